pub mod engine;
mod normalize;
pub mod policy;
pub mod query;
pub mod scenario;
mod workspaces;

pub use engine::{LayoutEngine, LiveFocus, WindowPlacement};
pub use policy::{
    ConfiguredLayout, DefaultOrientation, Direction, Layout, LayoutChange, LayoutDescription,
    Orientation, Placement,
};
pub use query::{StatusSnapshot, WorkspaceBarItem};
pub use scenario::Scenario;
pub use workspaces::natural_cmp;
