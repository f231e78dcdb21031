pub mod focus;
pub mod graph;
pub mod monitor;
pub mod tree;

pub use focus::FocusState;
pub use graph::{
    NodeGraph, NodeKind, ParentKind, SystemContainerKind, TilingContainerData, WindowData,
    WindowId, WorkspaceData,
};
pub use monitor::{Monitor, MonitorId};
pub use tree::{BindIndex, NodeId};
