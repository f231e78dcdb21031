use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::layout_engine::{Direction, LayoutDescription};
use crate::model::WindowId;

/// Overrides which window or workspace a command applies to.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TargetArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<WindowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
}

/// How far a directional move may go before hitting a boundary.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Boundaries {
    #[default]
    Workspace,
    AllMonitorsOuterFrame,
}

/// What a directional move does at the boundary.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BoundariesAction {
    #[default]
    Stop,
    Fail,
    CreateImplicitContainer,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MoveArgs {
    pub direction: Direction,
    #[serde(default)]
    pub boundaries: Boundaries,
    #[serde(default)]
    pub boundaries_action: BoundariesAction,
    #[serde(flatten)]
    pub window: TargetArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum DfsNextPrev {
    #[strum(serialize = "dfs-next")]
    DfsNext,
    #[strum(serialize = "dfs-prev")]
    DfsPrev,
}

impl DfsNextPrev {
    pub fn offset(self) -> isize {
        match self {
            DfsNextPrev::DfsNext => 1,
            DfsNextPrev::DfsPrev => -1,
        }
    }
}

/// The window to swap with: `master`, a direction, or `dfs-next`/`dfs-prev`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum SwapTarget {
    Direction(Direction),
    DfsRelative(DfsNextPrev),
    Master,
}

impl FromStr for SwapTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "master" {
            return Ok(SwapTarget::Master);
        }
        if let Ok(direction) = Direction::from_str(s) {
            return Ok(SwapTarget::Direction(direction));
        }
        DfsNextPrev::from_str(s).map(SwapTarget::DfsRelative).map_err(|_| {
            format!("Can't parse '{s}'. Possible values: left|down|up|right|dfs-next|dfs-prev|master")
        })
    }
}

impl fmt::Display for SwapTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapTarget::Direction(d) => write!(f, "{d}"),
            SwapTarget::DfsRelative(np) => write!(f, "{np}"),
            SwapTarget::Master => f.write_str("master"),
        }
    }
}

impl TryFrom<String> for SwapTarget {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<SwapTarget> for String {
    fn from(value: SwapTarget) -> Self { value.to_string() }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SwapArgs {
    pub target: SwapTarget,
    #[serde(default)]
    pub swap_focus: bool,
    #[serde(default)]
    pub wrap_around: bool,
    #[serde(flatten)]
    pub window: TargetArgs,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LayoutArgs {
    pub toggle_between: Vec<LayoutDescription>,
    #[serde(flatten)]
    pub window: TargetArgs,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NextPrev {
    Next,
    Prev,
}

/// `next`, `prev`, or a workspace name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum WorkspaceTarget {
    Relative(NextPrev),
    Direct(String),
}

impl From<String> for WorkspaceTarget {
    fn from(value: String) -> Self {
        match NextPrev::from_str(&value) {
            Ok(np) => WorkspaceTarget::Relative(np),
            Err(_) => WorkspaceTarget::Direct(value),
        }
    }
}

impl From<WorkspaceTarget> for String {
    fn from(value: WorkspaceTarget) -> Self {
        match value {
            WorkspaceTarget::Relative(np) => np.to_string(),
            WorkspaceTarget::Direct(name) => name,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkspaceArgs {
    pub target: WorkspaceTarget,
    #[serde(default)]
    pub wrap_around: bool,
    /// Take the candidate list for `next`/`prev` from piped input.
    #[serde(default)]
    pub use_stdin: bool,
    #[serde(default)]
    pub fail_if_noop: bool,
    /// Falls back to the `workspace_auto_back_and_forth` setting.
    #[serde(default)]
    pub auto_back_and_forth: Option<bool>,
}

impl WorkspaceArgs {
    pub fn new(target: WorkspaceTarget) -> Self {
        WorkspaceArgs {
            target,
            wrap_around: false,
            use_stdin: false,
            fail_if_noop: false,
            auto_back_and_forth: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JoinWithArgs {
    pub direction: Direction,
    #[serde(flatten)]
    pub window: TargetArgs,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SplitOrientation {
    Horizontal,
    Vertical,
    Opposite,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SplitArgs {
    pub orientation: SplitOrientation,
    #[serde(flatten)]
    pub window: TargetArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_target_tokens() {
        assert_eq!("master".parse::<SwapTarget>(), Ok(SwapTarget::Master));
        assert_eq!("left".parse::<SwapTarget>(), Ok(SwapTarget::Direction(Direction::Left)));
        assert_eq!("dfs-prev".parse::<SwapTarget>(), Ok(SwapTarget::DfsRelative(DfsNextPrev::DfsPrev)));
        assert!("sideways".parse::<SwapTarget>().unwrap_err().contains("Possible values"));
        assert_eq!(SwapTarget::DfsRelative(DfsNextPrev::DfsNext).to_string(), "dfs-next");
    }

    #[test]
    fn workspace_target_tokens() {
        assert_eq!(
            WorkspaceTarget::from("prev".to_string()),
            WorkspaceTarget::Relative(NextPrev::Prev)
        );
        assert_eq!(
            WorkspaceTarget::from("10".to_string()),
            WorkspaceTarget::Direct("10".into())
        );
        assert_eq!(String::from(WorkspaceTarget::Relative(NextPrev::Next)), "next");
    }

    #[test]
    fn move_defaults() {
        let args: MoveArgs = serde_json::from_str(r#"{"direction": "down"}"#).unwrap();
        assert_eq!(args.boundaries, Boundaries::Workspace);
        assert_eq!(args.boundaries_action, BoundariesAction::Stop);
        assert_eq!(args.window, TargetArgs::default());
    }
}
