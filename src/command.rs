//! Commands that mutate the tiling tree.
//!
//! Every command reports its outcome as a `bool`. Failures that a user can
//! act on are written to the [`CmdIo`] error sink first.

pub mod args;
mod layout;
mod move_node;
mod swap;
pub mod target;
mod workspace;

pub use args::{
    Boundaries, BoundariesAction, DfsNextPrev, JoinWithArgs, LayoutArgs, MoveArgs, NextPrev,
    SplitArgs, SplitOrientation, SwapArgs, SwapTarget, TargetArgs, WorkspaceArgs,
    WorkspaceTarget,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::layout_engine::LayoutEngine;
use crate::model::WindowId;
use crate::sys::native::NativeWindows;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    #[error("No window is focused")]
    NoWindowIsFocused,
    #[error("No such window: {0}")]
    NoSuchWindow(WindowId),
    #[error("moving floating windows isn't yet supported")]
    MoveFloatingUnsupported,
    #[error(
        "moving fullscreen, minimized windows and windows of hidden apps isn't yet supported"
    )]
    MoveSystemUnsupported,
    #[error("The window is non-tiling")]
    NonTiling,
    #[error(
        "Can't change layout for minimized, fullscreen windows or windows of hidden apps. This behavior is subject to change"
    )]
    SystemContainerLayout,
    #[error("Workspace '{0}' is already focused")]
    AlreadyFocused(String),
    #[error("Prev workspace doesn't exist")]
    NoPreviousWorkspace,
    #[error("The list of layouts to toggle between is empty")]
    EmptyToggleList,
    #[error(
        "'join-with' is unavailable in dynamic dwm-style mode. Use stack move/swap commands instead."
    )]
    JoinUnavailable,
    #[error(
        "'split' is unavailable in dynamic dwm-style mode. Use stack operations and layout toggles instead."
    )]
    SplitUnavailable,
}

/// Error sink and piped input of one command invocation.
#[derive(Debug, Default, Clone)]
pub struct CmdIo {
    stdin: String,
    pub stderr: Vec<String>,
}

impl CmdIo {
    pub fn new() -> Self { Self::default() }

    pub fn with_stdin(stdin: impl Into<String>) -> Self {
        CmdIo {
            stdin: stdin.into(),
            ..Default::default()
        }
    }

    pub fn read_stdin(&self) -> &str { &self.stdin }

    /// Records an error message. Always returns false.
    pub fn err(&mut self, msg: impl Into<String>) -> bool {
        self.stderr.push(msg.into());
        false
    }

    pub fn fail(&mut self, err: CommandError) -> bool {
        debug!(%err, "command failed");
        self.err(err.to_string())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum WmCommand {
    Move(MoveArgs),
    Swap(SwapArgs),
    Layout(LayoutArgs),
    Workspace(WorkspaceArgs),
    WorkspaceBackAndForth,
    JoinWith(JoinWithArgs),
    Split(SplitArgs),
}

impl WmCommand {
    /// Runs the command against the tree. Does not normalize; see
    /// [`LayoutEngine::execute`].
    pub async fn run<N: NativeWindows>(
        &self,
        engine: &mut LayoutEngine,
        native: &N,
        io: &mut CmdIo,
    ) -> bool {
        match self {
            WmCommand::Move(args) => move_node::run(args, engine, native, io),
            WmCommand::Swap(args) => swap::run(args, engine, native, io),
            WmCommand::Layout(args) => layout::run(args, engine, native, io).await,
            WmCommand::Workspace(args) => workspace::run(args, engine, native, io),
            WmCommand::WorkspaceBackAndForth => workspace::back_and_forth(engine, native, io),
            WmCommand::JoinWith(_) => io.fail(CommandError::JoinUnavailable),
            WmCommand::Split(_) => io.fail(CommandError::SplitUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_engine::{Direction, LayoutDescription};

    #[test]
    fn commands_from_json() {
        let cmds: Vec<WmCommand> = serde_json::from_str(
            r#"[
                {"move": {"direction": "left"}},
                {"move": {"direction": "up", "boundaries": "all_monitors_outer_frame",
                          "boundaries_action": "fail", "window_id": 3}},
                {"swap": {"target": "dfs-next", "wrap_around": true}},
                {"swap": {"target": "master", "swap_focus": true}},
                {"layout": {"toggle_between": ["h_tiles", "v_tiles"]}},
                {"workspace": {"target": "next", "wrap_around": true}},
                {"workspace": {"target": "web", "fail_if_noop": true}},
                "workspace_back_and_forth",
                {"join_with": {"direction": "right"}},
                {"split": {"orientation": "opposite"}}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            cmds[1],
            WmCommand::Move(MoveArgs {
                direction: Direction::Up,
                boundaries: Boundaries::AllMonitorsOuterFrame,
                boundaries_action: BoundariesAction::Fail,
                window: TargetArgs {
                    window_id: Some(WindowId(3)),
                    workspace: None,
                },
            })
        );
        assert_eq!(
            cmds[2],
            WmCommand::Swap(SwapArgs {
                target: SwapTarget::DfsRelative(DfsNextPrev::DfsNext),
                swap_focus: false,
                wrap_around: true,
                window: TargetArgs::default(),
            })
        );
        assert_eq!(
            cmds[4],
            WmCommand::Layout(LayoutArgs {
                toggle_between: vec![LayoutDescription::HTiles, LayoutDescription::VTiles],
                window: TargetArgs::default(),
            })
        );
        assert!(matches!(
            &cmds[5],
            WmCommand::Workspace(WorkspaceArgs {
                target: WorkspaceTarget::Relative(NextPrev::Next),
                wrap_around: true,
                ..
            })
        ));
        assert!(matches!(
            &cmds[6],
            WmCommand::Workspace(WorkspaceArgs { target: WorkspaceTarget::Direct(name), .. })
                if name == "web"
        ));
        assert_eq!(cmds[7], WmCommand::WorkspaceBackAndForth);
    }

    #[test]
    fn io_collects_errors() {
        let mut io = CmdIo::with_stdin("1\n2\n");
        assert_eq!(io.read_stdin(), "1\n2\n");
        assert!(!io.fail(CommandError::AlreadyFocused("2".into())));
        assert_eq!(io.stderr, ["Workspace '2' is already focused"]);
    }
}
