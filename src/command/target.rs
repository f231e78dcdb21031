use super::{CmdIo, CommandError, TargetArgs};
use crate::layout_engine::{LayoutEngine, LiveFocus};
use crate::model::{NodeId, WindowId};

impl TargetArgs {
    /// Resolves the window and workspace a command applies to.
    ///
    /// An explicit window id wins, then an explicit workspace (focusing its
    /// most recent window), then ambient focus.
    pub fn resolve_target_or_report_error(
        &self,
        engine: &mut LayoutEngine,
        io: &mut CmdIo,
    ) -> Option<LiveFocus> {
        if let Some(wid) = self.window_id {
            let Some(workspace) = engine.window_workspace_name(wid) else {
                io.fail(CommandError::NoSuchWindow(wid));
                return None;
            };
            return Some(LiveFocus { window: Some(wid), workspace });
        }
        if let Some(name) = &self.workspace {
            let ws = engine.workspace_node(name);
            let graph = engine.graph();
            let window = graph
                .workspace_data(ws)
                .and_then(|d| d.last_focused_window)
                .filter(|&w| graph.window(w).and_then(|n| graph.node_workspace(n)) == Some(ws))
                .or_else(|| graph.all_leaf_windows(ws).first().and_then(|&n| graph.window_id(n)));
            return Some(LiveFocus { window, workspace: name.clone() });
        }
        Some(engine.focus())
    }
}

impl LiveFocus {
    /// The focused window's node, or a reported error when there is none.
    pub fn window_or_report(
        &self,
        engine: &LayoutEngine,
        io: &mut CmdIo,
    ) -> Option<(WindowId, NodeId)> {
        let Some(wid) = self.window else {
            io.fail(CommandError::NoWindowIsFocused);
            return None;
        };
        match engine.graph().window(wid) {
            Some(node) => Some((wid, node)),
            None => {
                io.fail(CommandError::NoSuchWindow(wid));
                None
            }
        }
    }
}
