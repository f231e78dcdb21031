use serde::{Deserialize, Serialize};

use super::graph::WindowId;

/// Ambient focus, kept by workspace name so it survives save and restore.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FocusState {
    pub focused_workspace: String,
    pub focused_window: Option<WindowId>,
    /// Target of workspace back-and-forth.
    pub prev_workspace: Option<String>,
    /// Last window the native layer reported as focused.
    pub last_native_focused: Option<WindowId>,
}

impl FocusState {
    pub fn new(workspace: impl Into<String>) -> Self {
        FocusState {
            focused_workspace: workspace.into(),
            ..Default::default()
        }
    }

    /// Records a focus change, remembering the workspace being left.
    pub fn focus(&mut self, workspace: &str, window: Option<WindowId>) {
        if self.focused_workspace != workspace {
            self.prev_workspace = Some(std::mem::replace(
                &mut self.focused_workspace,
                workspace.to_string(),
            ));
        }
        self.focused_window = window;
    }

    /// Forgets references to a workspace that no longer exists.
    pub fn forget_workspace(&mut self, workspace: &str) {
        if self.prev_workspace.as_deref() == Some(workspace) {
            self.prev_workspace = None;
        }
    }
}
