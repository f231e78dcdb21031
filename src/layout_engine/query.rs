use serde::{Deserialize, Serialize};

use super::LayoutEngine;
use crate::model::{ParentKind, TilingContainerData, WindowId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceBarItem {
    pub name: String,
    pub is_focused: bool,
    pub is_visible: bool,
    pub window_count: usize,
}

/// A read-only view of the engine for status bars and other background
/// readers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub workspaces: Vec<WorkspaceBarItem>,
    pub focused_workspace: String,
    pub focused_window: Option<WindowId>,
}

impl LayoutEngine {
    /// Lists existing workspaces that hold windows, are visible or are
    /// persistent; all of them if none qualify.
    pub fn status_snapshot(&self) -> StatusSnapshot {
        let all: Vec<WorkspaceBarItem> = self
            .sorted_workspace_names()
            .into_iter()
            .map(|name| WorkspaceBarItem {
                is_focused: name == self.focus.focused_workspace,
                is_visible: self.is_visible(&name),
                window_count: self
                    .graph
                    .workspace(&name)
                    .map_or(0, |ws| self.graph.all_leaf_windows(ws).len()),
                name,
            })
            .collect();
        let shown: Vec<WorkspaceBarItem> = all
            .iter()
            .filter(|item| {
                item.window_count > 0
                    || item.is_visible
                    || self.settings.persistent_workspaces.contains(&item.name)
            })
            .cloned()
            .collect();

        StatusSnapshot {
            workspaces: if shown.is_empty() { all } else { shown },
            focused_workspace: self.focus.focused_workspace.clone(),
            focused_window: self.focus.focused_window,
        }
    }

    /// Tiling windows of a workspace, master first.
    pub fn tiling_window_ids(&self, workspace: &str) -> Vec<WindowId> {
        let Some(ws) = self.graph.workspace(workspace) else {
            return Vec::new();
        };
        self.tiling_clients(ws).into_iter().filter_map(|n| self.graph.window_id(n)).collect()
    }

    pub fn floating_window_ids(&self, workspace: &str) -> Vec<WindowId> {
        let Some(ws) = self.graph.workspace(workspace) else {
            return Vec::new();
        };
        self.floating_windows(ws).into_iter().filter_map(|n| self.graph.window_id(n)).collect()
    }

    pub fn root_container(&self, workspace: &str) -> Option<TilingContainerData> {
        let ws = self.graph.workspace(workspace)?;
        let root = self.existing_root_tiling_container(ws)?;
        self.graph.tiling_data(root).copied()
    }

    /// What kind of node holds the window.
    pub fn window_parent_kind(&self, wid: WindowId) -> Option<ParentKind> {
        self.graph.parent_kind(self.graph.window(wid)?)
    }
}
