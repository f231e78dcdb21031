use std::cmp::Ordering;

use tracing::debug;

use super::LayoutEngine;
use crate::common::geometry::Rect;
use crate::model::{
    BindIndex, MonitorId, NodeId, NodeKind, SystemContainerKind, TilingContainerData,
};

impl LayoutEngine {
    /// The workspace's single root tiling container, created on first use.
    ///
    /// Panics if the workspace somehow holds more than one.
    #[track_caller]
    pub fn root_tiling_container(&mut self, ws: NodeId) -> NodeId {
        let containers: Vec<_> = self
            .graph
            .children(ws)
            .filter(|&c| matches!(self.graph.kind(c), NodeKind::TilingContainer(_)))
            .collect();
        match containers[..] {
            [] => {
                let monitor = self
                    .workspace_name(ws)
                    .map(|name| self.workspace_monitor(name))
                    .and_then(|m| self.monitor(m))
                    .map(|m| m.rect);
                let data = TilingContainerData {
                    layout: self.settings.default_root_container_layout.canonical(),
                    orientation: self.settings.default_root_container_orientation.resolve(monitor),
                };
                let root = self.graph.create_tiling_container(data);
                self.graph.bind(root, ws, BindIndex::Last);
                root
            }
            [root] => root,
            _ => panic!(
                "workspace {:?} must contain zero or one tiling container",
                self.workspace_name(ws)
            ),
        }
    }

    /// Like [`Self::root_tiling_container`], without creating one.
    pub fn existing_root_tiling_container(&self, ws: NodeId) -> Option<NodeId> {
        self.graph
            .children(ws)
            .find(|&c| matches!(self.graph.kind(c), NodeKind::TilingContainer(_)))
    }

    /// Windows directly under the root container, master first.
    pub fn tiling_clients(&self, ws: NodeId) -> Vec<NodeId> {
        let Some(root) = self.existing_root_tiling_container(ws) else {
            return Vec::new();
        };
        self.graph
            .children(root)
            .filter(|&c| matches!(self.graph.kind(c), NodeKind::Window(_)))
            .collect()
    }

    /// Rebinds `clients` under the root container in the given order.
    pub fn rebind_tiling_clients(&mut self, ws: NodeId, clients: &[NodeId]) {
        let root = self.root_tiling_container(ws);
        for &client in clients {
            self.graph.bind(client, root, BindIndex::Last);
        }
    }

    pub fn floating_windows(&self, ws: NodeId) -> Vec<NodeId> {
        self.graph
            .children(ws)
            .filter(|&c| matches!(self.graph.kind(c), NodeKind::Window(_)))
            .collect()
    }

    /// The workspace's holder for `kind` windows, created on first use.
    #[track_caller]
    pub fn system_container(&mut self, ws: NodeId, kind: SystemContainerKind) -> NodeId {
        let containers: Vec<_> = self
            .graph
            .children(ws)
            .filter(|&c| matches!(self.graph.kind(c), NodeKind::System(k) if *k == kind))
            .collect();
        match containers[..] {
            [] => {
                let container = self.graph.create_system_container(kind);
                self.graph.bind(container, ws, BindIndex::Last);
                container
            }
            [container] => container,
            _ => panic!(
                "workspace {:?} must contain zero or one {kind} container",
                self.workspace_name(ws)
            ),
        }
    }

    pub fn workspace_name(&self, ws: NodeId) -> Option<&str> {
        self.graph.workspace_data(ws).map(|d| d.name.as_str())
    }

    /// The first monitor from the workspace's forced assignment that exists.
    pub fn forced_monitor(&self, name: &str) -> Option<MonitorId> {
        self.settings
            .workspace_to_monitor_force_assignment
            .get(name)?
            .iter()
            .find_map(|desc| desc.resolve(&self.monitors))
    }

    /// The monitor a workspace belongs to: its forced monitor, the monitor it
    /// is shown on, the monitor it was last shown on, or the main monitor.
    pub fn workspace_monitor(&self, name: &str) -> MonitorId {
        if let Some(forced) = self.forced_monitor(name) {
            return forced;
        }
        if let Some((&monitor, _)) = self.active_workspaces.iter().find(|(_, n)| *n == name) {
            return monitor;
        }
        self.graph
            .workspace(name)
            .and_then(|ws| self.graph.workspace_data(ws))
            .and_then(|d| d.assigned_monitor)
            .filter(|&m| self.monitor(m).is_some())
            .unwrap_or_else(|| self.main_monitor())
    }

    pub fn monitor_rect(&self, id: MonitorId) -> Option<Rect> { self.monitor(id).map(|m| m.rect) }

    pub fn active_workspace(&self, monitor: MonitorId) -> Option<&str> {
        self.active_workspaces.get(&monitor).map(String::as_str)
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.active_workspaces.values().any(|n| n == name)
    }

    pub fn focused_monitor(&self) -> MonitorId {
        self.workspace_monitor(&self.focus.focused_workspace)
    }

    pub fn is_effectively_empty(&self, ws: NodeId) -> bool {
        self.graph.all_leaf_windows(ws).is_empty()
    }

    /// Names of all existing workspaces in natural order.
    pub fn sorted_workspace_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.graph.workspaces().map(|(n, _)| n.to_string()).collect();
        names.sort_by(|a, b| natural_cmp(a, b));
        names
    }

    /// Drops workspaces nobody can see or reach.
    pub fn gc_workspaces(&mut self) {
        let doomed: Vec<(String, NodeId)> = self
            .graph
            .workspaces()
            .filter(|&(name, ws)| {
                !self.is_visible(name)
                    && name != self.focus.focused_workspace
                    && !self.settings.persistent_workspaces.iter().any(|p| p == name)
                    && self.is_effectively_empty(ws)
            })
            .map(|(name, ws)| (name.to_string(), ws))
            .collect();
        for (name, ws) in doomed {
            debug!(name, "removing empty workspace");
            self.focus.forget_workspace(&name);
            self.graph.remove(ws);
        }
    }
}

/// Orders names so that digit runs compare by value: "2" < "10" < "a".
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        let (Some(ca), Some(cb)) = (a.chars().next(), b.chars().next()) else {
            return a.len().cmp(&b.len());
        };
        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let na = a.find(|c: char| !c.is_ascii_digit()).unwrap_or(a.len());
            let nb = b.find(|c: char| !c.is_ascii_digit()).unwrap_or(b.len());
            let (da, db) = (a[..na].trim_start_matches('0'), b[..nb].trim_start_matches('0'));
            let ord = da.len().cmp(&db.len()).then_with(|| da.cmp(db)).then(na.cmp(&nb));
            if ord != Ordering::Equal {
                return ord;
            }
            (a, b) = (&a[na..], &b[nb..]);
        } else {
            if ca != cb {
                return ca.cmp(&cb);
            }
            (a, b) = (&a[ca.len_utf8()..], &b[cb.len_utf8()..]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order() {
        let mut names = vec!["10", "b", "2", "a10", "1", "a9", "02", "a"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, ["1", "2", "02", "10", "a", "a9", "a10", "b"]);
    }

    #[test]
    fn natural_order_is_total() {
        assert_eq!(natural_cmp("web", "web"), Ordering::Equal);
        assert_eq!(natural_cmp("", "1"), Ordering::Less);
        assert_eq!(natural_cmp("3", "3x"), Ordering::Less);
    }
}
