use tracing::trace;

use super::LayoutEngine;
use crate::model::{BindIndex, NodeId, NodeKind};

impl LayoutEngine {
    /// Flattens a workspace's tiling tree into one root container holding
    /// every tiling window, in depth-first order.
    ///
    /// An empty root is kept so the workspace's layout survives.
    pub fn normalize_containers(&mut self, ws: NodeId) {
        let root = self.root_tiling_container(ws);
        let clients = self.graph.all_leaf_windows(root);
        trace!(?root, clients = clients.len(), "normalizing");

        if clients.is_empty() {
            let nested: Vec<_> = self
                .graph
                .children(root)
                .filter(|&c| matches!(self.graph.kind(c), NodeKind::TilingContainer(_)))
                .collect();
            for container in nested {
                self.graph.remove(container);
            }
            return;
        }

        let weights: Vec<f32> = clients.iter().map(|&w| self.graph.weight(w)).collect();
        for &window in &clients {
            self.graph.unbind(window);
        }
        // Only emptied containers are left.
        let leftovers: Vec<_> = self.graph.children(root).collect();
        for container in leftovers {
            self.graph.remove(container);
        }
        for (window, weight) in clients.into_iter().zip(weights) {
            self.graph.bind(window, root, BindIndex::Last);
            self.graph.set_weight(window, weight);
        }
    }

    pub fn normalize_all(&mut self) {
        let workspaces: Vec<_> = self.graph.workspaces().map(|(_, ws)| ws).collect();
        for ws in workspaces {
            self.normalize_containers(ws);
        }
    }
}
