use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

use super::monitor::MonitorId;
use super::tree::{self, BindIndex, NodeId, NodeMap, Tree};
use crate::common::collections::BTreeMap;
use crate::common::geometry::Size;
use crate::layout_engine::{Layout, Orientation};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Per-workspace holders for windows that are neither tiling nor floating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SystemContainerKind {
    Minimized,
    Fullscreen,
    HiddenApps,
    Popups,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceData {
    pub name: String,
    /// The monitor this workspace was last shown on.
    pub assigned_monitor: Option<MonitorId>,
    pub last_focused_window: Option<WindowId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilingContainerData {
    pub layout: Layout,
    pub orientation: Orientation,
}

impl TilingContainerData {
    pub fn change_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowData {
    pub id: WindowId,
    pub last_floating_size: Option<Size>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Workspace(WorkspaceData),
    TilingContainer(TilingContainerData),
    Window(WindowData),
    System(SystemContainerKind),
}

/// The kind of a window's direct parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentKind {
    Workspace,
    TilingContainer,
    System(SystemContainerKind),
}

impl NodeKind {
    fn can_adopt(&self, child: &NodeKind) -> bool {
        use NodeKind::*;
        match (self, child) {
            (_, Workspace(_)) => false,
            (Workspace(_), _) => true,
            (TilingContainer(_), Window(_) | TilingContainer(_)) => true,
            (System(_), Window(_)) => true,
            _ => false,
        }
    }

    /// Kinds a workspace may hold at most one of.
    fn is_singleton_like(&self, other: &NodeKind) -> bool {
        match (self, other) {
            (NodeKind::TilingContainer(_), NodeKind::TilingContainer(_)) => true,
            (NodeKind::System(a), NodeKind::System(b)) => a == b,
            _ => false,
        }
    }

    fn as_parent(&self) -> Option<ParentKind> {
        match self {
            NodeKind::Workspace(_) => Some(ParentKind::Workspace),
            NodeKind::TilingContainer(_) => Some(ParentKind::TilingContainer),
            NodeKind::System(kind) => Some(ParentKind::System(*kind)),
            NodeKind::Window(_) => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Workspace(ws) => write!(f, "workspace {}", ws.name),
            NodeKind::TilingContainer(c) => write!(f, "{} {}", c.layout, c.orientation),
            NodeKind::Window(w) => write!(f, "window {}", w.id),
            NodeKind::System(kind) => write!(f, "{kind}"),
        }
    }
}

/// The typed node graph: workspaces, containers and windows.
///
/// Every workspace is a root of the underlying forest. Nodes are typed by
/// [`NodeKind`]; windows and workspaces are also indexed by id and name.
#[derive(Serialize, Deserialize)]
pub struct NodeGraph {
    tree: Tree<Components>,
}

impl Default for NodeGraph {
    fn default() -> Self { Self::new() }
}

impl NodeGraph {
    pub fn new() -> Self {
        NodeGraph {
            tree: Tree::with_observer(Components::default()),
        }
    }

    pub fn map(&self) -> &NodeMap { &self.tree.map }

    pub fn kind(&self, node: NodeId) -> &NodeKind { &self.tree.data.kinds[node] }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> { node.parent(&self.tree.map) }

    pub fn parent_kind(&self, node: NodeId) -> Option<ParentKind> {
        self.parent(node).and_then(|p| self.kind(p).as_parent())
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.children(&self.tree.map)
    }

    pub fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        node.index_in_parent(&self.tree.map)
    }

    #[track_caller]
    pub fn create_workspace(&mut self, name: &str) -> NodeId {
        assert!(
            !self.tree.data.workspaces.contains_key(name),
            "workspace {name:?} already exists"
        );
        let node = self.create(NodeKind::Workspace(WorkspaceData {
            name: name.to_string(),
            assigned_monitor: None,
            last_focused_window: None,
        }));
        self.tree.data.workspaces.insert(name.to_string(), node);
        node
    }

    pub fn create_tiling_container(&mut self, data: TilingContainerData) -> NodeId {
        self.create(NodeKind::TilingContainer(data))
    }

    #[track_caller]
    pub fn create_window(&mut self, id: WindowId) -> NodeId {
        assert!(!self.tree.data.windows.contains_key(&id), "window {id} already exists");
        let node = self.create(NodeKind::Window(WindowData { id, last_floating_size: None }));
        self.tree.data.windows.insert(id, node);
        node
    }

    pub fn create_system_container(&mut self, kind: SystemContainerKind) -> NodeId {
        self.create(NodeKind::System(kind))
    }

    fn create(&mut self, kind: NodeKind) -> NodeId {
        let node = self.tree.mk_node();
        self.tree.data.kinds.insert(node, kind);
        node
    }

    /// Moves `node` under `parent`; see [`Tree::bind`].
    ///
    /// Panics when `parent` cannot hold a node of this kind, or when it would
    /// give a workspace a second root container or system container.
    #[track_caller]
    pub fn bind(&mut self, node: NodeId, parent: NodeId, index: BindIndex) {
        let (parent_kind, child_kind) = (self.kind(parent), self.kind(node));
        assert!(
            parent_kind.can_adopt(child_kind),
            "{parent_kind} cannot hold {child_kind}"
        );
        if matches!(parent_kind, NodeKind::Workspace(_)) {
            let duplicate = self
                .children(parent)
                .any(|c| c != node && self.kind(c).is_singleton_like(child_kind));
            assert!(!duplicate, "{parent_kind} already holds a {child_kind}");
        }
        self.tree.bind(node, parent, index);
    }

    pub fn unbind(&mut self, node: NodeId) -> Option<(NodeId, usize)> { self.tree.unbind(node) }

    /// Unbinds and destroys `node` and everything under it.
    pub fn remove(&mut self, node: NodeId) { self.tree.remove(node) }

    pub fn window(&self, id: WindowId) -> Option<NodeId> {
        self.tree.data.windows.get(&id).copied()
    }

    pub fn window_data(&self, node: NodeId) -> Option<&WindowData> {
        match self.tree.data.kinds.get(node)? {
            NodeKind::Window(w) => Some(w),
            _ => None,
        }
    }

    pub fn window_data_mut(&mut self, node: NodeId) -> Option<&mut WindowData> {
        match self.tree.data.kinds.get_mut(node)? {
            NodeKind::Window(w) => Some(w),
            _ => None,
        }
    }

    pub fn window_id(&self, node: NodeId) -> Option<WindowId> {
        self.window_data(node).map(|w| w.id)
    }

    pub fn workspace(&self, name: &str) -> Option<NodeId> {
        self.tree.data.workspaces.get(name).copied()
    }

    /// All workspaces, ordered by name bytes.
    pub fn workspaces(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.tree.data.workspaces.iter().map(|(name, node)| (name.as_str(), *node))
    }

    pub fn workspace_data(&self, node: NodeId) -> Option<&WorkspaceData> {
        match self.tree.data.kinds.get(node)? {
            NodeKind::Workspace(ws) => Some(ws),
            _ => None,
        }
    }

    pub fn workspace_data_mut(&mut self, node: NodeId) -> Option<&mut WorkspaceData> {
        match self.tree.data.kinds.get_mut(node)? {
            NodeKind::Workspace(ws) => Some(ws),
            _ => None,
        }
    }

    pub fn tiling_data(&self, node: NodeId) -> Option<&TilingContainerData> {
        match self.tree.data.kinds.get(node)? {
            NodeKind::TilingContainer(c) => Some(c),
            _ => None,
        }
    }

    pub fn tiling_data_mut(&mut self, node: NodeId) -> Option<&mut TilingContainerData> {
        match self.tree.data.kinds.get_mut(node)? {
            NodeKind::TilingContainer(c) => Some(c),
            _ => None,
        }
    }

    /// The workspace a node belongs to, if it is attached to one.
    pub fn node_workspace(&self, node: NodeId) -> Option<NodeId> {
        node.ancestors(&self.tree.map)
            .find(|&n| matches!(self.kind(n), NodeKind::Workspace(_)))
    }

    /// Windows under `node` in depth-first order.
    pub fn all_leaf_windows(&self, node: NodeId) -> Vec<NodeId> {
        node.traverse_preorder(&self.tree.map)
            .filter(|&n| matches!(self.kind(n), NodeKind::Window(_)))
            .collect()
    }

    pub fn weight(&self, node: NodeId) -> f32 { self.tree.data.weights[node].size }

    pub fn set_weight(&mut self, node: NodeId, weight: f32) {
        let weights = &mut self.tree.data.weights;
        if let Some(parent) = node.parent(&self.tree.map) {
            weights[parent].total += weight - weights[node].size;
        }
        weights[node].size = weight;
    }

    /// Exchanges the positions of two bound nodes.
    ///
    /// Each node takes over the slot of the other, including its weight, so
    /// the rest of both sibling lists is left as it was.
    pub fn swap_windows(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let (Some(pa), Some(pb)) = (self.parent(a), self.parent(b)) else {
            return;
        };
        let (Some(ia), Some(ib)) = (self.index_in_parent(a), self.index_in_parent(b)) else {
            return;
        };
        let (wa, wb) = (self.weight(a), self.weight(b));
        if pa == pb {
            let (first, second, i1, i2) = if ia < ib { (a, b, ia, ib) } else { (b, a, ib, ia) };
            self.bind(second, pa, BindIndex::At(i1));
            self.bind(first, pa, BindIndex::At(i2));
        } else {
            self.unbind(b);
            self.unbind(a);
            self.bind(b, pa, BindIndex::At(ia));
            self.bind(a, pb, BindIndex::At(ib));
        }
        self.set_weight(b, wa);
        self.set_weight(a, wb);
    }

    pub fn draw_tree(&self, node: NodeId) -> String {
        let tree = self.get_ascii_tree(node);
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = ascii_tree::write_tree(&mut out, &tree);
        out
    }

    fn get_ascii_tree(&self, node: NodeId) -> ascii_tree::Tree {
        let mut desc = self.kind(node).to_string();
        if self.parent(node).is_some() {
            desc = format!("{desc} (weight {})", self.weight(node));
        }
        let children: Vec<_> = self.children(node).map(|c| self.get_ascii_tree(c)).collect();
        if children.is_empty() {
            ascii_tree::Tree::Leaf(vec![desc])
        } else {
            ascii_tree::Tree::Node(desc, children)
        }
    }
}

#[derive(Default, Serialize, Deserialize)]
struct Components {
    kinds: SecondaryMap<NodeId, NodeKind>,
    weights: SecondaryMap<NodeId, Weight>,
    windows: BTreeMap<WindowId, NodeId>,
    workspaces: BTreeMap<String, NodeId>,
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
struct Weight {
    size: f32,
    total: f32,
}

impl tree::Observer for Components {
    fn added_to_forest(&mut self, _map: &NodeMap, node: NodeId) {
        self.weights.insert(node, Weight::default());
    }

    fn added_to_parent(&mut self, map: &NodeMap, node: NodeId) {
        let Some(parent) = node.parent(map) else { return };
        self.weights[node].size = 1.0;
        self.weights[parent].total += 1.0;
    }

    fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId) {
        let Some(parent) = node.parent(map) else { return };
        self.weights[parent].total -= self.weights[node].size;
    }

    fn removed_from_forest(&mut self, _map: &NodeMap, node: NodeId) {
        self.weights.remove(node);
        match self.kinds.remove(node) {
            Some(NodeKind::Window(w)) => {
                self.windows.remove(&w.id);
            }
            Some(NodeKind::Workspace(ws)) => {
                self.workspaces.remove(&ws.name);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tiles() -> TilingContainerData {
        TilingContainerData {
            layout: Layout::Tile,
            orientation: Orientation::H,
        }
    }

    struct Fixture {
        graph: NodeGraph,
        ws: NodeId,
        root: NodeId,
        windows: Vec<NodeId>,
    }

    fn fixture(n: u32) -> Fixture {
        let mut graph = NodeGraph::new();
        let ws = graph.create_workspace("1");
        let root = graph.create_tiling_container(tiles());
        graph.bind(root, ws, BindIndex::Last);
        let windows = (1..=n)
            .map(|i| {
                let w = graph.create_window(WindowId(i));
                graph.bind(w, root, BindIndex::Last);
                w
            })
            .collect();
        Fixture { graph, ws, root, windows }
    }

    /// Share of the parent's total weight held by `node`.
    fn proportion(graph: &NodeGraph, node: NodeId) -> Option<f64> {
        let parent = graph.parent(node)?;
        let weights = &graph.tree.data.weights;
        Some(f64::from(weights[node].size) / f64::from(weights[parent].total))
    }

    fn ids(graph: &NodeGraph, parent: NodeId) -> Vec<u32> {
        graph.children(parent).filter_map(|c| graph.window_id(c)).map(|w| w.0).collect()
    }

    #[test]
    fn indices_follow_lifecycle() {
        let mut f = fixture(2);
        assert_eq!(f.graph.window(WindowId(1)), Some(f.windows[0]));
        assert_eq!(f.graph.workspace("1"), Some(f.ws));
        assert_eq!(f.graph.node_workspace(f.windows[1]), Some(f.ws));
        assert_eq!(f.graph.parent_kind(f.windows[0]), Some(ParentKind::TilingContainer));

        f.graph.remove(f.windows[0]);
        assert_eq!(f.graph.window(WindowId(1)), None);
        assert_eq!(ids(&f.graph, f.root), [2]);

        f.graph.remove(f.ws);
        assert_eq!(f.graph.workspace("1"), None);
        assert_eq!(f.graph.window(WindowId(2)), None);
        assert!(!f.graph.map().contains(f.root));
        assert!(!f.graph.map().contains(f.windows[1]));
    }

    #[test]
    fn unbound_window_has_no_workspace() {
        let mut f = fixture(1);
        f.graph.unbind(f.windows[0]);
        assert_eq!(f.graph.node_workspace(f.windows[0]), None);
        assert_eq!(f.graph.parent_kind(f.windows[0]), None);
        assert_eq!(f.graph.window(WindowId(1)), Some(f.windows[0]));
    }

    #[test]
    fn leaf_windows_are_depth_first() {
        let mut f = fixture(2);
        let nested = f.graph.create_tiling_container(tiles());
        f.graph.bind(nested, f.root, BindIndex::At(1));
        let w3 = f.graph.create_window(WindowId(3));
        f.graph.bind(w3, nested, BindIndex::Last);
        let leaves: Vec<_> =
            f.graph.all_leaf_windows(f.ws).into_iter().filter_map(|n| f.graph.window_id(n)).collect();
        assert_eq!(leaves, [WindowId(1), WindowId(3), WindowId(2)]);
    }

    #[test]
    fn weights_track_binding() {
        let mut f = fixture(3);
        assert_eq!(proportion(&f.graph, f.windows[0]), Some(1.0 / 3.0));
        f.graph.set_weight(f.windows[0], 2.0);
        assert_eq!(proportion(&f.graph, f.windows[0]), Some(0.5));
        f.graph.unbind(f.windows[0]);
        assert_eq!(proportion(&f.graph, f.windows[1]), Some(0.5));
        f.graph.bind(f.windows[0], f.root, BindIndex::Last);
        assert_eq!(f.graph.weight(f.windows[0]), 1.0);
        assert_eq!(proportion(&f.graph, f.windows[2]), Some(1.0 / 3.0));
    }

    mod swap {
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn adjacent() {
            let mut f = fixture(3);
            f.graph.swap_windows(f.windows[0], f.windows[1]);
            assert_eq!(ids(&f.graph, f.root), [2, 1, 3]);
        }

        #[test]
        fn far_apart_keeps_middle() {
            let mut f = fixture(4);
            f.graph.swap_windows(f.windows[3], f.windows[0]);
            assert_eq!(ids(&f.graph, f.root), [4, 2, 3, 1]);
        }

        #[test]
        fn with_self_is_noop() {
            let mut f = fixture(2);
            f.graph.swap_windows(f.windows[1], f.windows[1]);
            assert_eq!(ids(&f.graph, f.root), [1, 2]);
        }

        #[test]
        fn weights_stay_with_slots() {
            let mut f = fixture(3);
            f.graph.set_weight(f.windows[0], 3.0);
            f.graph.swap_windows(f.windows[0], f.windows[2]);
            assert_eq!(f.graph.weight(f.windows[2]), 3.0);
            assert_eq!(f.graph.weight(f.windows[0]), 1.0);
            assert_eq!(proportion(&f.graph, f.windows[2]), Some(0.6));
        }

        #[test]
        fn across_parents() {
            let mut f = fixture(2);
            let floating = f.graph.create_window(WindowId(9));
            f.graph.bind(floating, f.ws, BindIndex::Last);
            f.graph.swap_windows(f.windows[1], floating);
            assert_eq!(ids(&f.graph, f.root), [1, 9]);
            assert_eq!(f.graph.parent(f.windows[1]), Some(f.ws));
        }
    }

    mod invariants {
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        #[should_panic(expected = "already holds")]
        fn second_root_container() {
            let mut f = fixture(0);
            let other = f.graph.create_tiling_container(tiles());
            f.graph.bind(other, f.ws, BindIndex::Last);
        }

        #[test]
        #[should_panic(expected = "already holds")]
        fn second_system_container_of_a_kind() {
            let mut f = fixture(0);
            for _ in 0..2 {
                let c = f.graph.create_system_container(SystemContainerKind::Fullscreen);
                f.graph.bind(c, f.ws, BindIndex::Last);
            }
        }

        #[test]
        fn distinct_system_containers() {
            let mut f = fixture(0);
            for kind in [SystemContainerKind::Minimized, SystemContainerKind::Popups] {
                let c = f.graph.create_system_container(kind);
                f.graph.bind(c, f.ws, BindIndex::Last);
            }
            assert_eq!(f.graph.children(f.ws).count(), 3);
        }

        #[test]
        fn rebinding_root_into_same_workspace_is_allowed() {
            let mut f = fixture(1);
            f.graph.bind(f.root, f.ws, BindIndex::At(0));
            assert_eq!(f.graph.parent(f.root), Some(f.ws));
        }

        #[test]
        #[should_panic(expected = "cannot hold")]
        fn window_under_window() {
            let mut f = fixture(2);
            f.graph.bind(f.windows[0], f.windows[1], BindIndex::Last);
        }

        #[test]
        #[should_panic(expected = "cannot hold")]
        fn container_under_system_container() {
            let mut f = fixture(0);
            let c = f.graph.create_system_container(SystemContainerKind::Minimized);
            let t = f.graph.create_tiling_container(tiles());
            f.graph.bind(t, c, BindIndex::Last);
        }

        #[test]
        #[should_panic(expected = "already exists")]
        fn duplicate_window_id() {
            let mut f = fixture(1);
            f.graph.create_window(WindowId(1));
        }

        #[test]
        #[should_panic(expected = "already exists")]
        fn duplicate_workspace_name() {
            let mut f = fixture(0);
            f.graph.create_workspace("1");
        }
    }

    #[test]
    fn draw_tree() {
        let mut f = fixture(2);
        f.graph.tiling_data_mut(f.root).unwrap().layout = Layout::Monocle;
        let out = f.graph.draw_tree(f.ws);
        assert!(out.contains("workspace 1"), "{out}");
        assert!(out.contains("monocle h (weight 1)"), "{out}");
        assert!(out.contains("window 2 (weight 1)"), "{out}");
    }
}
