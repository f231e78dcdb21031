use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// N-ary tree with ordered children.
///
/// The tree only knows structure. Anything else attached to a node lives in
/// the observer `O`, which is told about every structural change.
#[derive(Serialize, Deserialize)]
pub struct Tree<O> {
    pub map: NodeMap,
    pub data: O,
}

/// Where to insert a node among its new siblings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindIndex {
    At(usize),
    Last,
}

impl<O: Observer> Tree<O> {
    pub fn with_observer(data: O) -> Self { Tree { map: NodeMap::new(), data } }

    /// Creates a parentless node.
    pub fn mk_node(&mut self) -> NodeId {
        let id = self.map.map.insert(Node::default());
        self.data.added_to_forest(&self.map, id);
        id
    }

    /// Moves `node` under `parent` at `index`.
    ///
    /// The node is first unbound from its current parent (if any), so
    /// indices refer to the sibling list without `node` in it. Indices past
    /// the end append.
    #[track_caller]
    pub fn bind(&mut self, node: NodeId, parent: NodeId, index: BindIndex) {
        assert!(
            !parent.ancestors(&self.map).any(|a| a == node),
            "binding {node:?} under {parent:?} would create a cycle"
        );
        assert!(
            self.map.contains(node) && self.map.contains(parent),
            "bind on a node that is not in the forest: {node:?} -> {parent:?}"
        );
        self.unbind(node);
        let count = parent.children(&self.map).count();
        let at = match index {
            BindIndex::At(i) => i.min(count),
            BindIndex::Last => count,
        };
        let next = parent.children(&self.map).nth(at);
        match next {
            Some(next) => node.link_before(next, &mut self.map),
            None => node.link_under_back(parent, &mut self.map),
        }
        self.data.added_to_parent(&self.map, node);
    }

    /// Detaches `node` from its parent and returns where it was.
    ///
    /// Unbinding a parentless node does nothing.
    pub fn unbind(&mut self, node: NodeId) -> Option<(NodeId, usize)> {
        let parent = node.parent(&self.map)?;
        let index = node.index_in_parent(&self.map)?;
        self.data.removing_from_parent(&self.map, node);
        self.map.unlink(node);
        Some((parent, index))
    }

    /// Unbinds `node` and drops it together with its whole subtree.
    pub fn remove(&mut self, node: NodeId) {
        self.unbind(node);
        let doomed: Vec<_> = node.traverse_postorder(&self.map).collect();
        for id in doomed {
            self.data.removed_from_forest(&self.map, id);
            self.map.map.remove(id);
        }
    }
}

/// Map that holds the structure of the tree.
///
/// Several roots can live in the same map, which makes moving branches
/// between them a plain rebind.
#[derive(Serialize, Deserialize)]
pub struct NodeMap {
    map: SlotMap<NodeId, Node>,
}

impl NodeMap {
    fn new() -> NodeMap { NodeMap { map: SlotMap::default() } }

    pub fn contains(&self, id: NodeId) -> bool { self.map.contains_key(id) }
}

impl Index<NodeId> for NodeMap {
    type Output = Node;

    fn index(&self, index: NodeId) -> &Self::Output { &self.map[index] }
}

impl IndexMut<NodeId> for NodeMap {
    fn index_mut(&mut self, index: NodeId) -> &mut Self::Output { &mut self.map[index] }
}

slotmap::new_key_type! {
    /// Represents a node somewhere in the tree.
    pub struct NodeId;
}

impl NodeId {
    pub fn parent(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.parent)
    }

    pub fn children(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        ChildIterator {
            cur: map.map.get(self).and_then(|n| n.first_child),
            map,
        }
    }

    pub fn index_in_parent(self, map: &NodeMap) -> Option<usize> {
        let parent = self.parent(map)?;
        parent.children(map).position(|c| c == self)
    }

    pub fn traverse_postorder(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        PostorderTraversal::new(map, self)
    }

    pub fn traverse_preorder(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        PreorderTraversal::new(map, self)
    }

    /// Returns an iterator over all ancestors of the current node, including itself.
    pub fn ancestors(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        let mut next = Some(self);
        std::iter::from_fn(move || {
            let node = next;
            next = node.and_then(|n| map.map.get(n).and_then(|nd| nd.parent));
            node
        })
    }

    pub fn next_sibling(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.next_sibling)
    }

    pub fn first_child(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.first_child)
    }
}

pub trait Observer
where Self: Sized {
    fn added_to_forest(&mut self, map: &NodeMap, node: NodeId);
    fn added_to_parent(&mut self, map: &NodeMap, node: NodeId);
    fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId);
    fn removed_from_forest(&mut self, map: &NodeMap, node: NodeId);
}

#[derive(Default, PartialEq, Debug, Serialize, Deserialize)]
pub struct Node {
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
}

impl NodeId {
    fn link_under_back(self, parent: NodeId, map: &mut NodeMap) {
        let prev_child = {
            let parent_node = &mut map.map[parent];
            parent_node.first_child.get_or_insert(self);
            parent_node.last_child.replace(self)
        };
        map.map[self].parent = Some(parent);
        if let Some(prev) = prev_child {
            self.hlink_after(prev, map);
        }
    }

    fn link_before(self, next: NodeId, map: &mut NodeMap) {
        let parent = next.parent(map).expect("cannot make a sibling of a root node");
        map.map[self].parent = Some(parent);
        let parent_node = &mut map.map[parent];
        if parent_node.first_child == Some(next) {
            parent_node.first_child = Some(self);
        }
        self.hlink_before(next, map);
    }

    fn hlink_after(self, prev: NodeId, map: &mut NodeMap) {
        debug_assert_eq!(map.map[self].prev_sibling, None);
        map.map[self].prev_sibling = Some(prev);
        if let Some(next) = map.map[prev].next_sibling.replace(self) {
            map.map[next].prev_sibling = Some(self);
            map.map[self].next_sibling = Some(next);
        }
    }

    fn hlink_before(self, next: NodeId, map: &mut NodeMap) {
        debug_assert_eq!(map.map[self].next_sibling, None);
        map.map[self].next_sibling = Some(next);
        if let Some(prev) = map.map[next].prev_sibling.replace(self) {
            map.map[prev].next_sibling = Some(self);
            map.map[self].prev_sibling = Some(prev);
        }
    }
}

impl NodeMap {
    fn unlink(&mut self, id: NodeId) {
        let Some((prev_sibling, next_sibling, parent)) =
            self.map.get(id).map(|n| (n.prev_sibling, n.next_sibling, n.parent))
        else {
            return;
        };
        if let Some(prev) = prev_sibling {
            self.map[prev].next_sibling = next_sibling;
        }
        if let Some(next) = next_sibling {
            self.map[next].prev_sibling = prev_sibling;
        }
        if let Some(parent) = parent {
            let parent_node = &mut self.map[parent];
            if parent_node.first_child == Some(id) {
                parent_node.first_child = next_sibling;
            }
            if parent_node.last_child == Some(id) {
                parent_node.last_child = prev_sibling;
            }
        }
        let node = &mut self.map[id];
        node.prev_sibling = None;
        node.next_sibling = None;
        node.parent = None;
    }
}

struct ChildIterator<'a> {
    cur: Option<NodeId>,
    map: &'a NodeMap,
}

impl<'a> Iterator for ChildIterator<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        self.cur = self.map.map.get(id).and_then(|n| n.next_sibling);
        Some(id)
    }
}

struct PostorderTraversal<'a> {
    cur: Option<NodeId>,
    top: NodeId,
    map: &'a NodeMap,
}

impl<'a> PostorderTraversal<'a> {
    fn new(map: &'a NodeMap, root: NodeId) -> Self {
        Self {
            top: root,
            cur: Some(Self::descend_left(root, map)),
            map,
        }
    }

    fn descend_left(mut node: NodeId, map: &'a NodeMap) -> NodeId {
        while let Some(child) = node.first_child(map) {
            node = child;
        }
        node
    }
}

impl<'a> Iterator for PostorderTraversal<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cur?;
        self.cur = None;
        if node != self.top {
            if let Some(next) = node.next_sibling(self.map) {
                self.cur = Some(Self::descend_left(next, self.map));
            } else {
                self.cur = node.parent(self.map);
            }
        }
        Some(node)
    }
}

struct PreorderTraversal<'a> {
    top: NodeId,
    cur: Option<NodeId>,
    map: &'a NodeMap,
}

impl<'a> PreorderTraversal<'a> {
    fn new(map: &'a NodeMap, root: NodeId) -> Self {
        Self {
            top: root,
            cur: Some(root),
            map,
        }
    }
}

impl<'a> Iterator for PreorderTraversal<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cur?;
        if let Some(child) = node.first_child(self.map) {
            self.cur = Some(child);
        } else {
            self.cur = None;
            for ancestor in node.ancestors(self.map) {
                if ancestor == self.top {
                    break;
                }
                if let Some(sibling) = ancestor.next_sibling(self.map) {
                    self.cur = Some(sibling);
                    break;
                }
            }
        }
        Some(node)
    }
}
