//! Arena representation of a tree decomposition.
//!
//! Nodes live in a contiguous arena and are addressed by [`NodeId`]. Parent
//! and child edges are stored as ids, so structural rewrites never move or
//! drop node data; ids stay stable for the lifetime of the decomposition.
//!
//! Bags are sorted and duplicate free. Structural operations may leave the
//! decomposition temporarily invalid (a bag shrunk before the node that
//! compensates for it is inserted); validity is checked by
//! [`TreeDecompositionVerifier`](crate::verify::TreeDecompositionVerifier)
//! once a whole manipulation has completed.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::DecompositionError;
use crate::hypergraph::{Hyperedge, Hypergraph, Vertex};
use crate::utils::{normalize_bag, sorted_difference, sorted_intersection, sorted_union};

/// Stable identifier of a decomposition node.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Position of the node in its arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value attached to a node by a labelling preprocessing hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    Flag(bool),
    Count(usize),
    Vertices(Vec<Vertex>),
}

/// A single bag of the decomposition together with its tree edges.
#[derive(Debug, Clone)]
pub struct DecompositionNode {
    id: NodeId,
    bag: Vec<Vertex>,
    induced_edges: Vec<Hyperedge>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    labels: BTreeMap<String, Label>,
}

impl DecompositionNode {
    fn new(id: NodeId, bag: Vec<Vertex>, parent: Option<NodeId>) -> Self {
        Self {
            id,
            bag,
            induced_edges: Vec::new(),
            parent,
            children: Vec::new(),
            labels: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn bag(&self) -> &[Vertex] {
        &self.bag
    }

    /// Hyperedges this node is responsible for covering.
    pub fn induced_edges(&self) -> &[Hyperedge] {
        &self.induced_edges
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn labels(&self) -> &BTreeMap<String, Label> {
        &self.labels
    }
}

/// Rooted tree decomposition stored as a node arena.
///
/// All methods taking a [`NodeId`] panic if the id was not handed out by this
/// decomposition.
#[derive(Debug, Clone)]
pub struct TreeDecomposition {
    nodes: Vec<DecompositionNode>,
    root: NodeId,
}

impl TreeDecomposition {
    /// Create a decomposition consisting of a single root bag.
    pub fn new<I>(root_bag: I) -> Self
    where
        I: IntoIterator<Item = Vertex>,
    {
        let root = NodeId(0);
        Self {
            nodes: vec![DecompositionNode::new(root, normalize_bag(root_bag), None)],
            root,
        }
    }

    fn allocate(&mut self, bag: Vec<Vertex>, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("node arena exceeds u32 ids"));
        self.nodes.push(DecompositionNode::new(id, bag, parent));
        id
    }

    #[inline]
    fn slot(&self, node: NodeId) -> &DecompositionNode {
        &self.nodes[node.index()]
    }

    #[inline]
    fn slot_mut(&mut self, node: NodeId) -> &mut DecompositionNode {
        &mut self.nodes[node.index()]
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, node: NodeId) -> &DecompositionNode {
        self.slot(node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All node ids in allocation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    pub fn bag(&self, node: NodeId) -> &[Vertex] {
        &self.slot(node).bag
    }

    pub fn induced_edges(&self, node: NodeId) -> &[Hyperedge] {
        &self.slot(node).induced_edges
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.slot(node).children
    }

    pub fn child_count(&self, node: NodeId) -> usize {
        self.slot(node).children.len()
    }

    pub fn child_at(&self, node: NodeId, position: usize) -> Option<NodeId> {
        self.slot(node).children.get(position).copied()
    }

    pub fn is_root(&self, node: NodeId) -> bool {
        node == self.root
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.slot(node).children.is_empty()
    }

    pub fn is_join(&self, node: NodeId) -> bool {
        self.slot(node).children.len() > 1
    }

    pub fn join_nodes(&self) -> Vec<NodeId> {
        self.node_ids().filter(|&n| self.is_join(n)).collect()
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        self.node_ids().filter(|&n| self.is_leaf(n)).collect()
    }

    pub fn max_bag_size(&self) -> usize {
        self.nodes.iter().map(|n| n.bag.len()).max().unwrap_or(0)
    }

    /// Width of the decomposition: largest bag size minus one.
    pub fn width(&self) -> usize {
        self.max_bag_size().saturating_sub(1)
    }

    pub fn max_child_count(&self) -> usize {
        self.nodes.iter().map(|n| n.children.len()).max().unwrap_or(0)
    }

    /// Number of edges between `node` and the root.
    pub fn depth(&self, node: NodeId) -> usize {
        let mut depth = 0;
        let mut current = node;
        while let Some(parent) = self.slot(current).parent {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(self.children(node).iter().map(|&c| (c, depth + 1)));
        }
        height
    }

    /// Union of the children's bags.
    fn child_bag_union(&self, node: NodeId) -> Vec<Vertex> {
        self.children(node)
            .iter()
            .fold(Vec::new(), |acc, &c| sorted_union(&acc, self.bag(c)))
    }

    /// Vertices of the bag that occur in no child bag.
    pub fn introduced(&self, node: NodeId) -> Vec<Vertex> {
        sorted_difference(self.bag(node), &self.child_bag_union(node))
    }

    /// Vertices of child bags that are dropped at this node.
    pub fn forgotten(&self, node: NodeId) -> Vec<Vertex> {
        sorted_difference(&self.child_bag_union(node), self.bag(node))
    }

    /// Vertices of the bag that also occur in some child bag.
    pub fn remembered(&self, node: NodeId) -> Vec<Vertex> {
        sorted_intersection(self.bag(node), &self.child_bag_union(node))
    }

    /// Append a new child below `parent` and return its id.
    pub fn add_child<I>(&mut self, parent: NodeId, bag: I) -> NodeId
    where
        I: IntoIterator<Item = Vertex>,
    {
        let child = self.allocate(normalize_bag(bag), Some(parent));
        self.slot_mut(parent).children.push(child);
        child
    }

    /// Insert a new node between `node` and its parent.
    ///
    /// The new node takes over `node`'s position in the parent's child list,
    /// or becomes the root if `node` was the root.
    pub fn add_parent<I>(&mut self, node: NodeId, bag: I) -> NodeId
    where
        I: IntoIterator<Item = Vertex>,
    {
        let old_parent = self.slot(node).parent;
        let inserted = self.allocate(normalize_bag(bag), old_parent);
        self.slot_mut(inserted).children.push(node);
        self.slot_mut(node).parent = Some(inserted);
        match old_parent {
            Some(p) => {
                for child in self.slot_mut(p).children.iter_mut() {
                    if *child == node {
                        *child = inserted;
                    }
                }
            }
            None => self.root = inserted,
        }
        inserted
    }

    /// Move `node` (with its subtree) below `new_parent`, appended as the
    /// last child.
    pub fn set_parent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), DecompositionError> {
        let old_parent = self
            .slot(node)
            .parent
            .ok_or(DecompositionError::ReparentRoot { node })?;
        let mut cursor = Some(new_parent);
        while let Some(current) = cursor {
            if current == node {
                return Err(DecompositionError::WouldCreateCycle {
                    node,
                    parent: new_parent,
                });
            }
            cursor = self.slot(current).parent;
        }
        if old_parent == new_parent {
            return Ok(());
        }
        self.slot_mut(old_parent).children.retain(|&c| c != node);
        self.slot_mut(new_parent).children.push(node);
        self.slot_mut(node).parent = Some(new_parent);
        Ok(())
    }

    pub fn set_bag<I>(&mut self, node: NodeId, bag: I)
    where
        I: IntoIterator<Item = Vertex>,
    {
        self.slot_mut(node).bag = normalize_bag(bag);
    }

    pub fn set_induced_edges(&mut self, node: NodeId, edges: Vec<Hyperedge>) {
        self.slot_mut(node).induced_edges = edges;
    }

    pub fn set_label(&mut self, node: NodeId, name: impl Into<String>, label: Label) {
        self.slot_mut(node).labels.insert(name.into(), label);
    }

    pub fn label(&self, node: NodeId, name: &str) -> Option<&Label> {
        self.slot(node).labels.get(name)
    }

    /// Assign every node the hyperedges of `graph` contained in its bag.
    pub fn compute_induced_edges(&mut self, graph: &Hypergraph) {
        for node in self.nodes.iter_mut() {
            node.induced_edges = graph.edges_within(&node.bag).cloned().collect();
        }
    }

    /// Nodes in pre-order (parent before children, children left to right).
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        order
    }

    /// Nodes in post-order (children left to right, then the parent).
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, 0usize)];
        while let Some((node, next)) = stack.last_mut() {
            let node = *node;
            if let Some(&child) = self.slot(node).children.get(*next) {
                *next += 1;
                stack.push((child, 0));
            } else {
                stack.pop();
                order.push(node);
            }
        }
        order
    }
}

/// Human-readable export: one `id[parent] @depth: bag` line per node, in
/// pre-order.
impl fmt::Display for TreeDecomposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self.root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            let parent = match self.parent(node) {
                Some(p) => p.to_string(),
                None => "-".to_string(),
            };
            writeln!(f, "{node}[{parent}] @{depth}: {:?}", self.bag(node))?;
            stack.extend(self.children(node).iter().rev().map(|&c| (c, depth + 1)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (TreeDecomposition, NodeId, NodeId) {
        let mut td = TreeDecomposition::new([3, 1, 2]);
        let root = td.root();
        let a = td.add_child(root, [1, 2]);
        let b = td.add_child(root, [2, 3, 4]);
        (td, a, b)
    }

    #[test]
    fn bags_are_sorted_sets() {
        let (td, _, b) = sample();
        assert_eq!(td.bag(td.root()), &[1, 2, 3]);
        assert_eq!(td.bag(b), &[2, 3, 4]);
        assert_eq!(td.max_bag_size(), 3);
        assert_eq!(td.width(), 2);
    }

    #[test]
    fn add_parent_keeps_child_position() {
        let (mut td, a, b) = sample();
        let root = td.root();
        let inserted = td.add_parent(a, [1, 2]);
        assert_eq!(td.children(root), &[inserted, b]);
        assert_eq!(td.parent(a), Some(inserted));
        assert_eq!(td.children(inserted), &[a]);
        assert_eq!(td.height(), 2);
    }

    #[test]
    fn add_parent_above_root_moves_root() {
        let (mut td, _, _) = sample();
        let old_root = td.root();
        let top = td.add_parent(old_root, [1, 2, 3]);
        assert_eq!(td.root(), top);
        assert_eq!(td.parent(top), None);
        assert_eq!(td.depth(old_root), 1);
    }

    #[test]
    fn set_parent_rejects_cycles_and_root() {
        let (mut td, a, b) = sample();
        let root = td.root();
        let below_a = td.add_child(a, [1]);
        assert_eq!(
            td.set_parent(a, below_a),
            Err(DecompositionError::WouldCreateCycle { node: a, parent: below_a })
        );
        assert_eq!(
            td.set_parent(root, a),
            Err(DecompositionError::ReparentRoot { node: root })
        );
        td.set_parent(below_a, b).unwrap();
        assert_eq!(td.children(a), &[] as &[NodeId]);
        assert_eq!(td.children(b), &[below_a]);
    }

    #[test]
    fn introduced_forgotten_remembered() {
        let (td, _, _) = sample();
        let root = td.root();
        assert!(td.introduced(root).is_empty());
        assert_eq!(td.forgotten(root), vec![4]);
        assert_eq!(td.remembered(root), vec![1, 2, 3]);
    }

    #[test]
    fn traversal_orders() {
        let (mut td, a, b) = sample();
        let c = td.add_child(a, [1]);
        let root = td.root();
        assert_eq!(td.pre_order(), vec![root, a, c, b]);
        assert_eq!(td.post_order(), vec![c, a, b, root]);
    }

    #[test]
    fn induced_edges_follow_bags() {
        let (mut td, a, b) = sample();
        let graph = Hypergraph::from_edges([(1, 2), (3, 4)]);
        td.compute_induced_edges(&graph);
        assert_eq!(td.induced_edges(a).len(), 1);
        assert_eq!(td.induced_edges(b)[0].vertices(), &[3, 4]);
        assert_eq!(td.induced_edges(td.root()).len(), 1);
    }

    #[test]
    fn display_lists_nodes_in_pre_order() {
        let (td, _, _) = sample();
        let rendered = td.to_string();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "0[-] @0: [1, 2, 3]");
        assert_eq!(lines[2], "2[0] @1: [2, 3, 4]");
    }
}
