use crate::decomposition::{NodeId, TreeDecomposition};
use crate::error::DecompositionError;
use crate::hypergraph::Vertex;
use crate::session::CancellationToken;
use crate::utils::{chain_groups, sorted_intersection, sorted_union};

use super::{edges_within, ManipulationOperation};

/// Bounds the number of children per node while keeping bags tight.
///
/// For a node `N` with bag `B` and `k > limit` children, the children are
/// split into groups in child-list order (see [`chain_groups`]). Group 0
/// stays below `N`; every further group hangs below a new chain link that is
/// the last child of the previous link. A link only keeps the part of `B`
/// still needed by the children of its own group and of all later groups.
///
/// When some element of `B` occurs in no child at all, `N` itself is
/// restricted the same way and a new node with bag `B` and all of `N`'s
/// induced hyperedges is inserted above it, so the elements missing below
/// are introduced there. Every restricted or synthetic node receives the
/// induced hyperedges of `N` that fit inside its bag.
///
/// Nodes with at most `limit` children are left alone, so applying the
/// operation twice yields the same tree.
#[derive(Debug, Clone, Copy)]
pub struct ExactLimitChildCount {
    limit: usize,
}

impl ExactLimitChildCount {
    /// # Panics
    /// Panics if `limit < 2`.
    pub fn new(limit: usize) -> Self {
        assert!(limit >= 2, "child limit must be at least 2");
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn rewrite(&self, td: &mut TreeDecomposition, node: NodeId) -> Result<(), DecompositionError> {
        let children = td.children(node).to_vec();
        let bag = td.bag(node).to_vec();
        let edges = td.induced_edges(node).to_vec();
        let groups = chain_groups(children.len(), self.limit);

        // required[i]: elements of `bag` used by children of group i or later
        let mut required: Vec<Vec<Vertex>> = vec![Vec::new(); groups.len()];
        let mut acc: Vec<Vertex> = Vec::new();
        for (i, group) in groups.iter().enumerate().rev() {
            for &child in &children[group.clone()] {
                acc = sorted_union(&acc, &sorted_intersection(&bag, td.bag(child)));
            }
            required[i] = acc.clone();
        }

        let mut link = node;
        for (group, link_bag) in groups.iter().zip(&required).skip(1) {
            let next = td.add_child(link, link_bag.iter().copied());
            td.set_induced_edges(next, edges_within(&edges, link_bag));
            for &child in &children[group.clone()] {
                td.set_parent(child, next)?;
            }
            link = next;
        }

        let introduce_left = required[0].len() < bag.len();
        if introduce_left {
            let above = td.add_parent(node, bag.iter().copied());
            td.set_induced_edges(above, edges.clone());
            td.set_bag(node, required[0].iter().copied());
            td.set_induced_edges(node, edges_within(&edges, &required[0]));
        }
        tracing::debug!(
            node = %node,
            children = children.len(),
            links = groups.len(),
            introduce_left,
            "bounded join node"
        );
        Ok(())
    }
}

impl ManipulationOperation for ExactLimitChildCount {
    fn name(&self) -> &'static str {
        "exact-limit-child-count"
    }

    fn apply_until(
        &self,
        decomposition: &mut TreeDecomposition,
        cancel: &CancellationToken,
    ) -> Result<(), DecompositionError> {
        let targets: Vec<NodeId> = decomposition
            .node_ids()
            .filter(|&n| decomposition.child_count(n) > self.limit)
            .collect();
        for node in targets {
            if cancel.is_cancelled() {
                break;
            }
            self.rewrite(decomposition, node)?;
        }
        Ok(())
    }
}
