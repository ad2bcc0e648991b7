use crate::decomposition::{NodeId, TreeDecomposition};
use crate::error::DecompositionError;
use crate::session::CancellationToken;
use crate::utils::chain_groups;

use super::ManipulationOperation;

/// Bounds the number of children per node by chaining copies of the node.
///
/// A node with `k > limit` children keeps its first `limit - 1` children and
/// gets a new child carrying the same bag and induced hyperedges; that copy
/// takes the next group of children, and so on until the last copy holds the
/// remaining `<= limit` children. Bags are never shrunk, so validity is kept
/// trivially.
#[derive(Debug, Clone, Copy)]
pub struct LimitChildCount {
    limit: usize,
}

impl LimitChildCount {
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

        let mut link = node;
        for group in groups.iter().skip(1) {
            let next = td.add_child(link, bag.iter().copied());
            td.set_induced_edges(next, edges.clone());
            for &child in &children[group.clone()] {
                td.set_parent(child, next)?;
            }
            link = next;
        }
        tracing::debug!(
            node = %node,
            children = children.len(),
            links = groups.len(),
            "split join node"
        );
        Ok(())
    }
}

impl ManipulationOperation for LimitChildCount {
    fn name(&self) -> &'static str {
        "limit-child-count"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypergraph::Hypergraph;
    use crate::verify::TreeDecompositionVerifier;

    #[test]
    fn wide_root_becomes_chain_of_copies() {
        let mut graph = Hypergraph::new();
        let mut td = TreeDecomposition::new([0]);
        let root = td.root();
        for i in 1..=7 {
            graph.add_edge([0, i]);
            td.add_child(root, [0, i]);
        }
        td.compute_induced_edges(&graph);

        LimitChildCount::new(3).apply(&mut td).unwrap();

        assert!(td.max_child_count() <= 3);
        assert_eq!(td.node_count(), 8 + 2);
        for n in td.node_ids() {
            if td.child_count(n) > 1 {
                assert_eq!(td.bag(n), &[0]);
            }
        }
        assert_eq!(TreeDecompositionVerifier::new().verify(&graph, &td), Ok(()));
    }

    #[test]
    fn small_nodes_are_untouched() {
        let mut td = TreeDecomposition::new([1, 2]);
        let root = td.root();
        td.add_child(root, [1]);
        td.add_child(root, [2]);
        LimitChildCount::new(2).apply(&mut td).unwrap();
        assert_eq!(td.node_count(), 3);
    }
}
