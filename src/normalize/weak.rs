use crate::decomposition::{NodeId, TreeDecomposition};
use crate::error::DecompositionError;
use crate::hypergraph::{Hyperedge, Vertex};
use crate::session::CancellationToken;
use crate::utils::{normalize_bag, sorted_difference};

use super::{edges_within, ManipulationOperation};

/// Weak normal form.
///
/// 1. Every child of a join node carries the join node's bag; where a child
///    differs, a copy of the join bag is inserted between the two.
/// 2. Along every other parent/child edge at most one element changes. An
///    edge that forgets or introduces more is expanded into a path that first
///    forgets the child's surplus one element at a time, then introduces the
///    parent's surplus one element at a time.
///
/// Leaves keep their bags. No bag of the result is larger than the larger
/// endpoint of the edge it was created on, so the width is unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeakNormalization;

impl WeakNormalization {
    fn equalize_join_children(&self, td: &mut TreeDecomposition, cancel: &CancellationToken) {
        for join in td.join_nodes() {
            if cancel.is_cancelled() {
                return;
            }
            let bag = td.bag(join).to_vec();
            let edges = td.induced_edges(join).to_vec();
            for child in td.children(join).to_vec() {
                if td.bag(child) != bag.as_slice() {
                    let copy = td.add_parent(child, bag.iter().copied());
                    td.set_induced_edges(copy, edges.clone());
                }
            }
        }
    }

    fn expand_edge(&self, td: &mut TreeDecomposition, child: NodeId, parent: NodeId) {
        let forget = sorted_difference(td.bag(child), td.bag(parent));
        let introduce = sorted_difference(td.bag(parent), td.bag(child));
        if forget.len() + introduce.len() <= 1 {
            return;
        }

        let mut current = td.bag(child).to_vec();
        let mut steps: Vec<Vec<Vertex>> = Vec::with_capacity(forget.len() + introduce.len());
        for v in &forget {
            current.retain(|u| u != v);
            steps.push(current.clone());
        }
        for &v in &introduce {
            current.push(v);
            current = normalize_bag(current);
            steps.push(current.clone());
        }
        // the last step equals the parent's bag
        steps.pop();

        let mut candidates: Vec<Hyperedge> = td.induced_edges(child).to_vec();
        for edge in td.induced_edges(parent) {
            if !candidates.iter().any(|e| e.id() == edge.id()) {
                candidates.push(edge.clone());
            }
        }

        let mut below = child;
        for bag in &steps {
            let inserted = td.add_parent(below, bag.iter().copied());
            td.set_induced_edges(inserted, edges_within(&candidates, bag));
            below = inserted;
        }
    }
}

impl ManipulationOperation for WeakNormalization {
    fn name(&self) -> &'static str {
        "weak-normalization"
    }

    fn apply_until(
        &self,
        decomposition: &mut TreeDecomposition,
        cancel: &CancellationToken,
    ) -> Result<(), DecompositionError> {
        self.equalize_join_children(decomposition, cancel);
        let edges: Vec<(NodeId, NodeId)> = decomposition
            .node_ids()
            .filter_map(|n| decomposition.parent(n).map(|p| (n, p)))
            .collect();
        for (child, parent) in edges {
            if cancel.is_cancelled() {
                break;
            }
            self.expand_edge(decomposition, child, parent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypergraph::Hypergraph;
    use crate::verify::TreeDecompositionVerifier;

    fn changed_elements(td: &TreeDecomposition, node: NodeId) -> usize {
        let parent = td.parent(node).unwrap();
        sorted_difference(td.bag(node), td.bag(parent)).len()
            + sorted_difference(td.bag(parent), td.bag(node)).len()
    }

    #[test]
    fn path_edges_change_one_element() {
        let graph = Hypergraph::from_edges([(1, 2), (2, 3), (3, 4), (4, 5)]);
        let mut td = TreeDecomposition::new([4, 5]);
        let root = td.root();
        let mid = td.add_child(root, [2, 3, 4]);
        td.add_child(mid, [1, 2]);
        td.compute_induced_edges(&graph);
        let width = td.max_bag_size();

        WeakNormalization.apply(&mut td).unwrap();

        assert_eq!(TreeDecompositionVerifier::new().verify(&graph, &td), Ok(()));
        assert_eq!(td.max_bag_size(), width);
        for n in td.node_ids().filter(|&n| !td.is_root(n)) {
            assert!(changed_elements(&td, n) <= 1, "{td}");
        }
        // {1,2} -> {2} -> {2,3} -> {2,3,4} -> {3,4} -> {4} -> {4,5}
        assert_eq!(td.height(), 6);
    }

    #[test]
    fn join_children_share_the_join_bag() {
        let graph = Hypergraph::from_edges([(1, 2), (2, 3), (1, 4)]);
        let mut td = TreeDecomposition::new([1, 2]);
        let root = td.root();
        td.add_child(root, [2, 3]);
        td.add_child(root, [1, 4]);
        td.compute_induced_edges(&graph);

        WeakNormalization.apply(&mut td).unwrap();

        assert_eq!(TreeDecompositionVerifier::new().verify(&graph, &td), Ok(()));
        for &child in td.children(root) {
            assert_eq!(td.bag(child), &[1, 2]);
            assert!(td.induced_edges(child).iter().any(|e| e.vertices() == [1, 2]));
        }
        let leaves: Vec<_> = td.leaves().iter().map(|&l| td.bag(l).to_vec()).collect();
        assert_eq!(leaves, vec![vec![2, 3], vec![1, 4]]);
    }

    #[test]
    fn intermediate_nodes_keep_fitting_edges() {
        let graph = Hypergraph::from_edges([(1, 2), (2, 3)]);
        let mut td = TreeDecomposition::new([2, 3]);
        let root = td.root();
        td.add_child(root, [1, 2]);
        td.compute_induced_edges(&graph);

        WeakNormalization.apply(&mut td).unwrap();

        let mid = td.children(root)[0];
        assert_eq!(td.bag(mid), &[2]);
        assert!(td.induced_edges(mid).is_empty());
    }
}
