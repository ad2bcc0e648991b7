//! Counting independent sets.
//!
//! A set of vertices is independent when it contains no hyperedge
//! completely. For a node with bag `B`, the table maps every assignment `a`
//! of `B` to the number of independent sets of the subtree's vertices whose
//! restriction to `B` is `a`. Subtrees of different children only share
//! vertices of `B`, so child counts multiply.

use rustc_hash::FxHashMap;

use crate::decomposition::{NodeId, TreeDecomposition};
use crate::error::AlgorithmFailure;
use crate::hypergraph::Hypergraph;
use crate::tables::NodeTableStore;
use crate::traits::{LabelingFunction, SolutionExtractor, TreeAlgorithm};

use super::assignment::{assignments, check_bag, edge_masks, table_of, Projection};
use super::IntroducedVertices;

/// Assignment mask to number of extensions.
pub type CountTable = FxHashMap<u64, u128>;

#[derive(Debug, Clone, Copy, Default)]
pub struct IndependentSetCounter;

impl TreeAlgorithm for IndependentSetCounter {
    type Instance = Hypergraph;
    type Table = CountTable;

    fn evaluate_node(
        &self,
        node: NodeId,
        decomposition: &TreeDecomposition,
        tables: &NodeTableStore<CountTable>,
        _instance: &Hypergraph,
    ) -> Result<CountTable, AlgorithmFailure> {
        let bag = decomposition.bag(node);
        check_bag(bag)?;
        let edges = edge_masks(bag, decomposition.induced_edges(node));

        // per child: shared-vertex mask (in this bag's bits) -> summed count
        let mut children = Vec::with_capacity(decomposition.child_count(node));
        for &child in decomposition.children(node) {
            let projection = Projection::new(decomposition.bag(child), bag);
            let mut sums: FxHashMap<u64, u128> = FxHashMap::default();
            for (&mask, &count) in table_of(tables, child)? {
                let slot = sums.entry(projection.apply(mask)).or_insert(0);
                *slot = slot
                    .checked_add(count)
                    .ok_or_else(|| AlgorithmFailure::new("independent set count overflows u128"))?;
            }
            children.push((projection.target_mask(), sums));
        }

        let mut table = CountTable::default();
        'assignment: for mask in assignments(bag.len()) {
            if edges.iter().any(|&e| mask & e == e) {
                continue;
            }
            let mut count: u128 = 1;
            for (shared, sums) in &children {
                let Some(&extensions) = sums.get(&(mask & shared)) else {
                    continue 'assignment;
                };
                count = count
                    .checked_mul(extensions)
                    .ok_or_else(|| AlgorithmFailure::new("independent set count overflows u128"))?;
            }
            table.insert(mask, count);
        }
        Ok(table)
    }

    fn preprocess_operations(&self) -> Vec<Box<dyn LabelingFunction>> {
        vec![Box::new(IntroducedVertices)]
    }
}

/// Total number of independent sets; `None` when unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndependentSetCount;

impl SolutionExtractor for IndependentSetCount {
    type Instance = Hypergraph;
    type Table = CountTable;
    type Solution = Option<u128>;

    fn extract_solution(
        &self,
        root: NodeId,
        _decomposition: &TreeDecomposition,
        tables: &NodeTableStore<CountTable>,
        _instance: &Hypergraph,
    ) -> Option<u128> {
        tables
            .get(root)?
            .values()
            .try_fold(0u128, |acc, &c| acc.checked_add(c))
    }

    fn empty_solution(&self, _instance: &Hypergraph) -> Option<u128> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(td: &TreeDecomposition) -> Option<u128> {
        let mut tables = NodeTableStore::new();
        tables.begin_pass();
        for node in td.post_order() {
            let table = IndependentSetCounter
                .evaluate_node(node, td, &tables, &Hypergraph::new())
                .unwrap();
            tables.insert(node, table).unwrap();
        }
        IndependentSetCount.extract_solution(td.root(), td, &tables, &Hypergraph::new())
    }

    #[test]
    fn triangle_has_four_independent_sets() {
        let graph = Hypergraph::from_edges([(0, 1), (1, 2), (0, 2)]);
        let mut td = TreeDecomposition::new([0, 1, 2]);
        td.compute_induced_edges(&graph);
        assert_eq!(solve(&td), Some(4));
    }

    #[test]
    fn star_through_a_join() {
        // centre 0 with leaves 1, 2, 3: 1 + 2^3 sets
        let graph = Hypergraph::from_edges([(0, 1), (0, 2), (0, 3)]);
        let mut td = TreeDecomposition::new([0]);
        let root = td.root();
        for leaf in 1..=3 {
            td.add_child(root, [0, leaf]);
        }
        td.compute_induced_edges(&graph);
        assert_eq!(solve(&td), Some(9));
    }

    #[test]
    fn oversized_bag_fails() {
        let td = TreeDecomposition::new(0..30);
        let tables = NodeTableStore::new();
        let failure = IndependentSetCounter
            .evaluate_node(td.root(), &td, &tables, &Hypergraph::new())
            .unwrap_err();
        assert!(failure.reason.contains("exceeds"));
    }
}
