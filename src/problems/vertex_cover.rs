//! Minimum vertex cover (hitting set on hypergraphs) with a witness.
//!
//! Two passes share one table type:
//! 1. [`CoverCosts`], bottom-up: for every assignment of the bag that hits
//!    all induced hyperedges, the smallest number of selected vertices in the
//!    subtree. Vertices shared with a child are counted at the parent only.
//! 2. [`CoverWitness`], top-down: picks a cheapest assignment at the root
//!    and, below it, a cheapest assignment agreeing with the parent's choice.
//!
//! Both passes keep all their tables: the witness pass reads the cost table
//! of every node, and the extractor reads every chosen assignment.

use rustc_hash::FxHashMap;

use crate::decomposition::{NodeId, TreeDecomposition};
use crate::error::AlgorithmFailure;
use crate::hypergraph::{Hypergraph, Vertex};
use crate::tables::NodeTableStore;
use crate::traits::{SolutionExtractor, TreeAlgorithm};

use super::assignment::{assignments, check_bag, edge_masks, selected, table_of, Projection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverTable {
    /// Assignment mask to cheapest cost of the subtree.
    Costs(FxHashMap<u64, usize>),
    /// Assignment chosen for the witness.
    Choice(u64),
}

impl CoverTable {
    fn costs(&self, node: NodeId) -> Result<&FxHashMap<u64, usize>, AlgorithmFailure> {
        match self {
            CoverTable::Costs(costs) => Ok(costs),
            CoverTable::Choice(_) => Err(AlgorithmFailure::new(format!(
                "node {node} holds a choice where costs were expected"
            ))),
        }
    }

    fn choice(&self, node: NodeId) -> Result<u64, AlgorithmFailure> {
        match self {
            CoverTable::Choice(mask) => Ok(*mask),
            CoverTable::Costs(_) => Err(AlgorithmFailure::new(format!(
                "node {node} holds costs where a choice was expected"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CoverCosts;

impl TreeAlgorithm for CoverCosts {
    type Instance = Hypergraph;
    type Table = CoverTable;

    fn evaluate_node(
        &self,
        node: NodeId,
        decomposition: &TreeDecomposition,
        tables: &NodeTableStore<CoverTable>,
        _instance: &Hypergraph,
    ) -> Result<CoverTable, AlgorithmFailure> {
        let bag = decomposition.bag(node);
        check_bag(bag)?;
        let edges = edge_masks(bag, decomposition.induced_edges(node));

        // per child: shared-vertex mask (in this bag's bits) -> cheapest cost
        // of the child's subtree without the shared vertices
        let mut children = Vec::with_capacity(decomposition.child_count(node));
        for &child in decomposition.children(node) {
            let projection = Projection::new(decomposition.bag(child), bag);
            let mut best: FxHashMap<u64, usize> = FxHashMap::default();
            for (&mask, &cost) in table_of(tables, child)?.costs(child)? {
                let key = projection.apply(mask);
                let own = cost - key.count_ones() as usize;
                best.entry(key)
                    .and_modify(|c| *c = (*c).min(own))
                    .or_insert(own);
            }
            children.push((projection.target_mask(), best));
        }

        let mut costs = FxHashMap::default();
        'assignment: for mask in assignments(bag.len()) {
            if edges.iter().any(|&e| mask & e == 0) {
                continue;
            }
            let mut cost = mask.count_ones() as usize;
            for (shared, best) in &children {
                let Some(&below) = best.get(&(mask & shared)) else {
                    continue 'assignment;
                };
                cost += below;
            }
            costs.insert(mask, cost);
        }
        Ok(CoverTable::Costs(costs))
    }

    fn need_all_tables(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CoverWitness;

impl TreeAlgorithm for CoverWitness {
    type Instance = Hypergraph;
    type Table = CoverTable;

    fn evaluate_node(
        &self,
        node: NodeId,
        decomposition: &TreeDecomposition,
        tables: &NodeTableStore<CoverTable>,
        _instance: &Hypergraph,
    ) -> Result<CoverTable, AlgorithmFailure> {
        let costs = table_of(tables, node)?.costs(node)?;
        let (required, shared) = match decomposition.parent(node) {
            Some(parent) => {
                let projection = Projection::new(decomposition.bag(parent), decomposition.bag(node));
                let parent_choice = table_of(tables, parent)?.choice(parent)?;
                (projection.apply(parent_choice), projection.target_mask())
            }
            None => (0, 0),
        };
        costs
            .iter()
            .filter(|(&mask, _)| mask & shared == required)
            .min_by_key(|(&mask, &cost)| (cost, mask))
            .map(|(&mask, _)| CoverTable::Choice(mask))
            .ok_or_else(|| AlgorithmFailure::new(format!("no cover assignment at node {node}")))
    }

    fn need_all_tables(&self) -> bool {
        true
    }

    fn is_bottom_up(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexCover {
    /// Sorted cover vertices.
    pub vertices: Vec<Vertex>,
}

impl VertexCover {
    pub fn size(&self) -> usize {
        self.vertices.len()
    }
}

/// Collects the witness chosen by [`CoverWitness`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexCoverExtractor;

impl SolutionExtractor for VertexCoverExtractor {
    type Instance = Hypergraph;
    type Table = CoverTable;
    type Solution = Option<VertexCover>;

    fn extract_solution(
        &self,
        root: NodeId,
        decomposition: &TreeDecomposition,
        tables: &NodeTableStore<CoverTable>,
        _instance: &Hypergraph,
    ) -> Option<VertexCover> {
        if !matches!(tables.get(root), Some(CoverTable::Choice(_))) {
            return None;
        }
        let mut vertices: Vec<Vertex> = tables
            .iter()
            .filter_map(|(node, table)| match table {
                CoverTable::Choice(mask) => Some(selected(decomposition.bag(node), *mask).collect::<Vec<_>>()),
                CoverTable::Costs(_) => None,
            })
            .flatten()
            .collect();
        vertices.sort_unstable();
        vertices.dedup();
        Some(VertexCover { vertices })
    }

    fn empty_solution(&self, _instance: &Hypergraph) -> Option<VertexCover> {
        None
    }
}
