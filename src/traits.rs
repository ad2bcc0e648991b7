//! Core trait definitions for tree-decomposition dynamic programs.
//!
//! To run a DP over a tree decomposition, plug the following pieces into a
//! [`TreeSolver`](crate::engine::TreeSolver):
//! - an [`Instance`] that can present itself as a hypergraph,
//! - a [`Decomposer`] turning that hypergraph into a tree decomposition,
//! - one or more [`TreeAlgorithm`]s computing a table per decomposition node,
//! - a [`SolutionExtractor`] reading the answer off the root table.
//!
//! The engine owns traversal order, table lifetimes and cancellation; the
//! plugins only ever see one node at a time.

use std::fmt::Debug;

use crate::decomposition::{Label, NodeId, TreeDecomposition};
use crate::error::{AlgorithmFailure, DecomposeError};
use crate::hypergraph::Hypergraph;
use crate::tables::NodeTableStore;

/// A problem instance the engine can decompose.
pub trait Instance {
    /// Hypergraph whose vertices are instance elements and whose hyperedges
    /// are the instance constraints.
    fn to_hypergraph(&self) -> Hypergraph;
}

impl Instance for Hypergraph {
    fn to_hypergraph(&self) -> Hypergraph {
        self.clone()
    }
}

/// Per-node step of a dynamic program over a tree decomposition.
///
/// Semantics:
/// - `evaluate_node` is called once per node and pass. For a bottom-up
///   algorithm every child's table of the current pass is in the store when
///   the node is evaluated; for a top-down algorithm every ancestor's table
///   of the current pass is.
/// - Returning `Err` stops the pass; the solve then yields the extractor's
///   empty solution.
/// - Unless [`need_all_tables`](Self::need_all_tables) is true, the engine
///   evicts child tables as soon as their parent has been evaluated.
pub trait TreeAlgorithm {
    /// Instance type the algorithm reads.
    type Instance: ?Sized;

    /// DP table computed per node. Shared by all passes of one solver.
    type Table;

    /// Compute the table of `node`.
    fn evaluate_node(
        &self,
        node: NodeId,
        decomposition: &TreeDecomposition,
        tables: &NodeTableStore<Self::Table>,
        instance: &Self::Instance,
    ) -> Result<Self::Table, AlgorithmFailure>;

    /// Keep every table of this pass alive until the solve finishes.
    fn need_all_tables(&self) -> bool {
        false
    }

    /// Evaluate children before parents (post-order). Pre-order otherwise.
    fn is_bottom_up(&self) -> bool {
        true
    }

    /// Labelling hooks applied once to the decomposition before any pass.
    fn preprocess_operations(&self) -> Vec<Box<dyn LabelingFunction>> {
        Vec::new()
    }
}

/// Turns the tables left by the last pass into the final answer.
pub trait SolutionExtractor {
    type Instance: ?Sized;
    type Table;
    type Solution;

    fn extract_solution(
        &self,
        root: NodeId,
        decomposition: &TreeDecomposition,
        tables: &NodeTableStore<Self::Table>,
        instance: &Self::Instance,
    ) -> Self::Solution;

    /// Answer reported on algorithm failure or cancellation.
    fn empty_solution(&self, instance: &Self::Instance) -> Self::Solution;
}

/// Source of tree decompositions.
///
/// Implementations must return decompositions satisfying vertex existence,
/// hyperedge coverage and connectedness for `graph`. Successive calls may
/// return different decompositions; the decomposition search relies on that.
pub trait Decomposer {
    fn compute_decomposition(&self, graph: &Hypergraph) -> Result<TreeDecomposition, DecomposeError>;
}

impl<F> Decomposer for F
where
    F: Fn(&Hypergraph) -> Result<TreeDecomposition, DecomposeError>,
{
    fn compute_decomposition(&self, graph: &Hypergraph) -> Result<TreeDecomposition, DecomposeError> {
        self(graph)
    }
}

/// Scores candidate decompositions. Lower scores are better.
pub trait FitnessFunction {
    type Score: Ord + Clone + Debug;

    fn fitness(&self, graph: &Hypergraph, decomposition: &TreeDecomposition) -> Self::Score;
}

/// Minimises the largest bag first and the height second.
#[derive(Debug, Clone, Copy, Default)]
pub struct WidthHeightFitness;

impl FitnessFunction for WidthHeightFitness {
    type Score = (usize, usize);

    fn fitness(&self, _graph: &Hypergraph, decomposition: &TreeDecomposition) -> Self::Score {
        (decomposition.max_bag_size(), decomposition.height())
    }
}

/// Computes a named label for every decomposition node.
pub trait LabelingFunction {
    fn name(&self) -> &str;

    fn compute_label(&self, decomposition: &TreeDecomposition, node: NodeId) -> Label;
}
