//! Structural rewrites applied to a decomposition before solving.
//!
//! Every operation rewrites the tree in place through the arena methods of
//! [`TreeDecomposition`]. Intermediate states may violate the tree
//! decomposition criteria; the result of a complete operation must not.
//!
//! - [`LimitChildCount`]: bounds join fan-out by chaining copies of the join bag.
//! - [`ExactLimitChildCount`]: bounds join fan-out with restricted bags and an
//!   introduce node above the join where needed.
//! - [`WeakNormalization`]: equal bags below joins, one element introduced or
//!   forgotten per edge.

use crate::config::NormalizationConfig;
use crate::decomposition::TreeDecomposition;
use crate::error::{DecompositionError, SolverError};
use crate::hypergraph::{Hyperedge, Hypergraph, Vertex};
use crate::session::{CancellationToken, SolverSession};
use crate::verify::TreeDecompositionVerifier;

mod exact_child_count;
mod limit_child_count;
mod weak;

pub use exact_child_count::ExactLimitChildCount;
pub use limit_child_count::LimitChildCount;
pub use weak::WeakNormalization;

/// In-place rewrite of a tree decomposition.
pub trait ManipulationOperation {
    fn name(&self) -> &'static str;

    /// Rewrite `decomposition`, polling `cancel` once per rewritten node.
    ///
    /// A cancelled operation stops between two node rewrites, so the
    /// decomposition stays valid but may be only partly rewritten.
    fn apply_until(
        &self,
        decomposition: &mut TreeDecomposition,
        cancel: &CancellationToken,
    ) -> Result<(), DecompositionError>;

    /// Rewrite `decomposition` completely.
    fn apply(&self, decomposition: &mut TreeDecomposition) -> Result<(), DecompositionError> {
        self.apply_until(decomposition, &CancellationToken::new())
    }
}

/// Operations requested by `config`, in application order.
///
/// A child limit below 2 is ignored here; [`NormalizationConfig::validate`]
/// rejects it before a solver is built.
pub fn pipeline(config: &NormalizationConfig) -> Vec<Box<dyn ManipulationOperation>> {
    let mut ops: Vec<Box<dyn ManipulationOperation>> = Vec::new();
    match config.child_limit {
        Some(limit) if limit >= 2 && config.exact_child_limit => {
            ops.push(Box::new(ExactLimitChildCount::new(limit)));
        }
        Some(limit) if limit >= 2 => ops.push(Box::new(LimitChildCount::new(limit))),
        _ => {}
    }
    if config.weak {
        ops.push(Box::new(WeakNormalization));
    }
    ops
}

/// Run `ops` one after another.
///
/// Returns `Ok(false)` if `cancel` fired before every operation finished.
pub fn apply_all(
    ops: &[Box<dyn ManipulationOperation>],
    decomposition: &mut TreeDecomposition,
    cancel: &CancellationToken,
) -> Result<bool, DecompositionError> {
    for op in ops {
        let before = decomposition.node_count();
        op.apply_until(decomposition, cancel)?;
        if cancel.is_cancelled() {
            tracing::debug!(operation = op.name(), "manipulation cancelled");
            return Ok(false);
        }
        tracing::trace!(
            operation = op.name(),
            added_nodes = decomposition.node_count() - before,
            "applied manipulation"
        );
    }
    Ok(true)
}

/// Attach induced hyperedges to a fresh decomposition of `graph`, run `ops`
/// and verify the result.
///
/// Returns `Ok(false)` when the session was cancelled during normalization;
/// the decomposition is then unverified and must not be solved over.
/// A violation is reported to the session's sink together with the rendered
/// decomposition and returned as [`SolverError::InvalidDecomposition`].
pub fn prepare_decomposition(
    graph: &Hypergraph,
    decomposition: &mut TreeDecomposition,
    ops: &[Box<dyn ManipulationOperation>],
    session: &SolverSession,
) -> Result<bool, SolverError> {
    decomposition.compute_induced_edges(graph);
    if !apply_all(ops, decomposition, session.cancellation())? {
        return Ok(false);
    }
    if let Err(report) = TreeDecompositionVerifier::new().verify(graph, decomposition) {
        session.sink().error(&format!(
            "tree decomposition violates its invariants ({report}):\n{decomposition}"
        ));
        return Err(SolverError::InvalidDecomposition(report));
    }
    Ok(true)
}

/// The hyperedges of `edges` that fit inside `bag`.
fn edges_within(edges: &[Hyperedge], bag: &[Vertex]) -> Vec<Hyperedge> {
    edges.iter().filter(|e| e.is_contained_in(bag)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(config: &NormalizationConfig) -> Vec<&'static str> {
        pipeline(config).iter().map(|op| op.name()).collect()
    }

    #[test]
    fn prepare_rejects_broken_decomposition() {
        let graph = Hypergraph::from_edges([(1, 2), (2, 3)]);
        let mut td = TreeDecomposition::new([1, 2]);
        let root = td.root();
        td.add_child(root, [3]);
        let ops = pipeline(&NormalizationConfig::default());
        match prepare_decomposition(&graph, &mut td, &ops, &SolverSession::new()) {
            Err(SolverError::InvalidDecomposition(report)) => {
                assert_eq!(report.uncovered_edges, vec![1]);
            }
            other => panic!("expected invalid decomposition, got {other:?}"),
        }
    }

    #[test]
    fn prepare_attaches_induced_edges() {
        let graph = Hypergraph::from_edges([(1, 2), (2, 3)]);
        let mut td = TreeDecomposition::new([1, 2]);
        let root = td.root();
        td.add_child(root, [2, 3]);
        assert!(prepare_decomposition(&graph, &mut td, &[], &SolverSession::new()).unwrap());
        assert_eq!(td.induced_edges(root).len(), 1);
        assert_eq!(td.induced_edges(root)[0].vertices(), &[1, 2]);
    }

    #[test]
    fn cancelled_session_stops_the_pipeline() {
        let mut graph = Hypergraph::new();
        let mut td = TreeDecomposition::new([0]);
        let root = td.root();
        for i in 1..8 {
            graph.add_edge([0, i]);
            td.add_child(root, [0, i]);
        }
        let session = SolverSession::new();
        session.cancellation().cancel();
        let ops = pipeline(&NormalizationConfig::default());
        assert!(!prepare_decomposition(&graph, &mut td, &ops, &session).unwrap());
        assert_eq!(td.child_count(root), 7);
    }

    #[test]
    fn pipeline_follows_config() {
        let mut config = NormalizationConfig {
            weak: true,
            child_limit: Some(3),
            exact_child_limit: false,
        };
        assert_eq!(names(&config), vec!["limit-child-count", "weak-normalization"]);
        config.exact_child_limit = true;
        config.weak = false;
        assert_eq!(names(&config), vec!["exact-limit-child-count"]);
        config.child_limit = None;
        assert!(names(&config).is_empty());
        config.child_limit = Some(1);
        assert!(names(&config).is_empty());
    }
}
