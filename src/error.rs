//! Error types for the solver and its collaborators.

use thiserror::Error;

use crate::decomposition::NodeId;
use crate::verify::VerificationReport;

/// Top-level error of the solver driver.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The external decomposer could not produce a decomposition.
    #[error(transparent)]
    Decompose(#[from] DecomposeError),

    /// A decomposition no longer satisfies the tree decomposition criteria
    /// after manipulation. Fatal for the solve attempt.
    #[error("invalid tree decomposition: {0}")]
    InvalidDecomposition(VerificationReport),

    /// Contract violation between driver and node table store.
    #[error(transparent)]
    TableStore(#[from] TableStoreError),

    #[error(transparent)]
    Structure(#[from] DecompositionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A required collaborator was never supplied to the builder.
    #[error("solver is missing its {0}")]
    MissingComponent(&'static str),
}

/// Logic errors of the node table store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableStoreError {
    #[error("node {node} already holds a table from pass {pass}")]
    DuplicateInsert { node: NodeId, pass: usize },

    #[error("no table stored for node {node}")]
    MissingTable { node: NodeId },
}

/// Rejected structural mutation of a tree decomposition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecompositionError {
    #[error("cannot attach {node} below {parent}: {parent} lies in the subtree of {node}")]
    WouldCreateCycle { node: NodeId, parent: NodeId },

    #[error("the root {node} cannot be reparented")]
    ReparentRoot { node: NodeId },
}

/// Failure reported by a [`Decomposer`](crate::traits::Decomposer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decomposer failed: {message}")]
pub struct DecomposeError {
    pub message: String,
}

impl DecomposeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Invalid solver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("child limit must be at least 2, got {0}")]
    ChildLimitTooSmall(usize),

    #[error("search iteration limit must be at least 1")]
    ZeroIterationLimit,

    #[error("at least one tree algorithm is required")]
    NoAlgorithms,
}

/// An algorithm module could not produce a table for a node.
///
/// This is not an error of the solver: the pass stops and the solve yields
/// the extractor's empty solution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct AlgorithmFailure {
    pub reason: String,
}

impl AlgorithmFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
