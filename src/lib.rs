//! Dynamic programming over tree decompositions (twdp)
//!
//! This crate runs dynamic programs over tree decompositions of bounded
//! width. A problem instance is viewed as a hypergraph, decomposed into a
//! tree of bags, and a pluggable per-node algorithm computes a table for
//! every node from the tables of its children until the root table yields
//! the answer.
//!
//! ## Core idea
//! 1. Present your instance as a [`Hypergraph`] by implementing [`Instance`].
//! 2. Implement [`TreeAlgorithm`] for the per-node step (one per pass) and a
//!    [`SolutionExtractor`] reading the answer off the final tables.
//! 3. Let [`TreeSolver`] decompose, normalize, verify and drive the passes.
//!
//! Traversals are iterative and child tables are released as soon as their
//! parent is evaluated, so only a small frontier of tables is live at any
//! time unless an algorithm asks to keep them all.
//!
//! ## Quick start
//! ```
//! use twdp::problems::vertex_cover::{CoverCosts, CoverWitness, VertexCoverExtractor};
//! use twdp::{EliminationDecomposer, Hypergraph, SolverSession, TreeSolverBuilder};
//!
//! let graph = Hypergraph::from_edges([(0, 1), (1, 2), (2, 0), (2, 3)]);
//! let solver = TreeSolverBuilder::new()
//!     .decomposer(EliminationDecomposer::new(1))
//!     .algorithm(CoverCosts)
//!     .algorithm(CoverWitness)
//!     .extractor(VertexCoverExtractor)
//!     .build()
//!     .unwrap();
//! let cover = solver.solve_instance(&graph, &SolverSession::new()).unwrap().unwrap();
//! assert_eq!(cover.size(), 2);
//! ```
//!
//! ## Decomposition rewrites
//! Before solving, each decomposition goes through the pipeline configured
//! by [`NormalizationConfig`]: fan-out bounding ([`normalize::LimitChildCount`]
//! or [`normalize::ExactLimitChildCount`]) and weak normalization. The result
//! is checked by [`TreeDecompositionVerifier`]; a violation is fatal.
//!
//! ## Built-in problems
//! The `problems` module contains reference algorithms for:
//! - counting independent sets,
//! - minimum vertex cover with a witness (two passes).

pub mod benchmark;
pub mod builder;
pub mod config;
pub mod decomposer;
pub mod decomposition;
pub mod engine;
pub mod error;
pub mod hypergraph;
pub mod normalize;
pub mod output;
pub mod problems;
pub mod search;
pub mod session;
pub mod tables;
pub mod traits;
pub mod utils;
pub mod verify;

pub use crate::builder::TreeSolverBuilder;
pub use crate::config::{NormalizationConfig, SearchConfig, SolverConfig};
pub use crate::decomposer::EliminationDecomposer;
pub use crate::decomposition::{Label, NodeId, TreeDecomposition};
pub use crate::engine::{PassStatus, TreeSolver};
pub use crate::error::{AlgorithmFailure, DecomposeError, SolverError};
pub use crate::hypergraph::{Hyperedge, Hypergraph, Vertex};
pub use crate::output::{DataValue, InstrumentationSink, TracingSink};
pub use crate::session::{CancellationToken, SolverSession};
pub use crate::tables::NodeTableStore;
pub use crate::traits::{Decomposer, FitnessFunction, Instance, SolutionExtractor, TreeAlgorithm};
pub use crate::verify::TreeDecompositionVerifier;
