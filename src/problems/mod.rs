//! Reference algorithm modules.
//!
//! Each module implements [`TreeAlgorithm`](crate::traits::TreeAlgorithm)
//! and a matching [`SolutionExtractor`](crate::traits::SolutionExtractor)
//! for a concrete problem on a [`Hypergraph`](crate::hypergraph::Hypergraph):
//! - [`independent_set`] : counts independent sets in one bottom-up pass.
//! - [`vertex_cover`]    : minimum vertex cover; a bottom-up cost pass
//!   followed by a top-down pass picking a witness.
//!
//! Both enumerate all assignments of a bag, so they fail on bags larger than
//! [`assignment::MAX_BAG_SIZE`].

pub mod assignment;
pub mod independent_set;
pub mod vertex_cover;

use crate::decomposition::{Label, NodeId, TreeDecomposition};
use crate::traits::LabelingFunction;

/// Labels every node with the vertices it introduces.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntroducedVertices;

impl LabelingFunction for IntroducedVertices {
    fn name(&self) -> &str {
        "introduced"
    }

    fn compute_label(&self, decomposition: &TreeDecomposition, node: NodeId) -> Label {
        Label::Vertices(decomposition.introduced(node))
    }
}
