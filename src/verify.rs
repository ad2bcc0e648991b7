//! Validity checks for tree decompositions.
//!
//! A decomposition of a hypergraph is valid when
//! - every vertex of the hypergraph occurs in some bag and no bag mentions an
//!   unknown vertex (vertex existence),
//! - every hyperedge is contained in at least one bag (hyperedge coverage),
//! - the bags containing any given vertex form a connected subtree
//!   (connectedness).

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::decomposition::TreeDecomposition;
use crate::hypergraph::{HyperedgeId, Hypergraph, Vertex};

/// One of the three tree decomposition criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    VertexExistence,
    HyperedgeCoverage,
    Connectedness,
}

impl Criterion {
    pub fn as_str(self) -> &'static str {
        match self {
            Criterion::VertexExistence => "vertex existence",
            Criterion::HyperedgeCoverage => "hyperedge coverage",
            Criterion::Connectedness => "connectedness",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offending items per criterion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Hypergraph vertices that occur in no bag.
    pub missing_vertices: Vec<Vertex>,
    /// Bag vertices that are not part of the hypergraph.
    pub unknown_vertices: Vec<Vertex>,
    pub uncovered_edges: Vec<HyperedgeId>,
    pub disconnected_vertices: Vec<Vertex>,
}

impl VerificationReport {
    pub fn is_valid(&self) -> bool {
        self.violated_criteria().is_empty()
    }

    pub fn violated_criteria(&self) -> Vec<Criterion> {
        let mut out = Vec::new();
        if !self.missing_vertices.is_empty() || !self.unknown_vertices.is_empty() {
            out.push(Criterion::VertexExistence);
        }
        if !self.uncovered_edges.is_empty() {
            out.push(Criterion::HyperedgeCoverage);
        }
        if !self.disconnected_vertices.is_empty() {
            out.push(Criterion::Connectedness);
        }
        out
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let criteria = self.violated_criteria();
        if criteria.is_empty() {
            return f.write_str("no violations");
        }
        for (i, criterion) in criteria.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            match criterion {
                Criterion::VertexExistence => write!(
                    f,
                    "{criterion} (missing {:?}, unknown {:?})",
                    self.missing_vertices, self.unknown_vertices
                )?,
                Criterion::HyperedgeCoverage => {
                    write!(f, "{criterion} (edges {:?})", self.uncovered_edges)?
                }
                Criterion::Connectedness => {
                    write!(f, "{criterion} (vertices {:?})", self.disconnected_vertices)?
                }
            }
        }
        Ok(())
    }
}

/// Checks a decomposition against the hypergraph it decomposes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeDecompositionVerifier;

impl TreeDecompositionVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Full check; returns every violation found.
    pub fn verify(&self, graph: &Hypergraph, td: &TreeDecomposition) -> Result<(), VerificationReport> {
        let (missing_vertices, unknown_vertices) = self.vertex_existence(graph, td);
        let report = VerificationReport {
            missing_vertices,
            unknown_vertices,
            uncovered_edges: self.violations_hyperedge_coverage(graph, td),
            disconnected_vertices: self.violations_connectedness(td),
        };
        if report.is_valid() {
            Ok(())
        } else {
            Err(report)
        }
    }

    /// Vertices violating vertex existence, missing and unknown combined.
    pub fn violations_vertex_existence(&self, graph: &Hypergraph, td: &TreeDecomposition) -> Vec<Vertex> {
        let (mut missing, unknown) = self.vertex_existence(graph, td);
        missing.extend(unknown);
        missing.sort_unstable();
        missing
    }

    fn vertex_existence(&self, graph: &Hypergraph, td: &TreeDecomposition) -> (Vec<Vertex>, Vec<Vertex>) {
        let mut seen = FxHashSet::default();
        let mut unknown = FxHashSet::default();
        for node in td.node_ids() {
            for &v in td.bag(node) {
                seen.insert(v);
                if !graph.contains_vertex(v) {
                    unknown.insert(v);
                }
            }
        }
        let missing = graph
            .vertices()
            .iter()
            .copied()
            .filter(|v| !seen.contains(v))
            .collect();
        let mut unknown: Vec<_> = unknown.into_iter().collect();
        unknown.sort_unstable();
        (missing, unknown)
    }

    /// Ids of hyperedges contained in no bag.
    pub fn violations_hyperedge_coverage(&self, graph: &Hypergraph, td: &TreeDecomposition) -> Vec<HyperedgeId> {
        graph
            .edges()
            .iter()
            .filter(|edge| !td.node_ids().any(|n| edge.is_contained_in(td.bag(n))))
            .map(|edge| edge.id())
            .collect()
    }

    /// Vertices whose occurrences do not form a connected subtree.
    ///
    /// The occurrences of a vertex are connected iff exactly one of them has a
    /// parent whose bag lacks the vertex (or is the root).
    pub fn violations_connectedness(&self, td: &TreeDecomposition) -> Vec<Vertex> {
        let mut tops: FxHashMap<Vertex, usize> = FxHashMap::default();
        for node in td.node_ids() {
            let parent_bag = td.parent(node).map(|p| td.bag(p));
            for &v in td.bag(node) {
                let continues = parent_bag.is_some_and(|bag| bag.binary_search(&v).is_ok());
                let entry = tops.entry(v).or_insert(0);
                if !continues {
                    *entry += 1;
                }
            }
        }
        let mut out: Vec<_> = tops
            .into_iter()
            .filter(|&(_, count)| count > 1)
            .map(|(v, _)| v)
            .collect();
        out.sort_unstable();
        out
    }
}
