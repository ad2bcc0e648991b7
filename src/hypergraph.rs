//! Instances viewed as hypergraphs.
//!
//! The engine only ever looks at an instance through its hypergraph: the
//! vertices are the instance elements that bags are made of, and every
//! hyperedge is one constraint that some bag has to cover.

use crate::utils::{is_sorted_subset, normalize_bag};

/// Instance element identifier.
pub type Vertex = usize;

/// Index of a hyperedge inside its [`Hypergraph`].
pub type HyperedgeId = usize;

/// A constraint over a set of vertices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hyperedge {
    id: HyperedgeId,
    vertices: Vec<Vertex>,
}

impl Hyperedge {
    /// Create a hyperedge; the vertex list is sorted and deduplicated.
    pub fn new<I>(id: HyperedgeId, vertices: I) -> Self
    where
        I: IntoIterator<Item = Vertex>,
    {
        Self {
            id,
            vertices: normalize_bag(vertices),
        }
    }

    pub fn id(&self) -> HyperedgeId {
        self.id
    }

    /// Sorted vertices of the edge.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// True if every vertex of the edge lies in the (sorted) `bag`.
    #[inline]
    pub fn is_contained_in(&self, bag: &[Vertex]) -> bool {
        is_sorted_subset(&self.vertices, bag)
    }
}

/// Hypergraph with a sorted vertex set and edges in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hypergraph {
    vertices: Vec<Vertex>,
    edges: Vec<Hyperedge>,
}

impl Hypergraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hypergraph with the given vertices and no edges.
    pub fn with_vertices<I>(vertices: I) -> Self
    where
        I: IntoIterator<Item = Vertex>,
    {
        Self {
            vertices: normalize_bag(vertices),
            edges: Vec::new(),
        }
    }

    /// Build a graph from a list of binary edges.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (Vertex, Vertex)>,
    {
        let mut graph = Self::new();
        for (u, v) in edges {
            graph.add_edge([u, v]);
        }
        graph
    }

    /// Insert a vertex; returns false if it was already present.
    pub fn add_vertex(&mut self, vertex: Vertex) -> bool {
        match self.vertices.binary_search(&vertex) {
            Ok(_) => false,
            Err(pos) => {
                self.vertices.insert(pos, vertex);
                true
            }
        }
    }

    /// Add a hyperedge, inserting any vertex the graph does not know yet.
    pub fn add_edge<I>(&mut self, vertices: I) -> HyperedgeId
    where
        I: IntoIterator<Item = Vertex>,
    {
        let id = self.edges.len();
        let edge = Hyperedge::new(id, vertices);
        for &v in edge.vertices() {
            self.add_vertex(v);
        }
        self.edges.push(edge);
        id
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Hyperedge] {
        &self.edges
    }

    pub fn edge(&self, id: HyperedgeId) -> Option<&Hyperedge> {
        self.edges.get(id)
    }

    pub fn contains_vertex(&self, vertex: Vertex) -> bool {
        self.vertices.binary_search(&vertex).is_ok()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges fully contained in `bag`.
    pub fn edges_within<'a>(&'a self, bag: &'a [Vertex]) -> impl Iterator<Item = &'a Hyperedge> + 'a {
        self.edges.iter().filter(move |e| e.is_contained_in(bag))
    }
}
