//! Reference decomposer based on vertex elimination.
//!
//! Vertices are eliminated by minimum degree in the primal graph; ties are
//! broken by a seeded random generator, so successive calls on the same
//! graph may return different decompositions while a fixed seed keeps the
//! whole sequence reproducible.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::decomposition::{NodeId, TreeDecomposition};
use crate::error::DecomposeError;
use crate::hypergraph::{Hypergraph, Vertex};
use crate::traits::Decomposer;

/// Min-degree elimination decomposer with random tie-breaks.
#[derive(Debug)]
pub struct EliminationDecomposer {
    rng: Mutex<StdRng>,
}

impl EliminationDecomposer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Elimination order together with the bag created for each vertex.
    fn eliminate(&self, graph: &Hypergraph) -> Vec<(Vertex, Vec<Vertex>)> {
        let mut adjacency: FxHashMap<Vertex, FxHashSet<Vertex>> = graph
            .vertices()
            .iter()
            .map(|&v| (v, FxHashSet::default()))
            .collect();
        for edge in graph.edges() {
            for &u in edge.vertices() {
                for &w in edge.vertices() {
                    if u != w {
                        adjacency.entry(u).or_default().insert(w);
                    }
                }
            }
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let mut remaining: Vec<Vertex> = graph.vertices().to_vec();
        let mut order = Vec::with_capacity(remaining.len());
        while !remaining.is_empty() {
            let min_degree = remaining
                .iter()
                .map(|v| adjacency[v].len())
                .min()
                .unwrap_or(0);
            let ties: Vec<usize> = (0..remaining.len())
                .filter(|&i| adjacency[&remaining[i]].len() == min_degree)
                .collect();
            let pick = ties[rng.gen_range(0..ties.len())];
            let vertex = remaining.swap_remove(pick);

            let neighbours: Vec<Vertex> = adjacency
                .remove(&vertex)
                .map(|set| set.into_iter().collect())
                .unwrap_or_default();
            for &u in &neighbours {
                if let Some(set) = adjacency.get_mut(&u) {
                    set.remove(&vertex);
                    set.extend(neighbours.iter().copied().filter(|&w| w != u));
                }
            }
            let mut bag = neighbours;
            bag.push(vertex);
            bag.sort_unstable();
            order.push((vertex, bag));
        }
        order
    }
}

impl Decomposer for EliminationDecomposer {
    fn compute_decomposition(&self, graph: &Hypergraph) -> Result<TreeDecomposition, DecomposeError> {
        let order = self.eliminate(graph);
        let Some((_, last_bag)) = order.last() else {
            return Ok(TreeDecomposition::new([]));
        };

        let position: FxHashMap<Vertex, usize> = order
            .iter()
            .enumerate()
            .map(|(i, (v, _))| (*v, i))
            .collect();
        let mut td = TreeDecomposition::new(last_bag.iter().copied());
        let root = td.root();
        let mut node_of: Vec<Option<NodeId>> = vec![None; order.len()];
        node_of[order.len() - 1] = Some(root);

        // parents are eliminated later, so walking backwards creates them first
        for i in (0..order.len() - 1).rev() {
            let (vertex, bag) = &order[i];
            let parent = bag
                .iter()
                .filter(|&u| u != vertex)
                .map(|u| position[u])
                .min()
                .and_then(|p| node_of[p])
                .unwrap_or(root);
            node_of[i] = Some(td.add_child(parent, bag.iter().copied()));
        }
        tracing::debug!(
            vertices = graph.vertex_count(),
            width = td.width(),
            "elimination decomposition"
        );
        Ok(td)
    }
}
