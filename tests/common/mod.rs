#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use twdp::{
    AlgorithmFailure, CancellationToken, DataValue, DecomposeError, Hypergraph, InstrumentationSink,
    NodeId, NodeTableStore, SolutionExtractor, TreeAlgorithm, TreeDecomposition, Vertex,
};

pub fn grid(rows: usize, cols: usize) -> Hypergraph {
    let mut g = Hypergraph::with_vertices(0..rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let v = r * cols + c;
            if c + 1 < cols {
                g.add_edge([v, v + 1]);
            }
            if r + 1 < rows {
                g.add_edge([v, v + cols]);
            }
        }
    }
    g
}

/// Random simple graph on `n` vertices, each edge kept with `density`.
pub fn random_graph(n: usize, density: f64, seed: u64) -> Hypergraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut g = Hypergraph::with_vertices(0..n);
    for u in 0..n {
        for w in u + 1..n {
            if rng.gen_bool(density) {
                g.add_edge([u, w]);
            }
        }
    }
    g
}

/// Random valid decomposition together with a hypergraph it decomposes.
///
/// Every new node hangs below an early node (to get wide joins), keeps a
/// random part of its parent's bag and adds fresh vertices. One hyperedge is
/// drawn from each bag.
pub fn random_decomposition(seed: u64, nodes: usize, max_fresh: usize) -> (Hypergraph, TreeDecomposition) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut next: Vertex = 0;
    let mut fresh = |rng: &mut StdRng, at_least: usize| {
        let count = rng.gen_range(at_least..=max_fresh.max(at_least));
        let out: Vec<Vertex> = (next..next + count).collect();
        next += count;
        out
    };

    let mut td = TreeDecomposition::new(fresh(&mut rng, 1));
    let mut ids = vec![td.root()];
    for _ in 1..nodes {
        let window = ids.len().min(4);
        let parent = ids[rng.gen_range(0..window)];
        let mut bag: Vec<Vertex> = td
            .bag(parent)
            .iter()
            .copied()
            .filter(|_| rng.gen_bool(0.6))
            .collect();
        bag.extend(fresh(&mut rng, 0));
        ids.push(td.add_child(parent, bag));
    }

    let mut graph = Hypergraph::new();
    for &node in &ids {
        for &v in td.bag(node) {
            graph.add_vertex(v);
        }
        let edge: Vec<Vertex> = td
            .bag(node)
            .iter()
            .copied()
            .filter(|_| rng.gen_bool(0.5))
            .collect();
        if !edge.is_empty() {
            graph.add_edge(edge);
        }
    }
    td.compute_induced_edges(&graph);
    (graph, td)
}

/// Decomposer that always returns a copy of `td`.
pub fn fixed(td: TreeDecomposition) -> impl Fn(&Hypergraph) -> Result<TreeDecomposition, DecomposeError> {
    move |_: &Hypergraph| Ok(td.clone())
}

/// Path decomposition `{0,1} - {1,2} - ... ` with `len` nodes, root first.
pub fn path_decomposition(len: usize) -> (Hypergraph, TreeDecomposition) {
    let mut graph = Hypergraph::new();
    let mut td = TreeDecomposition::new([0, 1]);
    graph.add_edge([0, 1]);
    let mut last = td.root();
    for i in 1..len {
        graph.add_edge([i, i + 1]);
        last = td.add_child(last, [i, i + 1]);
    }
    (graph, td)
}

pub fn brute_force_independent_sets(graph: &Hypergraph) -> u128 {
    let vertices = graph.vertices();
    assert!(vertices.len() <= 20);
    (0u64..1 << vertices.len())
        .filter(|&mask| {
            graph.edges().iter().all(|e| {
                e.vertices().is_empty()
                    || !e.vertices().iter().all(|v| {
                        let i = vertices.binary_search(v).unwrap();
                        mask & (1 << i) != 0
                    })
            })
        })
        .count() as u128
}

pub fn brute_force_min_cover(graph: &Hypergraph) -> usize {
    let vertices = graph.vertices();
    assert!(vertices.len() <= 20);
    (0u64..1 << vertices.len())
        .filter(|&mask| {
            graph.edges().iter().all(|e| {
                e.vertices().iter().any(|v| {
                    let i = vertices.binary_search(v).unwrap();
                    mask & (1 << i) != 0
                })
            })
        })
        .map(|mask| mask.count_ones() as usize)
        .min()
        .unwrap()
}

/// One `evaluate_node` call seen by a [`Recorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub node: NodeId,
    pub pass: usize,
    pub live_tables: usize,
}

/// Algorithm recording every evaluation.
///
/// Bottom-up it computes subtree sizes from its children's tables, top-down
/// it computes depths from its parent's table, so a missing table surfaces
/// as an algorithm failure.
pub struct Recorder {
    pub bottom_up: bool,
    pub need_all: bool,
    pub fail_at: Option<NodeId>,
    pub cancel_at: Option<(NodeId, CancellationToken)>,
    pub log: Arc<Mutex<Vec<Visit>>>,
}

impl Recorder {
    pub fn bottom_up() -> Self {
        Self {
            bottom_up: true,
            need_all: false,
            fail_at: None,
            cancel_at: None,
            log: Arc::default(),
        }
    }

    pub fn top_down() -> Self {
        Self {
            bottom_up: false,
            ..Self::bottom_up()
        }
    }

    pub fn keep_all(mut self) -> Self {
        self.need_all = true;
        self
    }

    pub fn visits(&self) -> Vec<Visit> {
        self.log.lock().unwrap().clone()
    }
}

impl TreeAlgorithm for Recorder {
    type Instance = Hypergraph;
    type Table = usize;

    fn evaluate_node(
        &self,
        node: NodeId,
        decomposition: &TreeDecomposition,
        tables: &NodeTableStore<usize>,
        _instance: &Hypergraph,
    ) -> Result<usize, AlgorithmFailure> {
        self.log.lock().unwrap().push(Visit {
            node,
            pass: tables.current_pass(),
            live_tables: tables.len(),
        });
        if let Some((at, token)) = &self.cancel_at {
            if *at == node {
                token.cancel();
            }
        }
        if self.fail_at == Some(node) {
            return Err(AlgorithmFailure::new(format!("refusing node {node}")));
        }
        let missing = |n: NodeId| AlgorithmFailure::new(format!("missing table of {n}"));
        if self.bottom_up {
            let mut size = 1;
            for &child in decomposition.children(node) {
                size += tables.get(child).ok_or_else(|| missing(child))?;
            }
            Ok(size)
        } else {
            match decomposition.parent(node) {
                Some(parent) => Ok(tables.get(parent).ok_or_else(|| missing(parent))? + 1),
                None => Ok(0),
            }
        }
    }

    fn need_all_tables(&self) -> bool {
        self.need_all
    }

    fn is_bottom_up(&self) -> bool {
        self.bottom_up
    }
}

/// Reports the root table; `None` as the empty solution.
pub struct RootValue;

impl SolutionExtractor for RootValue {
    type Instance = Hypergraph;
    type Table = usize;
    type Solution = Option<usize>;

    fn extract_solution(
        &self,
        root: NodeId,
        _decomposition: &TreeDecomposition,
        tables: &NodeTableStore<usize>,
        _instance: &Hypergraph,
    ) -> Option<usize> {
        tables.get(root).copied()
    }

    fn empty_solution(&self, _instance: &Hypergraph) -> Option<usize> {
        None
    }
}

/// Sink keeping every message with its level.
#[derive(Default)]
pub struct RecordingSink {
    pub messages: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingSink {
    pub fn at(&self, level: &str) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: &'static str, message: &str) {
        self.messages.lock().unwrap().push((level, message.to_string()));
    }
}

impl InstrumentationSink for RecordingSink {
    fn data(&self, _group: &str, _key: &str, _value: DataValue) {}

    fn info(&self, message: &str) {
        self.push("info", message);
    }

    fn debug(&self, message: &str) {
        self.push("debug", message);
    }

    fn warning(&self, message: &str) {
        self.push("warning", message);
    }

    fn error(&self, message: &str) {
        self.push("error", message);
    }

    fn flush(&self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}
