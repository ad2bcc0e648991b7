//! Example: a minimum vertex cover from two passes over one decomposition.
//!
//! Run with:
//! `cargo run --example vertex_cover`

use std::io;

use twdp::problems::vertex_cover::{CoverCosts, CoverWitness, VertexCoverExtractor};
use twdp::{EliminationDecomposer, Hypergraph, InstrumentationSink, SolverSession, TreeSolverBuilder};

fn main() {
    // Petersen graph: outer cycle, inner pentagram, spokes.
    let mut graph = Hypergraph::new();
    for i in 0..5 {
        graph.add_edge([i, (i + 1) % 5]);
        graph.add_edge([5 + i, 5 + (i + 2) % 5]);
        graph.add_edge([i, 5 + i]);
    }

    let solver = TreeSolverBuilder::new()
        .decomposer(EliminationDecomposer::new(3))
        .algorithm(CoverCosts)
        .algorithm(CoverWitness)
        .extractor(VertexCoverExtractor)
        .build()
        .expect("valid solver configuration");

    let session = SolverSession::new();
    match solver.solve_instance(&graph, &session).expect("solving succeeds") {
        Some(cover) => println!("minimum vertex cover ({}): {:?}", cover.size(), cover.vertices),
        None => println!("no answer"),
    }

    session
        .sink()
        .flush(&mut io::stdout().lock())
        .expect("stdout is writable");
}
