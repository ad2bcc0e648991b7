//! Example: counting independent sets of a grid graph.
//!
//! Run with:
//! `cargo run --example count_independent_sets`

use twdp::problems::independent_set::{IndependentSetCount, IndependentSetCounter};
use twdp::{EliminationDecomposer, Hypergraph, SearchConfig, SolverSession, TreeSolverBuilder};

fn main() {
    let side = 6;
    let mut graph = Hypergraph::with_vertices(0..side * side);
    for r in 0..side {
        for c in 0..side {
            let v = r * side + c;
            if c + 1 < side {
                graph.add_edge([v, v + 1]);
            }
            if r + 1 < side {
                graph.add_edge([v, v + side]);
            }
        }
    }

    let solver = TreeSolverBuilder::new()
        .decomposer(EliminationDecomposer::new(17))
        .algorithm(IndependentSetCounter)
        .extractor(IndependentSetCount)
        .search(SearchConfig::new(20, 5))
        .build()
        .expect("valid solver configuration");

    let session = SolverSession::new();
    let td = match solver.decompose(&graph, &session).expect("decomposition succeeds") {
        Some(td) => td,
        None => return,
    };
    println!(
        "decomposition: {} nodes, width {}, height {}",
        td.node_count(),
        td.width(),
        td.height()
    );

    match solver.solve(&td, &graph, &session).expect("solving succeeds") {
        Some(count) => println!("independent sets of the {side}x{side} grid: {count}"),
        None => println!("no answer"),
    }

    let mut report = Vec::new();
    session
        .benchmark()
        .write_report(&mut report, false)
        .expect("in-memory write");
    print!("{}", String::from_utf8_lossy(&report));
}
