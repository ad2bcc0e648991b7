//! Example: bounding the fan-out of a join node without widening bags.
//!
//! Run with:
//! `cargo run --example bounded_joins`

use twdp::normalize::{ExactLimitChildCount, LimitChildCount, ManipulationOperation};
use twdp::{Hypergraph, TreeDecomposition, TreeDecompositionVerifier};

fn main() {
    // a hub bag {0,1,2,3} with six children, each sharing one hub vertex
    let mut graph = Hypergraph::new();
    graph.add_edge([0, 1, 2, 3]);
    let mut td = TreeDecomposition::new([0, 1, 2, 3]);
    let root = td.root();
    for i in 0..6 {
        let leaf = 10 + i;
        graph.add_edge([i % 4, leaf]);
        td.add_child(root, [i % 4, leaf]);
    }
    td.compute_induced_edges(&graph);
    println!("original ({} nodes):\n{td}", td.node_count());

    let verifier = TreeDecompositionVerifier::new();
    for (name, op) in [
        ("copying", Box::new(LimitChildCount::new(2)) as Box<dyn ManipulationOperation>),
        ("exact", Box::new(ExactLimitChildCount::new(2))),
    ] {
        let mut bounded = td.clone();
        if let Err(err) = op.apply(&mut bounded) {
            eprintln!("{name}: {err}");
            continue;
        }
        println!(
            "{name} ({}): {} nodes, max children {}, max bag {}, valid {}",
            op.name(),
            bounded.node_count(),
            bounded.max_child_count(),
            bounded.max_bag_size(),
            verifier.verify(&graph, &bounded).is_ok()
        );
        println!("{bounded}");
    }
}
