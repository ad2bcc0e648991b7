use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use twdp::normalize::{ExactLimitChildCount, LimitChildCount, ManipulationOperation, WeakNormalization};
use twdp::{Hypergraph, TreeDecomposition, Vertex};

/// Bushy decomposition: every node hangs below one of the first few nodes.
fn bushy(seed: u64, nodes: usize) -> TreeDecomposition {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut next: Vertex = 4;
    let mut td = TreeDecomposition::new(0..4);
    let mut ids = vec![td.root()];
    let mut graph = Hypergraph::with_vertices(0..4);
    for _ in 1..nodes {
        let parent = ids[rng.gen_range(0..ids.len().min(8))];
        let mut bag: Vec<Vertex> = td
            .bag(parent)
            .iter()
            .copied()
            .filter(|_| rng.gen_bool(0.5))
            .collect();
        bag.push(next);
        next += 1;
        graph.add_edge(bag.iter().copied());
        ids.push(td.add_child(parent, bag));
    }
    td.compute_induced_edges(&graph);
    td
}

fn bench_operations(c: &mut Criterion) {
    let ops: [(&str, Box<dyn ManipulationOperation>); 4] = [
        ("limit_child_count_3", Box::new(LimitChildCount::new(3))),
        ("exact_limit_child_count_3", Box::new(ExactLimitChildCount::new(3))),
        ("exact_limit_child_count_2", Box::new(ExactLimitChildCount::new(2))),
        ("weak_normalization", Box::new(WeakNormalization)),
    ];
    let mut group = c.benchmark_group("normalize_ops");
    for &nodes in &[1_000usize, 10_000] {
        let td = bushy(0xC0FFEE, nodes);
        for (name, op) in &ops {
            group.bench_function(format!("{name}/{nodes}"), |b| {
                b.iter_batched(
                    || td.clone(),
                    |mut td| {
                        op.apply(&mut td).unwrap();
                        black_box(td.node_count());
                    },
                    BatchSize::LargeInput,
                )
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_operations);
criterion_main!(benches);
