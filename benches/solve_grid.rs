use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use sysinfo::{get_current_pid, ProcessRefreshKind, System};
use twdp::problems::independent_set::{IndependentSetCount, IndependentSetCounter};
use twdp::problems::vertex_cover::{CoverCosts, CoverWitness, VertexCoverExtractor};
use twdp::{EliminationDecomposer, Hypergraph, SolverSession, TreeSolverBuilder};

fn grid(side: usize) -> Hypergraph {
    let mut g = Hypergraph::with_vertices(0..side * side);
    for r in 0..side {
        for c in 0..side {
            let v = r * side + c;
            if c + 1 < side {
                g.add_edge([v, v + 1]);
            }
            if r + 1 < side {
                g.add_edge([v, v + side]);
            }
        }
    }
    g
}

/// Grid with a few random diagonals.
fn noisy_grid(rng: &mut StdRng, side: usize) -> Hypergraph {
    let mut g = grid(side);
    for _ in 0..side {
        let r = rng.gen_range(0..side - 1);
        let c = rng.gen_range(0..side - 1);
        g.add_edge([r * side + c, (r + 1) * side + c + 1]);
    }
    g
}

fn rss_kib() -> u64 {
    let mut sys = System::new();
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    match get_current_pid().ok().and_then(|pid| sys.process(pid).map(|p| p.memory())) {
        Some(bytes) => bytes / 1024,
        None => 0,
    }
}

fn bench_independent_sets(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_independent_sets");
    for &side in &[4usize, 6, 8] {
        group.bench_function(format!("grid_{side}x{side}"), |b| {
            b.iter_batched(
                || {
                    let mut rng = StdRng::seed_from_u64(42);
                    noisy_grid(&mut rng, side)
                },
                |graph| {
                    let before = rss_kib();
                    let solver = TreeSolverBuilder::new()
                        .decomposer(EliminationDecomposer::new(7))
                        .algorithm(IndependentSetCounter)
                        .extractor(IndependentSetCount)
                        .build()
                        .unwrap();
                    let count = solver.solve_instance(&graph, &SolverSession::new()).unwrap();
                    let after = rss_kib();
                    black_box(count);
                    eprintln!(
                        "RSS KiB delta (grid {side}): {}",
                        after.saturating_sub(before)
                    );
                },
                BatchSize::PerIteration,
            )
        });
    }
    group.finish();
}

fn bench_vertex_cover(c: &mut Criterion) {
    let mut group = c.benchmark_group("vertex_cover");
    for &side in &[4usize, 6, 8] {
        let graph = grid(side);
        let solver = TreeSolverBuilder::new()
            .decomposer(EliminationDecomposer::new(7))
            .algorithm(CoverCosts)
            .algorithm(CoverWitness)
            .extractor(VertexCoverExtractor)
            .build()
            .unwrap();
        group.bench_function(format!("grid_{side}x{side}"), |b| {
            b.iter(|| {
                let cover = solver.solve_instance(&graph, &SolverSession::new()).unwrap();
                black_box(cover);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_independent_sets, bench_vertex_cover);
criterion_main!(benches);
