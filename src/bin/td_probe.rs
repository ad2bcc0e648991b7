use std::env;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sysinfo::{get_current_pid, ProcessRefreshKind, System};
use twdp::problems::independent_set::{IndependentSetCount, IndependentSetCounter};
use twdp::problems::vertex_cover::{CoverCosts, CoverWitness, VertexCoverExtractor};
use twdp::{EliminationDecomposer, Hypergraph, SearchConfig, SolverSession, TreeSolverBuilder};

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("td_probe: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut sys = System::new();
    let mut measurements = Vec::new();

    eprintln!("[1/3] Counting independent sets on grids...");
    measurements.extend(run_grid_counts(&options, &mut sys));
    eprintln!("[2/3] Counting independent sets on random graphs...");
    measurements.extend(run_random_counts(&options, &mut sys));
    eprintln!("[3/3] Minimum vertex cover on random graphs...");
    measurements.extend(run_random_covers(&options, &mut sys));

    let failed = measurements
        .iter()
        .filter(|m| matches!(m.status, VerificationStatus::Failed))
        .count();
    eprintln!(
        "{} scenarios, {} failed, {} not checked (more than {} vertices)",
        measurements.len(),
        failed,
        measurements
            .iter()
            .filter(|m| matches!(m.status, VerificationStatus::NotChecked))
            .count(),
        options.verify_limit
    );

    options.format.write(&measurements);
    if failed > 0 {
        std::process::exit(1);
    }
}

struct Options {
    format: OutputFormat,
    verify_limit: usize,
    seed: u64,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut format = OutputFormat::Csv;
        let mut verify_limit = 18usize;
        let mut seed = 7u64;

        while let Some(arg) = args.next() {
            let arg = arg.into();
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg.clone(), None),
            };
            let mut value = || -> Result<String, String> {
                match &inline {
                    Some(v) => Ok(v.clone()),
                    None => args
                        .next()
                        .map(Into::into)
                        .ok_or_else(|| format!("missing value after {flag}")),
                }
            };
            match flag.as_str() {
                "--help" | "-h" => {
                    Options::print_help();
                    std::process::exit(0);
                }
                "--format" => format = OutputFormat::from_str(&value()?)?,
                "--verify-limit" => {
                    verify_limit = value()?
                        .parse::<usize>()
                        .map_err(|_| "verify limit must be a positive integer".to_string())?;
                    if verify_limit > 24 {
                        return Err("verify limit above 24 vertices is not supported".into());
                    }
                }
                "--seed" => {
                    seed = value()?
                        .parse::<u64>()
                        .map_err(|_| "seed must be an unsigned integer".to_string())?;
                }
                _ => return Err(format!("unrecognized argument '{arg}'")),
            }
        }

        Ok(Self {
            format,
            verify_limit,
            seed,
        })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --features probe --bin td_probe [-- <options>]

Options:
  --format <csv|table>          Output format (default: csv)
  --verify-limit <N>            Largest vertex count checked by brute force (default: 18, max: 24)
  --seed <N>                    Seed for decomposers and random graphs (default: 7)
  -h, --help                    Print this help message

Logging follows RUST_LOG (default: info).
"
        );
    }
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Csv,
    Table,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, measurements: &[Measurement]) {
        match self {
            OutputFormat::Csv => write_csv(measurements),
            OutputFormat::Table => write_table(measurements),
        }
    }
}

struct Measurement {
    scenario: &'static str,
    size_desc: String,
    width: usize,
    nodes: usize,
    wall_s: f64,
    rss_delta_kib: u64,
    status: VerificationStatus,
    detail: Option<String>,
}

#[derive(Clone, Copy)]
enum VerificationStatus {
    NotChecked,
    Passed,
    Failed,
}

impl VerificationStatus {
    fn label(&self) -> &'static str {
        match self {
            VerificationStatus::NotChecked => "not_checked",
            VerificationStatus::Passed => "passed",
            VerificationStatus::Failed => "failed",
        }
    }
}

/// What a scenario reports back besides timing.
struct Outcome {
    width: usize,
    nodes: usize,
    status: VerificationStatus,
    detail: Option<String>,
}

impl Outcome {
    fn failed(detail: String) -> Self {
        Self {
            width: 0,
            nodes: 0,
            status: VerificationStatus::Failed,
            detail: Some(detail),
        }
    }
}

fn run_grid_counts(options: &Options, sys: &mut System) -> Vec<Measurement> {
    const SIDES: &[usize] = &[3, 4, 6, 8, 10];
    SIDES
        .iter()
        .map(|&side| {
            let graph = grid(side);
            measure("is_grid", format!("{side}x{side}"), sys, || {
                count_and_check(&graph, options)
            })
        })
        .collect()
}

fn run_random_counts(options: &Options, sys: &mut System) -> Vec<Measurement> {
    const SIZES: &[usize] = &[12, 16, 24, 40];
    let mut rng = StdRng::seed_from_u64(options.seed);
    SIZES
        .iter()
        .map(|&n| {
            let graph = sparse_random(&mut rng, n, 3.0);
            measure("is_random", format!("n={n}"), sys, || {
                count_and_check(&graph, options)
            })
        })
        .collect()
}

fn run_random_covers(options: &Options, sys: &mut System) -> Vec<Measurement> {
    const SIZES: &[usize] = &[12, 16, 24, 40];
    let mut rng = StdRng::seed_from_u64(options.seed ^ 0x5EED);
    SIZES
        .iter()
        .map(|&n| {
            let graph = sparse_random(&mut rng, n, 3.0);
            measure("vc_random", format!("n={n}"), sys, || {
                let solver = match TreeSolverBuilder::new()
                    .decomposer(EliminationDecomposer::new(options.seed))
                    .algorithm(CoverCosts)
                    .algorithm(CoverWitness)
                    .extractor(VertexCoverExtractor)
                    .build()
                {
                    Ok(solver) => solver,
                    Err(err) => return Outcome::failed(err.to_string()),
                };
                let session = SolverSession::new();
                let td = match solver.decompose(&graph, &session) {
                    Ok(Some(td)) => td,
                    Ok(None) => return Outcome::failed("no decomposition".into()),
                    Err(err) => return Outcome::failed(err.to_string()),
                };
                let cover = match solver.solve(&td, &graph, &session) {
                    Ok(Some(cover)) => cover,
                    Ok(None) => return Outcome::failed("no cover".into()),
                    Err(err) => return Outcome::failed(err.to_string()),
                };
                let uncovered = graph
                    .edges()
                    .iter()
                    .filter(|e| !e.vertices().iter().any(|v| cover.vertices.contains(v)))
                    .count();
                let (status, detail) = if uncovered > 0 {
                    (
                        VerificationStatus::Failed,
                        Some(format!("{uncovered} edges uncovered")),
                    )
                } else if graph.vertex_count() <= options.verify_limit {
                    let expected = brute_force_min_cover(&graph);
                    if expected == cover.size() {
                        (VerificationStatus::Passed, None)
                    } else {
                        (
                            VerificationStatus::Failed,
                            Some(format!("expected {expected}, got {}", cover.size())),
                        )
                    }
                } else {
                    (VerificationStatus::NotChecked, None)
                };
                Outcome {
                    width: td.width(),
                    nodes: td.node_count(),
                    status,
                    detail,
                }
            })
        })
        .collect()
}

fn count_and_check(graph: &Hypergraph, options: &Options) -> Outcome {
    let solver = match TreeSolverBuilder::new()
        .decomposer(EliminationDecomposer::new(options.seed))
        .algorithm(IndependentSetCounter)
        .extractor(IndependentSetCount)
        .search(SearchConfig::new(10, 3))
        .build()
    {
        Ok(solver) => solver,
        Err(err) => return Outcome::failed(err.to_string()),
    };
    let session = SolverSession::new();
    let td = match solver.decompose(graph, &session) {
        Ok(Some(td)) => td,
        Ok(None) => return Outcome::failed("no decomposition".into()),
        Err(err) => return Outcome::failed(err.to_string()),
    };
    let count = match solver.solve(&td, graph, &session) {
        Ok(Some(count)) => count,
        Ok(None) => return Outcome::failed("count overflowed or bag too large".into()),
        Err(err) => return Outcome::failed(err.to_string()),
    };
    let (status, detail) = if graph.vertex_count() <= options.verify_limit {
        let expected = brute_force_independent_sets(graph);
        if expected == count {
            (VerificationStatus::Passed, None)
        } else {
            (
                VerificationStatus::Failed,
                Some(format!("expected {expected}, got {count}")),
            )
        }
    } else {
        (VerificationStatus::NotChecked, Some(format!("count={count}")))
    };
    Outcome {
        width: td.width(),
        nodes: td.node_count(),
        status,
        detail,
    }
}

fn measure<F>(scenario: &'static str, size_desc: String, sys: &mut System, compute: F) -> Measurement
where
    F: FnOnce() -> Outcome,
{
    eprint!("      {scenario} {size_desc}... ");
    let before = rss_kib(sys);
    let start = Instant::now();
    let outcome = compute();
    let duration = start.elapsed();
    let after = rss_kib(sys);
    eprintln!(
        "width={}, nodes={}, time={:.3}s, status={}",
        outcome.width,
        outcome.nodes,
        duration.as_secs_f64(),
        outcome.status.label()
    );

    Measurement {
        scenario,
        size_desc,
        width: outcome.width,
        nodes: outcome.nodes,
        wall_s: duration.as_secs_f64(),
        rss_delta_kib: after.saturating_sub(before),
        status: outcome.status,
        detail: outcome.detail,
    }
}

fn write_csv(measurements: &[Measurement]) {
    println!("scenario,size_desc,width,nodes,wall_s,rss_delta_kib,verification_status,verification_detail");
    for m in measurements {
        let detail = m
            .detail
            .as_ref()
            .map(|s| s.replace('"', "'"))
            .unwrap_or_default();
        println!(
            "{},{},{},{},{:.3},{},{},\"{}\"",
            m.scenario,
            m.size_desc,
            m.width,
            m.nodes,
            m.wall_s,
            m.rss_delta_kib,
            m.status.label(),
            detail
        );
    }
}

fn write_table(measurements: &[Measurement]) {
    let mut col1 = "scenario".len();
    let mut col2 = "size".len();
    for m in measurements {
        col1 = col1.max(m.scenario.len());
        col2 = col2.max(m.size_desc.len());
    }

    println!(
        "{:<col1$}  {:<col2$}  {:>6}  {:>8}  {:>10}  {:>14}  {:>12}  detail",
        "scenario", "size", "width", "nodes", "wall_s", "rss_delta_kib", "status",
    );
    println!(
        "{:-<col1$}  {:-<col2$}  {:-<6}  {:-<8}  {:-<10}  {:-<14}  {:-<12}  {:-<12}",
        "", "", "", "", "", "", "", "",
    );
    for m in measurements {
        println!(
            "{:<col1$}  {:<col2$}  {:>6}  {:>8}  {:>10.3}  {:>14}  {:>12}  {}",
            m.scenario,
            m.size_desc,
            m.width,
            m.nodes,
            m.wall_s,
            m.rss_delta_kib,
            m.status.label(),
            m.detail.as_deref().unwrap_or(""),
        );
    }
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    match get_current_pid().ok().and_then(|pid| sys.process(pid)) {
        Some(process) => process.memory() / 1024,
        None => 0,
    }
}

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

/// Random graph with roughly `avg_degree * n / 2` edges.
fn sparse_random(rng: &mut StdRng, n: usize, avg_degree: f64) -> Hypergraph {
    let p = (avg_degree / (n.max(2) - 1) as f64).min(1.0);
    let mut g = Hypergraph::with_vertices(0..n);
    for u in 0..n {
        for w in u + 1..n {
            if rng.gen_bool(p) {
                g.add_edge([u, w]);
            }
        }
    }
    g
}

fn in_mask(graph: &Hypergraph, mask: u32, v: usize) -> bool {
    graph
        .vertices()
        .binary_search(&v)
        .map(|i| mask & (1 << i) != 0)
        .unwrap_or(false)
}

fn brute_force_independent_sets(graph: &Hypergraph) -> u128 {
    let n = graph.vertex_count();
    (0u32..1 << n)
        .filter(|&mask| {
            graph.edges().iter().all(|e| {
                e.vertices().is_empty() || !e.vertices().iter().all(|&v| in_mask(graph, mask, v))
            })
        })
        .count() as u128
}

fn brute_force_min_cover(graph: &Hypergraph) -> usize {
    let n = graph.vertex_count();
    (0u32..1 << n)
        .filter(|&mask| {
            graph
                .edges()
                .iter()
                .all(|e| e.vertices().iter().any(|&v| in_mask(graph, mask, v)))
        })
        .map(|mask| mask.count_ones() as usize)
        .min()
        .unwrap_or(0)
}
