//! Solver driver.
//!
//! [`TreeSolver`] turns an instance into a decomposition and runs its
//! algorithm pipeline over it:
//! 1. `decompose`: ask the decomposer for a candidate (or run the
//!    decomposition search), normalize, verify, label.
//! 2. `evaluate_passes`: one traversal per algorithm, post-order for
//!    bottom-up algorithms and pre-order for top-down ones, sharing a single
//!    [`NodeTableStore`].
//! 3. extraction of the answer from the root table.
//!
//! Traversals use an explicit frame stack, so arbitrarily deep
//! decompositions do not grow the call stack.

use crate::builder::TreeSolverBuilder;
use crate::config::SolverConfig;
use crate::decomposition::{NodeId, TreeDecomposition};
use crate::error::{AlgorithmFailure, SolverError};
use crate::hypergraph::Hypergraph;
use crate::normalize::{pipeline, prepare_decomposition, ManipulationOperation};
use crate::search::DecompositionSearch;
use crate::session::SolverSession;
use crate::tables::NodeTableStore;
use crate::traits::{Decomposer, FitnessFunction, Instance, SolutionExtractor, TreeAlgorithm, WidthHeightFitness};

/// Boxed algorithm module of a solver pipeline.
pub type BoxedAlgorithm<I, T> = Box<dyn TreeAlgorithm<Instance = I, Table = T>>;

/// Boxed solution extractor.
pub type BoxedExtractor<I, T, S> = Box<dyn SolutionExtractor<Instance = I, Table = T, Solution = S>>;

/// How the pass pipeline ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassStatus {
    /// Every pass evaluated every node.
    Completed,
    /// An algorithm could not produce a table.
    Failed {
        pass: usize,
        node: NodeId,
        failure: AlgorithmFailure,
    },
    Cancelled { pass: usize },
}

impl PassStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, PassStatus::Completed)
    }

    fn as_str(&self) -> &'static str {
        match self {
            PassStatus::Completed => "completed",
            PassStatus::Failed { .. } => "failed",
            PassStatus::Cancelled { .. } => "cancelled",
        }
    }
}

/// Dynamic-programming solver over tree decompositions.
///
/// Typical usage:
/// ```
/// use twdp::problems::independent_set::{IndependentSetCounter, IndependentSetCount};
/// use twdp::{EliminationDecomposer, Hypergraph, SolverSession, TreeSolverBuilder};
///
/// let graph = Hypergraph::from_edges([(0, 1), (1, 2), (2, 3)]);
/// let solver = TreeSolverBuilder::new()
///     .decomposer(EliminationDecomposer::new(7))
///     .algorithm(IndependentSetCounter)
///     .extractor(IndependentSetCount)
///     .build()
///     .unwrap();
/// let count = solver.solve_instance(&graph, &SolverSession::new()).unwrap();
/// assert_eq!(count, Some(8));
/// ```
pub struct TreeSolver<I: ?Sized, T, S, F = WidthHeightFitness> {
    decomposer: Box<dyn Decomposer>,
    algorithms: Vec<BoxedAlgorithm<I, T>>,
    extractor: BoxedExtractor<I, T, S>,
    fitness: F,
    config: SolverConfig,
    operations: Vec<Box<dyn ManipulationOperation>>,
}

impl<I: ?Sized, T, S> TreeSolver<I, T, S> {
    pub fn builder() -> TreeSolverBuilder<I, T, S> {
        TreeSolverBuilder::new()
    }
}

impl<I, T, S, F> TreeSolver<I, T, S, F>
where
    I: ?Sized,
    F: FitnessFunction,
{
    /// Assemble a solver from validated parts. Use [`TreeSolverBuilder`].
    pub(crate) fn from_parts(
        decomposer: Box<dyn Decomposer>,
        algorithms: Vec<BoxedAlgorithm<I, T>>,
        extractor: BoxedExtractor<I, T, S>,
        fitness: F,
        config: SolverConfig,
    ) -> Self {
        let operations = pipeline(&config.normalization);
        Self {
            decomposer,
            algorithms,
            extractor,
            fitness,
            config,
            operations,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Number of passes run per solve.
    pub fn pass_count(&self) -> usize {
        self.algorithms.len()
    }

    /// Compute, normalize and verify a decomposition of `graph`, then apply
    /// the algorithms' labelling hooks to it.
    ///
    /// Returns `Ok(None)` when cancelled before any candidate was available.
    /// In search mode a cancelled search still returns its best candidate.
    pub fn decompose(
        &self,
        graph: &Hypergraph,
        session: &SolverSession,
    ) -> Result<Option<TreeDecomposition>, SolverError> {
        let span = tracing::info_span!(
            "decompose",
            vertices = graph.vertex_count(),
            edges = graph.edge_count()
        );
        let _enter = span.enter();

        let decomposition = match &self.config.search {
            Some(search_config) => {
                let search = DecompositionSearch::new(
                    self.decomposer.as_ref(),
                    &self.fitness,
                    &self.operations,
                    *search_config,
                );
                let sink = session.sink();
                let outcome = search.run(graph, session, |improvement| {
                    sink.data("search", "iteration", improvement.iteration.into());
                    sink.data("search", "fitness", format!("{:?}", improvement.fitness).into());
                })?;
                sink.data("search", "iterations", outcome.iterations.into());
                outcome.best.map(|(td, _)| td)
            }
            None if session.is_cancelled() => None,
            None => {
                let mut td = self.decomposer.compute_decomposition(graph)?;
                if prepare_decomposition(graph, &mut td, &self.operations, session)? {
                    Some(td)
                } else {
                    None
                }
            }
        };

        let Some(mut decomposition) = decomposition else {
            session
                .sink()
                .info("cancelled before a decomposition was available");
            return Ok(None);
        };
        self.apply_labels(&mut decomposition);

        session.benchmark().register_timestamp("tree decomposition time");
        let sink = session.sink();
        sink.data("decomposition", "width", decomposition.width().into());
        sink.data("decomposition", "height", decomposition.height().into());
        sink.data("decomposition", "nodes", decomposition.node_count().into());
        Ok(Some(decomposition))
    }

    fn apply_labels(&self, decomposition: &mut TreeDecomposition) {
        for algorithm in &self.algorithms {
            for labeling in algorithm.preprocess_operations() {
                let labels: Vec<_> = decomposition
                    .node_ids()
                    .map(|n| (n, labeling.compute_label(decomposition, n)))
                    .collect();
                for (node, label) in labels {
                    decomposition.set_label(node, labeling.name(), label);
                }
            }
        }
    }

    /// Run every pass over `decomposition` and extract the solution.
    ///
    /// Algorithm failure and cancellation yield the extractor's empty
    /// solution; only contract violations are errors.
    pub fn solve(
        &self,
        decomposition: &TreeDecomposition,
        instance: &I,
        session: &SolverSession,
    ) -> Result<S, SolverError> {
        let (status, tables) = self.evaluate_passes(decomposition, instance, session)?;
        if !status.is_completed() {
            return Ok(self.extractor.empty_solution(instance));
        }
        session.benchmark().register_timestamp("solving time");
        let solution = self
            .extractor
            .extract_solution(decomposition.root(), decomposition, &tables, instance);
        session.benchmark().register_timestamp("solution extraction time");
        Ok(solution)
    }

    /// Run every pass in order, stopping at the first one that does not
    /// complete.
    pub fn evaluate_passes(
        &self,
        decomposition: &TreeDecomposition,
        instance: &I,
        session: &SolverSession,
    ) -> Result<(PassStatus, NodeTableStore<T>), SolverError> {
        let mut tables = NodeTableStore::with_capacity(decomposition.node_count());
        let mut status = PassStatus::Completed;
        let mut completed = 0usize;

        for algorithm in &self.algorithms {
            let pass = tables.begin_pass();
            status = self.evaluate_pass(algorithm.as_ref(), pass, decomposition, instance, &mut tables, session)?;
            if !status.is_completed() {
                break;
            }
            completed += 1;
            session.benchmark().register_timestamp(format!("PASS {pass}"));
        }

        let sink = session.sink();
        match &status {
            PassStatus::Completed => {}
            PassStatus::Failed { pass, node, failure } => {
                sink.warning(&format!(
                    "pass {pass} failed at node {node}: {failure}; reporting empty solution"
                ));
                sink.data("solver", "failure", failure.reason.clone().into());
            }
            PassStatus::Cancelled { pass } => {
                sink.info(&format!("solve cancelled during pass {pass}"));
            }
        }
        sink.data("solver", "status", status.as_str().into());
        sink.data("solver", "passes", completed.into());
        sink.data("solver", "nodes", decomposition.node_count().into());
        sink.data("solver", "peak_tables", tables.peak_len().into());
        Ok((status, tables))
    }

    fn evaluate_pass(
        &self,
        algorithm: &dyn TreeAlgorithm<Instance = I, Table = T>,
        pass: usize,
        decomposition: &TreeDecomposition,
        instance: &I,
        tables: &mut NodeTableStore<T>,
        session: &SolverSession,
    ) -> Result<PassStatus, SolverError> {
        let bottom_up = algorithm.is_bottom_up();
        let span = tracing::trace_span!("pass", pass, bottom_up);
        let _enter = span.enter();

        let mut run = PassRun {
            algorithm,
            pass,
            decomposition,
            instance,
            tables,
            session,
            keep_all: algorithm.need_all_tables(),
        };
        if bottom_up {
            run.post_order()
        } else {
            run.pre_order()
        }
    }
}

impl<I, T, S, F> TreeSolver<I, T, S, F>
where
    I: Instance + ?Sized,
    F: FitnessFunction,
{
    /// Decompose the instance's hypergraph and solve over the result.
    pub fn solve_instance(&self, instance: &I, session: &SolverSession) -> Result<S, SolverError> {
        let graph = instance.to_hypergraph();
        match self.decompose(&graph, session)? {
            Some(decomposition) => self.solve(&decomposition, instance, session),
            None => Ok(self.extractor.empty_solution(instance)),
        }
    }
}

/// State of a single traversal.
struct PassRun<'a, I: ?Sized, T> {
    algorithm: &'a dyn TreeAlgorithm<Instance = I, Table = T>,
    pass: usize,
    decomposition: &'a TreeDecomposition,
    instance: &'a I,
    tables: &'a mut NodeTableStore<T>,
    session: &'a SolverSession,
    keep_all: bool,
}

enum Step {
    Continue,
    Stop(PassStatus),
}

impl<'a, I: ?Sized, T> PassRun<'a, I, T> {
    /// Evaluate `node` and store its table.
    fn evaluate(&mut self, node: NodeId) -> Result<Step, SolverError> {
        if self.session.is_cancelled() {
            return Ok(Step::Stop(PassStatus::Cancelled { pass: self.pass }));
        }
        match self
            .algorithm
            .evaluate_node(node, self.decomposition, self.tables, self.instance)
        {
            Ok(table) => {
                self.tables.insert(node, table)?;
                Ok(Step::Continue)
            }
            Err(failure) => Ok(Step::Stop(PassStatus::Failed {
                pass: self.pass,
                node,
                failure,
            })),
        }
    }

    fn evict_children(&mut self, node: NodeId) {
        if self.keep_all {
            return;
        }
        for &child in self.decomposition.children(node) {
            self.tables.erase(child);
        }
    }

    /// Children left to right, then the node; children's tables are evicted
    /// once their parent's table is stored.
    fn post_order(&mut self) -> Result<PassStatus, SolverError> {
        let td = self.decomposition;
        let mut stack: Vec<(NodeId, usize)> = vec![(td.root(), 0)];
        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            if let Some(child) = td.child_at(node, next) {
                frame.1 += 1;
                stack.push((child, 0));
                continue;
            }
            stack.pop();
            if let Step::Stop(status) = self.evaluate(node)? {
                return Ok(status);
            }
            self.evict_children(node);
        }
        Ok(PassStatus::Completed)
    }

    /// The node, then its children left to right. A node is evaluated when
    /// it is reached, so every ancestor's table is stored at that point;
    /// children's tables are evicted when the node is left.
    fn pre_order(&mut self) -> Result<PassStatus, SolverError> {
        let td = self.decomposition;
        if let Step::Stop(status) = self.evaluate(td.root())? {
            return Ok(status);
        }
        let mut stack: Vec<(NodeId, usize)> = vec![(td.root(), 0)];
        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            if let Some(child) = td.child_at(node, next) {
                frame.1 += 1;
                if let Step::Stop(status) = self.evaluate(child)? {
                    return Ok(status);
                }
                stack.push((child, 0));
                continue;
            }
            stack.pop();
            self.evict_children(node);
        }
        Ok(PassStatus::Completed)
    }
}
