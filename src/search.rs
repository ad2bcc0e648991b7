//! Fitness-guided search over alternative decompositions.
//!
//! The decomposer is asked for candidates repeatedly; each candidate goes
//! through the normalization pipeline and the verifier before it is scored.
//! The search keeps the best candidate seen and stops on the iteration
//! limit, on too many consecutive non-improving candidates, or on
//! cancellation.

use std::time::SystemTime;

use crate::config::SearchConfig;
use crate::decomposition::TreeDecomposition;
use crate::error::SolverError;
use crate::hypergraph::Hypergraph;
use crate::normalize::{prepare_decomposition, ManipulationOperation};
use crate::session::SolverSession;
use crate::traits::{Decomposer, FitnessFunction};

/// A candidate that strictly beat every earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Improvement<S> {
    /// 0-based index of the candidate.
    pub iteration: usize,
    pub fitness: S,
    pub timestamp: SystemTime,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome<S> {
    /// Best candidate and its score; `None` if no candidate was computed.
    pub best: Option<(TreeDecomposition, S)>,
    /// Candidates scored.
    pub iterations: usize,
    pub cancelled: bool,
}

/// One configured search run.
pub struct DecompositionSearch<'a, D: ?Sized, F> {
    decomposer: &'a D,
    fitness: &'a F,
    operations: &'a [Box<dyn ManipulationOperation>],
    config: SearchConfig,
}

impl<'a, D, F> DecompositionSearch<'a, D, F>
where
    D: Decomposer + ?Sized,
    F: FitnessFunction,
{
    pub fn new(
        decomposer: &'a D,
        fitness: &'a F,
        operations: &'a [Box<dyn ManipulationOperation>],
        config: SearchConfig,
    ) -> Self {
        Self {
            decomposer,
            fitness,
            operations,
            config,
        }
    }

    /// Run the search on `graph`.
    ///
    /// `on_improvement` fires once per strictly better candidate, in order.
    /// Decomposer failures and invalid candidates abort the search. The
    /// session's token is polled before every candidate and inside the
    /// normalization pipeline.
    pub fn run<C>(
        &self,
        graph: &Hypergraph,
        session: &SolverSession,
        mut on_improvement: C,
    ) -> Result<SearchOutcome<F::Score>, SolverError>
    where
        C: FnMut(&Improvement<F::Score>),
    {
        let span = tracing::info_span!(
            "decomposition_search",
            iteration_limit = self.config.iteration_limit,
            non_improvement_limit = self.config.non_improvement_limit
        );
        let _enter = span.enter();

        let mut best: Option<(TreeDecomposition, F::Score)> = None;
        let mut iterations = 0;
        let mut non_improving = 0;
        let mut cancelled = false;

        for iteration in 0..self.config.iteration_limit {
            if session.is_cancelled() {
                cancelled = true;
                break;
            }
            let mut candidate = self.decomposer.compute_decomposition(graph)?;
            if !prepare_decomposition(graph, &mut candidate, self.operations, session)? {
                cancelled = true;
                break;
            }
            iterations += 1;

            let score = self.fitness.fitness(graph, &candidate);
            let improved = best.as_ref().map_or(true, |(_, b)| score < *b);
            if improved {
                tracing::info!(iteration, fitness = ?score, "decomposition improved");
                on_improvement(&Improvement {
                    iteration,
                    fitness: score.clone(),
                    timestamp: SystemTime::now(),
                });
                best = Some((candidate, score));
                non_improving = 0;
            } else {
                non_improving += 1;
                if non_improving > self.config.non_improvement_limit {
                    session
                        .sink()
                        .debug(&format!("non-improvement limit reached after candidate {iteration}"));
                    break;
                }
            }
        }

        Ok(SearchOutcome {
            best,
            iterations,
            cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::DecomposeError;
    use crate::traits::WidthHeightFitness;

    /// Decomposer handing out path decompositions of a path graph whose
    /// root bag grows by one extra vertex per entry of `padding`.
    struct Scripted {
        padding: Vec<usize>,
        calls: Cell<usize>,
    }

    impl Decomposer for Scripted {
        fn compute_decomposition(&self, graph: &Hypergraph) -> Result<TreeDecomposition, DecomposeError> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            let pad = *self
                .padding
                .get(call)
                .ok_or_else(|| DecomposeError::new("script exhausted"))?;
            let mut root_bag = vec![1, 2];
            root_bag.extend((3..3 + pad).take(graph.vertex_count() - 2));
            let mut td = TreeDecomposition::new(root_bag);
            let root = td.root();
            td.add_child(root, [2, 3]);
            Ok(td)
        }
    }

    fn graph() -> Hypergraph {
        Hypergraph::from_edges([(1, 2), (2, 3)])
    }

    fn run(padding: Vec<usize>, config: SearchConfig) -> (SearchOutcome<(usize, usize)>, Vec<usize>) {
        let decomposer = Scripted {
            padding,
            calls: Cell::new(0),
        };
        let search = DecompositionSearch::new(&decomposer, &WidthHeightFitness, &[], config);
        let mut seen = Vec::new();
        let outcome = search
            .run(&graph(), &SolverSession::new(), |imp| seen.push(imp.iteration))
            .unwrap();
        (outcome, seen)
    }

    #[test]
    fn keeps_strictly_better_candidates() {
        let (outcome, seen) = run(vec![1, 1, 0, 0, 1], SearchConfig::new(5, 5));
        assert_eq!(outcome.iterations, 5);
        assert_eq!(seen, vec![0, 2]);
        let (td, score) = outcome.best.unwrap();
        assert_eq!(score, (2, 1));
        assert_eq!(td.bag(td.root()), &[1, 2]);
        assert!(!outcome.cancelled);
    }

    #[test]
    fn zero_tolerance_is_hill_climbing() {
        let (outcome, seen) = run(vec![1, 1, 0], SearchConfig::new(10, 0));
        assert_eq!(outcome.iterations, 2);
        assert_eq!(seen, vec![0]);
    }

    #[test]
    fn improvement_resets_the_counter() {
        // 0 improves, 1 fails, 2 improves, 3 fails, 4 fails -> stop after 4
        let (outcome, seen) = run(vec![1, 1, 0, 0, 0, 0], SearchConfig::new(10, 1));
        assert_eq!(seen, vec![0, 2]);
        assert_eq!(outcome.iterations, 5);
    }

    #[test]
    fn cancelled_search_reports_best_so_far() {
        let decomposer = Scripted {
            padding: vec![0; 4],
            calls: Cell::new(0),
        };
        let session = SolverSession::new();
        let search = DecompositionSearch::new(&decomposer, &WidthHeightFitness, &[], SearchConfig::new(4, 4));
        let outcome = search
            .run(&graph(), &session, |_| session.cancellation().cancel())
            .unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.best.is_some());
    }

    #[test]
    fn decomposer_failure_aborts() {
        let decomposer = Scripted {
            padding: vec![],
            calls: Cell::new(0),
        };
        let search = DecompositionSearch::new(&decomposer, &WidthHeightFitness, &[], SearchConfig::new(3, 3));
        let err = search.run(&graph(), &SolverSession::new(), |_| {}).unwrap_err();
        assert!(matches!(err, SolverError::Decompose(_)));
    }
}
