use crate::config::{NormalizationConfig, SearchConfig, SolverConfig};
use crate::engine::{BoxedAlgorithm, BoxedExtractor, TreeSolver};
use crate::error::{ConfigError, SolverError};
use crate::traits::{Decomposer, FitnessFunction, SolutionExtractor, TreeAlgorithm, WidthHeightFitness};

/// Collects the collaborators of a [`TreeSolver`].
///
/// Algorithms run as passes in the order they were added.
pub struct TreeSolverBuilder<I: ?Sized, T, S, F = WidthHeightFitness> {
    decomposer: Option<Box<dyn Decomposer>>,
    algorithms: Vec<BoxedAlgorithm<I, T>>,
    extractor: Option<BoxedExtractor<I, T, S>>,
    fitness: F,
    config: SolverConfig,
}

impl<I: ?Sized, T, S> Default for TreeSolverBuilder<I, T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ?Sized, T, S> TreeSolverBuilder<I, T, S> {
    pub fn new() -> Self {
        Self {
            decomposer: None,
            algorithms: Vec::new(),
            extractor: None,
            fitness: WidthHeightFitness,
            config: SolverConfig::default(),
        }
    }
}

impl<I: ?Sized, T, S, F: FitnessFunction> TreeSolverBuilder<I, T, S, F> {
    pub fn decomposer<D>(mut self, decomposer: D) -> Self
    where
        D: Decomposer + 'static,
    {
        self.decomposer = Some(Box::new(decomposer));
        self
    }

    /// Append a pass.
    pub fn algorithm<A>(mut self, algorithm: A) -> Self
    where
        A: TreeAlgorithm<Instance = I, Table = T> + 'static,
    {
        self.algorithms.push(Box::new(algorithm));
        self
    }

    pub fn extractor<E>(mut self, extractor: E) -> Self
    where
        E: SolutionExtractor<Instance = I, Table = T, Solution = S> + 'static,
    {
        self.extractor = Some(Box::new(extractor));
        self
    }

    /// Score used by the decomposition search.
    pub fn fitness<G: FitnessFunction>(self, fitness: G) -> TreeSolverBuilder<I, T, S, G> {
        TreeSolverBuilder {
            decomposer: self.decomposer,
            algorithms: self.algorithms,
            extractor: self.extractor,
            fitness,
            config: self.config,
        }
    }

    pub fn config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn normalization(mut self, normalization: NormalizationConfig) -> Self {
        self.config.normalization = normalization;
        self
    }

    /// Enable the decomposition search.
    pub fn search(mut self, search: SearchConfig) -> Self {
        self.config.search = Some(search);
        self
    }

    pub fn build(self) -> Result<TreeSolver<I, T, S, F>, SolverError> {
        self.config.validate()?;
        if self.algorithms.is_empty() {
            return Err(ConfigError::NoAlgorithms.into());
        }
        let decomposer = self.decomposer.ok_or(SolverError::MissingComponent("decomposer"))?;
        let extractor = self
            .extractor
            .ok_or(SolverError::MissingComponent("solution extractor"))?;
        Ok(TreeSolver::from_parts(
            decomposer,
            self.algorithms,
            extractor,
            self.fitness,
            self.config,
        ))
    }
}
