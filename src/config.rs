//! Solver configuration.

use crate::error::ConfigError;

/// Structural rewrites applied to every decomposition before solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizationConfig {
    /// Apply [`WeakNormalization`](crate::normalize::WeakNormalization) last.
    pub weak: bool,
    /// Maximum number of children per node; `None` leaves fan-out alone.
    pub child_limit: Option<usize>,
    /// Bound fan-out with the tight-bag operation
    /// ([`ExactLimitChildCount`](crate::normalize::ExactLimitChildCount))
    /// instead of plain bag copies.
    pub exact_child_limit: bool,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            weak: true,
            child_limit: Some(3),
            exact_child_limit: false,
        }
    }
}

impl NormalizationConfig {
    /// No rewrites at all; the decomposer's output is solved as is.
    pub fn none() -> Self {
        Self {
            weak: false,
            child_limit: None,
            exact_child_limit: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.child_limit {
            Some(limit) if limit < 2 => Err(ConfigError::ChildLimitTooSmall(limit)),
            _ => Ok(()),
        }
    }
}

/// Bounds of the decomposition search.
///
/// There is no default: callers choose how much search they pay for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Candidates computed at most.
    pub iteration_limit: usize,
    /// Consecutive non-improving candidates tolerated; 0 stops at the first.
    pub non_improvement_limit: usize,
}

impl SearchConfig {
    pub fn new(iteration_limit: usize, non_improvement_limit: usize) -> Self {
        Self {
            iteration_limit,
            non_improvement_limit,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iteration_limit == 0 {
            return Err(ConfigError::ZeroIterationLimit);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverConfig {
    pub normalization: NormalizationConfig,
    /// Run the decomposition search instead of taking the first candidate.
    pub search: Option<SearchConfig>,
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.normalization.validate()?;
        if let Some(search) = &self.search {
            search.validate()?;
        }
        Ok(())
    }
}
