//! Search parameters handed to [`RoutingModel::solve`](super::RoutingModel::solve).

use std::time::Duration;

use super::EngineError;

/// Heuristic used to build the first solution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FirstSolutionStrategy {
    /// Let the engine decide.
    Automatic,
    /// Extend each route with its cheapest outgoing arc.
    #[default]
    PathCheapestArc,
    /// Clarke-Wright savings.
    Savings,
    /// Angular sweep around the depot.
    Sweep,
    /// Christofides tour construction.
    Christofides,
    /// Insert the cheapest stop across all routes at once.
    ParallelCheapestInsertion,
    /// Connect the globally cheapest arcs first.
    GlobalCheapestArc,
}

/// Improvement strategy applied after the first solution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LocalSearchMetaheuristic {
    /// Let the engine decide.
    #[default]
    Automatic,
    /// Accept improving moves only.
    GreedyDescent,
    /// Penalise features of local optima.
    GuidedLocalSearch,
    /// Accept worsening moves with decreasing probability.
    SimulatedAnnealing,
    /// Forbid recently reversed moves.
    TabuSearch,
}

/// Knobs for a single search.
///
/// Engines map what they understand and ignore the rest; limits are honoured
/// by every engine in this workspace.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use routewright_core::engine::SearchParameters;
///
/// let parameters = SearchParameters::default().with_time_limit(Duration::from_secs(1));
/// assert_eq!(parameters.time_limit, Some(Duration::from_secs(1)));
/// assert!(parameters.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchParameters {
    /// First-solution heuristic.
    pub first_solution_strategy: FirstSolutionStrategy,
    /// Improvement metaheuristic.
    pub local_search_metaheuristic: LocalSearchMetaheuristic,
    /// Wall-clock budget for the search.
    pub time_limit: Option<Duration>,
    /// Iteration (generation) budget for the search.
    pub iteration_limit: Option<u64>,
    /// Ask the engine to log its progress.
    pub log_search: bool,
}

impl SearchParameters {
    /// Set the wall-clock budget.
    #[must_use]
    pub const fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Set the iteration budget.
    #[must_use]
    pub const fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    /// Set the first-solution heuristic.
    #[must_use]
    pub const fn with_first_solution_strategy(mut self, strategy: FirstSolutionStrategy) -> Self {
        self.first_solution_strategy = strategy;
        self
    }

    /// Set the improvement metaheuristic.
    #[must_use]
    pub const fn with_metaheuristic(mut self, metaheuristic: LocalSearchMetaheuristic) -> Self {
        self.local_search_metaheuristic = metaheuristic;
        self
    }

    /// Reject budgets that would stop the search before it starts.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.time_limit.is_some_and(|limit| limit.is_zero()) {
            return Err(EngineError::InvalidParameters(
                "time limit must be greater than zero".to_owned(),
            ));
        }
        if self.iteration_limit == Some(0) {
            return Err(EngineError::InvalidParameters(
                "iteration limit must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}
