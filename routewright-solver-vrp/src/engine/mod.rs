//! `VrpEngine` and its model.

use std::time::Duration;

use routewright_core::engine::{
    CallbackIndex, EngineDimension, EngineError, ModelRecord, RouteAssignment, RoutingEngine,
    RoutingModel, SearchParameters, TransitFn, UnaryTransitFn,
};
use routewright_core::IndexManager;

use crate::vrp::{SearchLimits, search};

/// Configuration for [`VrpEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VrpEngineConfig {
    /// Upper bound on `vrp-core` generations when the search parameters set
    /// no iteration limit.
    pub max_generations: usize,
    /// Wall-clock budget when the search parameters set no time limit.
    pub max_time: Option<Duration>,
}

impl Default for VrpEngineConfig {
    fn default() -> Self {
        Self {
            max_generations: 50,
            max_time: None,
        }
    }
}

impl VrpEngineConfig {
    /// Budget of one search: explicit parameters win over the configuration.
    pub(crate) fn limits(&self, parameters: &SearchParameters) -> SearchLimits {
        let max_generations = parameters.iteration_limit.map_or(self.max_generations, |limit| {
            usize::try_from(limit).unwrap_or(usize::MAX)
        });
        let max_seconds = parameters.time_limit.or(self.max_time).map(whole_seconds);
        SearchLimits {
            max_generations,
            max_seconds,
        }
    }
}

/// `vrp-core` accepts whole seconds only; partial seconds round up.
fn whole_seconds(limit: Duration) -> usize {
    let seconds = limit
        .as_secs()
        .saturating_add(u64::from(limit.subsec_nanos() > 0));
    usize::try_from(seconds).unwrap_or(usize::MAX)
}

/// Engine running the `vrp-core` metaheuristics.
///
/// # Examples
/// ```
/// use routewright_core::Context;
/// use routewright_solver_vrp::{VrpEngine, VrpEngineConfig};
///
/// let engine = VrpEngine::with_config(VrpEngineConfig {
///     max_generations: 10,
///     ..VrpEngineConfig::default()
/// });
/// let context = Context::with_depot(engine, 5, 2, 0).expect("depot in range");
/// assert_eq!(context.manager().expect("live context").index_count(), 8);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VrpEngine {
    config: VrpEngineConfig,
}

impl VrpEngine {
    /// Construct an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct an engine with explicit configuration.
    #[must_use]
    pub const fn with_config(config: VrpEngineConfig) -> Self {
        Self { config }
    }

    /// Configuration applied to every model this engine creates.
    #[must_use]
    pub const fn config(&self) -> &VrpEngineConfig {
        &self.config
    }
}

impl RoutingEngine for VrpEngine {
    type Model = VrpModel;

    fn create_model(&self, manager: &IndexManager) -> Result<Self::Model, EngineError> {
        Ok(VrpModel {
            record: ModelRecord::new(manager.clone()),
            config: self.config.clone(),
        })
    }
}

/// Model built by [`VrpEngine`].
#[derive(Debug)]
pub struct VrpModel {
    record: ModelRecord,
    config: VrpEngineConfig,
}

impl VrpModel {
    /// Everything registered so far.
    #[must_use]
    pub const fn record(&self) -> &ModelRecord {
        &self.record
    }
}

impl RoutingModel for VrpModel {
    type Solution = RouteAssignment;

    fn register_transit_callback(&mut self, callback: TransitFn) -> CallbackIndex {
        self.record.register_binary(callback, false)
    }

    fn register_positive_transit_callback(&mut self, callback: TransitFn) -> CallbackIndex {
        self.record.register_binary(callback, true)
    }

    fn register_unary_transit_callback(&mut self, callback: UnaryTransitFn) -> CallbackIndex {
        self.record.register_unary(callback, false)
    }

    fn register_positive_unary_transit_callback(
        &mut self,
        callback: UnaryTransitFn,
    ) -> CallbackIndex {
        self.record.register_unary(callback, true)
    }

    fn add_dimension(&mut self, dimension: EngineDimension) -> Result<(), EngineError> {
        self.record.add_dimension(dimension)
    }

    fn set_arc_cost_evaluator(&mut self, callback: CallbackIndex) -> Result<(), EngineError> {
        self.record.set_arc_cost_evaluator(callback)
    }

    fn set_global_span_cost_coefficient(
        &mut self,
        dimension: &str,
        coefficient: i64,
    ) -> Result<(), EngineError> {
        self.record
            .set_global_span_cost_coefficient(dimension, coefficient)
    }

    fn add_pickup_and_delivery(&mut self, pickup: i64, delivery: i64) -> Result<(), EngineError> {
        self.record.add_pickup_and_delivery(pickup, delivery)
    }

    fn add_disjunction(&mut self, indices: &[i64], penalty: i64) -> Result<(), EngineError> {
        self.record.add_disjunction(indices, penalty)
    }

    fn solve(
        &mut self,
        parameters: &SearchParameters,
    ) -> Result<Option<Self::Solution>, EngineError> {
        parameters.validate()?;
        let limits = self.config.limits(parameters);
        if parameters.log_search {
            log::info!(
                "vrp search over {} indices, {} generations, time limit {:?}s",
                self.record.manager().index_count(),
                limits.max_generations,
                limits.max_seconds
            );
        }
        log::debug!(
            "vrp search ignores first solution strategy {:?} and metaheuristic {:?}",
            parameters.first_solution_strategy,
            parameters.local_search_metaheuristic
        );
        let routes = search(&self.record, &limits)?;
        RouteAssignment::from_routes(&self.record, &routes).map(Some)
    }
}
