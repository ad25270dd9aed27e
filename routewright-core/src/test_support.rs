//! Deterministic, in-memory engine used by unit, behaviour and doc tests.
//!
//! [`ScriptedEngine`] does not search: it replays per-vehicle node plans
//! through [`RouteAssignment`], so capacity, coverage and precedence are still
//! checked against the registered model.
//!
//! Compiled for this crate's tests and behind the `test-support` feature.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::engine::{
    Assignment, CallbackIndex, EngineDimension, EngineError, ModelRecord, RouteAssignment,
    RoutingEngine, RoutingModel, SearchParameters, TransitFn, UnaryTransitFn, VariableBounds,
};
use crate::index::IndexManager;

/// Symmetric 13-city distance matrix; the tour
/// `[0, 7, 2, 3, 4, 12, 6, 8, 1, 11, 10, 5, 9, 0]` costs 7293.
pub const TSP_13: [[i64; 13]; 13] = [
    [0, 2451, 713, 1018, 1631, 1374, 2408, 213, 2571, 875, 1420, 2145, 1972],
    [2451, 0, 1745, 1524, 831, 1240, 959, 2596, 403, 1589, 1374, 357, 579],
    [713, 1745, 0, 355, 920, 803, 1737, 851, 1858, 262, 940, 1453, 1260],
    [1018, 1524, 355, 0, 700, 862, 1395, 1123, 1584, 466, 1056, 1280, 987],
    [1631, 831, 920, 700, 0, 663, 1021, 1769, 949, 796, 879, 586, 371],
    [1374, 1240, 803, 862, 663, 0, 1681, 1551, 1765, 547, 225, 887, 999],
    [2408, 959, 1737, 1395, 1021, 1681, 0, 2493, 678, 1724, 1891, 1114, 701],
    [213, 2596, 851, 1123, 1769, 1551, 2493, 0, 2699, 1038, 1605, 2300, 2099],
    [2571, 403, 1858, 1584, 949, 1765, 678, 2699, 0, 1744, 1645, 653, 600],
    [875, 1589, 262, 466, 796, 547, 1724, 1038, 1744, 0, 679, 1272, 1162],
    [1420, 1374, 940, 1056, 879, 225, 1891, 1605, 1645, 679, 0, 1017, 1200],
    [2145, 357, 1453, 1280, 586, 887, 1114, 2300, 653, 1272, 1017, 0, 504],
    [1972, 579, 1260, 987, 371, 999, 701, 2099, 600, 1162, 1200, 504, 0],
];

/// Stops of the best known tour over [`TSP_13`], depot left out.
pub const TSP_13_STOPS: [usize; 12] = [7, 2, 3, 4, 12, 6, 8, 1, 11, 10, 5, 9];

/// 17-stop, 4-vehicle distance matrix; [`VRP_17_STOPS`] gives four routes of
/// 1552 each.
pub const VRP_17: [[i64; 17]; 17] = [
    [0, 548, 776, 696, 582, 274, 502, 194, 308, 194, 536, 502, 388, 354, 468, 776, 662],
    [548, 0, 684, 308, 194, 502, 730, 354, 696, 742, 1084, 594, 480, 674, 1016, 868, 1210],
    [776, 684, 0, 992, 878, 502, 274, 810, 468, 742, 400, 1278, 1164, 1130, 788, 1552, 754],
    [696, 308, 992, 0, 114, 650, 878, 502, 844, 890, 1232, 514, 628, 822, 1164, 560, 1358],
    [582, 194, 878, 114, 0, 536, 764, 388, 730, 776, 1118, 400, 514, 708, 1050, 674, 1244],
    [274, 502, 502, 650, 536, 0, 228, 308, 194, 240, 582, 776, 662, 628, 514, 1050, 708],
    [502, 730, 274, 878, 764, 228, 0, 536, 194, 468, 354, 1004, 890, 856, 514, 1278, 480],
    [194, 354, 810, 502, 388, 308, 536, 0, 342, 388, 730, 468, 354, 320, 662, 742, 856],
    [308, 696, 468, 844, 730, 194, 194, 342, 0, 274, 388, 810, 696, 662, 320, 1084, 514],
    [194, 742, 742, 890, 776, 240, 468, 388, 274, 0, 342, 536, 422, 388, 274, 810, 468],
    [536, 1084, 400, 1232, 1118, 582, 354, 730, 388, 342, 0, 878, 764, 730, 388, 1152, 354],
    [502, 594, 1278, 514, 400, 776, 1004, 468, 810, 536, 878, 0, 114, 308, 650, 274, 844],
    [388, 480, 1164, 628, 514, 662, 890, 354, 696, 422, 764, 114, 0, 194, 536, 388, 730],
    [354, 674, 1130, 822, 708, 628, 856, 320, 662, 388, 730, 308, 194, 0, 342, 422, 536],
    [468, 1016, 788, 1164, 1050, 514, 514, 662, 320, 274, 388, 650, 536, 342, 0, 764, 194],
    [776, 868, 1552, 560, 674, 1050, 1278, 742, 1084, 810, 1152, 274, 388, 422, 764, 0, 798],
    [662, 1210, 754, 1358, 1244, 708, 480, 856, 514, 468, 354, 844, 730, 536, 194, 798, 0],
];

/// Per-vehicle stops over [`VRP_17`], depot left out.
pub const VRP_17_STOPS: [[usize; 4]; 4] = [[8, 6, 2, 5], [7, 1, 4, 3], [9, 10, 16, 14], [12, 11, 15, 13]];

/// Copy a fixed-size matrix into nested vectors.
#[must_use]
pub fn matrix<const N: usize>(rows: &[[i64; N]; N]) -> Vec<Vec<i64>> {
    rows.iter().map(|row| row.to_vec()).collect()
}

/// Shared counters observing an engine's handle lifecycle.
#[derive(Debug, Clone, Default)]
pub struct EngineProbe {
    inner: Rc<ProbeCounters>,
}

#[derive(Debug, Default)]
struct ProbeCounters {
    models_created: Cell<usize>,
    models_released: Cell<usize>,
    solves: Cell<usize>,
    solutions_created: Cell<usize>,
    solutions_released: Cell<usize>,
    last_parameters: RefCell<Option<SearchParameters>>,
}

impl EngineProbe {
    /// Models created so far.
    #[must_use]
    pub fn models_created(&self) -> usize {
        self.inner.models_created.get()
    }

    /// Models dropped so far.
    #[must_use]
    pub fn models_released(&self) -> usize {
        self.inner.models_released.get()
    }

    /// Calls to `solve`.
    #[must_use]
    pub fn solves(&self) -> usize {
        self.inner.solves.get()
    }

    /// Solutions handed out.
    #[must_use]
    pub fn solutions_created(&self) -> usize {
        self.inner.solutions_created.get()
    }

    /// Solutions dropped so far.
    #[must_use]
    pub fn solutions_released(&self) -> usize {
        self.inner.solutions_released.get()
    }

    /// Parameters of the most recent `solve`.
    #[must_use]
    pub fn last_parameters(&self) -> Option<SearchParameters> {
        self.inner.last_parameters.borrow().clone()
    }

    fn bump(counter: &Cell<usize>) {
        counter.set(counter.get() + 1);
    }
}

#[derive(Debug, Clone)]
enum Script {
    Routes(Vec<Vec<usize>>),
    NoAssignment,
    Fail(EngineError),
}

/// Engine that replays a fixed plan.
///
/// The default engine answers every solve with no assignment.
#[derive(Debug, Clone)]
pub struct ScriptedEngine {
    script: Script,
    probe: EngineProbe,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::without_solution()
    }
}

impl ScriptedEngine {
    /// Answer with `routes[v]`, the stops of vehicle `v` as domain nodes,
    /// start and end left out.
    #[must_use]
    pub fn solving_with(routes: Vec<Vec<usize>>) -> Self {
        Self::scripted(Script::Routes(routes))
    }

    /// Answer with no assignment.
    #[must_use]
    pub fn without_solution() -> Self {
        Self::scripted(Script::NoAssignment)
    }

    /// Fail every solve with `error`.
    #[must_use]
    pub fn failing_with(error: EngineError) -> Self {
        Self::scripted(Script::Fail(error))
    }

    fn scripted(script: Script) -> Self {
        Self {
            script,
            probe: EngineProbe::default(),
        }
    }

    /// Report lifecycle events to `probe`.
    #[must_use]
    pub fn with_probe(mut self, probe: EngineProbe) -> Self {
        self.probe = probe;
        self
    }

    /// The probe this engine reports to.
    #[must_use]
    pub const fn probe(&self) -> &EngineProbe {
        &self.probe
    }
}

impl RoutingEngine for ScriptedEngine {
    type Model = ScriptedModel;

    fn create_model(&self, manager: &IndexManager) -> Result<Self::Model, EngineError> {
        EngineProbe::bump(&self.probe.inner.models_created);
        Ok(ScriptedModel {
            record: ModelRecord::new(manager.clone()),
            script: self.script.clone(),
            probe: self.probe.clone(),
        })
    }
}

/// Model built by [`ScriptedEngine`].
#[derive(Debug)]
pub struct ScriptedModel {
    record: ModelRecord,
    script: Script,
    probe: EngineProbe,
}

impl ScriptedModel {
    /// Everything registered so far.
    #[must_use]
    pub const fn record(&self) -> &ModelRecord {
        &self.record
    }

    /// Evaluate a registered callback on an arc of engine indices.
    pub fn evaluate(&self, callback: CallbackIndex, from: i64, to: i64) -> Result<i64, EngineError> {
        self.record.transit(callback, from, to)
    }

    fn plan_indices(&self, routes: &[Vec<usize>]) -> Result<Vec<Vec<i64>>, EngineError> {
        let manager = self.record.manager();
        routes
            .iter()
            .map(|route| {
                route
                    .iter()
                    .map(|&node| {
                        manager.node_to_index(node).ok_or_else(|| {
                            EngineError::InvalidModel(format!("scripted node {node} has no index"))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }
}

impl Drop for ScriptedModel {
    fn drop(&mut self) {
        EngineProbe::bump(&self.probe.inner.models_released);
    }
}

impl RoutingModel for ScriptedModel {
    type Solution = ScriptedSolution;

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
        EngineProbe::bump(&self.probe.inner.solves);
        self.probe
            .inner
            .last_parameters
            .replace(Some(parameters.clone()));
        parameters.validate()?;
        match &self.script {
            Script::Routes(routes) => {
                let indices = self.plan_indices(routes)?;
                let inner = RouteAssignment::from_routes(&self.record, &indices)?;
                EngineProbe::bump(&self.probe.inner.solutions_created);
                Ok(Some(ScriptedSolution {
                    inner,
                    probe: self.probe.clone(),
                }))
            }
            Script::NoAssignment => Ok(None),
            Script::Fail(error) => Err(error.clone()),
        }
    }
}

/// Solution handed out by [`ScriptedModel`].
#[derive(Debug)]
pub struct ScriptedSolution {
    inner: RouteAssignment,
    probe: EngineProbe,
}

impl Drop for ScriptedSolution {
    fn drop(&mut self) {
        EngineProbe::bump(&self.probe.inner.solutions_released);
    }
}

impl Assignment for ScriptedSolution {
    fn next(&self, index: i64) -> Option<i64> {
        self.inner.next(index)
    }

    fn vehicle(&self, index: i64) -> Option<usize> {
        self.inner.vehicle(index)
    }

    fn cumul(&self, dimension: &str, index: i64) -> Option<VariableBounds> {
        self.inner.cumul(dimension, index)
    }

    fn objective(&self) -> i64 {
        self.inner.objective()
    }
}
