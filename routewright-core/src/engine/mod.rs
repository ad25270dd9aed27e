//! Boundary to the external route-optimisation engine.
//!
//! The search itself is opaque. Engines receive an [`IndexManager`], accept
//! transit callbacks expressed in index space, and return an [`Assignment`]
//! describing each vehicle's successor chain. [`ModelRecord`] and
//! [`RouteAssignment`] carry the bookkeeping every engine adapter needs, so an
//! adapter only has to translate the recorded model into its own search.

mod parameters;
mod record;
mod table;

use std::fmt;

use thiserror::Error;

use crate::index::IndexManager;

pub use parameters::{FirstSolutionStrategy, LocalSearchMetaheuristic, SearchParameters};
pub use record::{Disjunction, ModelRecord, TransitKind};
pub use table::RouteAssignment;

/// Pairwise transit callback over engine indices.
pub type TransitFn = Box<dyn Fn(i64, i64) -> i64>;

/// Single-index transit callback over engine indices.
pub type UnaryTransitFn = Box<dyn Fn(i64) -> i64>;

/// Opaque handle returned when a callback is registered with a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackIndex(usize);

impl CallbackIndex {
    /// Wrap a raw registration slot.
    #[must_use]
    pub const fn new(slot: usize) -> Self {
        Self(slot)
    }

    /// The raw registration slot.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for CallbackIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Upper bound of a dimension's cumulative variable.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum VehicleCapacity {
    /// Every vehicle shares one capacity.
    Uniform(i64),
    /// One capacity per vehicle, in vehicle order.
    PerVehicle(Vec<i64>),
}

impl VehicleCapacity {
    /// Capacity applying to `vehicle`.
    #[must_use]
    pub fn for_vehicle(&self, vehicle: usize) -> Option<i64> {
        match self {
            Self::Uniform(capacity) => Some(*capacity),
            Self::PerVehicle(capacities) => capacities.get(vehicle).copied(),
        }
    }
}

/// An accumulator the engine maintains along every route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineDimension {
    /// Name used to look up cumulative variables.
    pub name: String,
    /// Transit callback feeding the accumulator.
    pub callback: CallbackIndex,
    /// Maximum idle amount absorbed at a stop.
    pub slack: i64,
    /// Per-vehicle upper bound on the accumulated value.
    pub capacity: VehicleCapacity,
    /// Pin the accumulator to zero at each route start.
    pub fix_start_cumul_to_zero: bool,
}

/// Bounds of a decision variable in a committed assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableBounds {
    /// Lower bound.
    pub min: i64,
    /// Upper bound.
    pub max: i64,
}

impl VariableBounds {
    /// Bounds of a variable bound to a single value.
    #[must_use]
    pub const fn fixed(value: i64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// The bound value, when both bounds agree.
    #[must_use]
    pub const fn value(&self) -> Option<i64> {
        if self.min == self.max {
            Some(self.min)
        } else {
            None
        }
    }
}

/// Errors reported by an engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The model admits no assignment.
    #[error("no feasible assignment exists for the model")]
    Infeasible,
    /// The search ran out of time or iterations before finding an assignment.
    #[error("search limit reached before an assignment was found")]
    LimitReached,
    /// Search parameters were rejected.
    #[error("invalid search parameters: {0}")]
    InvalidParameters(String),
    /// The registered model is inconsistent.
    #[error("invalid model: {0}")]
    InvalidModel(String),
    /// The engine cannot express part of the model.
    #[error("{0} is not supported by this engine")]
    Unsupported(String),
    /// Any other engine failure.
    #[error("engine failure: {0}")]
    Internal(String),
}

impl EngineError {
    /// Whether the error means "no solution" rather than a broken setup.
    #[must_use]
    pub const fn is_infeasibility(&self) -> bool {
        matches!(self, Self::Infeasible | Self::LimitReached)
    }
}

/// Factory for engine models.
pub trait RoutingEngine {
    /// Model type produced by this engine.
    type Model: RoutingModel;

    /// Create a model over the given index space.
    fn create_model(&self, manager: &IndexManager) -> Result<Self::Model, EngineError>;
}

/// A model under construction, then solved once.
pub trait RoutingModel {
    /// Committed solution type.
    type Solution: Assignment;

    /// Register a pairwise callback that may return negative values.
    fn register_transit_callback(&mut self, callback: TransitFn) -> CallbackIndex;

    /// Register a pairwise callback that never returns negative values.
    fn register_positive_transit_callback(&mut self, callback: TransitFn) -> CallbackIndex;

    /// Register a single-index callback that may return negative values.
    fn register_unary_transit_callback(&mut self, callback: UnaryTransitFn) -> CallbackIndex;

    /// Register a single-index callback that never returns negative values.
    fn register_positive_unary_transit_callback(
        &mut self,
        callback: UnaryTransitFn,
    ) -> CallbackIndex;

    /// Attach an accumulator dimension.
    fn add_dimension(&mut self, dimension: EngineDimension) -> Result<(), EngineError>;

    /// Use `callback` as the arc cost of every vehicle.
    fn set_arc_cost_evaluator(&mut self, callback: CallbackIndex) -> Result<(), EngineError>;

    /// Charge `coefficient` times the spread of route end cumuls of `dimension`.
    fn set_global_span_cost_coefficient(
        &mut self,
        dimension: &str,
        coefficient: i64,
    ) -> Result<(), EngineError>;

    /// Require `pickup` and `delivery` on the same route, pickup first.
    fn add_pickup_and_delivery(&mut self, pickup: i64, delivery: i64) -> Result<(), EngineError>;

    /// Allow `indices` to stay unvisited at `penalty` each.
    fn add_disjunction(&mut self, indices: &[i64], penalty: i64) -> Result<(), EngineError>;

    /// Run the search. `Ok(None)` means the engine found nothing.
    fn solve(&mut self, parameters: &SearchParameters)
    -> Result<Option<Self::Solution>, EngineError>;
}

/// A committed solution: a successor chain per vehicle.
pub trait Assignment {
    /// Successor of `index`; unvisited indices point at themselves.
    fn next(&self, index: i64) -> Option<i64>;

    /// Vehicle serving `index`, if visited.
    fn vehicle(&self, index: i64) -> Option<usize>;

    /// Cumulative value of `dimension` at `index`.
    fn cumul(&self, dimension: &str, index: i64) -> Option<VariableBounds>;

    /// Objective value of the assignment.
    fn objective(&self) -> i64;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(EngineError::Infeasible, true)]
    #[case(EngineError::LimitReached, true)]
    #[case(EngineError::InvalidParameters("zero time limit".into()), false)]
    #[case(EngineError::InvalidModel("unknown callback".into()), false)]
    #[case(EngineError::Unsupported("span costs".into()), false)]
    #[case(EngineError::Internal("boom".into()), false)]
    fn only_search_outcomes_count_as_infeasibility(
        #[case] error: EngineError,
        #[case] expected: bool,
    ) {
        assert_eq!(error.is_infeasibility(), expected);
    }

    #[rstest]
    fn per_vehicle_capacity_is_looked_up_by_vehicle() {
        let capacity = VehicleCapacity::PerVehicle(vec![15, 20]);
        assert_eq!(capacity.for_vehicle(1), Some(20));
        assert_eq!(capacity.for_vehicle(2), None);
        assert_eq!(VehicleCapacity::Uniform(3).for_vehicle(7), Some(3));
    }

    #[rstest]
    fn bounds_expose_a_value_only_when_fixed() {
        assert_eq!(VariableBounds::fixed(4).value(), Some(4));
        assert_eq!(VariableBounds { min: 1, max: 4 }.value(), None);
    }
}
