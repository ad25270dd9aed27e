//! Named numeric tracks registered with the engine as transit callbacks.
//!
//! A dimension always registers a constant zero callback first and, unless
//! told otherwise, its evaluation callback second. Evaluators work on domain
//! node ids; the registered callbacks translate engine indices first and
//! answer the boundary default for indices outside the index space.
//!
//! # Examples
//! ```
//! use routewright_core::Context;
//! use routewright_core::dimension::{Dimension, DimensionCapacity};
//! use routewright_core::test_support::ScriptedEngine;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut context = Context::with_depot(ScriptedEngine::default(), 3, 1, 0)?;
//! let distance = Dimension::builder("Distance")
//!     .binary(|from: usize, to: usize| from.abs_diff(to) as i64)
//!     .non_negative()
//!     .capacity(DimensionCapacity::uniform(100))
//!     .arc_cost()
//!     .attach(&mut context)?;
//! assert_eq!(distance.callback_indices().len(), 2);
//! assert_eq!(distance.transit(0, 2), 2);
//! # Ok(())
//! # }
//! ```

mod cache;

use std::fmt;
use std::rc::Rc;

use geo::Coord;
use thiserror::Error;

use crate::context::{Context, ContextError};
use crate::engine::{
    CallbackIndex, EngineDimension, EngineError, RoutingEngine, RoutingModel, VehicleCapacity,
};
use crate::index::IndexManager;

pub use cache::{WeightCache, WeightKey};

/// Arity of a dimension's evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitShape {
    /// Evaluated on `(from, to)`.
    Binary,
    /// Evaluated on `from` only.
    Unary,
}

/// Sign declared for a dimension's callbacks.
///
/// `NonNegative` only selects the engine's positive entrypoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TransitSign {
    /// Values may be negative.
    #[default]
    Signed,
    /// Values are never negative.
    NonNegative,
}

/// Engine accumulator settings for a dimension.
///
/// `slack` and `fix_start_cumul_to_zero` are handed to the engine as they
/// are. [`RouteAssignment`](crate::engine::RouteAssignment) checks and reports
/// the least cumuls a route admits: every route starts at zero and consumes no
/// slack, so neither setting changes the values a walk observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionCapacity {
    /// Maximum idle amount absorbed at a stop.
    pub slack: i64,
    /// Upper bound of the accumulated value.
    pub capacity: VehicleCapacity,
    /// Pin the accumulator to zero at each route start.
    pub fix_start_cumul_to_zero: bool,
}

impl DimensionCapacity {
    /// One capacity shared by every vehicle, no slack, starting at zero.
    #[must_use]
    pub const fn uniform(capacity: i64) -> Self {
        Self {
            slack: 0,
            capacity: VehicleCapacity::Uniform(capacity),
            fix_start_cumul_to_zero: true,
        }
    }

    /// One capacity per vehicle, no slack, starting at zero.
    #[must_use]
    pub const fn per_vehicle(capacities: Vec<i64>) -> Self {
        Self {
            slack: 0,
            capacity: VehicleCapacity::PerVehicle(capacities),
            fix_start_cumul_to_zero: true,
        }
    }

    /// Set the slack.
    #[must_use]
    pub const fn with_slack(mut self, slack: i64) -> Self {
        self.slack = slack;
        self
    }

    /// Let the accumulator start anywhere within its bounds.
    #[must_use]
    pub const fn with_free_start(mut self) -> Self {
        self.fix_start_cumul_to_zero = false;
        self
    }
}

/// Errors raised while attaching a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionError {
    /// A dimension with this name is already attached.
    #[error("dimension {name} is already attached")]
    DuplicateName {
        /// Rejected name.
        name: String,
    },
    /// The context no longer accepts dimensions.
    #[error("dimension {name} cannot be attached: registration is closed")]
    RegistrationClosed {
        /// Rejected name.
        name: String,
    },
    /// The settings can never be registered; nothing was registered.
    #[error("dimension {name} is invalid: {reason}")]
    Invalid {
        /// Rejected name.
        name: String,
        /// What is wrong with the settings.
        reason: String,
    },
    /// The context refused engine access.
    #[error(transparent)]
    Context(#[from] ContextError),
    /// The engine rejected a registration.
    #[error("engine rejected dimension: {0}")]
    Engine(#[from] EngineError),
}

#[derive(Clone)]
enum Evaluator {
    Binary(Rc<dyn Fn(usize, usize) -> i64>),
    Unary(Rc<dyn Fn(usize) -> i64>),
}

impl Evaluator {
    const fn shape(&self) -> TransitShape {
        match self {
            Self::Binary(_) => TransitShape::Binary,
            Self::Unary(_) => TransitShape::Unary,
        }
    }
}

// Evaluation shared by a dimension and the callbacks it registers.
#[derive(Clone)]
struct Transit {
    manager: IndexManager,
    evaluator: Option<Evaluator>,
    cache: Rc<WeightCache>,
    boundary_default: i64,
}

impl Transit {
    fn between_nodes(&self, from: usize, to: usize) -> i64 {
        match &self.evaluator {
            Some(Evaluator::Binary(evaluate)) => {
                self.cache.weight_or_insert_with(from, to, || evaluate(from, to))
            }
            Some(Evaluator::Unary(evaluate)) => evaluate(from),
            None => 0,
        }
    }

    fn between_indices(&self, from: i64, to: i64) -> i64 {
        match (self.manager.index_to_node(from), self.manager.index_to_node(to)) {
            (Some(from_node), Some(to_node)) => self.between_nodes(from_node, to_node),
            _ => self.boundary_default,
        }
    }

    fn at_index(&self, index: i64) -> i64 {
        self.manager
            .index_to_node(index)
            .map_or(self.boundary_default, |node| self.between_nodes(node, node))
    }
}

/// Configures and attaches a [`Dimension`].
#[must_use]
pub struct DimensionBuilder {
    name: String,
    evaluator: Option<Evaluator>,
    sign: TransitSign,
    register_evaluation: bool,
    boundary_default: i64,
    capacity: Option<DimensionCapacity>,
    coefficient: i64,
    arc_cost: bool,
    locations: Option<Vec<Coord<f64>>>,
}

impl DimensionBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            evaluator: None,
            sign: TransitSign::Signed,
            register_evaluation: true,
            boundary_default: 0,
            capacity: None,
            coefficient: 0,
            arc_cost: false,
            locations: None,
        }
    }

    /// Evaluate arcs with `evaluate(from_node, to_node)`.
    pub fn binary(mut self, evaluate: impl Fn(usize, usize) -> i64 + 'static) -> Self {
        self.evaluator = Some(Evaluator::Binary(Rc::new(evaluate)));
        self
    }

    /// Evaluate arcs with `evaluate(from_node)`.
    pub fn unary(mut self, evaluate: impl Fn(usize) -> i64 + 'static) -> Self {
        self.evaluator = Some(Evaluator::Unary(Rc::new(evaluate)));
        self
    }

    /// Evaluate arcs by looking them up in a square node matrix. Pairs
    /// outside the matrix weigh zero.
    pub fn matrix(self, matrix: Vec<Vec<i64>>) -> Self {
        self.binary(move |from, to| {
            matrix
                .get(from)
                .and_then(|row| row.get(to))
                .copied()
                .unwrap_or(0)
        })
    }

    /// Evaluate stops by looking them up in a per-node vector. Nodes outside
    /// the vector weigh zero.
    pub fn per_node(self, values: Vec<i64>) -> Self {
        self.unary(move |node| values.get(node).copied().unwrap_or(0))
    }

    /// Register through the engine's non-negative entrypoints.
    pub const fn non_negative(mut self) -> Self {
        self.sign = TransitSign::NonNegative;
        self
    }

    /// Whether to register the evaluation callback next to the zero one.
    pub const fn register_evaluation(mut self, register: bool) -> Self {
        self.register_evaluation = register;
        self
    }

    /// Value answered for indices outside the index space.
    pub const fn boundary_default(mut self, value: i64) -> Self {
        self.boundary_default = value;
        self
    }

    /// Attach an engine accumulator.
    pub fn capacity(mut self, capacity: DimensionCapacity) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Global span cost coefficient of the engine accumulator.
    pub const fn coefficient(mut self, coefficient: i64) -> Self {
        self.coefficient = coefficient;
        self
    }

    /// Use this dimension as the engine's arc cost.
    pub const fn arc_cost(mut self) -> Self {
        self.arc_cost = true;
        self
    }

    /// Key cached weights by `locations[node]` instead of node id.
    pub fn keyed_by_location(mut self, locations: impl IntoIterator<Item = Coord<f64>>) -> Self {
        self.locations = Some(locations.into_iter().collect());
        self
    }

    /// Register the callbacks with `context`'s model and store the dimension.
    pub fn attach<E: RoutingEngine, A>(
        self,
        context: &mut Context<E, A>,
    ) -> Result<&Dimension, DimensionError> {
        if !context.is_registration_open() {
            return Err(DimensionError::RegistrationClosed { name: self.name });
        }
        if context.dimension(&self.name).is_some() {
            return Err(DimensionError::DuplicateName { name: self.name });
        }

        let shape = self
            .evaluator
            .as_ref()
            .map_or(TransitShape::Binary, Evaluator::shape);
        if let Err(reason) = self.check_settings(shape, context.vehicle_count()) {
            return Err(DimensionError::Invalid {
                name: self.name,
                reason,
            });
        }
        let cache = Rc::new(
            self.locations
                .map_or_else(WeightCache::by_node, WeightCache::by_location),
        );
        let transit = Transit {
            manager: context.manager()?.clone(),
            evaluator: self.evaluator,
            cache: Rc::clone(&cache),
            boundary_default: self.boundary_default,
        };
        let non_negative = self.sign == TransitSign::NonNegative;

        let model = context.model_mut()?;
        let zero = if non_negative {
            model.register_positive_transit_callback(Box::new(|_, _| 0))
        } else {
            model.register_transit_callback(Box::new(|_, _| 0))
        };
        let mut callback_indices = vec![zero];
        let evaluation = if self.register_evaluation {
            register_evaluation(model, &transit, non_negative)
        } else {
            None
        };
        callback_indices.extend(evaluation);
        let primary = evaluation.unwrap_or(zero);

        if let Some(capacity) = &self.capacity {
            model.add_dimension(EngineDimension {
                name: self.name.clone(),
                callback: primary,
                slack: capacity.slack,
                capacity: capacity.capacity.clone(),
                fix_start_cumul_to_zero: capacity.fix_start_cumul_to_zero,
            })?;
            if self.coefficient != 0 {
                model.set_global_span_cost_coefficient(&self.name, self.coefficient)?;
            }
        } else if self.coefficient != 0 {
            log::warn!(
                "dimension {} has span coefficient {} but no capacity; coefficient ignored",
                self.name,
                self.coefficient
            );
        }
        if self.arc_cost {
            model.set_arc_cost_evaluator(primary)?;
        }

        log::debug!(
            "attached {shape:?} dimension {} with callbacks {callback_indices:?}",
            self.name
        );
        let name = self.name.clone();
        context
            .dimensions_mut()
            .push(Dimension {
                name: self.name,
                shape,
                sign: self.sign,
                coefficient: self.coefficient,
                capacity: self.capacity,
                arc_cost: self.arc_cost,
                callback_indices,
                transit,
                cache,
            })
            .ok_or_else(|| DimensionError::Invalid {
                name,
                reason: "it was not stored".to_owned(),
            })
    }

    /// Reject settings the engine would refuse, before any callback is
    /// registered.
    fn check_settings(&self, shape: TransitShape, vehicle_count: usize) -> Result<(), String> {
        if self.arc_cost && self.register_evaluation && shape == TransitShape::Unary {
            return Err("a unary evaluator cannot be the arc cost".to_owned());
        }
        let Some(capacity) = &self.capacity else {
            return Ok(());
        };
        if capacity.slack < 0 {
            return Err(format!("negative slack {}", capacity.slack));
        }
        if self.coefficient < 0 {
            return Err(format!("negative span cost coefficient {}", self.coefficient));
        }
        for vehicle in 0..vehicle_count {
            match capacity.capacity.for_vehicle(vehicle) {
                Some(bound) if bound >= 0 => {}
                Some(bound) => {
                    return Err(format!("negative capacity {bound} for vehicle {vehicle}"));
                }
                None => return Err(format!("no capacity for vehicle {vehicle}")),
            }
        }
        Ok(())
    }
}

fn register_evaluation<M: RoutingModel>(
    model: &mut M,
    transit: &Transit,
    non_negative: bool,
) -> Option<CallbackIndex> {
    let evaluator = transit.evaluator.as_ref()?;
    let registered = match (evaluator.shape(), non_negative) {
        (TransitShape::Binary, false) => {
            let transit = transit.clone();
            model.register_transit_callback(Box::new(move |from, to| {
                transit.between_indices(from, to)
            }))
        }
        (TransitShape::Binary, true) => {
            let transit = transit.clone();
            model.register_positive_transit_callback(Box::new(move |from, to| {
                transit.between_indices(from, to)
            }))
        }
        (TransitShape::Unary, false) => {
            let transit = transit.clone();
            model.register_unary_transit_callback(Box::new(move |index| transit.at_index(index)))
        }
        (TransitShape::Unary, true) => {
            let transit = transit.clone();
            model.register_positive_unary_transit_callback(Box::new(move |index| {
                transit.at_index(index)
            }))
        }
    };
    Some(registered)
}

/// A dimension attached to a context.
pub struct Dimension {
    name: String,
    shape: TransitShape,
    sign: TransitSign,
    coefficient: i64,
    capacity: Option<DimensionCapacity>,
    arc_cost: bool,
    callback_indices: Vec<CallbackIndex>,
    transit: Transit,
    cache: Rc<WeightCache>,
}

impl fmt::Debug for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dimension")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("sign", &self.sign)
            .field("coefficient", &self.coefficient)
            .field("capacity", &self.capacity)
            .field("arc_cost", &self.arc_cost)
            .field("callback_indices", &self.callback_indices)
            .finish_non_exhaustive()
    }
}

impl Dimension {
    /// Start configuring a dimension called `name`.
    pub fn builder(name: impl Into<String>) -> DimensionBuilder {
        DimensionBuilder::new(name.into())
    }

    /// Unique name within the context.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arity of the evaluator.
    #[must_use]
    pub const fn shape(&self) -> TransitShape {
        self.shape
    }

    /// Declared sign.
    #[must_use]
    pub const fn sign(&self) -> TransitSign {
        self.sign
    }

    /// Global span cost coefficient.
    #[must_use]
    pub const fn coefficient(&self) -> i64 {
        self.coefficient
    }

    /// Engine accumulator settings, if any.
    #[must_use]
    pub const fn capacity(&self) -> Option<&DimensionCapacity> {
        self.capacity.as_ref()
    }

    /// Whether this dimension is the engine's arc cost.
    #[must_use]
    pub const fn is_arc_cost(&self) -> bool {
        self.arc_cost
    }

    /// Every callback index registered, zero callback first.
    #[must_use]
    pub fn callback_indices(&self) -> &[CallbackIndex] {
        &self.callback_indices
    }

    /// Index of the zero callback.
    #[must_use]
    pub fn zero_callback(&self) -> Option<CallbackIndex> {
        self.callback_indices.first().copied()
    }

    /// Index of the evaluation callback, when registered.
    #[must_use]
    pub fn evaluation_callback(&self) -> Option<CallbackIndex> {
        self.callback_indices.get(1).copied()
    }

    /// Transit of the arc `from_node -> to_node`; unary dimensions read
    /// `from_node` only. Dimensions without an evaluator weigh zero.
    #[must_use]
    pub fn transit(&self, from_node: usize, to_node: usize) -> i64 {
        self.transit.between_nodes(from_node, to_node)
    }

    /// Transit of the arc `from -> to` in engine indices, as the engine sees it.
    #[must_use]
    pub fn transit_between_indices(&self, from: i64, to: i64) -> i64 {
        match self.shape {
            TransitShape::Binary => self.transit.between_indices(from, to),
            TransitShape::Unary => self.transit.at_index(from),
        }
    }

    /// Number of memoised node pairs.
    #[must_use]
    pub fn cached_weights(&self) -> usize {
        self.cache.len()
    }
}

/// Dimensions attached to a context, in attachment order.
#[derive(Debug, Default)]
pub struct Dimensions {
    items: Vec<Dimension>,
}

impl Dimensions {
    /// Look up a dimension by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Dimension> {
        self.items.iter().find(|dimension| dimension.name == name)
    }

    /// Dimensions with the given transit shape.
    pub fn with_shape(&self, shape: TransitShape) -> impl Iterator<Item = &Dimension> + '_ {
        self.items
            .iter()
            .filter(move |dimension| dimension.shape == shape)
    }

    /// Names in attachment order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(Dimension::name)
    }

    /// Iterate in attachment order.
    pub fn iter(&self) -> std::slice::Iter<'_, Dimension> {
        self.items.iter()
    }

    /// Number of attached dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn push(&mut self, dimension: Dimension) -> Option<&Dimension> {
        self.items.push(dimension);
        self.items.last()
    }
}

impl<'a> IntoIterator for &'a Dimensions {
    type Item = &'a Dimension;
    type IntoIter = std::slice::Iter<'a, Dimension>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
