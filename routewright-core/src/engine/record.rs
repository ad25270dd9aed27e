//! Engine-side bookkeeping of everything registered on a model.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::{CallbackIndex, EngineDimension, EngineError, TransitFn, UnaryTransitFn};
use crate::index::IndexManager;

/// Arity of a registered callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitKind {
    /// Evaluated on an arc `(from, to)`.
    Binary,
    /// Evaluated on the arc's origin only.
    Unary,
}

enum RegisteredCallback {
    Binary(TransitFn),
    Unary(UnaryTransitFn),
}

struct Registration {
    callback: RegisteredCallback,
    non_negative: bool,
}

/// Indices that may stay unvisited at a cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disjunction {
    /// Optional indices.
    pub indices: Vec<i64>,
    /// Objective penalty per unvisited index.
    pub penalty: i64,
}

/// Model state shared by engine adapters.
///
/// Validates registrations against the index space so adapters only deal
/// with consistent models.
pub struct ModelRecord {
    manager: IndexManager,
    callbacks: Vec<Registration>,
    dimensions: Vec<EngineDimension>,
    arc_cost: Option<CallbackIndex>,
    span_costs: BTreeMap<String, i64>,
    pickups_and_deliveries: Vec<(i64, i64)>,
    disjunctions: Vec<Disjunction>,
}

impl fmt::Debug for ModelRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRecord")
            .field("index_count", &self.manager.index_count())
            .field("callbacks", &self.callbacks.len())
            .field("dimensions", &self.dimensions)
            .field("arc_cost", &self.arc_cost)
            .field("span_costs", &self.span_costs)
            .field("pickups_and_deliveries", &self.pickups_and_deliveries)
            .field("disjunctions", &self.disjunctions)
            .finish()
    }
}

impl ModelRecord {
    /// Start an empty record over `manager`'s index space.
    #[must_use]
    pub fn new(manager: IndexManager) -> Self {
        Self {
            manager,
            callbacks: Vec::new(),
            dimensions: Vec::new(),
            arc_cost: None,
            span_costs: BTreeMap::new(),
            pickups_and_deliveries: Vec::new(),
            disjunctions: Vec::new(),
        }
    }

    /// Index space the model was created over.
    #[must_use]
    pub const fn manager(&self) -> &IndexManager {
        &self.manager
    }

    /// Store a pairwise callback.
    pub fn register_binary(&mut self, callback: TransitFn, non_negative: bool) -> CallbackIndex {
        self.push(RegisteredCallback::Binary(callback), non_negative)
    }

    /// Store a single-index callback.
    pub fn register_unary(
        &mut self,
        callback: UnaryTransitFn,
        non_negative: bool,
    ) -> CallbackIndex {
        self.push(RegisteredCallback::Unary(callback), non_negative)
    }

    fn push(&mut self, callback: RegisteredCallback, non_negative: bool) -> CallbackIndex {
        let index = CallbackIndex::new(self.callbacks.len());
        self.callbacks.push(Registration {
            callback,
            non_negative,
        });
        log::debug!("registered transit callback {index}");
        index
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Arity of a registered callback.
    #[must_use]
    pub fn kind(&self, callback: CallbackIndex) -> Option<TransitKind> {
        self.callbacks
            .get(callback.get())
            .map(|registration| match registration.callback {
                RegisteredCallback::Binary(_) => TransitKind::Binary,
                RegisteredCallback::Unary(_) => TransitKind::Unary,
            })
    }

    /// Whether the callback was registered through a positive entrypoint.
    #[must_use]
    pub fn is_non_negative(&self, callback: CallbackIndex) -> Option<bool> {
        self.callbacks
            .get(callback.get())
            .map(|registration| registration.non_negative)
    }

    /// Evaluate a callback on the arc `from -> to`. Unary callbacks read
    /// `from` only.
    pub fn transit(&self, callback: CallbackIndex, from: i64, to: i64) -> Result<i64, EngineError> {
        let registration = self.registration(callback)?;
        let value = match &registration.callback {
            RegisteredCallback::Binary(evaluate) => evaluate(from, to),
            RegisteredCallback::Unary(evaluate) => evaluate(from),
        };
        if registration.non_negative && value < 0 {
            return Err(EngineError::InvalidModel(format!(
                "callback {callback} was registered as non-negative but returned {value} on {from} -> {to}"
            )));
        }
        Ok(value)
    }

    fn registration(&self, callback: CallbackIndex) -> Result<&Registration, EngineError> {
        self.callbacks
            .get(callback.get())
            .ok_or_else(|| EngineError::InvalidModel(format!("unknown callback {callback}")))
    }

    /// Record an accumulator dimension.
    pub fn add_dimension(&mut self, dimension: EngineDimension) -> Result<(), EngineError> {
        self.registration(dimension.callback)?;
        if self.dimension(&dimension.name).is_some() {
            return Err(EngineError::InvalidModel(format!(
                "dimension {} is already registered",
                dimension.name
            )));
        }
        if dimension.slack < 0 {
            return Err(EngineError::InvalidModel(format!(
                "dimension {} has negative slack {}",
                dimension.name, dimension.slack
            )));
        }
        let vehicle_count = self.manager.vehicle_count();
        for vehicle in 0..vehicle_count {
            match dimension.capacity.for_vehicle(vehicle) {
                Some(capacity) if capacity >= 0 => {}
                Some(capacity) => {
                    return Err(EngineError::InvalidModel(format!(
                        "dimension {} has negative capacity {capacity} for vehicle {vehicle}",
                        dimension.name
                    )));
                }
                None => {
                    return Err(EngineError::InvalidModel(format!(
                        "dimension {} has no capacity for vehicle {vehicle} of {vehicle_count}",
                        dimension.name
                    )));
                }
            }
        }
        log::debug!(
            "added dimension {} over callback {}",
            dimension.name,
            dimension.callback
        );
        self.dimensions.push(dimension);
        Ok(())
    }

    /// Recorded dimensions, in registration order.
    #[must_use]
    pub fn dimensions(&self) -> &[EngineDimension] {
        &self.dimensions
    }

    /// Look up a dimension by name.
    #[must_use]
    pub fn dimension(&self, name: &str) -> Option<&EngineDimension> {
        self.dimensions.iter().find(|dimension| dimension.name == name)
    }

    /// Use a pairwise callback as the arc cost.
    pub fn set_arc_cost_evaluator(&mut self, callback: CallbackIndex) -> Result<(), EngineError> {
        match self.kind(callback) {
            Some(TransitKind::Binary) => {
                self.arc_cost = Some(callback);
                Ok(())
            }
            Some(TransitKind::Unary) => Err(EngineError::InvalidModel(format!(
                "arc cost callback {callback} must be pairwise"
            ))),
            None => Err(EngineError::InvalidModel(format!(
                "unknown callback {callback}"
            ))),
        }
    }

    /// Callback used as the arc cost, if any.
    #[must_use]
    pub const fn arc_cost(&self) -> Option<CallbackIndex> {
        self.arc_cost
    }

    /// Arc cost of `from -> to`; zero when no evaluator is set.
    pub fn arc_cost_between(&self, from: i64, to: i64) -> Result<i64, EngineError> {
        self.arc_cost
            .map_or(Ok(0), |callback| self.transit(callback, from, to))
    }

    /// Record a global span cost coefficient for an existing dimension.
    pub fn set_global_span_cost_coefficient(
        &mut self,
        dimension: &str,
        coefficient: i64,
    ) -> Result<(), EngineError> {
        if self.dimension(dimension).is_none() {
            return Err(EngineError::InvalidModel(format!(
                "span cost set on unknown dimension {dimension}"
            )));
        }
        if coefficient < 0 {
            return Err(EngineError::InvalidModel(format!(
                "span cost coefficient of {dimension} must not be negative, got {coefficient}"
            )));
        }
        self.span_costs.insert(dimension.to_owned(), coefficient);
        Ok(())
    }

    /// Span cost coefficient of `dimension`; zero when unset.
    #[must_use]
    pub fn span_cost_coefficient(&self, dimension: &str) -> i64 {
        self.span_costs.get(dimension).copied().unwrap_or(0)
    }

    /// Every non-zero span cost coefficient, by dimension name.
    pub fn span_costs(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.span_costs
            .iter()
            .filter(|(_, coefficient)| **coefficient > 0)
            .map(|(name, coefficient)| (name.as_str(), *coefficient))
    }

    /// Record a pickup-and-delivery pair.
    pub fn add_pickup_and_delivery(&mut self, pickup: i64, delivery: i64) -> Result<(), EngineError> {
        self.require_visit(pickup)?;
        self.require_visit(delivery)?;
        if pickup == delivery {
            return Err(EngineError::InvalidModel(format!(
                "index {pickup} cannot be both pickup and delivery"
            )));
        }
        let paired: HashSet<i64> = self
            .pickups_and_deliveries
            .iter()
            .flat_map(|&(p, d)| [p, d])
            .collect();
        if let Some(index) = [pickup, delivery].into_iter().find(|i| paired.contains(i)) {
            return Err(EngineError::InvalidModel(format!(
                "index {index} already belongs to a pickup-and-delivery pair"
            )));
        }
        self.pickups_and_deliveries.push((pickup, delivery));
        Ok(())
    }

    /// Recorded pickup-and-delivery pairs.
    #[must_use]
    pub fn pickups_and_deliveries(&self) -> &[(i64, i64)] {
        &self.pickups_and_deliveries
    }

    /// Record a disjunction.
    pub fn add_disjunction(&mut self, indices: &[i64], penalty: i64) -> Result<(), EngineError> {
        if indices.is_empty() {
            return Err(EngineError::InvalidModel(
                "disjunction must name at least one index".to_owned(),
            ));
        }
        if penalty < 0 {
            return Err(EngineError::InvalidModel(format!(
                "disjunction penalty must not be negative, got {penalty}"
            )));
        }
        for &index in indices {
            self.require_visit(index)?;
            if self.is_optional(index) {
                return Err(EngineError::InvalidModel(format!(
                    "index {index} already belongs to a disjunction"
                )));
            }
        }
        self.disjunctions.push(Disjunction {
            indices: indices.to_vec(),
            penalty,
        });
        Ok(())
    }

    /// Recorded disjunctions.
    #[must_use]
    pub fn disjunctions(&self) -> &[Disjunction] {
        &self.disjunctions
    }

    /// Penalty for leaving `index` unvisited, if it is optional.
    #[must_use]
    pub fn penalty(&self, index: i64) -> Option<i64> {
        self.disjunctions
            .iter()
            .find(|disjunction| disjunction.indices.contains(&index))
            .map(|disjunction| disjunction.penalty)
    }

    /// Whether `index` may stay unvisited.
    #[must_use]
    pub fn is_optional(&self, index: i64) -> bool {
        self.penalty(index).is_some()
    }

    fn require_visit(&self, index: i64) -> Result<(), EngineError> {
        let in_space = self.manager.index_to_node(index).is_some();
        if in_space && !self.manager.is_start(index) && !self.manager.is_end(index) {
            Ok(())
        } else {
            Err(EngineError::InvalidModel(format!(
                "index {index} is not a visit index"
            )))
        }
    }
}
