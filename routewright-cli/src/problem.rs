//! JSON problem description and the report written after a solve.
//!
//! A [`ProblemFile`] is a distance matrix plus fleet description. It becomes a
//! `Distance` arc-cost dimension, an optional `Load` dimension fed by
//! per-node demands, and visitor-registered pickup/delivery pairs and
//! optional stops.

use routewright_core::dimension::{Dimension, DimensionCapacity};
use routewright_core::{
    Context, ContextError, DimensionError, Endpoint, ProblemDefinition, RoutingEngine,
    SearchParameters, SolveOutcome, UnsolvedReason,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dimension carrying the distance matrix; it is also the arc cost.
pub(crate) const DISTANCE: &str = "Distance";
/// Dimension carrying per-node demands.
pub(crate) const LOAD: &str = "Load";

/// A routing problem as read from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ProblemFile {
    /// Square matrix of non-negative distances between nodes.
    pub(crate) distance_matrix: Vec<Vec<i64>>,
    /// Fleet size.
    pub(crate) vehicles: usize,
    /// Shared start and end node; node 0 when neither this nor `endpoints`
    /// is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) depot: Option<usize>,
    /// Per-vehicle start and end nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) endpoints: Option<Vec<Endpoint>>,
    /// Amount loaded at each node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) demands: Option<Vec<i64>>,
    /// Load each vehicle can carry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) vehicle_capacities: Option<Vec<i64>>,
    /// Longest distance a single route may cover.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) max_route_distance: Option<i64>,
    /// Cost per unit of the longest route's distance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) span_cost_coefficient: Option<i64>,
    /// Nodes that must be served by the same vehicle, pickup first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) pickups_and_deliveries: Vec<PickupDelivery>,
    /// Nodes the solver may skip for a penalty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) optional_stops: Vec<OptionalStop>,
    /// Search parameters overriding the command's budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) search: Option<SearchParameters>,
}

/// A pickup node and the node its load is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct PickupDelivery {
    pub(crate) pickup: usize,
    pub(crate) delivery: usize,
}

/// A node that may be left unserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct OptionalStop {
    pub(crate) node: usize,
    pub(crate) penalty: i64,
}

/// Reasons a decoded problem cannot be modelled.
#[derive(Debug, Error)]
pub enum ProblemError {
    /// The distance matrix has no rows.
    #[error("distance matrix is empty")]
    EmptyMatrix,
    /// A matrix row has the wrong length.
    #[error("distance matrix row {row} has {found} entries, expected {expected}")]
    MatrixNotSquare {
        /// Offending row.
        row: usize,
        /// Entries found.
        found: usize,
        /// Number of rows.
        expected: usize,
    },
    /// A matrix entry is negative.
    #[error("distance from {from} to {to} is negative ({value})")]
    NegativeDistance {
        /// Row of the entry.
        from: usize,
        /// Column of the entry.
        to: usize,
        /// The entry.
        value: i64,
    },
    /// A scalar setting is negative.
    #[error("{field} must not be negative ({value})")]
    NegativeSetting {
        /// Setting name.
        field: &'static str,
        /// Rejected value.
        value: i64,
    },
    /// Both a shared depot and per-vehicle endpoints were given.
    #[error("depot and endpoints are mutually exclusive")]
    ConflictingEndpoints,
    /// `demands` does not list one value per node.
    #[error("expected {expected} demands, found {found}")]
    DemandCount {
        /// Node count.
        expected: usize,
        /// Demands given.
        found: usize,
    },
    /// `vehicle_capacities` does not list one value per vehicle.
    #[error("expected {expected} vehicle capacities, found {found}")]
    CapacityCount {
        /// Fleet size.
        expected: usize,
        /// Capacities given.
        found: usize,
    },
    /// Capacities were given for a problem without demands.
    #[error("vehicle capacities need demands")]
    CapacitiesWithoutDemands,
    /// The fleet shape was rejected.
    #[error(transparent)]
    Shape(#[from] ContextError),
}

impl ProblemFile {
    /// Number of nodes, depot included.
    pub(crate) fn node_count(&self) -> usize {
        self.distance_matrix.len()
    }

    /// Check everything that can be checked before building a context.
    pub(crate) fn validate(&self) -> Result<(), ProblemError> {
        self.validate_matrix()?;
        if self.depot.is_some() && self.endpoints.is_some() {
            return Err(ProblemError::ConflictingEndpoints);
        }
        let settings = [
            ("max_route_distance", self.max_route_distance),
            ("span_cost_coefficient", self.span_cost_coefficient),
        ];
        for (field, value) in settings {
            if let Some(value) = value.filter(|value| *value < 0) {
                return Err(ProblemError::NegativeSetting { field, value });
            }
        }
        if let Some(demands) = &self.demands
            && demands.len() != self.node_count()
        {
            return Err(ProblemError::DemandCount {
                expected: self.node_count(),
                found: demands.len(),
            });
        }
        if let Some(capacities) = &self.vehicle_capacities {
            if self.demands.is_none() {
                return Err(ProblemError::CapacitiesWithoutDemands);
            }
            if capacities.len() != self.vehicles {
                return Err(ProblemError::CapacityCount {
                    expected: self.vehicles,
                    found: capacities.len(),
                });
            }
        }
        Ok(())
    }

    fn validate_matrix(&self) -> Result<(), ProblemError> {
        let expected = self.node_count();
        if expected == 0 {
            return Err(ProblemError::EmptyMatrix);
        }
        for (row, distances) in self.distance_matrix.iter().enumerate() {
            if distances.len() != expected {
                return Err(ProblemError::MatrixNotSquare {
                    row,
                    found: distances.len(),
                    expected,
                });
            }
            if let Some((to, &value)) = distances.iter().enumerate().find(|(_, value)| **value < 0)
            {
                return Err(ProblemError::NegativeDistance {
                    from: row,
                    to,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Bind the fleet shape to `engine`.
    pub(crate) fn context<E: RoutingEngine>(&self, engine: E) -> Result<Context<E>, ProblemError> {
        let context = match &self.endpoints {
            Some(endpoints) => Context::with_endpoints(
                engine,
                self.node_count(),
                self.vehicles,
                endpoints.clone(),
            )?,
            None => Context::with_depot(
                engine,
                self.node_count(),
                self.vehicles,
                self.depot.unwrap_or(0),
            )?,
        };
        Ok(context)
    }

    /// Split into the dimension hooks and the stop placements.
    pub(crate) fn into_parts(self) -> (FileProblem, Placements) {
        let route_limit = match (self.max_route_distance, self.span_cost_coefficient) {
            (Some(limit), _) => Some(limit),
            (None, Some(coefficient)) if coefficient > 0 => Some(
                self.distance_matrix
                    .iter()
                    .flatten()
                    .fold(0_i64, |total, distance| total.saturating_add(*distance)),
            ),
            _ => None,
        };
        let definition = FileProblem {
            matrix: self.distance_matrix,
            route_limit,
            span_cost_coefficient: self.span_cost_coefficient.unwrap_or(0),
            demands: self.demands,
            capacities: self.vehicle_capacities,
            search: self.search,
        };
        let placements = Placements {
            pairs: self.pickups_and_deliveries,
            optional: self.optional_stops,
        };
        (definition, placements)
    }
}

/// Dimension hooks derived from a [`ProblemFile`].
#[derive(Debug, Clone)]
pub(crate) struct FileProblem {
    matrix: Vec<Vec<i64>>,
    route_limit: Option<i64>,
    span_cost_coefficient: i64,
    demands: Option<Vec<i64>>,
    capacities: Option<Vec<i64>>,
    search: Option<SearchParameters>,
}

impl FileProblem {
    /// Whether a `Load` dimension is attached.
    pub(crate) const fn tracks_load(&self) -> bool {
        self.demands.is_some()
    }
}

impl<E: RoutingEngine> ProblemDefinition<E> for FileProblem {
    fn add_dimensions(&mut self, context: &mut Context<E>) -> Result<(), DimensionError> {
        let mut distance = Dimension::builder(DISTANCE)
            .matrix(self.matrix.clone())
            .non_negative()
            .arc_cost();
        if let Some(limit) = self.route_limit {
            distance = distance
                .capacity(DimensionCapacity::uniform(limit))
                .coefficient(self.span_cost_coefficient);
        }
        distance.attach(context)?;

        if let Some(demands) = &self.demands {
            // Without explicit capacities a vehicle can carry everything.
            let capacity = match &self.capacities {
                Some(capacities) => DimensionCapacity::per_vehicle(capacities.clone()),
                None => DimensionCapacity::uniform(
                    demands
                        .iter()
                        .filter(|demand| **demand > 0)
                        .fold(0_i64, |total, demand| total.saturating_add(*demand)),
                ),
            };
            let mut load = Dimension::builder(LOAD).per_node(demands.clone());
            if demands.iter().all(|demand| *demand >= 0) {
                load = load.non_negative();
            }
            load.capacity(capacity).attach(context)?;
        }
        Ok(())
    }

    fn configure_search(&self, parameters: SearchParameters) -> SearchParameters {
        self.search.clone().unwrap_or(parameters)
    }
}

/// Pairs and optional stops, registered by a visitor before dimensions.
#[derive(Debug, Clone, Default)]
pub(crate) struct Placements {
    pairs: Vec<PickupDelivery>,
    optional: Vec<OptionalStop>,
}

impl Placements {
    pub(crate) fn apply<E: RoutingEngine>(
        &self,
        context: &mut Context<E>,
    ) -> Result<(), ContextError> {
        for pair in &self.pairs {
            context.add_pickup_and_delivery(pair.pickup, pair.delivery)?;
        }
        for stop in &self.optional {
            context.add_disjunction(&[stop.node], stop.penalty)?;
        }
        Ok(())
    }
}

/// What the `solve` command prints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum SolveReport {
    /// Routes were found and walked.
    Solved {
        objective: i64,
        vehicles_used: usize,
        total_distance: i64,
        routes: Vec<RouteReport>,
    },
    /// The engine produced no routes.
    Unsolved { reason: String },
}

/// One vehicle's route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct RouteReport {
    pub(crate) vehicle: usize,
    /// Nodes in visiting order, start and end included.
    pub(crate) nodes: Vec<usize>,
    pub(crate) distance: i64,
    /// Load on board when the route ends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) load: Option<i64>,
}

impl SolveReport {
    /// Assemble a report from a finished run and its observers' records.
    pub(crate) fn from_walk(
        outcome: &SolveOutcome,
        paths: Vec<Vec<usize>>,
        distances: &[i64],
        loads: Option<&[Option<i64>]>,
    ) -> Self {
        let summary = match outcome {
            SolveOutcome::Solved(summary) => summary,
            SolveOutcome::Unsolved(UnsolvedReason::NoAssignment) => {
                return Self::Unsolved {
                    reason: "the engine found no assignment".to_owned(),
                };
            }
            SolveOutcome::Unsolved(UnsolvedReason::Engine(error)) => {
                return Self::Unsolved {
                    reason: error.to_string(),
                };
            }
        };
        let routes: Vec<RouteReport> = paths
            .into_iter()
            .enumerate()
            .map(|(vehicle, nodes)| RouteReport {
                vehicle,
                nodes,
                distance: distances.get(vehicle).copied().unwrap_or(0),
                load: loads.and_then(|loads| loads.get(vehicle).copied().flatten()),
            })
            .collect();
        Self::Solved {
            objective: summary.objective,
            vehicles_used: summary.vehicles_used,
            total_distance: routes.iter().map(|route| route.distance).sum(),
            routes,
        }
    }
}
