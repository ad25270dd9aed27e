//! Problem shape: node and vehicle counts plus per-vehicle endpoints.
//!
//! Every way of describing where vehicles start and finish is normalised into
//! a single `Vec<Endpoint>` and validated before any engine handle exists.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

/// A vehicle's start and end node.
///
/// # Examples
/// ```
/// use routewright_core::Endpoint;
///
/// let endpoint = Endpoint::new(0, 3);
/// assert_eq!(endpoint.start, 0);
/// assert_eq!(endpoint.end, 3);
/// assert!(!endpoint.is_round_trip());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Endpoint {
    /// Node the vehicle leaves from.
    pub start: usize,
    /// Node the vehicle finishes at.
    pub end: usize,
}

impl Endpoint {
    /// Construct an endpoint pair.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Construct a pair that starts and ends at `depot`.
    #[must_use]
    pub const fn depot(depot: usize) -> Self {
        Self::new(depot, depot)
    }

    /// Whether the vehicle returns to where it started.
    #[must_use]
    pub const fn is_round_trip(&self) -> bool {
        self.start == self.end
    }
}

impl From<(usize, usize)> for Endpoint {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

/// Which half of an [`Endpoint`] a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointCoordinate {
    /// The start node.
    Start,
    /// The end node.
    End,
}

impl fmt::Display for EndpointCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::End => f.write_str("end"),
        }
    }
}

/// Errors raised while building a [`RoutingShape`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The depot does not address a node.
    #[error("depot {depot} is out of range: expected a node in [0, {node_count})")]
    DepotOutOfRange {
        /// Offending depot node.
        depot: usize,
        /// Exclusive upper bound.
        node_count: usize,
    },
    /// An endpoint coordinate does not address a node.
    #[error(
        "{coordinate} node {node} of vehicle {vehicle} is out of range: expected a node in [0, {node_count})"
    )]
    EndpointOutOfRange {
        /// Which coordinate was rejected.
        coordinate: EndpointCoordinate,
        /// Vehicle owning the endpoint.
        vehicle: usize,
        /// Offending node.
        node: usize,
        /// Exclusive upper bound.
        node_count: usize,
    },
    /// A per-vehicle collection does not have one entry per vehicle.
    #[error("expected {expected} {collection} (one per vehicle), found {actual}")]
    CountMismatch {
        /// Name of the collection, e.g. `"starts"`.
        collection: &'static str,
        /// Vehicle count.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },
}

/// The capability every context builds on.
///
/// Index managers and engines only need counts and endpoints; richer domain
/// data travels separately as the context's adjunct value.
pub trait ProblemShape {
    /// Number of domain nodes.
    fn node_count(&self) -> usize;

    /// Number of vehicles.
    fn vehicle_count(&self) -> usize;

    /// One endpoint per vehicle, in vehicle order.
    fn endpoints(&self) -> &[Endpoint];

    /// The shared depot, when the shape was built from one.
    fn depot(&self) -> Option<usize> {
        None
    }
}

/// Validated node/vehicle configuration.
///
/// # Examples
/// ```
/// use routewright_core::{Endpoint, ProblemShape, RoutingShape};
///
/// # fn main() -> Result<(), routewright_core::ConfigurationError> {
/// let shape = RoutingShape::with_depot(5, 2, 0)?;
/// assert_eq!(shape.endpoints(), &[Endpoint::depot(0), Endpoint::depot(0)]);
/// assert_eq!(shape.depot(), Some(0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingShape {
    node_count: usize,
    vehicle_count: usize,
    depot: Option<usize>,
    endpoints: Vec<Endpoint>,
}

impl RoutingShape {
    /// Every vehicle starts and ends at `depot`.
    pub fn with_depot(
        node_count: usize,
        vehicle_count: usize,
        depot: usize,
    ) -> Result<Self, ConfigurationError> {
        if depot >= node_count {
            return Err(ConfigurationError::DepotOutOfRange { depot, node_count });
        }
        Ok(Self {
            node_count,
            vehicle_count,
            depot: Some(depot),
            endpoints: vec![Endpoint::depot(depot); vehicle_count],
        })
    }

    /// Vehicle `v` starts at `starts[v]` and ends at `ends[v]`.
    pub fn with_starts_and_ends(
        node_count: usize,
        vehicle_count: usize,
        starts: &[usize],
        ends: &[usize],
    ) -> Result<Self, ConfigurationError> {
        require_count("starts", vehicle_count, starts.len())?;
        require_count("ends", vehicle_count, ends.len())?;
        let endpoints = starts
            .iter()
            .zip(ends)
            .map(|(&start, &end)| Endpoint::new(start, end))
            .collect();
        Self::with_endpoints(node_count, vehicle_count, endpoints)
    }

    /// Explicit endpoints, one per vehicle.
    pub fn with_endpoints(
        node_count: usize,
        vehicle_count: usize,
        endpoints: Vec<Endpoint>,
    ) -> Result<Self, ConfigurationError> {
        require_count("endpoints", vehicle_count, endpoints.len())?;
        for (vehicle, endpoint) in endpoints.iter().enumerate() {
            check_coordinate(EndpointCoordinate::Start, vehicle, endpoint.start, node_count)?;
            check_coordinate(EndpointCoordinate::End, vehicle, endpoint.end, node_count)?;
        }
        Ok(Self {
            node_count,
            vehicle_count,
            depot: None,
            endpoints,
        })
    }

    /// Endpoint of a single vehicle.
    #[must_use]
    pub fn endpoint(&self, vehicle: usize) -> Option<Endpoint> {
        self.endpoints.get(vehicle).copied()
    }

    /// Distinct nodes used as a start or end by any vehicle.
    #[must_use]
    pub fn depot_nodes(&self) -> BTreeSet<usize> {
        self.endpoints
            .iter()
            .flat_map(|endpoint| [endpoint.start, endpoint.end])
            .collect()
    }

    /// Whether `node` starts or ends some vehicle's route.
    #[must_use]
    pub fn is_terminal(&self, node: usize) -> bool {
        self.endpoints
            .iter()
            .any(|endpoint| endpoint.start == node || endpoint.end == node)
    }
}

impl ProblemShape for RoutingShape {
    fn node_count(&self) -> usize {
        self.node_count
    }

    fn vehicle_count(&self) -> usize {
        self.vehicle_count
    }

    fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    fn depot(&self) -> Option<usize> {
        self.depot
    }
}

const fn require_count(
    collection: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ConfigurationError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ConfigurationError::CountMismatch {
            collection,
            expected,
            actual,
        })
    }
}

const fn check_coordinate(
    coordinate: EndpointCoordinate,
    vehicle: usize,
    node: usize,
    node_count: usize,
) -> Result<(), ConfigurationError> {
    if node < node_count {
        Ok(())
    } else {
        Err(ConfigurationError::EndpointOutOfRange {
            coordinate,
            vehicle,
            node,
            node_count,
        })
    }
}
