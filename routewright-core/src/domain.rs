//! Domain data carried next to the problem shape.
//!
//! A [`Domain`] holds the caller's node and vehicle values. It derives a
//! [`RoutingShape`] from its own sizes and travels as a context's adjunct, so
//! dimension evaluators and visitors can reach the domain without the shape
//! knowing anything about it.

use geo::Coord;

use crate::shape::{ConfigurationError, Endpoint, RoutingShape};

/// Domain values that sit at a point.
pub trait Locatable {
    /// Where the value sits.
    fn location(&self) -> Coord<f64>;
}

impl Locatable for Coord<f64> {
    fn location(&self) -> Coord<f64> {
        *self
    }
}

/// The caller's nodes and vehicles.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use routewright_core::{Domain, ProblemShape};
///
/// # fn main() -> Result<(), routewright_core::ConfigurationError> {
/// let depot = Coord { x: 0.0, y: 0.0 };
/// let stop = Coord { x: 3.0, y: 4.0 };
/// let domain = Domain::new(vec![depot, stop], vec!["van"]);
/// let shape = domain.shape_with_depot(0)?;
/// assert_eq!(shape.node_count(), 2);
/// assert_eq!(domain.locations(), vec![depot, stop]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Domain<N, V> {
    nodes: Vec<N>,
    vehicles: Vec<V>,
}

impl<N, V> Domain<N, V> {
    /// Wrap nodes and vehicles; node ids and vehicle ids are their positions.
    #[must_use]
    pub const fn new(nodes: Vec<N>, vehicles: Vec<V>) -> Self {
        Self { nodes, vehicles }
    }

    /// Every node, by id.
    #[must_use]
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    /// Every vehicle, by id.
    #[must_use]
    pub fn vehicles(&self) -> &[V] {
        &self.vehicles
    }

    /// Node with id `node`.
    #[must_use]
    pub fn node(&self, node: usize) -> Option<&N> {
        self.nodes.get(node)
    }

    /// Vehicle with id `vehicle`.
    #[must_use]
    pub fn vehicle(&self, vehicle: usize) -> Option<&V> {
        self.vehicles.get(vehicle)
    }

    /// Every vehicle starts and ends at `depot`.
    pub fn shape_with_depot(&self, depot: usize) -> Result<RoutingShape, ConfigurationError> {
        RoutingShape::with_depot(self.nodes.len(), self.vehicles.len(), depot)
    }

    /// Vehicle `v` starts at `starts[v]` and ends at `ends[v]`.
    pub fn shape_with_starts_and_ends(
        &self,
        starts: &[usize],
        ends: &[usize],
    ) -> Result<RoutingShape, ConfigurationError> {
        RoutingShape::with_starts_and_ends(self.nodes.len(), self.vehicles.len(), starts, ends)
    }

    /// Explicit endpoints, one per vehicle.
    pub fn shape_with_endpoints(
        &self,
        endpoints: Vec<Endpoint>,
    ) -> Result<RoutingShape, ConfigurationError> {
        RoutingShape::with_endpoints(self.nodes.len(), self.vehicles.len(), endpoints)
    }
}

impl<N: Locatable, V> Domain<N, V> {
    /// Location of every node, by id.
    #[must_use]
    pub fn locations(&self) -> Vec<Coord<f64>> {
        self.nodes.iter().map(Locatable::location).collect()
    }
}
