//! Translation between domain nodes and engine indices.
//!
//! The layout follows the OR-Tools routing index manager: every node that
//! starts a route or never ends one is indexed in node order; each extra
//! vehicle sharing an already indexed start receives a fresh index; finally
//! every vehicle receives its own end index. Start and end slots translate
//! back to ordinary nodes.

use std::collections::HashSet;
use std::sync::Arc;

use crate::shape::ProblemShape;

#[derive(Debug)]
struct IndexLayout {
    node_count: usize,
    vehicle_count: usize,
    index_to_node: Vec<usize>,
    node_to_index: Vec<Option<i64>>,
    vehicle_starts: Vec<i64>,
    vehicle_ends: Vec<i64>,
}

/// Shared, immutable node/index translation table.
///
/// Cloning is cheap; dimension callbacks hold their own clone so they can
/// translate indices without borrowing the context.
///
/// # Examples
/// ```
/// use routewright_core::{IndexManager, RoutingShape};
///
/// # fn main() -> Result<(), routewright_core::ConfigurationError> {
/// let shape = RoutingShape::with_depot(2, 1, 0)?;
/// let manager = IndexManager::new(&shape);
/// assert_eq!(manager.index_count(), 3);
/// assert_eq!(manager.vehicle_end_index(0), Some(2));
/// assert_eq!(manager.index_to_node(2), Some(0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IndexManager {
    layout: Arc<IndexLayout>,
}

impl IndexManager {
    /// Build the translation table for a validated shape.
    #[must_use]
    pub fn new(shape: &impl ProblemShape) -> Self {
        let node_count = shape.node_count();
        let endpoints = shape.endpoints();
        let starts: HashSet<usize> = endpoints.iter().map(|e| e.start).collect();
        let ends: HashSet<usize> = endpoints.iter().map(|e| e.end).collect();

        let mut index_to_node = Vec::with_capacity(node_count + 2 * endpoints.len());
        let mut node_to_index = vec![None; node_count];
        for node in 0..node_count {
            if starts.contains(&node) || !ends.contains(&node) {
                if let Some(slot) = node_to_index.get_mut(node) {
                    *slot = Some(to_index(index_to_node.len()));
                }
                index_to_node.push(node);
            }
        }

        let mut seen_starts = HashSet::new();
        let mut vehicle_starts = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            let shared = node_to_index.get(endpoint.start).copied().flatten();
            match shared {
                Some(index) if seen_starts.insert(endpoint.start) => vehicle_starts.push(index),
                _ => {
                    vehicle_starts.push(to_index(index_to_node.len()));
                    index_to_node.push(endpoint.start);
                }
            }
        }

        let mut vehicle_ends = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            vehicle_ends.push(to_index(index_to_node.len()));
            index_to_node.push(endpoint.end);
        }

        log::debug!(
            "index manager built: {node_count} nodes, {} vehicles, {} indices",
            endpoints.len(),
            index_to_node.len()
        );

        Self {
            layout: Arc::new(IndexLayout {
                node_count,
                vehicle_count: shape.vehicle_count(),
                index_to_node,
                node_to_index,
                vehicle_starts,
                vehicle_ends,
            }),
        }
    }

    /// Number of domain nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.layout.node_count
    }

    /// Number of vehicles.
    #[must_use]
    pub fn vehicle_count(&self) -> usize {
        self.layout.vehicle_count
    }

    /// Size of the index space, start and end slots included.
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.layout.index_to_node.len()
    }

    /// Index of `node`, or `None` when the node is out of range or only ever
    /// used as a route end.
    #[must_use]
    pub fn node_to_index(&self, node: usize) -> Option<i64> {
        self.layout.node_to_index.get(node).copied().flatten()
    }

    /// Node addressed by `index`, or `None` outside the index space.
    #[must_use]
    pub fn index_to_node(&self, index: i64) -> Option<usize> {
        usize::try_from(index)
            .ok()
            .and_then(|position| self.layout.index_to_node.get(position))
            .copied()
    }

    /// Translate several nodes at once; `None` if any fails to translate.
    #[must_use]
    pub fn nodes_to_indices(&self, nodes: &[usize]) -> Option<Vec<i64>> {
        nodes.iter().map(|&node| self.node_to_index(node)).collect()
    }

    /// Start index of `vehicle`.
    #[must_use]
    pub fn vehicle_start_index(&self, vehicle: usize) -> Option<i64> {
        self.layout.vehicle_starts.get(vehicle).copied()
    }

    /// End index of `vehicle`.
    #[must_use]
    pub fn vehicle_end_index(&self, vehicle: usize) -> Option<i64> {
        self.layout.vehicle_ends.get(vehicle).copied()
    }

    /// Whether `index` is some vehicle's start slot.
    #[must_use]
    pub fn is_start(&self, index: i64) -> bool {
        self.layout.vehicle_starts.contains(&index)
    }

    /// Whether `index` is some vehicle's end slot.
    #[must_use]
    pub fn is_end(&self, index: i64) -> bool {
        self.layout.vehicle_ends.contains(&index)
    }

    /// Indices that are neither a start nor an end slot: the stops an engine
    /// has to place on routes.
    pub fn visit_indices(&self) -> impl Iterator<Item = i64> + '_ {
        (0..self.index_count())
            .map(to_index)
            .filter(|&index| !self.is_start(index) && !self.is_end(index))
    }
}

// Index spaces are bounded by allocatable vectors; saturate rather than wrap.
fn to_index(position: usize) -> i64 {
    i64::try_from(position).unwrap_or(i64::MAX)
}
