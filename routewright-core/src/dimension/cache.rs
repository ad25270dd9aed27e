//! Memoised pairwise weights.

use std::cell::RefCell;
use std::collections::HashMap;

use geo::Coord;

/// Identity under which a node's weights are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightKey {
    /// Keyed by node id.
    Node(usize),
    /// Keyed by coordinate bits, so co-located nodes share weights.
    Location {
        /// Bits of the x coordinate.
        x: u64,
        /// Bits of the y coordinate.
        y: u64,
    },
}

impl From<Coord<f64>> for WeightKey {
    fn from(coord: Coord<f64>) -> Self {
        Self::Location {
            x: coord.x.to_bits(),
            y: coord.y.to_bits(),
        }
    }
}

/// Lazily filled weight lookup owned by one dimension.
///
/// Entries are never evicted; the cache lives as long as its dimension.
///
/// # Examples
/// ```
/// use routewright_core::dimension::WeightCache;
///
/// let cache = WeightCache::by_node();
/// assert_eq!(cache.weight_or_insert_with(0, 1, || 7), 7);
/// assert_eq!(cache.weight_or_insert_with(0, 1, || 99), 7);
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct WeightCache {
    locations: Option<Vec<Coord<f64>>>,
    weights: RefCell<HashMap<(WeightKey, WeightKey), i64>>,
}

impl WeightCache {
    /// Cache keyed by node id.
    #[must_use]
    pub fn by_node() -> Self {
        Self::default()
    }

    /// Cache keyed by `locations[node]`; nodes without a location fall back
    /// to their id.
    #[must_use]
    pub fn by_location(locations: Vec<Coord<f64>>) -> Self {
        Self {
            locations: Some(locations),
            weights: RefCell::default(),
        }
    }

    /// Whether weights are keyed by coordinates.
    #[must_use]
    pub const fn is_location_keyed(&self) -> bool {
        self.locations.is_some()
    }

    /// Key used for `node`.
    #[must_use]
    pub fn key(&self, node: usize) -> WeightKey {
        self.locations
            .as_ref()
            .and_then(|locations| locations.get(node))
            .map_or(WeightKey::Node(node), |&coord| WeightKey::from(coord))
    }

    /// Cached weight of `from -> to`, computing and storing it on a miss.
    pub fn weight_or_insert_with(&self, from: usize, to: usize, compute: impl FnOnce() -> i64) -> i64 {
        let key = (self.key(from), self.key(to));
        if let Some(&weight) = self.weights.borrow().get(&key) {
            return weight;
        }
        let weight = compute();
        self.weights.borrow_mut().insert(key, weight);
        weight
    }

    /// Number of cached pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.borrow().len()
    }

    /// Whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.borrow().is_empty()
    }
}
