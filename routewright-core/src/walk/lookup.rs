//! Named access to assignment variables.

use crate::engine::{Assignment, VariableBounds};

/// A decision variable observers can read at an index.
///
/// # Examples
/// ```
/// use routewright_core::walk::VariableLookup;
///
/// let load = VariableLookup::cumul("Capacity");
/// assert_eq!(load, VariableLookup::Cumul("Capacity".to_owned()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariableLookup {
    /// Cumulative value of the named dimension.
    Cumul(String),
    /// Vehicle serving the index.
    Vehicle,
    /// Successor of the index.
    Next,
}

impl VariableLookup {
    /// Cumulative value of `dimension`.
    pub fn cumul(dimension: impl Into<String>) -> Self {
        Self::Cumul(dimension.into())
    }

    /// Resolve the variable at `index`.
    #[must_use]
    pub fn resolve(&self, assignment: &dyn Assignment, index: i64) -> Option<VariableBounds> {
        match self {
            Self::Cumul(dimension) => assignment.cumul(dimension, index),
            Self::Vehicle => assignment
                .vehicle(index)
                .and_then(|vehicle| i64::try_from(vehicle).ok())
                .map(VariableBounds::fixed),
            Self::Next => assignment.next(index).map(VariableBounds::fixed),
        }
    }
}
