//! Values produced while walking a solution.

/// One visited stop of a vehicle's route.
///
/// `previous_node` is `None` on a vehicle's first step: there is no arc to
/// charge, which is different from a zero-cost arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssignmentStep {
    /// Vehicle serving the stop.
    pub vehicle: usize,
    /// Domain node of the stop.
    pub node: usize,
    /// Domain node of the preceding stop on the same vehicle.
    pub previous_node: Option<usize>,
    /// Engine index of the stop.
    pub index: i64,
    /// Engine index of the preceding stop on the same vehicle.
    pub previous_index: Option<i64>,
}

impl AssignmentStep {
    /// The arc leading into this stop, as domain nodes.
    #[must_use]
    pub fn arc(&self) -> Option<(usize, usize)> {
        self.previous_node.map(|previous| (previous, self.node))
    }
}

/// Where a vehicle's route ends: its end slot and the last visited stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleTerminal {
    /// Vehicle owning the route.
    pub vehicle: usize,
    /// Domain node of the end slot.
    pub node: usize,
    /// Engine index of the end slot.
    pub index: i64,
    /// Domain node of the last visited stop.
    pub previous_node: Option<usize>,
    /// Engine index of the last visited stop.
    pub previous_index: Option<i64>,
}

impl VehicleTerminal {
    /// The closing arc of the route, as domain nodes.
    #[must_use]
    pub fn arc(&self) -> Option<(usize, usize)> {
        self.previous_node.map(|previous| (previous, self.node))
    }
}

/// Payloads that carry the step they were built from.
///
/// Ready-made observers work on any payload implementing this.
pub trait StepRecord {
    /// The underlying step.
    fn step(&self) -> &AssignmentStep;
}

impl StepRecord for AssignmentStep {
    fn step(&self) -> &Self {
        self
    }
}
