//! Ready-made walk observers.
//!
//! Each observer resets itself on `BeforeSolution`, so one instance can be
//! reused across solvers.

use crate::walk::{
    ObserverError, StepRecord, VariableLookup, WalkEvent, WalkEventKind, WalkObserver,
};

/// Collects each vehicle's node path, closing node included.
///
/// # Examples
/// ```
/// use routewright_core::observe::PathCollector;
///
/// let collector = PathCollector::default();
/// assert!(collector.paths().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathCollector {
    paths: Vec<Vec<usize>>,
}

impl PathCollector {
    /// Paths indexed by vehicle.
    #[must_use]
    pub fn paths(&self) -> &[Vec<usize>] {
        &self.paths
    }

    /// Path of one vehicle.
    #[must_use]
    pub fn path(&self, vehicle: usize) -> Option<&[usize]> {
        self.paths.get(vehicle).map(Vec::as_slice)
    }

    /// Take the collected paths.
    #[must_use]
    pub fn into_paths(self) -> Vec<Vec<usize>> {
        self.paths
    }
}

impl<P: StepRecord> WalkObserver<P> for PathCollector {
    fn observe(&mut self, event: &WalkEvent<'_, P>) -> Result<(), ObserverError> {
        match &event.kind {
            WalkEventKind::BeforeSolution => {
                self.paths = vec![Vec::new(); event.manager.vehicle_count()];
            }
            WalkEventKind::Node { step } => {
                let step = step.step();
                path_mut(&mut self.paths, step.vehicle)?.push(step.node);
            }
            WalkEventKind::AfterVehicle { terminal, .. } => {
                path_mut(&mut self.paths, terminal.vehicle)?.push(terminal.node);
            }
            WalkEventKind::BeforeVehicle { .. } | WalkEventKind::AfterSolution { .. } => {}
        }
        Ok(())
    }
}

fn path_mut(paths: &mut [Vec<usize>], vehicle: usize) -> Result<&mut Vec<usize>, ObserverError> {
    paths
        .get_mut(vehicle)
        .ok_or_else(|| format!("vehicle {vehicle} was not announced by the walk").into())
}

/// Sums a dimension's transit along every route, closing arc included.
///
/// First steps contribute nothing: there is no arc into a route start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcCostAccumulator {
    dimension: String,
    per_vehicle: Vec<i64>,
}

impl ArcCostAccumulator {
    /// Accumulate the dimension called `dimension`.
    pub fn new(dimension: impl Into<String>) -> Self {
        Self {
            dimension: dimension.into(),
            per_vehicle: Vec::new(),
        }
    }

    /// Route totals indexed by vehicle.
    #[must_use]
    pub fn per_vehicle(&self) -> &[i64] {
        &self.per_vehicle
    }

    /// Sum over every route.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.per_vehicle.iter().sum()
    }

    fn charge<P>(
        &mut self,
        event: &WalkEvent<'_, P>,
        vehicle: usize,
        arc: Option<(usize, usize)>,
    ) -> Result<(), ObserverError> {
        let Some((from, to)) = arc else {
            return Ok(());
        };
        let dimension = event
            .dimensions
            .get(&self.dimension)
            .ok_or_else(|| format!("dimension {} is not attached", self.dimension))?;
        let cost = dimension.transit(from, to);
        let total = self
            .per_vehicle
            .get_mut(vehicle)
            .ok_or_else(|| format!("vehicle {vehicle} was not announced by the walk"))?;
        *total += cost;
        Ok(())
    }
}

impl<P: StepRecord> WalkObserver<P> for ArcCostAccumulator {
    fn observe(&mut self, event: &WalkEvent<'_, P>) -> Result<(), ObserverError> {
        match &event.kind {
            WalkEventKind::BeforeSolution => {
                self.per_vehicle = vec![0; event.manager.vehicle_count()];
                Ok(())
            }
            WalkEventKind::Node { step } => {
                let step = step.step();
                self.charge(event, step.vehicle, step.arc())
            }
            WalkEventKind::AfterVehicle { terminal, .. } => {
                self.charge(event, terminal.vehicle, terminal.arc())
            }
            WalkEventKind::BeforeVehicle { .. } | WalkEventKind::AfterSolution { .. } => Ok(()),
        }
    }
}

/// Cumul of a dimension at one visited stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRecord {
    /// Vehicle serving the stop.
    pub vehicle: usize,
    /// Domain node of the stop.
    pub node: usize,
    /// Lower bound of the cumul, when the engine tracks it.
    pub load: Option<i64>,
}

/// Records a dimension's cumul at every step and at each route end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTracker {
    variable: VariableLookup,
    records: Vec<LoadRecord>,
    route_loads: Vec<Option<i64>>,
}

impl LoadTracker {
    /// Track the cumul of the dimension called `dimension`.
    pub fn new(dimension: impl Into<String>) -> Self {
        Self {
            variable: VariableLookup::cumul(dimension),
            records: Vec::new(),
            route_loads: Vec::new(),
        }
    }

    /// One record per visited stop, in walk order.
    #[must_use]
    pub fn records(&self) -> &[LoadRecord] {
        &self.records
    }

    /// Cumul at each vehicle's end slot, indexed by vehicle.
    #[must_use]
    pub fn route_loads(&self) -> &[Option<i64>] {
        &self.route_loads
    }
}

impl<P: StepRecord> WalkObserver<P> for LoadTracker {
    fn observe(&mut self, event: &WalkEvent<'_, P>) -> Result<(), ObserverError> {
        match &event.kind {
            WalkEventKind::BeforeSolution => {
                self.records.clear();
                self.route_loads = vec![None; event.manager.vehicle_count()];
            }
            WalkEventKind::Node { step } => {
                let step = step.step();
                let load = event.lookup(&self.variable, step.index).map(|bounds| bounds.min);
                self.records.push(LoadRecord {
                    vehicle: step.vehicle,
                    node: step.node,
                    load,
                });
            }
            WalkEventKind::AfterVehicle { terminal, .. } => {
                let load = event
                    .lookup(&self.variable, terminal.index)
                    .map(|bounds| bounds.min);
                if let Some(slot) = self.route_loads.get_mut(terminal.vehicle) {
                    *slot = load;
                }
            }
            WalkEventKind::BeforeVehicle { .. } | WalkEventKind::AfterSolution { .. } => {}
        }
        Ok(())
    }
}
