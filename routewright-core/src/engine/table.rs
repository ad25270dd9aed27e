//! A concrete [`Assignment`] built from per-vehicle routes.

use std::collections::HashMap;

use super::{Assignment, EngineError, ModelRecord, VariableBounds};

/// Successor table, vehicle table and dimension cumuls of a solution.
///
/// Engines that produce routes as ordered stop lists hand them to
/// [`RouteAssignment::from_routes`], which checks them against the recorded
/// model and derives every variable the walk can query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteAssignment {
    next: Vec<i64>,
    vehicles: Vec<Option<usize>>,
    cumuls: HashMap<String, Vec<Option<i64>>>,
    objective: i64,
}

impl RouteAssignment {
    /// Build an assignment from `routes[v]`, the visit indices of vehicle
    /// `v` in order with start and end slots left out.
    ///
    /// Unvisited optional indices point at themselves. A required index left
    /// unvisited, an exceeded capacity or a pickup served after its delivery
    /// makes the routes [`EngineError::Infeasible`].
    ///
    /// Cumuls start at zero on every route and add transits without slack,
    /// whatever the dimension's slack or start setting.
    pub fn from_routes(record: &ModelRecord, routes: &[Vec<i64>]) -> Result<Self, EngineError> {
        let manager = record.manager();
        if routes.len() != manager.vehicle_count() {
            return Err(EngineError::InvalidModel(format!(
                "expected {} routes, got {}",
                manager.vehicle_count(),
                routes.len()
            )));
        }

        let index_count = manager.index_count();
        let mut next: Vec<i64> = (0..index_count).map(to_index).collect();
        let mut vehicles = vec![None; index_count];
        let mut positions = vec![None; index_count];
        let mut paths = Vec::with_capacity(routes.len());

        for (vehicle, route) in routes.iter().enumerate() {
            let path = full_path(record, vehicle, route)?;
            for (position, &index) in path.iter().enumerate() {
                let slot = slot(index, index_count)?;
                if vehicles.get(slot).copied().flatten().is_some() {
                    return Err(EngineError::InvalidModel(format!(
                        "index {index} is visited more than once"
                    )));
                }
                if let Some(entry) = vehicles.get_mut(slot) {
                    *entry = Some(vehicle);
                }
                if let Some(entry) = positions.get_mut(slot) {
                    *entry = Some(position);
                }
            }
            for pair in path.windows(2) {
                if let [from, to] = *pair {
                    if let Some(entry) = next.get_mut(slot(from, index_count)?) {
                        *entry = to;
                    }
                }
            }
            paths.push(path);
        }

        let mut penalties = 0_i64;
        for index in manager.visit_indices() {
            if vehicles.get(slot(index, index_count)?).copied().flatten().is_some() {
                continue;
            }
            match record.penalty(index) {
                Some(penalty) => penalties = penalties.saturating_add(penalty),
                None => {
                    log::debug!("required index {index} left unvisited");
                    return Err(EngineError::Infeasible);
                }
            }
        }

        for &(pickup, delivery) in record.pickups_and_deliveries() {
            let pickup_at = (
                vehicles.get(slot(pickup, index_count)?).copied().flatten(),
                positions.get(slot(pickup, index_count)?).copied().flatten(),
            );
            let delivery_at = (
                vehicles.get(slot(delivery, index_count)?).copied().flatten(),
                positions.get(slot(delivery, index_count)?).copied().flatten(),
            );
            let served_in_order = match (pickup_at, delivery_at) {
                ((Some(pv), Some(pp)), (Some(dv), Some(dp))) => pv == dv && pp < dp,
                ((None, _), (None, _)) => true,
                _ => false,
            };
            if !served_in_order {
                log::debug!("pickup {pickup} and delivery {delivery} are not served in order");
                return Err(EngineError::Infeasible);
            }
        }

        let mut cumuls = HashMap::with_capacity(record.dimensions().len());
        let mut span_cost = 0_i64;
        for dimension in record.dimensions() {
            let mut values = vec![None; index_count];
            let mut ends = Vec::with_capacity(paths.len());
            for (vehicle, path) in paths.iter().enumerate() {
                let capacity = dimension.capacity.for_vehicle(vehicle).unwrap_or(i64::MAX);
                let mut cumul = 0_i64;
                if let Some(&first) = path.first() {
                    if let Some(entry) = values.get_mut(slot(first, index_count)?) {
                        *entry = Some(cumul);
                    }
                }
                for pair in path.windows(2) {
                    if let [from, to] = *pair {
                        let transit = record.transit(dimension.callback, from, to)?;
                        cumul = cumul.saturating_add(transit);
                        if cumul > capacity {
                            log::debug!(
                                "dimension {} exceeds capacity {capacity} on vehicle {vehicle}",
                                dimension.name
                            );
                            return Err(EngineError::Infeasible);
                        }
                        if let Some(entry) = values.get_mut(slot(to, index_count)?) {
                            *entry = Some(cumul);
                        }
                    }
                }
                ends.push(cumul);
            }
            let coefficient = record.span_cost_coefficient(&dimension.name);
            if coefficient > 0 {
                let spread = ends.iter().max().copied().unwrap_or(0);
                span_cost = span_cost.saturating_add(coefficient.saturating_mul(spread));
            }
            cumuls.insert(dimension.name.clone(), values);
        }

        let mut arc_cost = 0_i64;
        for path in &paths {
            for pair in path.windows(2) {
                if let [from, to] = *pair {
                    arc_cost = arc_cost.saturating_add(record.arc_cost_between(from, to)?);
                }
            }
        }

        Ok(Self {
            next,
            vehicles,
            cumuls,
            objective: arc_cost.saturating_add(span_cost).saturating_add(penalties),
        })
    }
}

fn full_path(record: &ModelRecord, vehicle: usize, route: &[i64]) -> Result<Vec<i64>, EngineError> {
    let manager = record.manager();
    let missing = || EngineError::Internal(format!("vehicle {vehicle} has no start or end slot"));
    let start = manager.vehicle_start_index(vehicle).ok_or_else(missing)?;
    let end = manager.vehicle_end_index(vehicle).ok_or_else(missing)?;
    let mut path = Vec::with_capacity(route.len() + 2);
    path.push(start);
    for &index in route {
        if manager.index_to_node(index).is_none() || manager.is_start(index) || manager.is_end(index) {
            return Err(EngineError::InvalidModel(format!(
                "route of vehicle {vehicle} contains {index}, which is not a visit index"
            )));
        }
        path.push(index);
    }
    path.push(end);
    Ok(path)
}

fn slot(index: i64, index_count: usize) -> Result<usize, EngineError> {
    usize::try_from(index)
        .ok()
        .filter(|&position| position < index_count)
        .ok_or_else(|| EngineError::InvalidModel(format!("index {index} is outside the index space")))
}

// Index spaces are bounded by allocatable vectors; saturate rather than wrap.
fn to_index(position: usize) -> i64 {
    i64::try_from(position).unwrap_or(i64::MAX)
}

impl Assignment for RouteAssignment {
    fn next(&self, index: i64) -> Option<i64> {
        usize::try_from(index)
            .ok()
            .and_then(|position| self.next.get(position))
            .copied()
    }

    fn vehicle(&self, index: i64) -> Option<usize> {
        usize::try_from(index)
            .ok()
            .and_then(|position| self.vehicles.get(position))
            .copied()
            .flatten()
    }

    fn cumul(&self, dimension: &str, index: i64) -> Option<VariableBounds> {
        let position = usize::try_from(index).ok()?;
        self.cumuls
            .get(dimension)?
            .get(position)
            .copied()
            .flatten()
            .map(VariableBounds::fixed)
    }

    fn objective(&self) -> i64 {
        self.objective
    }
}
