//! `vrp-core` modelling helpers for `VrpModel`.
//!
//! The recorded model is first evaluated into a [`Plan`]: dense index-space
//! matrices plus plain job and vehicle descriptions. Anything `vrp-core`
//! cannot express is rejected at that point. The plan is then converted into
//! a `vrp-core` problem, solved, and each tour is translated back into the
//! visit indices of the vehicle slot that drove it.
//!
//! Single-index disjunctions become optional jobs. Every job left out of the
//! tours is charged a weight: an optional stop its penalty, anything else a
//! weight no combination of optional penalties reaches. An optional stop is
//! only inserted where its own detour costs no more than its penalty.

use std::collections::HashSet;
use std::sync::Arc;

use routewright_core::engine::{EngineDimension, EngineError, ModelRecord, TransitKind};
use vrp_core::models::common::{Location, Profile};
use vrp_core::models::problem::TravelTime;
use vrp_core::models::solution::Route as VrpRoute;
use vrp_core::prelude::*;

custom_dimension!(VehicleSlot typeof usize);
custom_dimension!(JobPenalty typeof Cost);

/// Budget of a single `vrp-core` search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SearchLimits {
    pub(crate) max_generations: usize,
    pub(crate) max_seconds: Option<usize>,
}

/// Dense distance and duration matrices over the engine index space.
#[derive(Debug)]
pub(crate) struct IndexTransport {
    distances: Vec<Vec<f64>>,
    durations: Vec<Vec<f64>>,
}

impl IndexTransport {
    /// Evaluate the arc cost, and the shift dimension when present, on every
    /// pair of indices.
    fn from_record(
        record: &ModelRecord,
        shift: Option<&EngineDimension>,
    ) -> Result<Self, EngineError> {
        let count = index_bound(record)?;
        let capacity = record.manager().index_count();
        let mut distances = Vec::with_capacity(capacity);
        let mut durations = Vec::with_capacity(capacity);
        for from in 0..count {
            let mut distance_row = Vec::with_capacity(capacity);
            let mut duration_row = Vec::with_capacity(capacity);
            for to in 0..count {
                let distance = record.arc_cost_between(from, to)?;
                let duration = match shift {
                    Some(dimension) => record.transit(dimension.callback, from, to)?,
                    None => distance,
                };
                distance_row.push(to_cost(distance));
                duration_row.push(to_cost(duration));
            }
            distances.push(distance_row);
            durations.push(duration_row);
        }
        Ok(Self {
            distances,
            durations,
        })
    }

    fn lookup(matrix: &[Vec<f64>], from: Location, to: Location) -> f64 {
        let value = matrix.get(from).and_then(|row| row.get(to)).copied();
        debug_assert!(value.is_some(), "matrix lookup failed: from={from}, to={to}");
        value.unwrap_or(0.0)
    }

    fn distance_between(&self, from: Location, to: Location) -> f64 {
        Self::lookup(&self.distances, from, to)
    }

    fn duration_between(&self, from: Location, to: Location) -> f64 {
        Self::lookup(&self.durations, from, to)
    }

    /// Extra distance of visiting `target` between `prev` and `next`.
    #[expect(
        clippy::float_arithmetic,
        reason = "vrp-core distances are floating point"
    )]
    fn detour(&self, prev: Location, target: Location, next: Option<Location>) -> f64 {
        let inbound = self.distance_between(prev, target);
        next.map_or(inbound, |next| {
            inbound + self.distance_between(target, next) - self.distance_between(prev, next)
        })
    }
}

impl TransportCost for IndexTransport {
    fn distance(
        &self,
        _route: &VrpRoute,
        from: Location,
        to: Location,
        _departure: TravelTime,
    ) -> Cost {
        self.distance_between(from, to)
    }

    fn duration(
        &self,
        _route: &VrpRoute,
        from: Location,
        to: Location,
        _departure: TravelTime,
    ) -> f64 {
        self.duration_between(from, to)
    }

    fn distance_approx(&self, _profile: &Profile, from: usize, to: usize) -> f64 {
        self.distance_between(from, to)
    }

    fn duration_approx(&self, _profile: &Profile, from: usize, to: usize) -> f64 {
        self.duration_between(from, to)
    }
}

/// A stop served by a job. Optional stops carry their disjunction penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stop {
    index: i64,
    demand: i32,
    penalty: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum JobPlan {
    Single(Stop),
    PickupDelivery { pickup: Stop, delivery: Stop },
}

#[derive(Debug, Clone, PartialEq)]
struct VehiclePlan {
    slot: usize,
    start: Location,
    end: Location,
    latest_return: Option<f64>,
    capacity: i32,
}

/// Weights charged for jobs left out of the tours.
#[derive(Debug, Clone, Copy, PartialEq)]
struct UnservedWeights {
    /// Weight of a job without a disjunction.
    required: Cost,
    /// Sum of the weights of every job.
    total: Cost,
}

impl UnservedWeights {
    #[expect(
        clippy::float_arithmetic,
        reason = "vrp-core objectives are floating point"
    )]
    fn from_jobs(jobs: &[JobPlan]) -> Self {
        let optional: Cost = jobs
            .iter()
            .filter_map(|job| match job {
                JobPlan::Single(stop) => stop.penalty.map(to_cost),
                JobPlan::PickupDelivery { .. } => None,
            })
            .sum();
        let required = optional + 1.0;
        let total = jobs
            .iter()
            .map(|job| match job {
                JobPlan::Single(Stop {
                    penalty: Some(penalty),
                    ..
                }) => to_cost(*penalty),
                _ => required,
            })
            .sum();
        Self { required, total }
    }

    fn of(&self, job: &Job) -> Cost {
        job.dimens()
            .get_job_penalty()
            .copied()
            .unwrap_or(self.required)
    }
}

/// Objective charging the weight of every job left out of the tours.
struct UnservedPenalty {
    weights: UnservedWeights,
}

impl FeatureObjective for UnservedPenalty {
    #[expect(
        clippy::float_arithmetic,
        reason = "vrp-core objectives are floating point"
    )]
    fn fitness(&self, solution: &InsertionContext) -> Cost {
        let served: Cost = solution
            .solution
            .routes
            .iter()
            .flat_map(|route_ctx| route_ctx.route().tour.jobs())
            .map(|job| self.weights.of(job))
            .sum();
        self.weights.total - served
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "vrp-core objectives are floating point"
    )]
    fn estimate(&self, move_ctx: &MoveContext<'_>) -> Cost {
        match move_ctx {
            MoveContext::Route { job, .. } => -self.weights.of(job),
            MoveContext::Activity { .. } => 0.0,
        }
    }
}

/// Rejects insertion points where an optional stop's detour costs more than
/// leaving it out.
struct DetourGuard {
    transport: Arc<IndexTransport>,
    code: ViolationCode,
}

impl FeatureConstraint for DetourGuard {
    fn evaluate(&self, move_ctx: &MoveContext<'_>) -> Option<ConstraintViolation> {
        match move_ctx {
            MoveContext::Route { .. } => None,
            MoveContext::Activity { activity_ctx, .. } => {
                let penalty = activity_ctx
                    .target
                    .job
                    .as_ref()
                    .and_then(|single| single.dimens.get_job_penalty().copied())?;
                let detour = self.transport.detour(
                    activity_ctx.prev.place.location,
                    activity_ctx.target.place.location,
                    activity_ctx.next.map(|next| next.place.location),
                );
                if detour > penalty {
                    ConstraintViolation::skip(self.code)
                } else {
                    None
                }
            }
        }
    }
}

/// Everything `vrp-core` needs, evaluated from the record.
#[derive(Debug)]
pub(crate) struct Plan {
    transport: Arc<IndexTransport>,
    time_constrained: bool,
    with_capacity: bool,
    jobs: Vec<JobPlan>,
    vehicles: Vec<VehiclePlan>,
    weights: UnservedWeights,
}

impl Plan {
    pub(crate) fn from_record(record: &ModelRecord) -> Result<Self, EngineError> {
        if let Some(disjunction) = record
            .disjunctions()
            .iter()
            .find(|disjunction| disjunction.indices.len() > 1)
        {
            return Err(EngineError::Unsupported(format!(
                "a disjunction over {} indices",
                disjunction.indices.len()
            )));
        }
        for (name, coefficient) in record.span_costs() {
            if coefficient > 0 {
                log::warn!(
                    "span cost coefficient {coefficient} on {name} is charged but not optimised"
                );
            }
        }

        let shift = first_dimension(record, TransitKind::Binary);
        let load = first_dimension(record, TransitKind::Unary);
        for dimension in record.dimensions() {
            let constrained = [shift, load]
                .into_iter()
                .flatten()
                .any(|used| used.name == dimension.name);
            if !constrained {
                log::debug!("dimension {} is only checked after the search", dimension.name);
            }
        }

        let transport = Arc::new(IndexTransport::from_record(record, shift)?);
        let jobs = plan_jobs(record, load)?;
        let vehicles = plan_vehicles(record, shift, load)?;
        let weights = UnservedWeights::from_jobs(&jobs);
        Ok(Self {
            transport,
            time_constrained: shift.is_some(),
            with_capacity: load.is_some(),
            jobs,
            vehicles,
            weights,
        })
    }
}

fn first_dimension(record: &ModelRecord, kind: TransitKind) -> Option<&EngineDimension> {
    record
        .dimensions()
        .iter()
        .find(|dimension| record.kind(dimension.callback) == Some(kind))
}

fn plan_jobs(
    record: &ModelRecord,
    load: Option<&EngineDimension>,
) -> Result<Vec<JobPlan>, EngineError> {
    let stop = |index: i64| -> Result<Stop, EngineError> {
        let demand = match load {
            Some(dimension) => {
                let value = record.transit(dimension.callback, index, index)?;
                i32::try_from(value)
                    .ok()
                    .filter(|demand| *demand >= 0)
                    .ok_or_else(|| {
                        EngineError::Unsupported(format!(
                            "demand {value} of {} at index {index}",
                            dimension.name
                        ))
                    })?
            }
            None => 0,
        };
        Ok(Stop {
            index,
            demand,
            penalty: record.penalty(index),
        })
    };

    let mut paired = HashSet::new();
    let mut jobs = Vec::new();
    for &(pickup, delivery) in record.pickups_and_deliveries() {
        if let Some(optional) = [pickup, delivery]
            .into_iter()
            .find(|&index| record.is_optional(index))
        {
            return Err(EngineError::Unsupported(format!(
                "a disjunction on paired index {optional}"
            )));
        }
        paired.insert(pickup);
        paired.insert(delivery);
        let pickup_stop = stop(pickup)?;
        jobs.push(JobPlan::PickupDelivery {
            pickup: pickup_stop,
            delivery: Stop {
                index: delivery,
                demand: pickup_stop.demand,
                penalty: None,
            },
        });
    }
    for index in record.manager().visit_indices() {
        if !paired.contains(&index) {
            jobs.push(JobPlan::Single(stop(index)?));
        }
    }
    Ok(jobs)
}

fn plan_vehicles(
    record: &ModelRecord,
    shift: Option<&EngineDimension>,
    load: Option<&EngineDimension>,
) -> Result<Vec<VehiclePlan>, EngineError> {
    let manager = record.manager();
    (0..manager.vehicle_count())
        .map(|slot| {
            let missing =
                || EngineError::Internal(format!("vehicle {slot} has no start or end slot"));
            let start = manager.vehicle_start_index(slot).ok_or_else(missing)?;
            let end = manager.vehicle_end_index(slot).ok_or_else(missing)?;
            let latest_return = shift
                .and_then(|dimension| dimension.capacity.for_vehicle(slot))
                .map(to_cost);
            let capacity = load
                .and_then(|dimension| dimension.capacity.for_vehicle(slot))
                .map_or(i32::MAX, |capacity| {
                    i32::try_from(capacity).unwrap_or(i32::MAX)
                });
            Ok(VehiclePlan {
                slot,
                start: to_location(start)?,
                end: to_location(end)?,
                latest_return,
                capacity,
            })
        })
        .collect()
}

fn define_goal(plan: &Plan) -> GenericResult<GoalContext> {
    let unserved_feature = FeatureBuilder::default()
        .with_name("min-unserved-penalty")
        .with_objective(UnservedPenalty {
            weights: plan.weights,
        })
        .build()?;
    let detour_feature = FeatureBuilder::default()
        .with_name("optional-detour")
        .with_constraint(DetourGuard {
            transport: plan.transport.clone(),
            code: ViolationCode::default(),
        })
        .build()?;
    let transport: Arc<dyn TransportCost> = plan.transport.clone();
    let transport_feature = TransportFeatureBuilder::new("min-distance")
        .set_transport_cost(transport)
        .set_time_constrained(plan.time_constrained)
        .build_minimize_distance()?;
    let mut features = vec![unserved_feature, transport_feature, detour_feature];
    if plan.with_capacity {
        features.push(CapacityFeatureBuilder::<SingleDimLoad>::new("capacity").build()?);
    }
    GoalContextBuilder::with_features(features.as_slice())?.build()
}

fn define_job(job: &JobPlan) -> GenericResult<Job> {
    match *job {
        JobPlan::Single(stop) => SingleBuilder::default()
            .id(format!("stop{}", stop.index).as_str())
            .demand(Demand::delivery(stop.demand))
            .dimension(|dimens| {
                if let Some(penalty) = stop.penalty {
                    dimens.set_job_penalty(to_cost(penalty));
                }
            })
            .location(to_location(stop.index).map_err(|error| error.to_string())?)?
            .build_as_job(),
        JobPlan::PickupDelivery { pickup, delivery } => MultiBuilder::default()
            .id(format!("pair{}-{}", pickup.index, delivery.index).as_str())
            .add_job(
                SingleBuilder::default()
                    .demand(Demand::pudo_pickup(pickup.demand))
                    .location(to_location(pickup.index).map_err(|error| error.to_string())?)?
                    .build()?,
            )
            .add_job(
                SingleBuilder::default()
                    .demand(Demand::pudo_delivery(delivery.demand))
                    .location(to_location(delivery.index).map_err(|error| error.to_string())?)?
                    .build()?,
            )
            .build_as_job(),
    }
}

fn define_problem(plan: &Plan, goal: GoalContext) -> GenericResult<Problem> {
    let jobs = plan
        .jobs
        .iter()
        .map(define_job)
        .collect::<Result<Vec<_>, _>>()?;
    let vehicles = plan
        .vehicles
        .iter()
        .map(|vehicle| {
            let mut detail = VehicleDetailBuilder::default()
                .set_start_location(vehicle.start)
                .set_start_time(0.0)
                .set_end_location(vehicle.end);
            if let Some(latest) = vehicle.latest_return {
                detail = detail.set_end_time(latest);
            }
            let slot = vehicle.slot;
            VehicleBuilder::default()
                .id(format!("vehicle{slot}").as_str())
                .add_detail(detail.build()?)
                .dimension(|dimens| {
                    dimens.set_vehicle_slot(slot);
                })
                .capacity(SingleDimLoad::new(vehicle.capacity))
                .build()
        })
        .collect::<Result<Vec<_>, _>>()?;
    let transport: Arc<dyn TransportCost> = plan.transport.clone();
    ProblemBuilder::default()
        .add_jobs(jobs.into_iter())
        .add_vehicles(vehicles.into_iter())
        .with_goal(goal)
        .with_transport_cost(transport)
        .build()
}

/// Solve `plan`, returning the visited locations of every used vehicle slot.
fn run(plan: &Plan, limits: &SearchLimits) -> GenericResult<Vec<(usize, Vec<Location>)>> {
    let goal = define_goal(plan)?;
    let problem = Arc::new(define_problem(plan, goal)?);
    let config = VrpConfigBuilder::new(problem.clone())
        .prebuild()?
        .with_max_generations(Some(limits.max_generations))
        .with_max_time(limits.max_seconds)
        .build()?;

    let solution = vrp_core::solver::Solver::new(problem, config).solve()?;
    if !solution.unassigned.is_empty() {
        log::debug!("{} jobs left unassigned", solution.unassigned.len());
    }
    solution
        .routes
        .iter()
        .map(|route| {
            let slot = route
                .actor
                .vehicle
                .dimens
                .get_vehicle_slot()
                .copied()
                .ok_or("route is driven by a vehicle without a slot")?;
            let locations = route
                .tour
                .all_activities()
                .map(|activity| activity.place.location)
                .collect();
            Ok((slot, locations))
        })
        .collect()
}

/// Search the recorded model, returning each vehicle's visit indices.
pub(crate) fn search(
    record: &ModelRecord,
    limits: &SearchLimits,
) -> Result<Vec<Vec<i64>>, EngineError> {
    let manager = record.manager();
    let mut routes = vec![Vec::new(); manager.vehicle_count()];
    if manager.visit_indices().next().is_none() {
        log::debug!("no visit indices, skipping the search");
        return Ok(routes);
    }

    let plan = Plan::from_record(record)?;
    let tours = run(&plan, limits).map_err(|error| EngineError::Internal(error.to_string()))?;
    for (slot, locations) in tours {
        let stops = locations
            .into_iter()
            .filter_map(|location| i64::try_from(location).ok())
            .filter(|&index| !manager.is_start(index) && !manager.is_end(index))
            .collect();
        let route = routes.get_mut(slot).ok_or_else(|| {
            EngineError::Internal(format!("tour assigned to unknown vehicle slot {slot}"))
        })?;
        *route = stops;
    }
    Ok(routes)
}

fn index_bound(record: &ModelRecord) -> Result<i64, EngineError> {
    let count = record.manager().index_count();
    i64::try_from(count)
        .map_err(|_| EngineError::InvalidModel(format!("{count} indices do not fit the engine")))
}

fn to_location(index: i64) -> Result<Location, EngineError> {
    usize::try_from(index)
        .map_err(|_| EngineError::InvalidModel(format!("index {index} is not a location")))
}

#[expect(
    clippy::cast_precision_loss,
    reason = "vrp-core costs are floating point; integer transits stay exact below 2^53"
)]
const fn to_cost(value: i64) -> f64 {
    value as f64
}

#[cfg(test)]
mod tests {
    //! Plan construction tests; searches are covered by the engine tests.

    use super::*;
    use routewright_core::engine::{CallbackIndex, VehicleCapacity};
    use routewright_core::{IndexManager, RoutingShape};
    use rstest::rstest;

    #[expect(clippy::expect_used, reason = "tests use expect for readable failures")]
    fn record(nodes: usize, vehicles: usize) -> ModelRecord {
        let shape = RoutingShape::with_depot(nodes, vehicles, 0).expect("depot in range");
        ModelRecord::new(IndexManager::new(&shape))
    }

    #[expect(clippy::expect_used, reason = "tests use expect for readable failures")]
    fn dimension(
        record: &mut ModelRecord,
        name: &str,
        callback: CallbackIndex,
        capacity: i64,
    ) {
        record
            .add_dimension(EngineDimension {
                name: name.to_owned(),
                callback,
                slack: 0,
                capacity: VehicleCapacity::Uniform(capacity),
                fix_start_cumul_to_zero: true,
            })
            .expect("dimension registers");
    }

    #[rstest]
    #[expect(clippy::expect_used, reason = "tests use expect for readable failures")]
    fn transport_reads_arc_cost_and_shift() {
        let mut record = record(3, 1);
        let distance = record.register_binary(Box::new(|from: i64, to: i64| (to - from).abs()), true);
        let time = record.register_binary(Box::new(|from: i64, to: i64| 10 * (to - from).abs()), true);
        record.set_arc_cost_evaluator(distance).expect("arc cost");
        dimension(&mut record, "Time", time, 500);

        let plan = Plan::from_record(&record).expect("plan builds");
        assert!(plan.time_constrained);
        assert!(!plan.with_capacity);
        let within = plan.transport.distance_between(0, 2).total_cmp(&2.0);
        assert!(within.is_eq());
        let duration = plan.transport.duration_between(2, 0).total_cmp(&20.0);
        assert!(duration.is_eq());
        let vehicle = plan.vehicles.first().expect("one vehicle");
        assert_eq!(vehicle.latest_return.map(f64::to_bits), Some(500.0_f64.to_bits()));
    }

    #[rstest]
    #[expect(clippy::expect_used, reason = "tests use expect for readable failures")]
    fn jobs_carry_unary_demands_and_pairs() {
        let mut record = record(4, 2);
        let demand = record.register_unary(Box::new(|index: i64| if index == 0 { 0 } else { 2 }), true);
        dimension(&mut record, "Load", demand, 6);
        record.add_pickup_and_delivery(1, 3).expect("pair registers");

        let plan = Plan::from_record(&record).expect("plan builds");
        assert!(plan.with_capacity);
        assert!(!plan.time_constrained);
        assert_eq!(
            plan.jobs,
            vec![
                JobPlan::PickupDelivery {
                    pickup: Stop { index: 1, demand: 2, penalty: None },
                    delivery: Stop { index: 3, demand: 2, penalty: None },
                },
                JobPlan::Single(Stop { index: 2, demand: 2, penalty: None }),
            ]
        );
        let slots: Vec<(usize, Location, Location, i32)> = plan
            .vehicles
            .iter()
            .map(|vehicle| (vehicle.slot, vehicle.start, vehicle.end, vehicle.capacity))
            .collect();
        assert_eq!(slots, vec![(0, 0, 5, 6), (1, 4, 6, 6)]);
    }

    #[rstest]
    #[expect(clippy::expect_used, reason = "tests use expect for readable failures")]
    fn negative_demands_are_unsupported() {
        let mut record = record(3, 1);
        let demand = record.register_unary(Box::new(|index: i64| -index), false);
        dimension(&mut record, "Load", demand, 6);

        let err = Plan::from_record(&record).expect_err("negative demand");
        assert!(matches!(err, EngineError::Unsupported(_)));
    }

    #[rstest]
    #[expect(clippy::expect_used, reason = "tests use expect for readable failures")]
    fn grouped_disjunctions_are_unsupported() {
        let mut record = record(4, 1);
        record.add_disjunction(&[1, 2], 100).expect("disjunction registers");

        let err = Plan::from_record(&record).expect_err("grouped disjunction");
        assert!(matches!(err, EngineError::Unsupported(_)));
    }

    #[rstest]
    #[expect(clippy::expect_used, reason = "tests use expect for readable failures")]
    fn optional_stops_weigh_their_penalty() {
        let mut record = record(4, 1);
        record.add_disjunction(&[2], 7).expect("disjunction registers");
        record.add_disjunction(&[3], 5).expect("disjunction registers");

        let plan = Plan::from_record(&record).expect("plan builds");
        assert_eq!(
            plan.jobs,
            vec![
                JobPlan::Single(Stop { index: 1, demand: 0, penalty: None }),
                JobPlan::Single(Stop { index: 2, demand: 0, penalty: Some(7) }),
                JobPlan::Single(Stop { index: 3, demand: 0, penalty: Some(5) }),
            ]
        );
        assert_eq!(plan.weights.required.to_bits(), 13.0_f64.to_bits());
        assert_eq!(plan.weights.total.to_bits(), 25.0_f64.to_bits());

        let optional = define_job(&JobPlan::Single(Stop { index: 2, demand: 0, penalty: Some(7) }))
            .expect("job builds");
        let required = define_job(&JobPlan::Single(Stop { index: 1, demand: 0, penalty: None }))
            .expect("job builds");
        assert_eq!(plan.weights.of(&optional).to_bits(), 7.0_f64.to_bits());
        assert_eq!(plan.weights.of(&required).to_bits(), 13.0_f64.to_bits());
    }

    #[rstest]
    #[expect(clippy::expect_used, reason = "tests use expect for readable failures")]
    fn optional_paired_stops_are_unsupported() {
        let mut record = record(4, 1);
        record.add_pickup_and_delivery(1, 2).expect("pair registers");
        record.add_disjunction(&[2], 10).expect("disjunction registers");

        let err = Plan::from_record(&record).expect_err("optional delivery");
        assert!(matches!(err, EngineError::Unsupported(_)));
    }

    #[rstest]
    fn detours_are_measured_against_the_direct_arc() {
        let transport = IndexTransport {
            distances: vec![
                vec![0.0, 1.0, 9.0],
                vec![1.0, 0.0, 9.0],
                vec![9.0, 9.0, 0.0],
            ],
            durations: Vec::new(),
        };
        assert_eq!(transport.detour(0, 2, Some(1)).to_bits(), 17.0_f64.to_bits());
        assert_eq!(transport.detour(1, 2, None).to_bits(), 9.0_f64.to_bits());
    }

    #[rstest]
    #[expect(clippy::expect_used, reason = "tests use expect for readable failures")]
    fn models_without_visits_skip_the_search() {
        let record = record(1, 3);
        let limits = SearchLimits {
            max_generations: 1,
            max_seconds: None,
        };
        let routes = search(&record, &limits).expect("empty search");
        assert_eq!(routes, vec![Vec::<i64>::new(); 3]);
    }
}
