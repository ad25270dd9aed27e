#![expect(
    clippy::expect_used,
    reason = "regression tests use expect for readable failures"
)]

//! Golden route regression tests for the `vrp-core` engine.
//!
//! Each case loads a distance matrix from JSON, solves it through
//! `ProblemSolver` and checks the walked routes: every stop is served once,
//! the reported objective equals the walked arc costs, and the tour stays
//! within a tolerance of the recorded reference objective.

use std::fs;
use std::path::PathBuf;

use rstest::rstest;
use routewright_core::dimension::{Dimension, DimensionCapacity};
use routewright_core::observe::{ArcCostAccumulator, LoadTracker, PathCollector};
use routewright_core::{
    Context, DimensionError, ProblemDefinition, ProblemSolver, SearchParameters, WalkListeners,
    WalkSummary,
};
use routewright_solver_vrp::{VrpEngine, VrpEngineConfig};
use serde::Deserialize;

/// Deserialised golden case.
#[derive(Debug, Deserialize)]
struct GoldenCase {
    name: String,
    #[expect(dead_code, reason = "kept for documentation in JSON files")]
    description: String,
    matrix: Vec<Vec<i64>>,
    vehicles: usize,
    depot: usize,
    expected: Reference,
}

/// Reference values recorded for the case.
#[derive(Debug, Deserialize)]
struct Reference {
    objective: i64,
}

/// Distance as the arc cost, optionally with one unit of load per stop.
struct Deliveries {
    matrix: Vec<Vec<i64>>,
    depot: usize,
    vehicle_capacity: Option<i64>,
}

impl ProblemDefinition<VrpEngine> for Deliveries {
    fn add_dimensions(&mut self, context: &mut Context<VrpEngine>) -> Result<(), DimensionError> {
        Dimension::builder("Distance")
            .matrix(self.matrix.clone())
            .non_negative()
            .arc_cost()
            .attach(context)?;
        if let Some(capacity) = self.vehicle_capacity {
            let depot = self.depot;
            Dimension::builder("Load")
                .unary(move |node| i64::from(node != depot))
                .non_negative()
                .capacity(DimensionCapacity::uniform(capacity))
                .attach(context)?;
        }
        Ok(())
    }

    fn configure_search(&self, parameters: SearchParameters) -> SearchParameters {
        parameters.with_iteration_limit(100)
    }
}

struct Walked {
    summary: WalkSummary,
    paths: Vec<Vec<usize>>,
    route_costs: Vec<i64>,
    route_loads: Vec<Option<i64>>,
}

fn load_golden_case(filename: &str) -> GoldenCase {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(filename);
    let content = fs::read_to_string(&path).expect("failed to read golden case file");
    serde_json::from_str(&content).expect("failed to parse golden case JSON")
}

fn solve(golden: &GoldenCase, vehicle_capacity: Option<i64>) -> Walked {
    let engine = VrpEngine::with_config(VrpEngineConfig::default());
    let context = Context::with_depot(engine, golden.matrix.len(), golden.vehicles, golden.depot)
        .expect("golden shape is valid");
    let mut solver = ProblemSolver::new(
        context,
        Deliveries {
            matrix: golden.matrix.clone(),
            depot: golden.depot,
            vehicle_capacity,
        },
    );

    let mut paths = PathCollector::default();
    let mut costs = ArcCostAccumulator::new("Distance");
    let mut loads = LoadTracker::new("Load");
    let mut listeners: WalkListeners<'_> = WalkListeners::new();
    listeners.attach(&mut paths).attach(&mut costs);
    if vehicle_capacity.is_some() {
        listeners.attach(&mut loads);
    }
    let outcome = solver.solve(&mut listeners).expect("golden case walks");
    drop(listeners);

    Walked {
        summary: *outcome.summary().expect("golden case is solved"),
        paths: paths.into_paths(),
        route_costs: costs.per_vehicle().to_vec(),
        route_loads: loads.route_loads().to_vec(),
    }
}

fn assert_every_stop_served_once(golden: &GoldenCase, walked: &Walked) {
    let mut visited: Vec<usize> = walked
        .paths
        .iter()
        .flat_map(|path| path.iter().skip(1).take(path.len().saturating_sub(2)))
        .copied()
        .collect();
    visited.sort_unstable();
    let stops: Vec<usize> = (0..golden.matrix.len())
        .filter(|&node| node != golden.depot)
        .collect();
    assert_eq!(visited, stops, "{}: stops", golden.name);
    for path in &walked.paths {
        assert_eq!(path.first(), Some(&golden.depot), "{}: start", golden.name);
        assert_eq!(path.last(), Some(&golden.depot), "{}: end", golden.name);
    }
}

#[rstest]
fn tsp_tour_is_close_to_the_reference() {
    let golden = load_golden_case("tsp_13.json");
    let walked = solve(&golden, None);

    assert_every_stop_served_once(&golden, &walked);
    let walked_cost: i64 = walked.route_costs.iter().sum();
    assert_eq!(walked.summary.objective, walked_cost);
    assert!(
        walked.summary.objective >= golden.expected.objective,
        "{}: {} beats the best known tour",
        golden.name,
        walked.summary.objective
    );
    assert!(
        walked.summary.objective * 4 <= golden.expected.objective * 5,
        "{}: {} is more than 25% above {}",
        golden.name,
        walked.summary.objective,
        golden.expected.objective
    );
}

#[rstest]
#[case(4)]
#[case(6)]
fn capacitated_fleet_respects_vehicle_loads(#[case] capacity: i64) {
    let golden = load_golden_case("vrp_17.json");
    let walked = solve(&golden, Some(capacity));

    assert_every_stop_served_once(&golden, &walked);
    for (vehicle, path) in walked.paths.iter().enumerate() {
        let stops = i64::try_from(path.len().saturating_sub(2)).expect("small route");
        assert!(stops <= capacity, "vehicle {vehicle} serves {stops} stops");
        let load = walked
            .route_loads
            .get(vehicle)
            .copied()
            .flatten()
            .expect("load at route end");
        assert_eq!(load, stops, "vehicle {vehicle} load");
    }
    let walked_cost: i64 = walked.route_costs.iter().sum();
    assert_eq!(walked.summary.objective, walked_cost);
}
