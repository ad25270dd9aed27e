//! Unit tests for problem validation and the solve report.

use super::helpers::line_problem;
use super::*;
use crate::problem::{OptionalStop, PickupDelivery, ProblemFile, SolveReport};
use crate::solve::solve_problem;
use camino::Utf8Path;
use rstest::rstest;
use routewright_core::engine::EngineError;
use routewright_core::test_support::{EngineProbe, ScriptedEngine};
use routewright_core::{Endpoint, SearchParameters, SolveError};

fn solve_scripted(engine: ScriptedEngine, problem: ProblemFile) -> Result<SolveReport, CliError> {
    solve_problem(engine, problem, Utf8Path::new("problem.json"))
}

fn expect_routes(report: SolveReport) -> (i64, i64, Vec<crate::problem::RouteReport>) {
    match report {
        SolveReport::Solved {
            objective,
            total_distance,
            routes,
            ..
        } => (objective, total_distance, routes),
        SolveReport::Unsolved { reason } => panic!("expected routes, found unsolved: {reason}"),
    }
}

#[rstest]
fn a_line_problem_is_valid() {
    assert!(line_problem(4, 2).validate().is_ok());
}

#[rstest]
#[case::empty(ProblemFile::default())]
#[case::ragged(ProblemFile {
    distance_matrix: vec![vec![0, 1], vec![1]],
    vehicles: 1,
    ..ProblemFile::default()
})]
#[case::negative(ProblemFile {
    distance_matrix: vec![vec![0, -1], vec![1, 0]],
    vehicles: 1,
    ..ProblemFile::default()
})]
#[case::both_depot_and_endpoints(ProblemFile {
    endpoints: Some(vec![Endpoint::depot(0), Endpoint::depot(0)]),
    ..line_problem(3, 2)
})]
#[case::short_demands(ProblemFile {
    demands: Some(vec![0, 1]),
    ..line_problem(3, 1)
})]
#[case::capacities_without_demands(ProblemFile {
    vehicle_capacities: Some(vec![3]),
    ..line_problem(3, 1)
})]
#[case::capacity_per_vehicle(ProblemFile {
    demands: Some(vec![0, 1, 1]),
    vehicle_capacities: Some(vec![3]),
    ..line_problem(3, 2)
})]
#[case::negative_route_limit(ProblemFile {
    max_route_distance: Some(-1),
    ..line_problem(3, 1)
})]
fn malformed_problems_are_rejected(#[case] problem: ProblemFile) {
    assert!(problem.validate().is_err(), "{problem:?} should be rejected");
}

#[rstest]
fn matrix_errors_name_the_offending_row() {
    let problem = ProblemFile {
        distance_matrix: vec![vec![0, 1, 2], vec![1, 0, 1], vec![2, 1]],
        vehicles: 1,
        ..ProblemFile::default()
    };
    match problem.validate().expect_err("ragged matrix") {
        ProblemError::MatrixNotSquare {
            row,
            found,
            expected,
        } => assert_eq!((row, found, expected), (2, 2, 3)),
        other => panic!("expected MatrixNotSquare, found {other:?}"),
    }
}

#[rstest]
fn shape_errors_surface_as_invalid_problems() {
    let problem = ProblemFile {
        depot: Some(7),
        ..line_problem(3, 1)
    };
    match solve_scripted(ScriptedEngine::default(), problem).expect_err("depot out of range") {
        CliError::InvalidProblem {
            source: ProblemError::Shape(_),
            ..
        } => {}
        other => panic!("expected a shape error, found {other:?}"),
    }
}

#[rstest]
fn routes_report_every_vehicle_with_its_distance() {
    let engine = ScriptedEngine::solving_with(vec![vec![1, 2], vec![]]);
    let report = solve_scripted(engine, line_problem(3, 2)).expect("solve runs");
    let (objective, total_distance, routes) = expect_routes(report);

    assert_eq!(objective, 4);
    assert_eq!(total_distance, 4);
    let nodes: Vec<Vec<usize>> = routes.iter().map(|route| route.nodes.clone()).collect();
    assert_eq!(nodes, vec![vec![0, 1, 2, 0], vec![0, 0]]);
    let distances: Vec<i64> = routes.iter().map(|route| route.distance).collect();
    assert_eq!(distances, vec![4, 0]);
    assert!(routes.iter().all(|route| route.load.is_none()));
}

#[rstest]
fn endpoints_replace_the_depot() {
    let problem = ProblemFile {
        depot: None,
        endpoints: Some(vec![Endpoint::new(0, 3)]),
        ..line_problem(4, 1)
    };
    let engine = ScriptedEngine::solving_with(vec![vec![1, 2]]);
    let (objective, _, routes) = expect_routes(solve_scripted(engine, problem).expect("solve runs"));
    assert_eq!(objective, 3);
    assert_eq!(
        routes.first().map(|route| route.nodes.clone()),
        Some(vec![0, 1, 2, 3])
    );
}

#[rstest]
fn demands_report_the_load_carried_home() {
    let problem = ProblemFile {
        demands: Some(vec![0, 2, 3]),
        vehicle_capacities: Some(vec![5]),
        ..line_problem(3, 1)
    };
    let engine = ScriptedEngine::solving_with(vec![vec![1, 2]]);
    let (_, _, routes) = expect_routes(solve_scripted(engine, problem).expect("solve runs"));
    assert_eq!(routes.first().and_then(|route| route.load), Some(5));
}

#[rstest]
fn overloaded_routes_are_reported_unsolved() {
    let problem = ProblemFile {
        demands: Some(vec![0, 2, 3]),
        vehicle_capacities: Some(vec![4]),
        ..line_problem(3, 1)
    };
    let engine = ScriptedEngine::solving_with(vec![vec![1, 2]]);
    let report = solve_scripted(engine, problem).expect("solve runs");
    assert_eq!(
        report,
        SolveReport::Unsolved {
            reason: EngineError::Infeasible.to_string()
        }
    );
}

#[rstest]
fn span_costs_charge_the_longest_route() {
    let problem = ProblemFile {
        max_route_distance: Some(100),
        span_cost_coefficient: Some(10),
        ..line_problem(3, 2)
    };
    let engine = ScriptedEngine::solving_with(vec![vec![1], vec![2]]);
    let (objective, total_distance, _) =
        expect_routes(solve_scripted(engine, problem).expect("solve runs"));
    assert_eq!(total_distance, 6);
    assert_eq!(objective, 46);
}

#[rstest]
fn skipped_optional_stops_are_paid_for() {
    let problem = ProblemFile {
        optional_stops: vec![OptionalStop {
            node: 2,
            penalty: 50,
        }],
        ..line_problem(3, 1)
    };
    let engine = ScriptedEngine::solving_with(vec![vec![1]]);
    let (objective, total_distance, _) =
        expect_routes(solve_scripted(engine, problem).expect("solve runs"));
    assert_eq!(total_distance, 2);
    assert_eq!(objective, 52);
}

#[rstest]
fn deliveries_before_pickups_are_reported_unsolved() {
    let problem = ProblemFile {
        pickups_and_deliveries: vec![PickupDelivery {
            pickup: 2,
            delivery: 1,
        }],
        ..line_problem(3, 1)
    };
    let engine = ScriptedEngine::solving_with(vec![vec![1, 2]]);
    let report = solve_scripted(engine, problem).expect("solve runs");
    assert!(matches!(report, SolveReport::Unsolved { .. }));
}

#[rstest]
fn pairs_outside_the_problem_abort_the_run() {
    let problem = ProblemFile {
        pickups_and_deliveries: vec![PickupDelivery {
            pickup: 1,
            delivery: 9,
        }],
        ..line_problem(3, 1)
    };
    let engine = ScriptedEngine::solving_with(vec![vec![1, 2]]);
    match solve_scripted(engine, problem).expect_err("node 9 does not exist") {
        CliError::Solve {
            source: SolveError::Visitor { position, .. },
        } => assert_eq!(position, 0),
        other => panic!("expected a visitor failure, found {other:?}"),
    }
}

#[rstest]
fn problem_search_parameters_override_the_defaults() {
    let probe = EngineProbe::default();
    let engine = ScriptedEngine::solving_with(vec![vec![1, 2]]).with_probe(probe.clone());
    let search = SearchParameters::default().with_iteration_limit(7);
    let problem = ProblemFile {
        search: Some(search.clone()),
        ..line_problem(3, 1)
    };
    solve_scripted(engine, problem).expect("solve runs");
    assert_eq!(probe.last_parameters(), Some(search));
}

#[rstest]
fn engines_without_answers_are_reported_unsolved() {
    let report =
        solve_scripted(ScriptedEngine::without_solution(), line_problem(3, 1)).expect("solve runs");
    assert_eq!(
        report,
        SolveReport::Unsolved {
            reason: "the engine found no assignment".to_owned()
        }
    );
}

#[rstest]
fn reports_serialize_with_a_status_tag() {
    let report = SolveReport::Unsolved {
        reason: "nothing to do".to_owned(),
    };
    let value = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(
        value,
        serde_json::json!({ "status": "unsolved", "reason": "nothing to do" })
    );
}
