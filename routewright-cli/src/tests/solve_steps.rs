//! Behaviour-driven step definitions driving the solve CLI scenarios.

use super::helpers::{line_problem, problem_dir, write_problem, write_utf8};
use super::*;
use crate::problem::{ProblemFile, SolveReport};
use crate::solve::{DefaultSolveEngineBuilder, run_solve_with};
use camino::Utf8PathBuf;
use clap::Parser;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;

#[derive(Debug)]
struct SolveWorld {
    _tmp: TempDir,
    problem_path: Utf8PathBuf,
    problem: RefCell<Option<ProblemFile>>,
    include_problem: RefCell<bool>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl SolveWorld {
    fn new() -> Self {
        let (tmp, problem_path) = problem_dir();
        Self {
            _tmp: tmp,
            problem_path,
            problem: RefCell::new(None),
            include_problem: RefCell::new(true),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["routewright".to_string(), "solve".to_string()];
        if *self.include_problem.borrow() {
            argv.push(self.problem_path.as_str().to_string());
        }
        argv.extend([format!("--{ARG_SOLVE_MAX_GENERATIONS}"), "10".to_string()]);
        argv
    }

    fn report(&self) -> SolveReport {
        let borrowed = self.result.borrow();
        let result = borrowed.as_ref().expect("result recorded");
        result.as_ref().expect("expected success");
        let stdout = String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8");
        serde_json::from_str(&stdout).expect("output should be a JSON solve report")
    }

    fn with_error(&self, check: impl FnOnce(&CliError)) {
        let borrowed = self.result.borrow();
        let error = borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error");
        check(error);
    }
}

#[fixture]
fn world() -> SolveWorld {
    SolveWorld::new()
}

#[given("a problem with four stops on a line and two vehicles")]
fn problem_on_a_line(#[from(world)] world: &SolveWorld) {
    world.problem.replace(Some(line_problem(5, 2)));
}

#[given("routes limited to three distance units")]
fn routes_limited(#[from(world)] world: &SolveWorld) {
    if let Some(problem) = world.problem.borrow_mut().as_mut() {
        problem.max_route_distance = Some(3);
    }
}

#[given("the problem file contains invalid JSON")]
fn problem_contains_invalid_json(#[from(world)] world: &SolveWorld) {
    write_utf8(&world.problem_path, b"{ not valid json");
}

#[given("a problem whose distance matrix is not square")]
fn problem_not_square(#[from(world)] world: &SolveWorld) {
    let mut problem = line_problem(3, 1);
    if let Some(row) = problem.distance_matrix.last_mut() {
        row.pop();
    }
    world.problem.replace(Some(problem));
}

#[given("I omit the problem path")]
fn omit_problem_path(#[from(world)] world: &SolveWorld) {
    *world.include_problem.borrow_mut() = false;
}

#[when("I run the solve command")]
fn run_solve_command(#[from(world)] world: &SolveWorld) {
    if let Some(problem) = world.problem.borrow().as_ref() {
        write_problem(&world.problem_path, problem);
    }
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Solve(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_solve_with(args, &DefaultSolveEngineBuilder, &mut *buffer)
        }
    });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds and every stop is routed once")]
fn command_routes_every_stop(#[from(world)] world: &SolveWorld) {
    match world.report() {
        SolveReport::Solved {
            objective,
            total_distance,
            routes,
            ..
        } => {
            assert_eq!(objective, total_distance);
            assert_eq!(routes.len(), 2);
            let mut stops: Vec<usize> = routes
                .iter()
                .flat_map(|route| {
                    assert_eq!(route.nodes.first(), Some(&0));
                    assert_eq!(route.nodes.last(), Some(&0));
                    route
                        .nodes
                        .iter()
                        .skip(1)
                        .take(route.nodes.len().saturating_sub(2))
                        .copied()
                })
                .collect();
            stops.sort_unstable();
            assert_eq!(stops, vec![1, 2, 3, 4]);
        }
        SolveReport::Unsolved { reason } => panic!("expected routes, found unsolved: {reason}"),
    }
}

#[then("the command succeeds and reports the problem unsolved")]
fn command_reports_unsolved(#[from(world)] world: &SolveWorld) {
    assert!(matches!(world.report(), SolveReport::Unsolved { .. }));
}

#[then("the command fails because the problem JSON is invalid")]
fn command_fails_invalid_json(#[from(world)] world: &SolveWorld) {
    world.with_error(|error| match error {
        CliError::ParseProblem { .. } => {}
        other => panic!("expected ParseProblem, found {other:?}"),
    });
}

#[then("the command fails because the problem is invalid")]
fn command_fails_invalid_problem(#[from(world)] world: &SolveWorld) {
    world.with_error(|error| match error {
        CliError::InvalidProblem {
            source: ProblemError::MatrixNotSquare { row, .. },
            ..
        } => assert_eq!(*row, 2),
        other => panic!("expected InvalidProblem, found {other:?}"),
    });
}

#[then("the command fails because the problem path is missing")]
fn command_fails_missing_problem_path(#[from(world)] world: &SolveWorld) {
    world.with_error(|error| match error {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_SOLVE_PROBLEM),
        other => panic!("expected MissingArgument, found {other:?}"),
    });
}

macro_rules! register_solve_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/solve_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: SolveWorld) {
            let _ = world;
        }
    };
}

register_solve_scenario!(solve_happy_path, "solving a problem from JSON");
register_solve_scenario!(solve_unsolved, "reporting problems without routes");
register_solve_scenario!(solve_invalid_json, "rejecting invalid JSON input");
register_solve_scenario!(solve_invalid_problem, "rejecting invalid problems");
register_solve_scenario!(solve_missing_problem, "rejecting missing problem paths");
