//! Solve command implementation for the routewright CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use routewright_core::observe::{ArcCostAccumulator, LoadTracker, PathCollector};
use routewright_core::{Context, ContextError, ProblemSolver, RoutingEngine, WalkListeners};
use routewright_solver_vrp::{VrpEngine, VrpEngineConfig};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};
use std::time::Duration;

use crate::fs::open_utf8_file;
use crate::problem::{DISTANCE, LOAD, ProblemFile, SolveReport};
use crate::{
    ARG_SOLVE_MAX_GENERATIONS, ARG_SOLVE_PROBLEM, ARG_SOLVE_TIME_LIMIT, CliError,
    ENV_SOLVE_PROBLEM,
};

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Solve a routing problem described in JSON: a distance \
                 matrix, the fleet and its depot or endpoints, and optional \
                 demands, capacities, route limits, pickup/delivery pairs \
                 and optional stops. Routes are printed as JSON.",
    about = "Solve a routing problem"
)]
#[ortho_config(prefix = "ROUTEWRIGHT")]
pub(crate) struct SolveArgs {
    /// Path to a JSON file describing the problem.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) problem_path: Option<Utf8PathBuf>,
    /// Generations the engine may evolve before stopping.
    #[arg(long = ARG_SOLVE_MAX_GENERATIONS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_generations: Option<usize>,
    /// Wall-clock budget for the search, in seconds.
    #[arg(long = ARG_SOLVE_TIME_LIMIT, value_name = "seconds")]
    #[serde(default)]
    pub(crate) time_limit: Option<u64>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SolveConfig {
    /// Path to the JSON problem file.
    pub(crate) problem_path: Utf8PathBuf,
    /// Generation budget handed to the engine.
    pub(crate) max_generations: usize,
    /// Default wall-clock budget handed to the engine.
    pub(crate) time_limit: Option<Duration>,
}

impl SolveConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.problem_path, ARG_SOLVE_PROBLEM)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match crate::fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Engine settings derived from the command's budget.
    pub(crate) fn engine_config(&self) -> VrpEngineConfig {
        VrpEngineConfig {
            max_generations: self.max_generations,
            max_time: self.time_limit,
        }
    }
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let problem_path = args.problem_path.ok_or(CliError::MissingArgument {
            field: ARG_SOLVE_PROBLEM,
            env: ENV_SOLVE_PROBLEM,
        })?;
        let max_generations = args
            .max_generations
            .unwrap_or_else(|| VrpEngineConfig::default().max_generations);
        if max_generations == 0 {
            return Err(CliError::EmptyBudget {
                field: ARG_SOLVE_MAX_GENERATIONS,
            });
        }
        if args.time_limit == Some(0) {
            return Err(CliError::EmptyBudget {
                field: ARG_SOLVE_TIME_LIMIT,
            });
        }
        Ok(Self {
            problem_path,
            max_generations,
            time_limit: args.time_limit.map(Duration::from_secs),
        })
    }
}

/// Builds the engine for the current solve invocation.
pub(super) trait SolveEngineBuilder {
    /// Engine handed to the context.
    type Engine: RoutingEngine + 'static;

    fn build(&self, config: &SolveConfig) -> Self::Engine;
}

pub(super) struct DefaultSolveEngineBuilder;

impl SolveEngineBuilder for DefaultSolveEngineBuilder {
    type Engine = VrpEngine;

    fn build(&self, config: &SolveConfig) -> VrpEngine {
        VrpEngine::with_config(config.engine_config())
    }
}

pub(super) fn run_solve(args: SolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_solve_with(args, &DefaultSolveEngineBuilder, &mut stdout)
}

pub(super) fn run_solve_with<B: SolveEngineBuilder>(
    args: SolveArgs,
    builder: &B,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let report = execute_solve(args, builder)?;
    write_solve_report(writer, &report)
}

fn execute_solve<B: SolveEngineBuilder>(
    args: SolveArgs,
    builder: &B,
) -> Result<SolveReport, CliError> {
    let config = resolve_solve_config(args)?;
    let problem = load_problem(&config.problem_path)?;
    log::debug!(
        "solving {} nodes with {} vehicles from {}",
        problem.node_count(),
        problem.vehicles,
        config.problem_path
    );
    solve_problem(builder.build(&config), problem, &config.problem_path)
}

fn resolve_solve_config(args: SolveArgs) -> Result<SolveConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON-encoded [`ProblemFile`] from disk.
pub(super) fn load_problem(path: &Utf8Path) -> Result<ProblemFile, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenProblem {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseProblem {
        path: path.to_path_buf(),
        source,
    })
}

/// Solve `problem` with `engine` and walk the routes into a report.
pub(super) fn solve_problem<E: RoutingEngine + 'static>(
    engine: E,
    problem: ProblemFile,
    path: &Utf8Path,
) -> Result<SolveReport, CliError> {
    let invalid = |source| CliError::InvalidProblem {
        path: path.to_path_buf(),
        source,
    };
    problem.validate().map_err(invalid)?;
    let context = problem.context(engine).map_err(invalid)?;
    let (definition, placements) = problem.into_parts();
    let tracks_load = definition.tracks_load();

    let mut solver = ProblemSolver::new(context, definition);
    solver.add_visitor(move |context: &mut Context<E>| {
        placements.apply(context)?;
        Ok::<(), ContextError>(())
    });

    let mut paths = PathCollector::default();
    let mut distances = ArcCostAccumulator::new(DISTANCE);
    let mut loads = LoadTracker::new(LOAD);
    let mut listeners: WalkListeners<'_> = WalkListeners::new();
    listeners.attach(&mut paths).attach(&mut distances);
    if tracks_load {
        listeners.attach(&mut loads);
    }
    let outcome = solver
        .solve(&mut listeners)
        .map_err(|source| CliError::Solve { source })?;
    drop(listeners);

    if !outcome.is_solved() {
        log::warn!("no routes found for {path}: {outcome:?}");
    }
    Ok(SolveReport::from_walk(
        &outcome,
        paths.into_paths(),
        distances.per_vehicle(),
        tracks_load.then(|| loads.route_loads()),
    ))
}

fn write_solve_report(writer: &mut dyn Write, report: &SolveReport) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(report).map_err(CliError::SerializeReport)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteSolveOutput)?;
    writer
        .write_all(b"\n")
        .map_err(CliError::WriteSolveOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
