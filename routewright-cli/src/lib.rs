//! Command-line interface for solving routing problems described in JSON.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod fs;
mod problem;
mod solve;

pub use error::CliError;
pub use problem::ProblemError;

use solve::SolveArgs;

pub(crate) const ARG_SOLVE_PROBLEM: &str = "problem";
pub(crate) const ARG_SOLVE_MAX_GENERATIONS: &str = "max-generations";
pub(crate) const ARG_SOLVE_TIME_LIMIT: &str = "time-limit";
pub(crate) const ENV_SOLVE_PROBLEM: &str = "ROUTEWRIGHT_CMDS_SOLVE_PROBLEM_PATH";

/// Run the routewright CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Solve(args) => solve::run_solve(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "routewright",
    about = "Solve vehicle routing problems with the routewright orchestration layer",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve a routing problem and print the routes as JSON.
    Solve(SolveArgs),
}

#[cfg(test)]
mod tests;
