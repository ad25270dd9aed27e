//! Shared test harness modules for the routewright CLI.

use super::*;

mod helpers;
mod problem_unit;
mod solve_steps;
