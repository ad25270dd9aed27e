//! Facade crate for the routewright orchestration layer.
//!
//! This crate re-exports the context, dimension and walk types and exposes
//! the `vrp-core` engine behind the `solver-vrp` feature.

#![forbid(unsafe_code)]

pub use routewright_core::{
    Context, ContextError, Dimension, DimensionCapacity, DimensionError, Endpoint, EngineError,
    IndexManager, ProblemDefinition, ProblemSolver, RoutingEngine, RoutingShape,
    SearchParameters, SolveError, SolveOutcome, UnsolvedReason, WalkEvent, WalkEventKind,
    WalkListeners, WalkObserver, WalkPhase, WalkSummary,
};
pub use routewright_core::observe::{ArcCostAccumulator, LoadTracker, PathCollector};

#[cfg(feature = "solver-vrp")]
pub use routewright_solver_vrp::{VrpEngine, VrpEngineConfig};
