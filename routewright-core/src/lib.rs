//! Orchestration between a domain routing problem and a route-optimisation
//! engine.
//!
//! A [`Context`] validates the problem shape and translates nodes into the
//! engine's index space. [`Dimension`]s register transit callbacks with the
//! engine. A [`ProblemSolver`] runs the solve and walks the solution into
//! phased notifications, so callers never handle raw engine indices.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod context;
pub mod dimension;
pub mod domain;
pub mod engine;
pub mod index;
pub mod observe;
pub mod shape;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
pub mod walk;

pub use context::{Context, ContextError, ContextVisitor};
pub use dimension::{
    Dimension, DimensionBuilder, DimensionCapacity, DimensionError, Dimensions, TransitShape,
    TransitSign,
};
pub use domain::{Domain, Locatable};
pub use engine::{
    Assignment, CallbackIndex, EngineError, RoutingEngine, RoutingModel, SearchParameters,
    VariableBounds, VehicleCapacity,
};
pub use index::IndexManager;
pub use shape::{ConfigurationError, Endpoint, EndpointCoordinate, ProblemShape, RoutingShape};
pub use walk::{
    AssignmentStep, ObserverError, ProblemDefinition, ProblemSolver, SolveError, SolveOutcome,
    SolverState, StepRecord, UnsolvedReason, VariableLookup, VehicleTerminal, WalkEvent,
    WalkEventKind, WalkListeners, WalkObserver, WalkPhase, WalkSummary,
};
