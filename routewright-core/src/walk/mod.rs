//! Solve-and-walk orchestration.
//!
//! [`ProblemSolver`] applies context visitors, runs the dimension hook once,
//! solves, and walks every vehicle's successor chain into phased
//! notifications. Search failures never escape as errors: they become
//! [`SolveOutcome::Unsolved`]. The solution handle is released before
//! `solve` returns, whichever way it returns.

mod event;
mod lookup;
mod step;

use std::fmt;

use thiserror::Error;

use crate::context::{Context, ContextError, ContextVisitor};
use crate::dimension::{DimensionError, Dimensions};
use crate::engine::{Assignment, EngineError, RoutingEngine, RoutingModel, SearchParameters};
use crate::index::IndexManager;

pub use event::{ObserverError, WalkEvent, WalkEventKind, WalkListeners, WalkObserver, WalkPhase};
pub use lookup::VariableLookup;
pub use step::{AssignmentStep, StepRecord, VehicleTerminal};

/// Hooks a caller supplies to describe its problem.
pub trait ProblemDefinition<E: RoutingEngine, A = ()> {
    /// Attach dimensions. Called exactly once per solve, after visitors.
    fn add_dimensions(&mut self, context: &mut Context<E, A>) -> Result<(), DimensionError>;

    /// Adjust the search parameters. The default keeps them unchanged.
    fn configure_search(&self, parameters: SearchParameters) -> SearchParameters {
        parameters
    }
}

/// Progress of a [`ProblemSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverState {
    /// Nothing has run yet.
    Idle,
    /// Every visitor has been applied.
    VisitorsApplied,
    /// The dimension hook has run and registration is closed.
    DimensionsAdded,
    /// The engine is searching.
    Solving,
    /// The engine returned an assignment.
    SolutionFound,
    /// The assignment is being walked.
    Walking,
    /// The engine returned no assignment.
    NoSolution,
    /// The run finished.
    Done,
    /// The run stopped on an error.
    Failed,
}

impl fmt::Display for SolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::VisitorsApplied => "visitors-applied",
            Self::DimensionsAdded => "dimensions-added",
            Self::Solving => "solving",
            Self::SolutionFound => "solution-found",
            Self::Walking => "walking",
            Self::NoSolution => "no-solution",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Totals of a completed walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkSummary {
    /// Objective reported by the engine.
    pub objective: i64,
    /// Vehicles that visited at least one stop besides their start.
    pub vehicles_used: usize,
    /// Number of steps emitted.
    pub steps: usize,
}

/// Why a solve produced nothing to walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsolvedReason {
    /// The engine finished without an assignment.
    NoAssignment,
    /// The engine's search failed.
    Engine(EngineError),
}

/// Result of a run that did not hit a hard error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// An assignment was found and walked.
    Solved(WalkSummary),
    /// No assignment; no events were emitted.
    Unsolved(UnsolvedReason),
}

impl SolveOutcome {
    /// Whether an assignment was walked.
    #[must_use]
    pub const fn is_solved(&self) -> bool {
        matches!(self, Self::Solved(_))
    }

    /// The walk summary, if solved.
    #[must_use]
    pub const fn summary(&self) -> Option<&WalkSummary> {
        match self {
            Self::Solved(summary) => Some(summary),
            Self::Unsolved(_) => None,
        }
    }
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum SolveError {
    /// `solve` was called on a solver that already ran.
    #[error("cannot solve from state {state}: a solver runs once")]
    InvalidState {
        /// State at the time of the call.
        state: SolverState,
    },
    /// A visitor failed.
    #[error("visitor {position} failed: {source}")]
    Visitor {
        /// Position of the visitor in insertion order.
        position: usize,
        /// Underlying failure.
        #[source]
        source: ContextError,
    },
    /// The dimension hook failed.
    #[error("dimension hook failed: {0}")]
    Dimensions(#[source] DimensionError),
    /// The engine failed outside the search.
    #[error("engine error: {0}")]
    Engine(#[source] EngineError),
    /// The context refused access or a value did not translate.
    #[error("context error: {0}")]
    Context(#[source] ContextError),
    /// A successor is missing or outside the index space.
    #[error("route of vehicle {vehicle} breaks after index {index}")]
    BrokenRoute {
        /// Vehicle being walked.
        vehicle: usize,
        /// Last index reached.
        index: i64,
    },
    /// A route does not reach its end slot.
    #[error("route of vehicle {vehicle} does not reach its end within {limit} steps")]
    RouteCycle {
        /// Vehicle being walked.
        vehicle: usize,
        /// Size of the index space.
        limit: usize,
    },
    /// An observer aborted the walk.
    #[error("observer failed during the {phase} phase: {source}")]
    Observer {
        /// Phase being dispatched.
        phase: WalkPhase,
        /// Observer's error.
        #[source]
        source: ObserverError,
    },
}

impl From<ContextError> for SolveError {
    fn from(error: ContextError) -> Self {
        match error {
            ContextError::Engine(engine) => Self::Engine(engine),
            other => Self::Context(other),
        }
    }
}

type StepFactory<P> = Box<dyn Fn(&AssignmentStep) -> P>;
type BoxedVisitor<E, A> = Box<dyn ContextVisitor<E, A>>;

/// Drives one solve-and-walk sequence over a context.
///
/// `P` is the payload carried by node events; it defaults to
/// [`AssignmentStep`] and can be changed with
/// [`ProblemSolver::with_step_factory`].
///
/// # Examples
/// ```
/// use routewright_core::walk::{ProblemDefinition, ProblemSolver, WalkListeners};
/// use routewright_core::test_support::ScriptedEngine;
/// use routewright_core::{Context, DimensionError};
///
/// struct NoDimensions;
///
/// impl ProblemDefinition<ScriptedEngine> for NoDimensions {
///     fn add_dimensions(
///         &mut self,
///         _context: &mut Context<ScriptedEngine>,
///     ) -> Result<(), DimensionError> {
///         Ok(())
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = ScriptedEngine::solving_with(vec![vec![1]]);
/// let context = Context::with_depot(engine, 2, 1, 0)?;
/// let mut solver = ProblemSolver::new(context, NoDimensions);
/// let outcome = solver.solve(&mut WalkListeners::new())?;
/// assert_eq!(outcome.summary().map(|summary| summary.steps), Some(2));
/// # Ok(())
/// # }
/// ```
pub struct ProblemSolver<E: RoutingEngine, D, A = (), P = AssignmentStep> {
    context: Context<E, A>,
    definition: D,
    visitors: Vec<BoxedVisitor<E, A>>,
    step_factory: StepFactory<P>,
    state: SolverState,
}

impl<E: RoutingEngine, D, A> ProblemSolver<E, D, A> {
    /// Orchestrate `context` with the hooks in `definition`.
    pub fn new(context: Context<E, A>, definition: D) -> Self {
        Self {
            context,
            definition,
            visitors: Vec::new(),
            step_factory: Box::new(|step| *step),
            state: SolverState::Idle,
        }
    }
}

impl<E: RoutingEngine, D, A, P> fmt::Debug for ProblemSolver<E, D, A, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemSolver")
            .field("context", &self.context)
            .field("visitors", &self.visitors.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<E: RoutingEngine, D, A, P> ProblemSolver<E, D, A, P> {
    /// Build node payloads with `factory` instead.
    pub fn with_step_factory<Q>(
        self,
        factory: impl Fn(&AssignmentStep) -> Q + 'static,
    ) -> ProblemSolver<E, D, A, Q> {
        ProblemSolver {
            context: self.context,
            definition: self.definition,
            visitors: self.visitors,
            step_factory: Box::new(factory),
            state: self.state,
        }
    }

    /// Queue a visitor; visitors run in insertion order.
    pub fn add_visitor(&mut self, visitor: impl ContextVisitor<E, A> + 'static) -> &mut Self {
        self.visitors.push(Box::new(visitor));
        self
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SolverState {
        self.state
    }

    /// The orchestrated context.
    #[must_use]
    pub const fn context(&self) -> &Context<E, A> {
        &self.context
    }

    /// The problem hooks.
    #[must_use]
    pub const fn definition(&self) -> &D {
        &self.definition
    }

    /// Release the context's engine handles.
    pub fn dispose(&mut self) {
        self.context.dispose();
    }

    /// Give the context back.
    pub fn into_context(self) -> Context<E, A> {
        self.context
    }

    fn transition(&mut self, next: SolverState) {
        log::debug!("solver state {} -> {next}", self.state);
        self.state = next;
    }
}

impl<E, D, A, P> ProblemSolver<E, D, A, P>
where
    E: RoutingEngine,
    D: ProblemDefinition<E, A>,
{
    /// Run visitors, the dimension hook and the search, then walk the
    /// assignment through `listeners`.
    pub fn solve(&mut self, listeners: &mut WalkListeners<'_, P>) -> Result<SolveOutcome, SolveError> {
        if self.state != SolverState::Idle {
            return Err(SolveError::InvalidState { state: self.state });
        }
        let result = self.run(listeners);
        if result.is_err() {
            self.transition(SolverState::Failed);
        }
        result
    }

    fn run(&mut self, listeners: &mut WalkListeners<'_, P>) -> Result<SolveOutcome, SolveError> {
        for (position, visitor) in self.visitors.iter_mut().enumerate() {
            visitor
                .visit(&mut self.context)
                .map_err(|source| SolveError::Visitor { position, source })?;
        }
        self.transition(SolverState::VisitorsApplied);

        let hook = self.definition.add_dimensions(&mut self.context);
        self.context.close_registration();
        hook.map_err(SolveError::Dimensions)?;
        self.transition(SolverState::DimensionsAdded);

        let parameters = self.definition.configure_search(SearchParameters::default());
        self.transition(SolverState::Solving);
        let searched = self.context.model_mut()?.solve(&parameters);

        match searched {
            Ok(Some(assignment)) => {
                self.transition(SolverState::SolutionFound);
                self.transition(SolverState::Walking);
                let walked = walk(&self.context, &assignment, &*self.step_factory, listeners);
                drop(assignment);
                log::debug!("solution released");
                let summary = walked?;
                log::info!(
                    "solution walked: objective {}, {} steps over {} vehicles",
                    summary.objective,
                    summary.steps,
                    summary.vehicles_used
                );
                self.transition(SolverState::Done);
                Ok(SolveOutcome::Solved(summary))
            }
            Ok(None) => {
                log::info!("engine returned no assignment");
                self.finish_unsolved(UnsolvedReason::NoAssignment)
            }
            Err(error) => {
                if error.is_infeasibility() {
                    log::info!("search found no solution: {error}");
                } else {
                    log::warn!("search failed, treating as unsolved: {error}");
                }
                self.finish_unsolved(UnsolvedReason::Engine(error))
            }
        }
    }

    fn finish_unsolved(&mut self, reason: UnsolvedReason) -> Result<SolveOutcome, SolveError> {
        self.transition(SolverState::NoSolution);
        self.transition(SolverState::Done);
        Ok(SolveOutcome::Unsolved(reason))
    }
}

struct Notifier<'w, 'l, P> {
    listeners: &'w mut WalkListeners<'l, P>,
    dimensions: &'w Dimensions,
    assignment: &'w dyn Assignment,
    manager: &'w IndexManager,
}

impl<P> Notifier<'_, '_, P> {
    fn emit(&mut self, kind: WalkEventKind<'_, P>) -> Result<(), SolveError> {
        let phase = kind.phase();
        let event = WalkEvent {
            kind,
            dimensions: self.dimensions,
            assignment: self.assignment,
            manager: self.manager,
        };
        self.listeners
            .emit(&event)
            .map_err(|source| SolveError::Observer { phase, source })
    }
}

fn walk<E: RoutingEngine, A, P>(
    context: &Context<E, A>,
    assignment: &dyn Assignment,
    factory: &dyn Fn(&AssignmentStep) -> P,
    listeners: &mut WalkListeners<'_, P>,
) -> Result<WalkSummary, SolveError> {
    let manager = context.manager()?;
    let limit = manager.index_count();
    let mut notifier = Notifier {
        listeners,
        dimensions: context.dimensions(),
        assignment,
        manager,
    };

    notifier.emit(WalkEventKind::BeforeSolution)?;
    let mut all_steps = Vec::new();
    let mut vehicles_used = 0;
    for vehicle in 0..manager.vehicle_count() {
        notifier.emit(WalkEventKind::BeforeVehicle { vehicle })?;
        let mut index = manager
            .vehicle_start_index(vehicle)
            .ok_or(SolveError::BrokenRoute { vehicle, index: -1 })?;
        let mut previous: Option<(usize, i64)> = None;
        let mut steps = Vec::new();
        while !manager.is_end(index) {
            if steps.len() >= limit {
                return Err(SolveError::RouteCycle { vehicle, limit });
            }
            let node = manager
                .index_to_node(index)
                .ok_or(SolveError::BrokenRoute { vehicle, index })?;
            let step = AssignmentStep {
                vehicle,
                node,
                previous_node: previous.map(|(previous_node, _)| previous_node),
                index,
                previous_index: previous.map(|(_, previous_index)| previous_index),
            };
            let payload = factory(&step);
            notifier.emit(WalkEventKind::Node { step: &payload })?;
            steps.push(payload);
            previous = Some((node, index));
            index = assignment
                .next(index)
                .filter(|&next| manager.index_to_node(next).is_some())
                .ok_or(SolveError::BrokenRoute { vehicle, index })?;
        }
        let terminal = VehicleTerminal {
            vehicle,
            node: manager
                .index_to_node(index)
                .ok_or(SolveError::BrokenRoute { vehicle, index })?,
            index,
            previous_node: previous.map(|(previous_node, _)| previous_node),
            previous_index: previous.map(|(_, previous_index)| previous_index),
        };
        if steps.len() > 1 {
            vehicles_used += 1;
        }
        notifier.emit(WalkEventKind::AfterVehicle {
            vehicle,
            steps: &steps,
            terminal: &terminal,
        })?;
        all_steps.extend(steps);
    }
    notifier.emit(WalkEventKind::AfterSolution { steps: &all_steps })?;

    Ok(WalkSummary {
        objective: assignment.objective(),
        vehicles_used,
        steps: all_steps.len(),
    })
}
