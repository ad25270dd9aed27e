//! Phased notifications emitted while walking a solution.

use std::error::Error;
use std::fmt;

use super::lookup::VariableLookup;
use super::step::{AssignmentStep, VehicleTerminal};
use crate::dimension::Dimensions;
use crate::engine::{Assignment, VariableBounds};
use crate::index::IndexManager;

/// Error type observers may return; it aborts the walk.
pub type ObserverError = Box<dyn Error + Send + Sync>;

/// Granularity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalkPhase {
    /// Once, before any vehicle.
    BeforeSolution,
    /// Once per vehicle, before its stops.
    BeforeVehicle,
    /// Once per visited stop.
    Node,
    /// Once per vehicle, after its stops.
    AfterVehicle,
    /// Once, after every vehicle.
    AfterSolution,
}

impl fmt::Display for WalkPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BeforeSolution => "before-solution",
            Self::BeforeVehicle => "before-vehicle",
            Self::Node => "node",
            Self::AfterVehicle => "after-vehicle",
            Self::AfterSolution => "after-solution",
        };
        f.write_str(name)
    }
}

/// What happened.
#[derive(Debug)]
pub enum WalkEventKind<'e, P> {
    /// The walk is about to start.
    BeforeSolution,
    /// `vehicle`'s route is about to be walked.
    BeforeVehicle {
        /// Vehicle about to be walked.
        vehicle: usize,
    },
    /// A stop was visited.
    Node {
        /// Payload built from the step.
        step: &'e P,
    },
    /// `vehicle`'s route is complete.
    AfterVehicle {
        /// Vehicle just walked.
        vehicle: usize,
        /// Its payloads in route order.
        steps: &'e [P],
        /// Its end slot.
        terminal: &'e VehicleTerminal,
    },
    /// Every vehicle has been walked.
    AfterSolution {
        /// Every payload, vehicle ascending, route order within a vehicle.
        steps: &'e [P],
    },
}

impl<P> WalkEventKind<'_, P> {
    /// Phase this kind belongs to.
    #[must_use]
    pub const fn phase(&self) -> WalkPhase {
        match self {
            Self::BeforeSolution => WalkPhase::BeforeSolution,
            Self::BeforeVehicle { .. } => WalkPhase::BeforeVehicle,
            Self::Node { .. } => WalkPhase::Node,
            Self::AfterVehicle { .. } => WalkPhase::AfterVehicle,
            Self::AfterSolution { .. } => WalkPhase::AfterSolution,
        }
    }
}

/// A notification together with read access to the solved model.
pub struct WalkEvent<'e, P> {
    /// What happened.
    pub kind: WalkEventKind<'e, P>,
    /// Dimensions attached to the context.
    pub dimensions: &'e Dimensions,
    /// The committed solution.
    pub assignment: &'e dyn Assignment,
    /// Node/index translation.
    pub manager: &'e IndexManager,
}

impl<P> WalkEvent<'_, P> {
    /// Phase of this event.
    #[must_use]
    pub const fn phase(&self) -> WalkPhase {
        self.kind.phase()
    }

    /// Resolve a variable of the solution at `index`.
    #[must_use]
    pub fn lookup(&self, variable: &VariableLookup, index: i64) -> Option<VariableBounds> {
        variable.resolve(self.assignment, index)
    }
}

impl<P: fmt::Debug> fmt::Debug for WalkEvent<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkEvent")
            .field("kind", &self.kind)
            .field("objective", &self.assignment.objective())
            .finish_non_exhaustive()
    }
}

/// A subscriber to every phase of a walk.
pub trait WalkObserver<P = AssignmentStep> {
    /// React to one event.
    fn observe(&mut self, event: &WalkEvent<'_, P>) -> Result<(), ObserverError>;
}

type Handler<'a, P> = Box<dyn FnMut(&WalkEvent<'_, P>) -> Result<(), ObserverError> + 'a>;

enum Listener<'a, P> {
    Phase(WalkPhase, Handler<'a, P>),
    Observer(&'a mut dyn WalkObserver<P>),
}

/// Subscribers for one walk, notified in registration order.
///
/// # Examples
/// ```
/// use routewright_core::walk::{WalkEventKind, WalkListeners, WalkPhase};
///
/// let mut nodes = Vec::new();
/// let mut listeners: WalkListeners<'_> = WalkListeners::new();
/// listeners.on(WalkPhase::Node, |event| {
///     if let WalkEventKind::Node { step } = &event.kind {
///         nodes.push(step.node);
///     }
///     Ok(())
/// });
/// assert_eq!(listeners.len(), 1);
/// ```
pub struct WalkListeners<'a, P = AssignmentStep> {
    listeners: Vec<Listener<'a, P>>,
}

impl<P> Default for WalkListeners<'_, P> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<P> fmt::Debug for WalkListeners<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

impl<'a, P> WalkListeners<'a, P> {
    /// No subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `handler` for every event of `phase`.
    pub fn on(
        &mut self,
        phase: WalkPhase,
        handler: impl FnMut(&WalkEvent<'_, P>) -> Result<(), ObserverError> + 'a,
    ) -> &mut Self {
        self.listeners.push(Listener::Phase(phase, Box::new(handler)));
        self
    }

    /// Notify `observer` of every event.
    pub fn attach(&mut self, observer: &'a mut dyn WalkObserver<P>) -> &mut Self {
        self.listeners.push(Listener::Observer(observer));
        self
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub(crate) fn emit(&mut self, event: &WalkEvent<'_, P>) -> Result<(), ObserverError> {
        let phase = event.phase();
        for listener in &mut self.listeners {
            match listener {
                Listener::Phase(wanted, handler) if *wanted == phase => handler(event)?,
                Listener::Phase(..) => {}
                Listener::Observer(observer) => observer.observe(event)?,
            }
        }
        Ok(())
    }
}
