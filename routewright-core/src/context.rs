//! The routing context: a validated shape bound to an engine.
//!
//! A [`Context`] owns the problem shape, the engine, an optional adjunct
//! domain value and every attached dimension. The index manager and the
//! engine model are created lazily, at most once, and released together by
//! [`Context::dispose`]. Once either handle exists the shape is frozen.

use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::dimension::{Dimension, Dimensions, TransitShape};
use crate::engine::{EngineError, RoutingEngine, RoutingModel};
use crate::index::IndexManager;
use crate::shape::{ConfigurationError, Endpoint, ProblemShape, RoutingShape};

/// Errors raised by [`Context`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The shape failed validation.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    /// A structural change was attempted after engine handles were created.
    #[error("context structure is frozen once engine handles exist")]
    Frozen,
    /// Engine access was attempted after [`Context::dispose`].
    #[error("context has been disposed")]
    Disposed,
    /// A node id does not address a node.
    #[error("node {node} is out of range: expected a node in [0, {node_count})")]
    NodeOutOfRange {
        /// Offending node.
        node: usize,
        /// Exclusive upper bound.
        node_count: usize,
    },
    /// A node only ever ends routes and therefore has no index of its own.
    #[error("node {node} has no index: it is only used as a route end")]
    UnindexedNode {
        /// Offending node.
        node: usize,
    },
    /// An engine index does not address the index space.
    #[error("index {index} is out of range: expected an index in [0, {index_count})")]
    IndexOutOfRange {
        /// Offending index.
        index: i64,
        /// Exclusive upper bound.
        index_count: usize,
    },
    /// The engine rejected a request.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Validated shape plus lazily created engine handles.
///
/// # Examples
/// ```
/// use routewright_core::Context;
/// use routewright_core::test_support::ScriptedEngine;
///
/// # fn main() -> Result<(), routewright_core::ContextError> {
/// let mut context = Context::with_depot(ScriptedEngine::default(), 3, 1, 0)?;
/// assert_eq!(context.node_to_index(2)?, 2);
/// assert_eq!(context.index_to_node(3)?, 0);
/// context.dispose();
/// assert!(context.node_to_index(2).is_err());
/// # Ok(())
/// # }
/// ```
pub struct Context<E: RoutingEngine, A = ()> {
    engine: E,
    shape: RoutingShape,
    adjunct: A,
    dimensions: Dimensions,
    // Declared before `model` so an implicit drop releases the manager first.
    manager: OnceCell<IndexManager>,
    model: Option<E::Model>,
    registration_open: bool,
    disposed: bool,
}

impl<E: RoutingEngine, A> fmt::Debug for Context<E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("shape", &self.shape)
            .field("dimensions", &self.dimensions.names().collect::<Vec<_>>())
            .field("has_manager", &self.manager.get().is_some())
            .field("has_model", &self.model.is_some())
            .field("registration_open", &self.registration_open)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl<E: RoutingEngine> Context<E> {
    /// Bind a validated shape to `engine`.
    #[must_use]
    pub fn new(engine: E, shape: RoutingShape) -> Self {
        Self::with_adjunct(engine, shape, ())
    }

    /// Every vehicle starts and ends at `depot`.
    pub fn with_depot(
        engine: E,
        node_count: usize,
        vehicle_count: usize,
        depot: usize,
    ) -> Result<Self, ContextError> {
        let shape = RoutingShape::with_depot(node_count, vehicle_count, depot)?;
        Ok(Self::new(engine, shape))
    }

    /// Vehicle `v` starts at `starts[v]` and ends at `ends[v]`.
    pub fn with_starts_and_ends(
        engine: E,
        node_count: usize,
        vehicle_count: usize,
        starts: &[usize],
        ends: &[usize],
    ) -> Result<Self, ContextError> {
        let shape = RoutingShape::with_starts_and_ends(node_count, vehicle_count, starts, ends)?;
        Ok(Self::new(engine, shape))
    }

    /// Explicit per-vehicle endpoints.
    pub fn with_endpoints(
        engine: E,
        node_count: usize,
        vehicle_count: usize,
        endpoints: Vec<Endpoint>,
    ) -> Result<Self, ContextError> {
        let shape = RoutingShape::with_endpoints(node_count, vehicle_count, endpoints)?;
        Ok(Self::new(engine, shape))
    }
}

impl<E: RoutingEngine, A> Context<E, A> {
    /// Bind a validated shape and a domain value to `engine`.
    #[must_use]
    pub fn with_adjunct(engine: E, shape: RoutingShape, adjunct: A) -> Self {
        Self {
            engine,
            shape,
            adjunct,
            dimensions: Dimensions::default(),
            manager: OnceCell::new(),
            model: None,
            registration_open: true,
            disposed: false,
        }
    }

    /// The validated shape.
    #[must_use]
    pub const fn shape(&self) -> &RoutingShape {
        &self.shape
    }

    /// Replace the shape while no engine handle exists.
    pub fn set_shape(&mut self, shape: RoutingShape) -> Result<(), ContextError> {
        self.ensure_mutable()?;
        self.shape = shape;
        Ok(())
    }

    /// The engine this context builds its model with.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// The adjunct domain value.
    #[must_use]
    pub const fn adjunct(&self) -> &A {
        &self.adjunct
    }

    /// Mutable access to the adjunct while no engine handle exists.
    pub fn adjunct_mut(&mut self) -> Result<&mut A, ContextError> {
        self.ensure_mutable()?;
        Ok(&mut self.adjunct)
    }

    /// Number of domain nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.shape.node_count()
    }

    /// Number of vehicles.
    #[must_use]
    pub fn vehicle_count(&self) -> usize {
        self.shape.vehicle_count()
    }

    /// Distinct nodes used as a route start or end.
    #[must_use]
    pub fn depot_nodes(&self) -> BTreeSet<usize> {
        self.shape.depot_nodes()
    }

    /// Whether `node` starts or ends some route.
    #[must_use]
    pub fn is_terminal(&self, node: usize) -> bool {
        self.shape.is_terminal(node)
    }

    /// The index manager, created on first use.
    pub fn manager(&self) -> Result<&IndexManager, ContextError> {
        self.ensure_live()?;
        Ok(self.manager.get_or_init(|| {
            log::debug!("creating index manager");
            IndexManager::new(&self.shape)
        }))
    }

    /// The engine model, created on first use.
    pub fn model_mut(&mut self) -> Result<&mut E::Model, ContextError> {
        self.ensure_live()?;
        let model = match self.model.take() {
            Some(model) => model,
            None => {
                let manager = self.manager()?.clone();
                log::debug!("creating engine model over {} indices", manager.index_count());
                self.engine.create_model(&manager)?
            }
        };
        Ok(self.model.insert(model))
    }

    /// The engine model, if it has been created.
    #[must_use]
    pub const fn model(&self) -> Option<&E::Model> {
        self.model.as_ref()
    }

    /// Whether any engine handle exists.
    #[must_use]
    pub fn has_handles(&self) -> bool {
        self.manager.get().is_some() || self.model.is_some()
    }

    /// Whether [`Context::dispose`] has run.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release the index manager, then the model. Later calls do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        drop(self.manager.take());
        drop(self.model.take());
        log::debug!("context disposed");
    }

    /// Engine index of `node`.
    pub fn node_to_index(&self, node: usize) -> Result<i64, ContextError> {
        let manager = self.manager()?;
        if node >= manager.node_count() {
            return Err(ContextError::NodeOutOfRange {
                node,
                node_count: manager.node_count(),
            });
        }
        manager
            .node_to_index(node)
            .ok_or(ContextError::UnindexedNode { node })
    }

    /// Domain node addressed by `index`.
    pub fn index_to_node(&self, index: i64) -> Result<usize, ContextError> {
        let manager = self.manager()?;
        manager
            .index_to_node(index)
            .ok_or(ContextError::IndexOutOfRange {
                index,
                index_count: manager.index_count(),
            })
    }

    /// Engine indices of several nodes, failing on the first untranslatable one.
    pub fn nodes_to_indices(&self, nodes: &[usize]) -> Result<Vec<i64>, ContextError> {
        nodes.iter().map(|&node| self.node_to_index(node)).collect()
    }

    /// Require `pickup` and `delivery` on the same route, pickup first.
    pub fn add_pickup_and_delivery(
        &mut self,
        pickup: usize,
        delivery: usize,
    ) -> Result<(), ContextError> {
        let pickup_index = self.node_to_index(pickup)?;
        let delivery_index = self.node_to_index(delivery)?;
        self.model_mut()?
            .add_pickup_and_delivery(pickup_index, delivery_index)?;
        Ok(())
    }

    /// Allow `nodes` to stay unvisited at `penalty` each.
    pub fn add_disjunction(&mut self, nodes: &[usize], penalty: i64) -> Result<(), ContextError> {
        let indices = self.nodes_to_indices(nodes)?;
        self.model_mut()?.add_disjunction(&indices, penalty)?;
        Ok(())
    }

    /// Every attached dimension, in attachment order.
    #[must_use]
    pub const fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Look up an attached dimension by name.
    #[must_use]
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.get(name)
    }

    /// Attached dimensions with the given transit shape.
    pub fn dimensions_with_shape(
        &self,
        shape: TransitShape,
    ) -> impl Iterator<Item = &Dimension> + '_ {
        self.dimensions.with_shape(shape)
    }

    /// Whether dimensions may still be attached.
    #[must_use]
    pub const fn is_registration_open(&self) -> bool {
        self.registration_open
    }

    /// Refuse further dimension attachment.
    pub fn close_registration(&mut self) {
        if self.registration_open {
            log::debug!(
                "dimension registration closed with {} dimensions",
                self.dimensions.len()
            );
        }
        self.registration_open = false;
    }

    pub(crate) const fn dimensions_mut(&mut self) -> &mut Dimensions {
        &mut self.dimensions
    }

    fn ensure_live(&self) -> Result<(), ContextError> {
        if self.disposed {
            Err(ContextError::Disposed)
        } else {
            Ok(())
        }
    }

    fn ensure_mutable(&self) -> Result<(), ContextError> {
        self.ensure_live()?;
        if self.has_handles() {
            Err(ContextError::Frozen)
        } else {
            Ok(())
        }
    }
}

/// A context mutator applied once before dimensions are attached.
///
/// Closures of the right shape are visitors.
pub trait ContextVisitor<E: RoutingEngine, A> {
    /// Adjust the context.
    fn visit(&mut self, context: &mut Context<E, A>) -> Result<(), ContextError>;
}

impl<E, A, F> ContextVisitor<E, A> for F
where
    E: RoutingEngine,
    F: FnMut(&mut Context<E, A>) -> Result<(), ContextError>,
{
    fn visit(&mut self, context: &mut Context<E, A>) -> Result<(), ContextError> {
        self(context)
    }
}
