//! Route-optimisation engine for Routewright backed by `vrp-core`.
//!
//! [`VrpEngine`] implements [`RoutingEngine`](routewright_core::RoutingEngine).
//! Models record their callbacks through
//! [`ModelRecord`](routewright_core::engine::ModelRecord); at solve time the
//! record is evaluated into dense index-space matrices and handed to the
//! `vrp-core` metaheuristics. The best tour of every vehicle comes back as a
//! [`RouteAssignment`](routewright_core::engine::RouteAssignment), so the
//! objective and cumulative values match what the scripted engine reports
//! for the same routes.
//!
//! `vrp-core` only understands a subset of the model:
//!
//! - the arc cost evaluator becomes the travelled distance;
//! - the first pairwise dimension becomes the shift duration, its capacity
//!   the latest return time of each vehicle;
//! - the first single-index dimension becomes the vehicle load;
//! - pickup and delivery pairs become pickup/drop-off jobs;
//! - single-index disjunctions mark jobs as optional.
//!
//! Span cost coefficients are charged on the returned routes but do not steer
//! the search.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod engine;
mod vrp;

pub use engine::{VrpEngine, VrpEngineConfig, VrpModel};
