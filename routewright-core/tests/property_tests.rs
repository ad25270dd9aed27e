//! Property-based tests for index translation and solution walks.
//!
//! # Invariants tested
//!
//! - **Round trip:** every indexed node translates back to itself.
//! - **Endpoints:** start and end slots translate to the configured nodes.
//! - **Depot layout:** a shared depot yields `nodes + 2 * vehicles - 1`
//!   indices.
//! - **Coverage:** a walk reports every scripted stop exactly once, each
//!   route opening and closing at the depot.

use std::collections::HashSet;

use proptest::prelude::*;
use routewright_core::observe::PathCollector;
use routewright_core::test_support::ScriptedEngine;
use routewright_core::{
    Context, DimensionError, IndexManager, ProblemDefinition, ProblemSolver, RoutingShape,
    WalkListeners,
};

struct NoDimensions;

impl ProblemDefinition<ScriptedEngine> for NoDimensions {
    fn add_dimensions(
        &mut self,
        _context: &mut Context<ScriptedEngine>,
    ) -> Result<(), DimensionError> {
        Ok(())
    }
}

/// Node count, starts and ends for up to five vehicles.
fn endpoints_strategy() -> impl Strategy<Value = (usize, Vec<usize>, Vec<usize>)> {
    (1_usize..15, 1_usize..6).prop_flat_map(|(nodes, vehicles)| {
        (
            Just(nodes),
            prop::collection::vec(0..nodes, vehicles),
            prop::collection::vec(0..nodes, vehicles),
        )
    })
}

/// Node count and per-vehicle stops covering every non-depot node once.
fn plan_strategy() -> impl Strategy<Value = (usize, Vec<Vec<usize>>)> {
    (2_usize..20, 1_usize..5)
        .prop_flat_map(|(nodes, vehicles)| {
            let stops: Vec<usize> = (1..nodes).collect();
            (
                Just(nodes),
                Just(vehicles),
                Just(stops).prop_shuffle(),
                prop::collection::vec(0..vehicles, nodes - 1),
            )
        })
        .prop_map(|(nodes, vehicles, stops, owners)| {
            let mut routes = vec![Vec::new(); vehicles];
            for (stop, owner) in stops.into_iter().zip(owners) {
                routes[owner].push(stop);
            }
            (nodes, routes)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: indexed nodes round-trip and slots land on their endpoints.
    #[test]
    fn index_space_round_trips((nodes, starts, ends) in endpoints_strategy()) {
        let vehicles = starts.len();
        let shape = RoutingShape::with_starts_and_ends(nodes, vehicles, &starts, &ends)
            .expect("endpoints are in range");
        let manager = IndexManager::new(&shape);

        for node in 0..nodes {
            if let Some(index) = manager.node_to_index(node) {
                prop_assert_eq!(manager.index_to_node(index), Some(node));
            }
        }
        let mut slots = HashSet::new();
        for vehicle in 0..vehicles {
            let start = manager.vehicle_start_index(vehicle).expect("start slot");
            let end = manager.vehicle_end_index(vehicle).expect("end slot");
            prop_assert_eq!(manager.index_to_node(start), Some(starts[vehicle]));
            prop_assert_eq!(manager.index_to_node(end), Some(ends[vehicle]));
            prop_assert!(manager.is_start(start) && manager.is_end(end));
            prop_assert!(slots.insert(start), "start slot {} is shared", start);
            prop_assert!(slots.insert(end), "end slot {} is shared", end);
        }
        prop_assert_eq!(
            manager.visit_indices().count(),
            manager.index_count() - 2 * vehicles
        );
        prop_assert!(manager.index_to_node(manager.index_count() as i64).is_none());
    }

    /// Property: a shared depot adds one start per extra vehicle and one end
    /// per vehicle.
    #[test]
    fn depot_layout_size(nodes in 1_usize..40, vehicles in 1_usize..8, seed in any::<usize>()) {
        let depot = seed % nodes;
        let shape = RoutingShape::with_depot(nodes, vehicles, depot).expect("depot in range");
        let manager = IndexManager::new(&shape);
        prop_assert_eq!(manager.index_count(), nodes + 2 * vehicles - 1);
        prop_assert_eq!(manager.vehicle_start_index(0), manager.node_to_index(depot));
    }

    /// Property: every scripted stop is walked exactly once.
    #[test]
    fn walks_cover_every_stop((nodes, routes) in plan_strategy()) {
        let vehicles = routes.len();
        let context = Context::with_depot(ScriptedEngine::solving_with(routes.clone()), nodes, vehicles, 0)
            .expect("depot in range");
        let mut solver = ProblemSolver::new(context, NoDimensions);
        let mut paths = PathCollector::default();
        let mut listeners: WalkListeners<'_> = WalkListeners::new();
        listeners.attach(&mut paths);
        let outcome = solver.solve(&mut listeners).expect("plan walks");
        drop(listeners);

        let summary = outcome.summary().expect("plan is solved");
        prop_assert_eq!(summary.steps, nodes - 1 + vehicles);
        prop_assert_eq!(
            summary.vehicles_used,
            routes.iter().filter(|route| !route.is_empty()).count()
        );
        let mut visited = Vec::new();
        for (vehicle, path) in paths.paths().iter().enumerate() {
            prop_assert_eq!(path.first(), Some(&0));
            prop_assert_eq!(path.last(), Some(&0));
            prop_assert_eq!(&path[1..path.len() - 1], routes[vehicle].as_slice());
            visited.extend_from_slice(&path[1..path.len() - 1]);
        }
        visited.sort_unstable();
        prop_assert_eq!(visited, (1..nodes).collect::<Vec<_>>());
    }
}
