//! Criterion benchmarks for solve-and-walk orchestration.
//!
//! Replays a deterministic plan through the scripted engine so the numbers
//! measure callback registration, assignment checking and the walk itself,
//! not a search.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package routewright-core
//! ```

#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use routewright_core::dimension::{Dimension, DimensionCapacity};
use routewright_core::observe::{ArcCostAccumulator, PathCollector};
use routewright_core::test_support::ScriptedEngine;
use routewright_core::{Context, DimensionError, ProblemDefinition, ProblemSolver, WalkListeners};

/// Seed for deterministic coordinates.
const BENCHMARK_SEED: u64 = 42;

/// Node counts to benchmark, depot included.
const PROBLEM_SIZES: &[usize] = &[50, 100, 200];

/// Vehicles sharing the depot.
const VEHICLES: usize = 4;

struct Euclidean {
    matrix: Vec<Vec<i64>>,
}

impl ProblemDefinition<ScriptedEngine> for Euclidean {
    fn add_dimensions(
        &mut self,
        context: &mut Context<ScriptedEngine>,
    ) -> Result<(), DimensionError> {
        Dimension::builder("Distance")
            .matrix(self.matrix.clone())
            .non_negative()
            .capacity(DimensionCapacity::uniform(i64::MAX / 2))
            .arc_cost()
            .attach(context)?;
        Ok(())
    }
}

/// Rounded Euclidean distances between `count` seeded points in a
/// 1000 x 1000 square.
fn euclidean_matrix(count: usize, seed: u64) -> Vec<Vec<i64>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let points: Vec<(f64, f64)> = (0..count)
        .map(|_| (rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0)))
        .collect();
    points
        .iter()
        .map(|&(x1, y1)| {
            points
                .iter()
                .map(|&(x2, y2)| (x2 - x1).hypot(y2 - y1).round() as i64)
                .collect()
        })
        .collect()
}

/// Deal every non-depot node to the vehicles round-robin.
fn round_robin(count: usize) -> Vec<Vec<usize>> {
    let mut routes = vec![Vec::new(); VEHICLES];
    for node in 1..count {
        routes[node % VEHICLES].push(node);
    }
    routes
}

fn bench_solve_and_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_and_walk");
    group.measurement_time(Duration::from_secs(5));

    for &size in PROBLEM_SIZES {
        let matrix = euclidean_matrix(size, BENCHMARK_SEED);
        let routes = round_robin(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("nodes", size), &size, |b, &size| {
            b.iter(|| {
                let engine = ScriptedEngine::solving_with(routes.clone());
                let context =
                    Context::with_depot(engine, size, VEHICLES, 0).expect("valid depot");
                let mut solver = ProblemSolver::new(
                    context,
                    Euclidean {
                        matrix: matrix.clone(),
                    },
                );
                let mut paths = PathCollector::default();
                let mut costs = ArcCostAccumulator::new("Distance");
                let mut listeners: WalkListeners<'_> = WalkListeners::new();
                listeners.attach(&mut paths).attach(&mut costs);
                solver.solve(&mut listeners).expect("plan walks")
            });
        });
    }

    group.finish();
}

fn bench_cached_transit(c: &mut Criterion) {
    let size = 200;
    let matrix = euclidean_matrix(size, BENCHMARK_SEED);
    let mut context =
        Context::with_depot(ScriptedEngine::default(), size, 1, 0).expect("valid depot");
    let distance = Dimension::builder("Distance")
        .matrix(matrix)
        .attach(&mut context)
        .expect("attach");

    c.bench_function("cached_transit_200", |b| {
        b.iter(|| {
            let mut total = 0_i64;
            for from in 0..size {
                for to in 0..size {
                    total += distance.transit(from, to);
                }
            }
            total
        });
    });
}

criterion_group!(benches, bench_solve_and_walk, bench_cached_transit);
criterion_main!(benches);
