//! Criterion benchmarks for waypoint ordering and loop search.
//!
//! Measures exact ordering near its ceiling, the greedy fallback on larger
//! sets, and a complete loop search against the straight-line provider.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package boucle-solver
//! ```

// Criterion macros generate code that triggers missing_docs warnings.
#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use std::time::Duration;

use boucle_core::TravelProfile;
use boucle_core::test_support::StraightLineRoutingProvider;
use boucle_solver::{LoopSearch, LoopSearchRequest, WaypointOrderer};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

mod bench_support;

use bench_support::{BENCHMARK_SEED, CENTRE, generate_waypoints};

/// Waypoint counts handled by the exact dynamic programme.
const EXACT_SIZES: &[usize] = &[6, 9, 12];

/// Waypoint counts handled by the greedy fallback.
const GREEDY_SIZES: &[usize] = &[25, 100, 400];

/// Loop lengths to search for, in kilometres.
const LOOP_TARGETS_KM: &[u32] = &[5, 10, 40];

fn bench_ordering(c: &mut Criterion, name: &str, sizes: &[usize]) {
    let mut group = c.benchmark_group(name);
    group.measurement_time(Duration::from_secs(5));
    let orderer = WaypointOrderer::new();

    for &size in sizes {
        let waypoints = generate_waypoints(size, BENCHMARK_SEED);

        #[expect(
            clippy::as_conversions,
            reason = "Safe conversion for small problem sizes"
        )]
        let throughput_size = size as u64;
        group.throughput(Throughput::Elements(throughput_size));
        group.bench_with_input(BenchmarkId::new("waypoints", size), &waypoints, |b, wps| {
            b.iter(|| orderer.order_for_loop(CENTRE, wps));
        });
    }

    group.finish();
}

fn bench_exact_ordering(c: &mut Criterion) {
    bench_ordering(c, "exact_ordering", EXACT_SIZES);
}

fn bench_greedy_ordering(c: &mut Criterion) {
    bench_ordering(c, "greedy_ordering", GREEDY_SIZES);
}

fn bench_loop_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("loop_search");
    let search = LoopSearch::new(StraightLineRoutingProvider::default());

    for &target in LOOP_TARGETS_KM {
        let request = LoopSearchRequest::new(CENTRE, f64::from(target), TravelProfile::Cycling);
        group.bench_with_input(BenchmarkId::new("target_km", target), &request, |b, req| {
            b.iter(|| {
                #[expect(
                    clippy::let_underscore_must_use,
                    reason = "Benchmarking search performance, result is intentionally discarded"
                )]
                let _ = search.search(req);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_exact_ordering,
    bench_greedy_ordering,
    bench_loop_search
);
criterion_main!(benches);
