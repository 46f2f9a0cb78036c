//! Benchmark support utilities for waypoint ordering and loop search.
//!
//! Generates deterministic waypoint sets scattered around a fixed centre so
//! successive runs measure the same work.

use boucle_core::{GeoPoint, RouteLocation};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed for deterministic random number generation in benchmarks.
pub const BENCHMARK_SEED: u64 = 42;

/// Centre of the generated waypoints (central Paris).
pub const CENTRE: GeoPoint = GeoPoint::new(48.8566, 2.3522);

/// Half-width of the square waypoints are drawn from, in degrees.
/// 0.03 degrees of latitude is roughly 3.3 km.
const SPREAD_DEG: f64 = 0.03;

/// Generate `count` labelled waypoints around [`CENTRE`].
#[must_use]
pub fn generate_waypoints(count: usize, seed: u64) -> Vec<RouteLocation> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            #[expect(clippy::float_arithmetic, reason = "Required for coordinate offset")]
            let point = GeoPoint::new(
                CENTRE.lat + rng.gen_range(-SPREAD_DEG..SPREAD_DEG),
                CENTRE.lon + rng.gen_range(-SPREAD_DEG..SPREAD_DEG),
            );
            RouteLocation::new(point, format!("wp{i}"))
        })
        .collect()
}
