//! Synthetic loop shapes around a start point.
//!
//! A loop candidate is a pair of points placed on two bearings around the
//! start. Routing `start → A → B → start` (with any user waypoints ordered
//! in) gives a roughly triangular loop whose size scales with the target
//! distance. Jitter comes from a `ChaCha8Rng` seeded by a stable hash of the
//! request, so identical requests always see identical candidates.

use boucle_core::geometry::offset;
use boucle_core::{GeoPoint, RouteLocation};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ordering::{WaypointOrderer, path_length_m};

/// Number of candidates generated per request.
pub const CANDIDATE_COUNT: usize = 14;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Tunables for [`LoopCandidateGenerator`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CandidateConfig {
    /// Candidates generated per request.
    pub count: usize,
    /// Lower bound on the base radius, in kilometres.
    pub min_base_radius_km: f64,
    /// Target distance divided by this gives the base radius.
    pub radius_divisor: f64,
    /// Opening angles between the two bearings, cycled per candidate.
    pub opening_angles_deg: Vec<f64>,
    /// Radius multipliers, cycled every `opening_angles_deg.len()`
    /// candidates.
    pub radius_factors: Vec<f64>,
    /// Bearing jitter as a fraction of the angular step, split evenly either
    /// side.
    pub jitter_fraction: f64,
    /// Range of the extra multiplier applied to the second radius.
    pub second_radius_spread: (f64, f64),
    /// Estimated loops shorter than this fraction of the target are dropped.
    pub min_estimate_ratio: f64,
    /// Estimated loops longer than this fraction of the target are dropped.
    pub max_estimate_ratio: f64,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            count: CANDIDATE_COUNT,
            min_base_radius_km: 0.8,
            radius_divisor: 3.4,
            opening_angles_deg: vec![70.0, 90.0, 110.0, 130.0],
            radius_factors: vec![0.85, 1.0, 1.15],
            jitter_fraction: 0.4,
            second_radius_spread: (0.9, 1.1),
            min_estimate_ratio: 0.6,
            max_estimate_ratio: 1.4,
        }
    }
}

/// Two synthetic points defining a loop shape.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoopCandidate {
    /// Position in generation order.
    pub index: usize,
    /// First synthetic point.
    pub point_a: GeoPoint,
    /// Second synthetic point.
    pub point_b: GeoPoint,
    /// Bearing of `point_a` from the start, in degrees.
    pub bearing_deg: f64,
    /// Distance of `point_a` from the start, in kilometres.
    pub radius_km: f64,
}

/// A candidate that survived the length estimate, with its visiting order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedLoop {
    /// Source candidate.
    pub candidate: LoopCandidate,
    /// Locations to visit between leaving and returning to the start.
    pub ordered: Vec<RouteLocation>,
    /// Great-circle length of the closed loop, in kilometres.
    pub estimated_km: f64,
}

/// Stable seed for a loop request.
///
/// FNV-1a over the bit patterns of the start coordinates and target
/// distance, then the variation counter.
///
/// # Examples
/// ```
/// use boucle_core::GeoPoint;
/// use boucle_solver::candidate_seed;
///
/// let start = GeoPoint::new(48.8566, 2.3522);
/// assert_eq!(candidate_seed(start, 10.0, 0), candidate_seed(start, 10.0, 0));
/// assert_ne!(candidate_seed(start, 10.0, 0), candidate_seed(start, 10.0, 1));
/// ```
#[must_use]
pub fn candidate_seed(start: GeoPoint, target_km: f64, variation: u64) -> u64 {
    [
        start.lat.to_bits(),
        start.lon.to_bits(),
        target_km.to_bits(),
        variation,
    ]
    .into_iter()
    .fold(FNV_OFFSET_BASIS, fnv1a_word)
}

fn fnv1a_word(hash: u64, word: u64) -> u64 {
    (0..8).fold(hash, |acc, byte| {
        let octet = (word >> (byte * 8)) & 0xff;
        (acc ^ octet).wrapping_mul(FNV_PRIME)
    })
}

/// Generates and pre-filters loop candidates.
#[derive(Debug, Clone, Default)]
pub struct LoopCandidateGenerator {
    config: CandidateConfig,
    orderer: WaypointOrderer,
}

impl LoopCandidateGenerator {
    /// Construct a generator with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a generator with explicit configuration.
    #[must_use]
    pub const fn with_config(config: CandidateConfig, orderer: WaypointOrderer) -> Self {
        Self { config, orderer }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CandidateConfig {
        &self.config
    }

    /// Base radius for `target_km`, in kilometres.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "radius heuristic")]
    pub fn base_radius_km(&self, target_km: f64) -> f64 {
        (target_km / self.config.radius_divisor).max(self.config.min_base_radius_km)
    }

    /// Generate the configured number of candidates around `start`.
    ///
    /// Deterministic in `(start, target_km, variation)`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        clippy::integer_division,
        reason = "candidate geometry is computed in floating point from small indices"
    )]
    pub fn generate(&self, start: GeoPoint, target_km: f64, variation: u64) -> Vec<LoopCandidate> {
        let count = self.config.count;
        if count == 0 {
            return Vec::new();
        }
        let mut rng = ChaCha8Rng::seed_from_u64(candidate_seed(start, target_km, variation));
        let step = 360.0 / count as f64;
        let half_jitter = (self.config.jitter_fraction * step / 2.0).abs();
        let base_km = self.base_radius_km(target_km);
        let angles = &self.config.opening_angles_deg;
        let factors = &self.config.radius_factors;
        let (spread_lo, spread_hi) = ordered_pair(self.config.second_radius_spread);

        (0..count)
            .map(|i| {
                let angle = cycle(angles, i).unwrap_or(90.0);
                let factor = cycle(factors, i / angles.len().max(1)).unwrap_or(1.0);
                let jitter = if half_jitter > 0.0 {
                    rng.gen_range(-half_jitter..=half_jitter)
                } else {
                    0.0
                };
                let spread = rng.gen_range(spread_lo..=spread_hi);
                let bearing = step * i as f64 + jitter;
                let radius_km = base_km * factor;
                LoopCandidate {
                    index: i,
                    point_a: offset(start, radius_km * 1_000.0, bearing),
                    point_b: offset(start, radius_km * spread * 1_000.0, bearing + angle),
                    bearing_deg: bearing,
                    radius_km,
                }
            })
            .collect()
    }

    /// Generate candidates, order each with `waypoints` as a loop and keep
    /// those whose estimated length is plausible for `target_km`.
    ///
    /// Survivors keep generation order.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "length estimate bounds")]
    pub fn plan(
        &self,
        start: GeoPoint,
        target_km: f64,
        waypoints: &[RouteLocation],
        variation: u64,
    ) -> Vec<PlannedLoop> {
        let min_km = target_km * self.config.min_estimate_ratio;
        let max_km = target_km * self.config.max_estimate_ratio;
        self.generate(start, target_km, variation)
            .into_iter()
            .filter_map(|candidate| {
                let mut combined = Vec::with_capacity(waypoints.len() + 2);
                combined.push(RouteLocation::unlabelled(candidate.point_a));
                combined.push(RouteLocation::unlabelled(candidate.point_b));
                combined.extend_from_slice(waypoints);
                let ordered = self.orderer.order_for_loop(start, &combined);
                let estimated_km = path_length_m(start, &ordered, Some(start)) / 1_000.0;
                if (min_km..=max_km).contains(&estimated_km) {
                    Some(PlannedLoop {
                        candidate,
                        ordered,
                        estimated_km,
                    })
                } else {
                    debug!(
                        "candidate {} estimated at {estimated_km:.2} km, outside {min_km:.2}..={max_km:.2} km",
                        candidate.index
                    );
                    None
                }
            })
            .collect()
    }
}

fn cycle(values: &[f64], i: usize) -> Option<f64> {
    values.get(i.checked_rem(values.len())?).copied()
}

fn ordered_pair((a, b): (f64, f64)) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boucle_core::geometry::haversine_distance;
    use rstest::{fixture, rstest};

    const PARIS: GeoPoint = GeoPoint::new(48.8566, 2.3522);

    #[fixture]
    fn generator() -> LoopCandidateGenerator {
        LoopCandidateGenerator::new()
    }

    #[rstest]
    fn generates_fourteen_candidates(generator: LoopCandidateGenerator) {
        let candidates = generator.generate(PARIS, 10.0, 0);
        assert_eq!(candidates.len(), CANDIDATE_COUNT);
        assert!(
            candidates
                .iter()
                .enumerate()
                .all(|(i, c)| c.index == i && c.point_a.is_valid() && c.point_b.is_valid())
        );
    }

    #[rstest]
    fn identical_inputs_yield_identical_candidates(generator: LoopCandidateGenerator) {
        assert_eq!(
            generator.generate(PARIS, 10.0, 3),
            generator.generate(PARIS, 10.0, 3)
        );
    }

    #[rstest]
    fn variation_changes_candidates(generator: LoopCandidateGenerator) {
        assert_ne!(
            generator.generate(PARIS, 10.0, 0),
            generator.generate(PARIS, 10.0, 1)
        );
    }

    #[rstest]
    #[case(1.0, 0.8)]
    #[case(10.0, 10.0 / 3.4)]
    fn base_radius_has_floor(generator: LoopCandidateGenerator, #[case] target: f64, #[case] expected: f64) {
        assert!((generator.base_radius_km(target) - expected).abs() < 1e-12);
    }

    #[rstest]
    fn radius_factors_cycle_every_four(generator: LoopCandidateGenerator) {
        let base = generator.base_radius_km(10.0);
        let candidates = generator.generate(PARIS, 10.0, 0);
        let factors: Vec<f64> = candidates.iter().map(|c| c.radius_km / base).collect();
        let expected = [
            0.85, 0.85, 0.85, 0.85, 1.0, 1.0, 1.0, 1.0, 1.15, 1.15, 1.15, 1.15, 0.85, 0.85,
        ];
        for (got, want) in factors.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
        }
    }

    #[rstest]
    fn point_a_sits_on_jittered_bearing(generator: LoopCandidateGenerator) {
        let step = 360.0 / 14.0;
        for candidate in generator.generate(PARIS, 10.0, 0) {
            let nominal = step * f64::from(u32::try_from(candidate.index).unwrap_or_default());
            assert!((candidate.bearing_deg - nominal).abs() <= 0.2 * step + 1e-9);
            let distance = haversine_distance(PARIS, candidate.point_a);
            assert!((distance - candidate.radius_km * 1_000.0).abs() < 0.5);
            let second = haversine_distance(PARIS, candidate.point_b);
            assert!(second >= candidate.radius_km * 900.0 - 0.5);
            assert!(second <= candidate.radius_km * 1_100.0 + 0.5);
        }
    }

    #[rstest]
    fn planned_loops_stay_within_estimate_window(generator: LoopCandidateGenerator) {
        let planned = generator.plan(PARIS, 10.0, &[], 0);
        assert!(!planned.is_empty());
        assert!(planned.iter().all(|p| (6.0..=14.0).contains(&p.estimated_km)));
        assert!(planned.windows(2).all(|w| match w {
            [a, b] => a.candidate.index < b.candidate.index,
            _ => true,
        }));
    }

    #[rstest]
    fn distant_waypoint_filters_every_candidate(generator: LoopCandidateGenerator) {
        let far = RouteLocation::new(GeoPoint::new(49.8566, 2.3522), "far away");
        assert!(generator.plan(PARIS, 10.0, &[far], 0).is_empty());
    }

    #[rstest]
    fn seed_depends_on_every_input() {
        let base = candidate_seed(PARIS, 10.0, 0);
        assert_ne!(base, candidate_seed(GeoPoint::new(48.8567, 2.3522), 10.0, 0));
        assert_ne!(base, candidate_seed(GeoPoint::new(48.8566, 2.3523), 10.0, 0));
        assert_ne!(base, candidate_seed(PARIS, 10.5, 0));
    }
}
