//! Greedy nearest-neighbour ordering with a destination bias.

use boucle_core::GeoPoint;
use boucle_core::geometry::haversine_distance;

/// Repeatedly visit the waypoint minimising
/// `dist(current, c) + end_weight × dist(c, destination)`.
///
/// Ties keep the earliest waypoint. Without a destination the bias term is
/// zero.
#[expect(clippy::float_arithmetic, reason = "biased distance heuristic")]
pub(super) fn greedy_order(
    start: GeoPoint,
    destination: Option<GeoPoint>,
    points: &[GeoPoint],
    end_weight: f64,
) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut order = Vec::with_capacity(points.len());
    let mut current = start;

    while !remaining.is_empty() {
        let mut chosen: Option<(usize, f64)> = None;
        for (slot, &index) in remaining.iter().enumerate() {
            let Some(&point) = points.get(index) else {
                continue;
            };
            let bias = destination.map_or(0.0, |d| haversine_distance(point, d));
            let score = haversine_distance(current, point) + end_weight * bias;
            if chosen.is_none_or(|(_, best)| score < best) {
                chosen = Some((slot, score));
            }
        }
        // NaN scores never compare lower, so fall back to the first slot.
        let slot = chosen.map_or(0, |(slot, _)| slot);
        let index = remaining.remove(slot);
        if let Some(&point) = points.get(index) {
            current = point;
        }
        order.push(index);
    }
    order
}
