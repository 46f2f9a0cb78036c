//! Exact open-path ordering by dynamic programming over visited subsets.

use boucle_core::GeoPoint;
use boucle_core::geometry::haversine_distance;

const NO_PARENT: usize = usize::MAX;

/// Visiting order minimising `start → … → destination`.
///
/// `dp[mask][last]` holds the cheapest path from `start` through exactly the
/// waypoints in `mask`, ending at `last`. Without a destination the final
/// leg costs nothing. Returns `None` when no finite path exists. Callers
/// bound `points.len()` by the exact-ordering ceiling.
#[expect(
    clippy::indexing_slicing,
    clippy::float_arithmetic,
    reason = "subset table indices are bounded by the waypoint count"
)]
pub(super) fn exact_order(
    start: GeoPoint,
    destination: Option<GeoPoint>,
    points: &[GeoPoint],
) -> Option<Vec<usize>> {
    let n = points.len();
    if n == 0 {
        return Some(Vec::new());
    }
    let full = (1_usize << n) - 1;
    let legs: Vec<f64> = points
        .iter()
        .flat_map(|a| points.iter().map(move |b| haversine_distance(*a, *b)))
        .collect();
    let end_cost: Vec<f64> = points
        .iter()
        .map(|p| destination.map_or(0.0, |d| haversine_distance(*p, d)))
        .collect();

    let mut cost = vec![f64::INFINITY; (full + 1) * n];
    let mut parent = vec![NO_PARENT; (full + 1) * n];
    for (i, point) in points.iter().enumerate() {
        cost[(1 << i) * n + i] = haversine_distance(start, *point);
    }

    for mask in 1..=full {
        for last in 0..n {
            if mask & (1 << last) == 0 {
                continue;
            }
            let current = cost[mask * n + last];
            if !current.is_finite() {
                continue;
            }
            for next in 0..n {
                if mask & (1 << next) != 0 {
                    continue;
                }
                let grown = mask | (1 << next);
                let candidate = current + legs[last * n + next];
                if candidate < cost[grown * n + next] {
                    cost[grown * n + next] = candidate;
                    parent[grown * n + next] = last;
                }
            }
        }
    }

    let mut best: Option<(usize, f64)> = None;
    for last in 0..n {
        let total = cost[full * n + last] + end_cost[last];
        if total.is_finite() && best.is_none_or(|(_, b)| total < b) {
            best = Some((last, total));
        }
    }
    let (mut last, _) = best?;

    let mut order = Vec::with_capacity(n);
    let mut mask = full;
    loop {
        order.push(last);
        let previous = parent[mask * n + last];
        mask &= !(1 << last);
        if previous == NO_PARENT {
            break;
        }
        last = previous;
    }
    order.reverse();
    (order.len() == n).then_some(order)
}
