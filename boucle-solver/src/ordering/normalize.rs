//! Waypoint clean-up applied before any ordering.

use boucle_core::geometry::haversine_distance;
use boucle_core::{GeoPoint, RouteLocation};
use log::debug;

/// Drop unusable waypoints and label the rest.
///
/// Removes, in order of precedence: points with non-finite or out-of-range
/// coordinates, points closer than `min_separation_m` to `start`, and points
/// closer than `min_separation_m` to an earlier survivor (first occurrence
/// wins). Blank labels are replaced with the coordinate label.
///
/// # Examples
/// ```
/// use boucle_core::{GeoPoint, RouteLocation};
/// use boucle_solver::normalize_waypoints;
///
/// let start = GeoPoint::new(48.0, 2.0);
/// let waypoints = [
///     RouteLocation::new(GeoPoint::new(f64::NAN, 2.0), "broken"),
///     RouteLocation::new(GeoPoint::new(48.01, 2.0), ""),
///     RouteLocation::new(GeoPoint::new(48.01, 2.00001), "duplicate"),
/// ];
/// let kept = normalize_waypoints(start, &waypoints, 15.0);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].label, "48.01000,2.00000");
/// ```
#[must_use]
pub fn normalize_waypoints(
    start: GeoPoint,
    waypoints: &[RouteLocation],
    min_separation_m: f64,
) -> Vec<RouteLocation> {
    let mut kept: Vec<RouteLocation> = Vec::with_capacity(waypoints.len());
    for waypoint in waypoints {
        if !waypoint.point.is_valid() {
            debug!("dropping waypoint {:?} with invalid coordinates", waypoint.label);
            continue;
        }
        if haversine_distance(start, waypoint.point) < min_separation_m {
            debug!("dropping waypoint {:?} next to the start", waypoint.label);
            continue;
        }
        if kept
            .iter()
            .any(|k| haversine_distance(k.point, waypoint.point) < min_separation_m)
        {
            debug!("dropping duplicate waypoint {:?}", waypoint.label);
            continue;
        }
        kept.push(waypoint.clone().with_default_label());
    }
    kept
}
