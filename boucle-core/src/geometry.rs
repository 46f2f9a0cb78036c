//! Spherical geometry primitives shared by every routing component.
//!
//! Distances use a spherical Earth of radius [`EARTH_RADIUS_M`]. Projections
//! onto segments are computed in a local equirectangular plane anchored at
//! the first segment endpoint; the reported distance is then measured with
//! [`haversine_distance`] between the input and the projected point, so the
//! plane only decides *where* the closest point lies.
//!
//! All functions are total: degenerate segments project to `t = 0` and
//! non-finite distances leave points untouched.

use crate::GeoPoint;

/// Mean Earth radius used for all distance computations, in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Squared planar length (m²) below which a segment is treated as a point.
const DEGENERATE_SEGMENT_M2: f64 = 1e-9;

/// Result of projecting a point onto a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Great-circle distance from the point to the closest point, in metres.
    pub distance_m: f64,
    /// Interpolation fraction of the closest point along the segment.
    pub t: f64,
}

/// Result of finding the closest pair of points between two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPairProjection {
    /// Great-circle distance between the two closest points, in metres.
    pub distance_m: f64,
    /// Interpolation fraction along the route segment.
    pub route_t: f64,
    /// Interpolation fraction along the feature segment.
    pub feature_t: f64,
}

/// Great-circle distance between two points in metres.
///
/// # Examples
/// ```
/// use boucle_core::{GeoPoint, geometry::haversine_distance};
///
/// let a = GeoPoint::new(0.0, 0.0);
/// let b = GeoPoint::new(1.0, 0.0);
/// let d = haversine_distance(a, b);
/// assert!((d - 111_194.93).abs() < 0.01);
/// assert_eq!(haversine_distance(a, a), 0.0);
/// ```
#[must_use]
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let half_dlat = (b.lat - a.lat).to_radians() / 2.0;
    let half_dlon = (b.lon - a.lon).to_radians() / 2.0;
    let h = half_dlat.sin().powi(2) + lat_a.cos() * lat_b.cos() * half_dlon.sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Sum of great-circle legs between consecutive points, in metres.
#[must_use]
pub fn path_length(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| match pair {
            [a, b] => haversine_distance(*a, *b),
            _ => 0.0,
        })
        .sum()
}

/// Move `distance_m` metres from `start` along the initial `bearing_deg`.
///
/// Bearings are clockwise from true north. The resulting longitude is
/// normalised into `[-180, 180]`. A zero (or non-finite) distance returns
/// `start` unchanged.
///
/// # Examples
/// ```
/// use boucle_core::{GeoPoint, geometry::{haversine_distance, offset}};
///
/// let start = GeoPoint::new(48.8566, 2.3522);
/// let moved = offset(start, 2_500.0, 45.0);
/// assert!((haversine_distance(start, moved) - 2_500.0).abs() < 0.01);
/// assert_eq!(offset(start, 0.0, 123.0), start);
/// ```
#[must_use]
pub fn offset(start: GeoPoint, distance_m: f64, bearing_deg: f64) -> GeoPoint {
    if distance_m == 0.0 || !distance_m.is_finite() || !bearing_deg.is_finite() {
        return start;
    }
    let angular = distance_m / EARTH_RADIUS_M;
    let bearing = bearing_deg.to_radians();
    let lat1 = start.lat.to_radians();
    let lon1 = start.lon.to_radians();

    let sin_lat2 = lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * sin_lat2);

    GeoPoint::new(lat2.to_degrees(), normalize_longitude(lon2.to_degrees()))
}

/// Wrap a longitude into `[-180, 180)`, leaving `180` itself untouched.
#[must_use]
pub fn normalize_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Linear interpolation between two points, taking the short way across the
/// antimeridian.
#[must_use]
pub fn interpolate(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    let dlon = normalize_longitude(b.lon - a.lon);
    GeoPoint::new(
        a.lat + (b.lat - a.lat) * t,
        normalize_longitude(a.lon + dlon * t),
    )
}

/// Project `point` onto the segment `seg_a → seg_b`.
///
/// `t` is clamped to `[0, 1]`; zero-length segments yield `t = 0`.
///
/// # Examples
/// ```
/// use boucle_core::{GeoPoint, geometry::project_point_to_segment};
///
/// let a = GeoPoint::new(0.0, 0.0);
/// let b = GeoPoint::new(0.0, 0.01);
/// let projection = project_point_to_segment(GeoPoint::new(0.0, 0.005), a, b);
/// assert!(projection.distance_m < 1e-6);
/// assert!((projection.t - 0.5).abs() < 1e-9);
/// ```
#[must_use]
pub fn project_point_to_segment(
    point: GeoPoint,
    seg_a: GeoPoint,
    seg_b: GeoPoint,
) -> SegmentProjection {
    let plane = LocalPlane::anchored_at(seg_a);
    let (bx, by) = plane.project(seg_b);
    let (px, py) = plane.project(point);
    let length_sq = bx * bx + by * by;
    let t = if length_sq <= DEGENERATE_SEGMENT_M2 {
        0.0
    } else {
        ((px * bx + py * by) / length_sq).clamp(0.0, 1.0)
    };
    let closest = interpolate(seg_a, seg_b, t);
    SegmentProjection {
        distance_m: haversine_distance(point, closest),
        t,
    }
}

/// Closest approach between a route segment and a feature segment.
///
/// Follows the clamped closest-point-between-segments construction: when the
/// segments cross, the distance is zero and both fractions locate the
/// crossing.
#[must_use]
pub fn project_segment_to_segment(
    route_a: GeoPoint,
    route_b: GeoPoint,
    feature_a: GeoPoint,
    feature_b: GeoPoint,
) -> SegmentPairProjection {
    let plane = LocalPlane::anchored_at(route_a);
    let route_dir = plane.project(route_b);
    let feature_start = plane.project(feature_a);
    let feature_end = plane.project(feature_b);
    let feature_dir = (
        feature_end.0 - feature_start.0,
        feature_end.1 - feature_start.1,
    );
    // Vector from the feature start to the route start (the plane origin).
    let r = (-feature_start.0, -feature_start.1);

    let (route_t, feature_t) = closest_fractions(route_dir, feature_dir, r);
    let route_point = interpolate(route_a, route_b, route_t);
    let feature_point = interpolate(feature_a, feature_b, feature_t);
    SegmentPairProjection {
        distance_m: haversine_distance(route_point, feature_point),
        route_t,
        feature_t,
    }
}

fn dot(u: (f64, f64), v: (f64, f64)) -> f64 {
    u.0 * v.0 + u.1 * v.1
}

/// Fractions `(s, t)` of the closest points on `P(s) = d1 * s` and
/// `Q(t) = q0 + d2 * t`, where `r = p0 - q0`.
fn closest_fractions(d1: (f64, f64), d2: (f64, f64), r: (f64, f64)) -> (f64, f64) {
    let a = dot(d1, d1);
    let e = dot(d2, d2);
    let f = dot(d2, r);

    if a <= DEGENERATE_SEGMENT_M2 && e <= DEGENERATE_SEGMENT_M2 {
        return (0.0, 0.0);
    }
    if a <= DEGENERATE_SEGMENT_M2 {
        return (0.0, (f / e).clamp(0.0, 1.0));
    }
    let c = dot(d1, r);
    if e <= DEGENERATE_SEGMENT_M2 {
        return ((-c / a).clamp(0.0, 1.0), 0.0);
    }

    let b = dot(d1, d2);
    let denom = a * e - b * b;
    let s = if denom > f64::EPSILON {
        ((b * f - c * e) / denom).clamp(0.0, 1.0)
    } else {
        // Parallel segments: any s works, the t clamp below fixes the pair.
        0.0
    };
    let t = (b * s + f) / e;
    if t < 0.0 {
        ((-c / a).clamp(0.0, 1.0), 0.0)
    } else if t > 1.0 {
        (((b - c) / a).clamp(0.0, 1.0), 1.0)
    } else {
        (s, t)
    }
}

/// Equirectangular tangent plane in metres around an anchor point.
struct LocalPlane {
    anchor: GeoPoint,
    metres_per_lon_radian: f64,
}

impl LocalPlane {
    fn anchored_at(anchor: GeoPoint) -> Self {
        Self {
            anchor,
            metres_per_lon_radian: EARTH_RADIUS_M * anchor.lat.to_radians().cos(),
        }
    }

    fn project(&self, point: GeoPoint) -> (f64, f64) {
        let dlon = normalize_longitude(point.lon - self.anchor.lon).to_radians();
        let dlat = (point.lat - self.anchor.lat).to_radians();
        (dlon * self.metres_per_lon_radian, dlat * EARTH_RADIUS_M)
    }
}
