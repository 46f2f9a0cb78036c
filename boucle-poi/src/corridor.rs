//! Project POI geometry onto a route.
//!
//! [`CorridorProjector`] precomputes the route's segments and cumulative
//! lengths once and answers two questions per feature: how far it lies from
//! the route, and how far along the route its closest approach is.

use boucle_core::geometry::{
    haversine_distance, interpolate, project_point_to_segment, project_segment_to_segment,
};
use boucle_core::{FeatureGeometry, GeoPoint, RoutePolyline};

/// Segments shorter than this, in metres, are ignored.
pub const MIN_SEGMENT_M: f64 = 0.01;

/// Closest approach of a feature to a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorridorMatch {
    /// Point on the feature closest to the route.
    pub point: GeoPoint,
    /// Distance from the route, in metres. Infinite when the route has no
    /// usable segment.
    pub distance_to_route_m: f64,
    /// Distance from the route start to the closest route point, in metres.
    /// Always finite.
    pub distance_along_route_m: f64,
}

#[derive(Debug, Clone, Copy)]
struct RouteSegment {
    a: GeoPoint,
    b: GeoPoint,
    start_m: f64,
    length_m: f64,
}

/// Projects points and lines onto a fixed route.
///
/// # Examples
/// ```
/// use boucle_core::{GeoPoint, RoutePolyline};
/// use boucle_poi::CorridorProjector;
///
/// let route = RoutePolyline::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.01)]);
/// let projector = CorridorProjector::new(&route);
/// let hit = projector.project_point(GeoPoint::new(0.001, 0.005));
/// assert!((hit.distance_to_route_m - 111.2).abs() < 1.0);
/// assert!((hit.distance_along_route_m - 556.0).abs() < 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct CorridorProjector {
    segments: Vec<RouteSegment>,
    total_length_m: f64,
}

impl CorridorProjector {
    /// Prepare `route` for projection.
    #[must_use]
    pub fn new(route: &RoutePolyline) -> Self {
        let cumulative = route.cumulative_lengths();
        let segments = route
            .segments()
            .zip(cumulative.iter().copied())
            .filter_map(|((a, b), start_m)| {
                let length_m = haversine_distance(a, b);
                (length_m > MIN_SEGMENT_M).then_some(RouteSegment {
                    a,
                    b,
                    start_m,
                    length_m,
                })
            })
            .collect();
        Self {
            segments,
            total_length_m: cumulative.last().copied().unwrap_or(0.0),
        }
    }

    /// Total route length, in metres.
    #[must_use]
    pub const fn total_length_m(&self) -> f64 {
        self.total_length_m
    }

    /// Project any feature geometry.
    #[must_use]
    pub fn project(&self, geometry: &FeatureGeometry) -> CorridorMatch {
        match geometry {
            FeatureGeometry::Point(point) => self.project_point(*point),
            FeatureGeometry::Line(points) => self.project_line(points),
            FeatureGeometry::MultiLine(runs) => runs
                .iter()
                .map(|run| self.project_line(run))
                .min_by(|a, b| a.distance_to_route_m.total_cmp(&b.distance_to_route_m))
                .unwrap_or_else(|| self.project_line(&[])),
        }
    }

    /// Project a single point. The matched point is the input itself.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "position along a segment")]
    pub fn project_point(&self, point: GeoPoint) -> CorridorMatch {
        let mut best = self.unmatched(point);
        for segment in &self.segments {
            let projection = project_point_to_segment(point, segment.a, segment.b);
            if projection.distance_m < best.distance_to_route_m {
                best.distance_to_route_m = projection.distance_m;
                best.distance_along_route_m = segment.start_m + projection.t * segment.length_m;
            }
        }
        best
    }

    /// Project a line feature.
    ///
    /// Every route segment is paired with every feature segment; the matched
    /// point lies on the feature. A line without usable segments is treated
    /// as its vertices and the closest vertex is kept.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "position along a segment")]
    pub fn project_line(&self, points: &[GeoPoint]) -> CorridorMatch {
        let feature_segments: Vec<(GeoPoint, GeoPoint)> = points
            .windows(2)
            .filter_map(|pair| match pair {
                [a, b] if haversine_distance(*a, *b) > MIN_SEGMENT_M => Some((*a, *b)),
                _ => None,
            })
            .collect();
        if feature_segments.is_empty() {
            return self.project_vertices(points);
        }

        let fallback = feature_segments.first().map_or(GeoPoint::new(0.0, 0.0), |(a, _)| *a);
        let mut best = self.unmatched(fallback);
        for segment in &self.segments {
            for &(fa, fb) in &feature_segments {
                let projection = project_segment_to_segment(segment.a, segment.b, fa, fb);
                if projection.distance_m < best.distance_to_route_m {
                    best = CorridorMatch {
                        point: interpolate(fa, fb, projection.feature_t),
                        distance_to_route_m: projection.distance_m,
                        distance_along_route_m: segment.start_m
                            + projection.route_t * segment.length_m,
                    };
                }
            }
        }
        best
    }

    fn project_vertices(&self, points: &[GeoPoint]) -> CorridorMatch {
        let fallback = points.first().copied().unwrap_or(GeoPoint::new(0.0, 0.0));
        points
            .iter()
            .map(|p| self.project_point(*p))
            .fold(self.unmatched(fallback), |best, candidate| {
                if candidate.distance_to_route_m < best.distance_to_route_m {
                    candidate
                } else {
                    best
                }
            })
    }

    const fn unmatched(&self, point: GeoPoint) -> CorridorMatch {
        CorridorMatch {
            point,
            distance_to_route_m: f64::INFINITY,
            distance_along_route_m: self.total_length_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn route() -> RoutePolyline {
        RoutePolyline::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.01),
            GeoPoint::new(0.0, 0.01),
            GeoPoint::new(0.01, 0.01),
        ])
    }

    #[rstest]
    fn point_on_vertex_matches_cumulative_length(route: RoutePolyline) {
        let projector = CorridorProjector::new(&route);
        let hit = projector.project_point(GeoPoint::new(0.0, 0.01));
        let first_leg = haversine_distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.01));
        assert!(hit.distance_to_route_m < 1e-6);
        assert!((hit.distance_along_route_m - first_leg).abs() < 1e-6);
        assert_eq!(hit.point, GeoPoint::new(0.0, 0.01));
    }

    #[rstest]
    fn point_beside_second_leg(route: RoutePolyline) {
        let projector = CorridorProjector::new(&route);
        let hit = projector.project_point(GeoPoint::new(0.005, 0.0105));
        let first_leg = haversine_distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.01));
        assert!((hit.distance_to_route_m - 55.6).abs() < 0.5);
        assert!((hit.distance_along_route_m - (first_leg + 556.0)).abs() < 1.0);
    }

    #[rstest]
    fn crossing_line_matches_at_intersection(route: RoutePolyline) {
        let projector = CorridorProjector::new(&route);
        let line = [GeoPoint::new(-0.001, 0.004), GeoPoint::new(0.001, 0.004)];
        let hit = projector.project_line(&line);
        assert!(hit.distance_to_route_m < 0.01);
        assert!(hit.point.lat.abs() < 1e-7);
        assert!((hit.point.lon - 0.004).abs() < 1e-7);
        assert!((hit.distance_along_route_m - 444.8).abs() < 1.0);
    }

    #[rstest]
    fn collapsed_line_uses_closest_vertex(route: RoutePolyline) {
        let projector = CorridorProjector::new(&route);
        let line = [GeoPoint::new(0.002, 0.005), GeoPoint::new(0.002, 0.005)];
        let hit = projector.project_line(&line);
        assert_eq!(hit.point, GeoPoint::new(0.002, 0.005));
        assert!((hit.distance_to_route_m - 222.4).abs() < 1.0);
    }

    #[rstest]
    fn route_without_segments_yields_infinite_distance() {
        let route = RoutePolyline::new(vec![GeoPoint::new(1.0, 1.0)]);
        let projector = CorridorProjector::new(&route);
        let hit = projector.project(&FeatureGeometry::Point(GeoPoint::new(1.0, 1.0)));
        assert!(hit.distance_to_route_m.is_infinite());
        assert!(hit.distance_along_route_m.abs() < f64::EPSILON);
        let line = projector.project(&FeatureGeometry::Line(vec![
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(1.0, 1.1),
        ]));
        assert!(line.distance_to_route_m.is_infinite());
        assert!(line.distance_along_route_m.is_finite());
    }

    #[rstest]
    fn clipped_way_runs_are_projected_separately(route: RoutePolyline) {
        let projector = CorridorProjector::new(&route);
        let runs = vec![
            vec![GeoPoint::new(0.002, 0.005), GeoPoint::new(0.001, 0.005)],
            vec![GeoPoint::new(-0.001, 0.005), GeoPoint::new(-0.002, 0.005)],
        ];
        let joined: Vec<GeoPoint> = runs.iter().flatten().copied().collect();
        assert!(projector.project(&FeatureGeometry::Line(joined)).distance_to_route_m < 1e-6);

        let hit = projector.project(&FeatureGeometry::MultiLine(runs));
        assert!((hit.distance_to_route_m - 111.2).abs() < 1.0);
        assert!(hit.point.lat > 0.0);
    }

    #[rstest]
    fn empty_multi_line_is_unmatched(route: RoutePolyline) {
        let projector = CorridorProjector::new(&route);
        let hit = projector.project(&FeatureGeometry::MultiLine(Vec::new()));
        assert!(hit.distance_to_route_m.is_infinite());
    }

    #[rstest]
    fn empty_line_is_unmatched(route: RoutePolyline) {
        let projector = CorridorProjector::new(&route);
        let hit = projector.project_line(&[]);
        assert!(hit.distance_to_route_m.is_infinite());
        assert!((hit.distance_along_route_m - route.length_m()).abs() < 1e-9);
    }
}
