//! Ordered route geometry with cumulative length bookkeeping.

use geo::{Coord, LineString, Rect};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::GeoPoint;
use crate::geometry::{EARTH_RADIUS_M, haversine_distance};

/// Smallest cosine used when widening a bounding box in longitude.
const MIN_BUFFER_COS: f64 = 0.01;

/// An ordered sequence of points describing a route on the ground.
///
/// # Examples
/// ```
/// use boucle_core::{GeoPoint, RoutePolyline};
///
/// let line: RoutePolyline = [GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0)]
///     .into_iter()
///     .collect();
/// assert_eq!(line.segments().count(), 1);
/// assert!((line.length_m() - 111_194.93).abs() < 0.01);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RoutePolyline {
    points: Vec<GeoPoint>,
}

impl RoutePolyline {
    /// Wrap an ordered list of points.
    #[must_use]
    pub const fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// Points of the polyline in route order.
    #[must_use]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the polyline has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consecutive point pairs in route order.
    pub fn segments(&self) -> impl Iterator<Item = (GeoPoint, GeoPoint)> + '_ {
        self.points.windows(2).filter_map(|pair| match pair {
            [a, b] => Some((*a, *b)),
            _ => None,
        })
    }

    /// Distance from the first point to each point, in metres.
    ///
    /// The result has one entry per point, starts at zero and never
    /// decreases.
    #[must_use]
    pub fn cumulative_lengths(&self) -> Vec<f64> {
        let mut total = 0.0;
        let mut lengths = Vec::with_capacity(self.points.len());
        if !self.points.is_empty() {
            lengths.push(0.0);
        }
        for (a, b) in self.segments() {
            total += haversine_distance(a, b);
            lengths.push(total);
        }
        lengths
    }

    /// Total length in metres.
    #[must_use]
    pub fn length_m(&self) -> f64 {
        self.segments().map(|(a, b)| haversine_distance(a, b)).sum()
    }

    /// Bounding rectangle widened by `buffer_m` metres on every side.
    ///
    /// Returns `None` for an empty polyline. Latitudes are clamped to the
    /// poles and longitudes to `[-180, 180]`.
    #[must_use]
    pub fn bounding_rect(&self, buffer_m: f64) -> Option<Rect<f64>> {
        let first = self.points.first()?;
        let (mut min, mut max) = (*first, *first);
        for p in &self.points {
            min.lat = min.lat.min(p.lat);
            min.lon = min.lon.min(p.lon);
            max.lat = max.lat.max(p.lat);
            max.lon = max.lon.max(p.lon);
        }

        let buffer = if buffer_m.is_finite() { buffer_m.max(0.0) } else { 0.0 };
        let dlat = (buffer / EARTH_RADIUS_M).to_degrees();
        let widest = min.lat.abs().max(max.lat.abs()).to_radians().cos();
        let dlon = dlat / widest.max(MIN_BUFFER_COS);

        Some(Rect::new(
            Coord {
                x: (min.lon - dlon).max(-180.0),
                y: (min.lat - dlat).max(-90.0),
            },
            Coord {
                x: (max.lon + dlon).min(180.0),
                y: (max.lat + dlat).min(90.0),
            },
        ))
    }
}

impl From<Vec<GeoPoint>> for RoutePolyline {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<GeoPoint> for RoutePolyline {
    fn from_iter<I: IntoIterator<Item = GeoPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<&RoutePolyline> for LineString<f64> {
    fn from(polyline: &RoutePolyline) -> Self {
        polyline.points.iter().map(|p| Coord::from(*p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn zigzag() -> RoutePolyline {
        RoutePolyline::new(vec![
            GeoPoint::new(48.0, 2.0),
            GeoPoint::new(48.01, 2.0),
            GeoPoint::new(48.01, 2.01),
            GeoPoint::new(48.01, 2.01),
        ])
    }

    #[rstest]
    fn cumulative_lengths_are_monotonic(zigzag: RoutePolyline) {
        let lengths = zigzag.cumulative_lengths();
        assert_eq!(lengths.len(), zigzag.len());
        assert!(lengths.windows(2).all(|w| w.first() <= w.last()));
        let total = lengths.last().copied().unwrap_or_default();
        assert!((total - zigzag.length_m()).abs() < 1e-6);
    }

    #[rstest]
    fn empty_polyline_has_no_geometry() {
        let empty = RoutePolyline::default();
        assert!(empty.cumulative_lengths().is_empty());
        assert!(empty.length_m().abs() < f64::EPSILON);
        assert!(empty.bounding_rect(100.0).is_none());
    }

    #[rstest]
    fn bounding_rect_is_buffered(zigzag: RoutePolyline) {
        let tight = zigzag.bounding_rect(0.0).expect("non-empty polyline");
        let wide = zigzag.bounding_rect(500.0).expect("non-empty polyline");
        assert!((tight.min().y - 48.0).abs() < 1e-12);
        assert!((tight.max().x - 2.01).abs() < 1e-12);
        assert!(wide.min().y < tight.min().y);
        assert!(wide.max().x > tight.max().x);
        let lat_buffer = (tight.min().y - wide.min().y).to_radians() * EARTH_RADIUS_M;
        assert!((lat_buffer - 500.0).abs() < 0.01);
    }

    #[rstest]
    fn converts_to_line_string(zigzag: RoutePolyline) {
        let line = LineString::from(&zigzag);
        assert_eq!(line.0.len(), 4);
        assert_eq!(line.0.first(), Some(&Coord { x: 2.0, y: 48.0 }));
    }
}
