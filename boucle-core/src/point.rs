//! Geographic points and labelled route locations.

use geo::{Coord, Point};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
///
/// The struct stores latitude first to match how routes are described to
/// users. Conversions to [`geo::Coord`] follow the `geo` convention of
/// `x = longitude` and `y = latitude`.
///
/// # Examples
/// ```
/// use boucle_core::GeoPoint;
///
/// let paris = GeoPoint::new(48.8566, 2.3522);
/// assert!(paris.is_valid());
/// assert!(!GeoPoint::new(f64::NAN, 2.0).is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoPoint {
    /// Latitude in degrees, `-90.0..=90.0`.
    pub lat: f64,
    /// Longitude in degrees, `-180.0..=180.0`.
    pub lon: f64,
}

impl GeoPoint {
    /// Construct a point without validating it.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both coordinates are finite and inside their WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Default human-readable label, `"{lat:.5},{lon:.5}"`.
    ///
    /// # Examples
    /// ```
    /// use boucle_core::GeoPoint;
    ///
    /// assert_eq!(GeoPoint::new(48.0, 2.1).default_label(), "48.00000,2.10000");
    /// ```
    #[must_use]
    pub fn default_label(&self) -> String {
        format!("{:.5},{:.5}", self.lat, self.lon)
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        Self {
            x: point.lon,
            y: point.lat,
        }
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord.y, coord.x)
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Self::new(point.lon, point.lat)
    }
}

/// A point the route should pass through, with a display label.
///
/// Blank labels are replaced by [`GeoPoint::default_label`] on construction.
///
/// # Examples
/// ```
/// use boucle_core::{GeoPoint, RouteLocation};
///
/// let location = RouteLocation::new(GeoPoint::new(48.0, 2.0), "  ");
/// assert_eq!(location.label, "48.00000,2.00000");
///
/// let named = RouteLocation::new(GeoPoint::new(48.0, 2.0), "Bakery");
/// assert_eq!(named.label, "Bakery");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteLocation {
    /// Position of the location.
    pub point: GeoPoint,
    /// Label shown to the user.
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: String,
}

impl RouteLocation {
    /// Construct a location, defaulting blank labels.
    #[must_use]
    pub fn new(point: GeoPoint, label: impl Into<String>) -> Self {
        Self {
            point,
            label: label.into(),
        }
        .with_default_label()
    }

    /// Construct a location carrying the default coordinate label.
    #[must_use]
    pub fn unlabelled(point: GeoPoint) -> Self {
        Self::new(point, String::new())
    }

    /// Replace a blank label with the coordinate label.
    #[must_use]
    pub fn with_default_label(mut self) -> Self {
        if self.label.trim().is_empty() {
            self.label = self.point.default_label();
        }
        self
    }
}

impl From<GeoPoint> for RouteLocation {
    fn from(point: GeoPoint) -> Self {
        Self::unlabelled(point)
    }
}
