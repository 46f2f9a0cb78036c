//! OSRM API response types for the Route service.
//!
//! Only the fields requested with `overview=full&geometries=geojson` are
//! modelled.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
///
/// The response contains one or more routes on success or an error message
/// on failure. The `code` field indicates the response status.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"InvalidQuery"` - Invalid query parameters
    /// - `"NoRoute"` - No route found between the coordinates
    /// - `"NoSegment"` - A coordinate could not be snapped to the network
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

/// A single route of a [`RouteResponse`].
#[derive(Debug, Deserialize)]
pub struct OsrmRoute {
    /// Length in metres.
    pub distance: f64,
    /// Travel time in seconds.
    pub duration: f64,
    /// Full-resolution geometry.
    pub geometry: LineGeometry,
}

/// A GeoJSON `LineString`; coordinates are `[lon, lat]`.
#[derive(Debug, Deserialize)]
pub struct LineGeometry {
    /// Vertex positions as `[lon, lat]` pairs.
    pub coordinates: Vec<[f64; 2]>,
}
