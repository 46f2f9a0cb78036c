//! Overpass JSON response types and their conversion into features.

use boucle_core::{FeatureGeometry, GeoPoint, OsmType, PoiFeature, Tags};
use log::debug;
use serde::Deserialize;

use super::OverpassError;

/// Top-level Overpass JSON document.
#[derive(Debug, Deserialize)]
pub(super) struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
    /// Runtime errors are reported here with an HTTP 200 status.
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(rename = "type")]
    kind: String,
    id: i64,
    #[serde(default)]
    tags: Tags,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<Position>,
    /// Way vertices; entries outside a clipped bbox can be `null`.
    #[serde(default)]
    geometry: Vec<Option<Position>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Position {
    lat: f64,
    lon: f64,
}

impl From<Position> for GeoPoint {
    fn from(position: Position) -> Self {
        Self::new(position.lat, position.lon)
    }
}

/// Parse an Overpass JSON body into features.
///
/// Nodes become points, ways become lines (or their centre when no vertex
/// geometry is present) and relations become their centre. A way clipped
/// into several runs by `null` vertices becomes a multi-line with one entry
/// per run. Elements without usable coordinates are skipped.
///
/// # Errors
/// Returns [`OverpassError::Parse`] for malformed JSON and
/// [`OverpassError::Remark`] when the server reports a runtime error.
///
/// # Examples
/// ```
/// use boucle_core::{FeatureGeometry, GeoPoint};
/// use boucle_data::overpass::parse_response;
///
/// let body = r#"{"elements": [
///     {"type": "node", "id": 1, "lat": 48.85, "lon": 2.35, "tags": {"amenity": "toilets"}}
/// ]}"#;
/// let features = parse_response(body).expect("valid response");
/// assert_eq!(features[0].geometry, FeatureGeometry::Point(GeoPoint::new(48.85, 2.35)));
/// ```
pub fn parse_response(body: &str) -> Result<Vec<PoiFeature>, OverpassError> {
    let response: OverpassResponse =
        serde_json::from_str(body).map_err(|err| OverpassError::Parse {
            message: err.to_string(),
        })?;
    response.into_features()
}

impl OverpassResponse {
    pub(super) fn into_features(self) -> Result<Vec<PoiFeature>, OverpassError> {
        if let Some(remark) = self.remark.filter(|r| r.contains("error")) {
            return Err(OverpassError::Remark { message: remark });
        }
        Ok(self
            .elements
            .into_iter()
            .filter_map(Element::into_feature)
            .collect())
    }
}

impl Element {
    fn into_feature(self) -> Option<PoiFeature> {
        let osm_type = match self.kind.as_str() {
            "node" => OsmType::Node,
            "way" => OsmType::Way,
            "relation" => OsmType::Relation,
            _ => OsmType::Unknown,
        };
        let Some(geometry) = self.feature_geometry(osm_type) else {
            debug!("skipping {}/{} without usable geometry", self.kind, self.id);
            return None;
        };
        Some(PoiFeature {
            osm_type,
            osm_id: self.id,
            tags: self.tags,
            geometry,
        })
    }

    fn feature_geometry(&self, osm_type: OsmType) -> Option<FeatureGeometry> {
        let centre = self.center.map(GeoPoint::from).filter(GeoPoint::is_valid);
        match osm_type {
            OsmType::Node => {
                let point = GeoPoint::new(self.lat?, self.lon?);
                point.is_valid().then_some(FeatureGeometry::Point(point))
            }
            OsmType::Way => {
                let mut runs = self.vertex_runs();
                match runs.len() {
                    0 => centre.map(FeatureGeometry::Point),
                    1 => runs.pop().and_then(|run| {
                        if run.len() == 1 {
                            run.first().copied().map(FeatureGeometry::Point)
                        } else {
                            Some(FeatureGeometry::Line(run))
                        }
                    }),
                    _ => Some(FeatureGeometry::MultiLine(runs)),
                }
            }
            OsmType::Relation | OsmType::Unknown => centre.map(FeatureGeometry::Point),
        }
    }

    /// Way vertices split at missing or invalid positions.
    fn vertex_runs(&self) -> Vec<Vec<GeoPoint>> {
        self.geometry
            .split(|position| !position.is_some_and(|p| GeoPoint::from(p).is_valid()))
            .filter(|run| !run.is_empty())
            .map(|run| run.iter().flatten().map(|p| GeoPoint::from(*p)).collect())
            .collect()
    }
}
