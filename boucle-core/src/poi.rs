//! Points of interest as delivered by a data source and as matched to a
//! route.

use std::collections::HashMap;
use std::fmt;
use std::slice;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// OpenStreetMap-style tags.
pub type Tags = HashMap<String, String>;

/// OpenStreetMap element type of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OsmType {
    /// A single tagged node.
    Node,
    /// A way, open or closed.
    Way,
    /// A relation.
    Relation,
    /// Source did not say.
    #[default]
    Unknown,
}

impl OsmType {
    /// Preference when two matches are otherwise tied: relations carry the
    /// most curated data, then ways, then nodes.
    ///
    /// # Examples
    /// ```
    /// use boucle_core::OsmType;
    ///
    /// assert!(OsmType::Relation.rank() > OsmType::Way.rank());
    /// assert_eq!(OsmType::Unknown.rank(), 0);
    /// ```
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Relation => 3,
            Self::Way => 2,
            Self::Node => 1,
            Self::Unknown => 0,
        }
    }

    /// Lowercase element name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OsmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a feature.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "coordinates"))]
pub enum FeatureGeometry {
    /// A single position.
    Point(GeoPoint),
    /// An ordered list of vertices, e.g. a way's geometry.
    Line(Vec<GeoPoint>),
    /// Disjoint runs of vertices, e.g. a way clipped to a bounding box.
    /// Consecutive runs are not connected.
    MultiLine(Vec<Vec<GeoPoint>>),
}

impl FeatureGeometry {
    /// Contiguous vertex runs: one for points and lines.
    #[must_use]
    pub fn parts(&self) -> Vec<&[GeoPoint]> {
        match self {
            Self::Point(point) => vec![slice::from_ref(point)],
            Self::Line(points) => vec![points.as_slice()],
            Self::MultiLine(runs) => runs.iter().map(Vec::as_slice).collect(),
        }
    }

    /// Every vertex of the geometry, a single one for points.
    pub fn vertices(&self) -> impl Iterator<Item = &GeoPoint> + '_ {
        self.parts().into_iter().flatten()
    }
}

/// A raw feature fetched from a POI data source.
///
/// # Examples
/// ```
/// use boucle_core::{FeatureGeometry, GeoPoint, OsmType, PoiFeature};
///
/// let feature = PoiFeature::new(OsmType::Node, 42, FeatureGeometry::Point(GeoPoint::new(1.0, 2.0)))
///     .with_tag("amenity", "drinking_water");
/// assert_eq!(feature.id(), "node/42");
/// assert_eq!(feature.tags.get("amenity").map(String::as_str), Some("drinking_water"));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoiFeature {
    /// Element type.
    pub osm_type: OsmType,
    /// Element identifier within its type.
    pub osm_id: i64,
    /// Element tags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Tags,
    /// Element geometry.
    pub geometry: FeatureGeometry,
}

impl PoiFeature {
    /// Construct an untagged feature.
    #[must_use]
    pub fn new(osm_type: OsmType, osm_id: i64, geometry: FeatureGeometry) -> Self {
        Self {
            osm_type,
            osm_id,
            tags: Tags::new(),
            geometry,
        }
    }

    /// Add a tag, replacing any previous value for `key`.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Stable identifier, `"{type}/{id}"`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}/{}", self.osm_type, self.osm_id)
    }
}

/// A point of interest placed on a route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoiMatch {
    /// Stable identifier, `"{type}/{id}"`.
    pub id: String,
    /// Display name, when the feature carries one.
    pub name: Option<String>,
    /// Catalog category, e.g. `water`.
    pub category: String,
    /// Tag value that selected the category, e.g. `drinking_water`.
    pub kind: String,
    /// Point on the feature closest to the route.
    pub point: GeoPoint,
    /// Element type.
    pub osm_type: OsmType,
    /// Element identifier within its type.
    pub osm_id: i64,
    /// Element tags.
    pub tags: Tags,
    /// Distance from the route, in metres.
    pub distance_to_route_m: f64,
    /// Distance from the route start to the closest route point, in metres.
    pub distance_along_route_m: f64,
}
