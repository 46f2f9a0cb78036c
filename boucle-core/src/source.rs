//! Read-only access to points of interest.
//!
//! The `PoiSource` trait defines the boundary to whatever supplies raw
//! [`PoiFeature`] values: an Overpass API client, a local extract or an
//! in-memory fixture. Consumers query features within a geographic bounding
//! box and do their own classification and projection.

use geo::{Coord, Intersects, LineString, Rect};

use crate::{FeatureGeometry, GeoPoint, PoiFeature};

/// Fetch [`PoiFeature`] values intersecting a bounding box.
///
/// Coordinates in the rectangle follow the `geo` convention: `x` is
/// longitude and `y` is latitude.
///
/// # Examples
///
/// ```rust
/// use geo::{Coord, Rect};
/// use boucle_core::{FeatureGeometry, GeoPoint, OsmType, PoiFeature, PoiSource};
///
/// struct Single(PoiFeature);
///
/// impl PoiSource for Single {
///     fn features_in_bbox(
///         &self,
///         _bbox: &Rect<f64>,
///     ) -> Box<dyn Iterator<Item = PoiFeature> + Send + '_> {
///         Box::new(std::iter::once(self.0.clone()))
///     }
/// }
///
/// let source = Single(PoiFeature::new(
///     OsmType::Node,
///     1,
///     FeatureGeometry::Point(GeoPoint::new(0.0, 0.0)),
/// ));
/// let bbox = Rect::new(Coord { x: -1.0, y: -1.0 }, Coord { x: 1.0, y: 1.0 });
/// assert_eq!(source.features_in_bbox(&bbox).count(), 1);
/// ```
pub trait PoiSource {
    /// Return features whose geometry touches `bbox`.
    ///
    /// Lines count when any of their segments crosses the rectangle, even
    /// if every vertex lies outside it.
    fn features_in_bbox(&self, bbox: &Rect<f64>) -> Box<dyn Iterator<Item = PoiFeature> + Send + '_>;
}

/// Linear scan over an in-memory feature list.
impl PoiSource for [PoiFeature] {
    fn features_in_bbox(&self, bbox: &Rect<f64>) -> Box<dyn Iterator<Item = PoiFeature> + Send + '_> {
        let bbox = *bbox;
        Box::new(
            self.iter()
                .filter(move |f| touches(&f.geometry, &bbox))
                .cloned(),
        )
    }
}

fn touches(geometry: &FeatureGeometry, bbox: &Rect<f64>) -> bool {
    geometry.parts().into_iter().any(|part| part_touches(part, bbox))
}

// `Intersects` treats boundary points as inside the rectangle.
fn part_touches(vertices: &[GeoPoint], bbox: &Rect<f64>) -> bool {
    match vertices {
        [] => false,
        [only] => bbox.intersects(&Coord::from(*only)),
        run => run
            .iter()
            .map(|p| Coord::from(*p))
            .collect::<LineString<f64>>()
            .intersects(bbox),
    }
}
