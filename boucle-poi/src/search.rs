//! Find points of interest along a route.

use std::cmp::Ordering;
use std::sync::Arc;

use boucle_core::{PoiFeature, PoiMatch, PoiSource, RoutePolyline};
use log::{debug, info};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::catalog::CategoryCatalog;
use crate::corridor::CorridorProjector;
use crate::dedup::{DedupConfig, PoiDeduplicator};
use crate::names::resolve_name;

/// Default half-width of the corridor, in metres.
pub const DEFAULT_CORRIDOR_WIDTH_M: f64 = 100.0;

/// A corridor query as read from JSON.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CorridorMatchRequest {
    /// Route to search along.
    pub route: RoutePolyline,
    /// Corridor half-width override, in metres.
    #[cfg_attr(feature = "serde", serde(default))]
    pub corridor_width_m: Option<f64>,
    /// Candidate features. When empty, callers fetch them from a source.
    #[cfg_attr(feature = "serde", serde(default))]
    pub features: Vec<PoiFeature>,
}

/// Classify, project, filter, deduplicate and sort POIs along a route.
///
/// # Examples
/// ```
/// use boucle_core::{FeatureGeometry, GeoPoint, OsmType, PoiFeature, RoutePolyline};
/// use boucle_poi::CorridorSearch;
///
/// let route = RoutePolyline::new(vec![GeoPoint::new(48.0, 2.0), GeoPoint::new(48.0, 2.01)]);
/// let tap = PoiFeature::new(OsmType::Node, 1, FeatureGeometry::Point(GeoPoint::new(48.0002, 2.005)))
///     .with_tag("amenity", "drinking_water");
/// let bench = PoiFeature::new(OsmType::Node, 2, FeatureGeometry::Point(GeoPoint::new(48.0, 2.005)))
///     .with_tag("amenity", "bench");
/// let features = vec![tap, bench];
/// let found = CorridorSearch::default().find(&route, features.as_slice());
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].category, "water");
/// ```
#[derive(Debug, Clone)]
pub struct CorridorSearch {
    catalog: Arc<CategoryCatalog>,
    corridor_width_m: f64,
    dedup: PoiDeduplicator,
}

impl Default for CorridorSearch {
    fn default() -> Self {
        Self {
            catalog: CategoryCatalog::standard(),
            corridor_width_m: DEFAULT_CORRIDOR_WIDTH_M,
            dedup: PoiDeduplicator::new(),
        }
    }
}

impl CorridorSearch {
    /// Construct a search with the standard catalog and default width.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<CategoryCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set the corridor half-width. Non-finite or negative values are
    /// ignored.
    #[must_use]
    pub fn with_corridor_width(mut self, width_m: f64) -> Self {
        if width_m.is_finite() && width_m >= 0.0 {
            self.corridor_width_m = width_m;
        }
        self
    }

    /// Set the deduplication thresholds.
    #[must_use]
    pub const fn with_dedup(mut self, config: DedupConfig) -> Self {
        self.dedup = PoiDeduplicator::with_config(config);
        self
    }

    /// Corridor half-width, in metres.
    #[must_use]
    pub const fn corridor_width_m(&self) -> f64 {
        self.corridor_width_m
    }

    /// Catalog used for classification.
    #[must_use]
    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    /// POIs within the corridor around `route`, ordered along the route.
    ///
    /// Returns an empty list for an empty route.
    #[must_use]
    pub fn find<S>(&self, route: &RoutePolyline, source: &S) -> Vec<PoiMatch>
    where
        S: PoiSource + ?Sized,
    {
        let Some(bbox) = route.bounding_rect(self.corridor_width_m) else {
            return Vec::new();
        };
        let projector = CorridorProjector::new(route);

        let mut fetched = 0_usize;
        let matches: Vec<PoiMatch> = source
            .features_in_bbox(&bbox)
            .inspect(|_| fetched += 1)
            .filter_map(|feature| self.match_feature(&projector, feature))
            .collect();
        let in_corridor = matches.len();

        let mut kept = self.dedup.dedup(matches);
        kept.sort_by(compare_along_route);
        info!(
            "corridor search kept {} of {in_corridor} matches from {fetched} features",
            kept.len()
        );
        kept
    }

    fn match_feature(&self, projector: &CorridorProjector, feature: PoiFeature) -> Option<PoiMatch> {
        let Some(class) = self.catalog.classify(&feature.tags) else {
            debug!("skipping unclassified feature {}", feature.id());
            return None;
        };
        let hit = projector.project(&feature.geometry);
        if hit.distance_to_route_m.is_nan() || hit.distance_to_route_m > self.corridor_width_m {
            return None;
        }
        Some(PoiMatch {
            id: feature.id(),
            name: resolve_name(&feature.tags),
            category: class.category.to_owned(),
            kind: class.kind,
            point: hit.point,
            osm_type: feature.osm_type,
            osm_id: feature.osm_id,
            tags: feature.tags,
            distance_to_route_m: hit.distance_to_route_m,
            distance_along_route_m: hit.distance_along_route_m,
        })
    }
}

fn compare_along_route(a: &PoiMatch, b: &PoiMatch) -> Ordering {
    a.distance_along_route_m
        .total_cmp(&b.distance_along_route_m)
        .then_with(|| a.distance_to_route_m.total_cmp(&b.distance_to_route_m))
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use boucle_core::test_support::MemoryPoiSource;
    use boucle_core::{FeatureGeometry, GeoPoint, OsmType};
    use rstest::{fixture, rstest};

    #[fixture]
    fn route() -> RoutePolyline {
        RoutePolyline::new(vec![GeoPoint::new(48.0, 2.0), GeoPoint::new(48.0, 2.02)])
    }

    fn node(id: i64, lat: f64, lon: f64, key: &str, value: &str) -> PoiFeature {
        PoiFeature::new(OsmType::Node, id, FeatureGeometry::Point(GeoPoint::new(lat, lon)))
            .with_tag(key, value)
    }

    #[rstest]
    fn results_are_sorted_along_the_route(route: RoutePolyline) {
        let source = MemoryPoiSource::with_features([
            node(1, 48.0003, 2.015, "amenity", "toilets"),
            node(2, 48.0001, 2.005, "amenity", "drinking_water"),
            node(3, 48.0002, 2.010, "shop", "bakery"),
        ]);
        let found = CorridorSearch::new().find(&route, &source);
        let ids: Vec<&str> = found.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["node/2", "node/3", "node/1"]);
        assert!(found.iter().all(|m| m.distance_along_route_m.is_finite()));
    }

    #[rstest]
    fn features_outside_the_corridor_are_dropped(route: RoutePolyline) {
        let source = MemoryPoiSource::with_features([
            node(1, 48.0005, 2.01, "amenity", "toilets"),
            node(2, 48.002, 2.01, "amenity", "toilets"),
        ]);
        let found = CorridorSearch::new().find(&route, &source);
        assert_eq!(found.len(), 1);
        let wide = CorridorSearch::new().with_corridor_width(300.0).find(&route, &source);
        assert_eq!(wide.len(), 2);
    }

    #[rstest]
    fn duplicates_are_collapsed(route: RoutePolyline) {
        let source = MemoryPoiSource::with_features([
            node(1, 48.0002, 2.01, "amenity", "drinking_water").with_tag("name", "Fontaine"),
            node(2, 48.0001, 2.0101, "amenity", "drinking_water").with_tag("name", "FONTAINE"),
        ]);
        let found = CorridorSearch::new().find(&route, &source);
        assert_eq!(found.len(), 1);
        assert_eq!(found.first().map(|m| m.osm_id), Some(2));
        assert_eq!(found.first().and_then(|m| m.name.as_deref()), Some("FONTAINE"));
    }

    #[rstest]
    fn line_features_match_their_closest_point(route: RoutePolyline) {
        let river_walk = PoiFeature::new(
            OsmType::Way,
            10,
            FeatureGeometry::Line(vec![GeoPoint::new(48.002, 2.01), GeoPoint::new(47.998, 2.01)]),
        )
        .with_tag("historic", "aqueduct");
        let found = CorridorSearch::new().find(&route, &[river_walk][..]);
        let hit = found.first().expect("aqueduct crosses the route");
        assert_eq!(hit.kind, "aqueduct");
        assert_eq!(hit.category, "heritage");
        assert!(hit.distance_to_route_m < 0.5);
        assert!((hit.point.lat - 48.0).abs() < 1e-5);
    }

    #[rstest]
    fn empty_route_finds_nothing() {
        let source = MemoryPoiSource::with_features([node(1, 48.0, 2.0, "amenity", "toilets")]);
        assert!(CorridorSearch::new().find(&RoutePolyline::default(), &source).is_empty());
    }

    #[rstest]
    fn invalid_width_is_ignored() {
        let search = CorridorSearch::new().with_corridor_width(f64::NAN);
        assert!((search.corridor_width_m() - DEFAULT_CORRIDOR_WIDTH_M).abs() < f64::EPSILON);
    }
}
