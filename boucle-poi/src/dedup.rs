//! Collapse near-identical POI matches.
//!
//! Matches are bucketed by `category | kind | name`, the name resolved from
//! the match's tags by [`resolve_name`] and both folded by
//! [`normalize_name`]. Within a bucket a match merges into the
//! first entry that lies close both along the route and on the ground;
//! otherwise it starts a new entry. Unnamed and placeholder-named matches
//! pass through untouched. Output keeps first-seen order.

use std::cmp::Ordering;
use std::collections::HashMap;

use boucle_core::PoiMatch;
use boucle_core::geometry::haversine_distance;
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::names::{is_placeholder, normalize_name, resolve_name};

/// Thresholds used by [`PoiDeduplicator`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DedupConfig {
    /// Largest difference in distance along the route for a merge, in metres.
    pub max_along_gap_m: f64,
    /// Largest ground distance for a merge, in metres.
    pub max_separation_m: f64,
    /// Distance-to-route differences at or below this are ties, in metres.
    pub distance_margin_m: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            max_along_gap_m: 80.0,
            max_separation_m: 35.0,
            distance_margin_m: 1.0,
        }
    }
}

/// Removes duplicate POI matches.
///
/// # Examples
/// ```
/// use boucle_core::{GeoPoint, OsmType, PoiMatch, Tags};
/// use boucle_poi::PoiDeduplicator;
///
/// let tap = |id: i64, lat: f64, along: f64, to_route: f64| PoiMatch {
///     id: format!("node/{id}"),
///     name: None,
///     category: "water".to_owned(),
///     kind: "drinking_water".to_owned(),
///     point: GeoPoint::new(lat, 2.0),
///     osm_type: OsmType::Node,
///     osm_id: id,
///     tags: Tags::from([("name".to_owned(), "Fontaine".to_owned())]),
///     distance_to_route_m: to_route,
///     distance_along_route_m: along,
/// };
/// let kept = PoiDeduplicator::new().dedup(vec![
///     tap(1, 48.0, 100.0, 12.0),
///     tap(2, 48.0001, 110.0, 4.0),
/// ]);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].osm_id, 2);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PoiDeduplicator {
    config: DedupConfig,
}

impl PoiDeduplicator {
    /// Construct a deduplicator with default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a deduplicator with explicit thresholds.
    #[must_use]
    pub const fn with_config(config: DedupConfig) -> Self {
        Self { config }
    }

    /// Active thresholds.
    #[must_use]
    pub const fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Deduplicate `matches`, keeping one representative per group.
    #[must_use]
    pub fn dedup(&self, matches: Vec<PoiMatch>) -> Vec<PoiMatch> {
        let input_len = matches.len();
        let mut slots: Vec<PoiMatch> = Vec::with_capacity(input_len);
        let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();

        for candidate in matches {
            let Some(key) = dedup_key(&candidate) else {
                slots.push(candidate);
                continue;
            };
            let entries = buckets.entry(key).or_default();
            let existing = entries
                .iter()
                .copied()
                .find(|&slot| slots.get(slot).is_some_and(|kept| self.same_place(kept, &candidate)));
            match existing.and_then(|slot| slots.get_mut(slot)) {
                Some(kept) => {
                    if self.prefer(&candidate, kept) {
                        debug!("{} replaces duplicate {}", candidate.id, kept.id);
                        *kept = candidate;
                    } else {
                        debug!("{} merged into {}", candidate.id, kept.id);
                    }
                }
                None => {
                    entries.push(slots.len());
                    slots.push(candidate);
                }
            }
        }

        if slots.len() < input_len {
            debug!("deduplicated {input_len} matches into {}", slots.len());
        }
        slots
    }

    #[expect(clippy::float_arithmetic, reason = "distance along route gap")]
    fn same_place(&self, a: &PoiMatch, b: &PoiMatch) -> bool {
        (a.distance_along_route_m - b.distance_along_route_m).abs() <= self.config.max_along_gap_m
            && haversine_distance(a.point, b.point) <= self.config.max_separation_m
    }

    /// Whether `candidate` should replace `kept`.
    #[expect(clippy::float_arithmetic, reason = "distance-to-route margin")]
    fn prefer(&self, candidate: &PoiMatch, kept: &PoiMatch) -> bool {
        let gap = candidate.distance_to_route_m - kept.distance_to_route_m;
        if gap.abs() > self.config.distance_margin_m {
            return gap < 0.0;
        }
        candidate
            .tags
            .len()
            .cmp(&kept.tags.len())
            .then_with(|| candidate.osm_type.rank().cmp(&kept.osm_type.rank()))
            .then_with(|| kept.id.cmp(&candidate.id))
            == Ordering::Greater
    }
}

/// `category | kind | name`, or `None` when the match must pass through.
///
/// The name comes from the tags, not from the display name.
fn dedup_key(poi: &PoiMatch) -> Option<String> {
    let name = normalize_name(&resolve_name(&poi.tags)?);
    if is_placeholder(&name) {
        return None;
    }
    Some(format!("{}|{}|{}", poi.category, normalize_name(&poi.kind), name))
}
