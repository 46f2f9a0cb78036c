//! Points of interest along a route.
//!
//! The crate turns raw [`PoiFeature`](boucle_core::PoiFeature)s into ordered
//! [`PoiMatch`](boucle_core::PoiMatch)es:
//! - [`CategoryCatalog`] classifies features by their tags.
//! - [`CorridorProjector`] measures how far a feature lies from the route and
//!   where along the route it is closest.
//! - [`PoiDeduplicator`] collapses the same place mapped more than once.
//! - [`CorridorSearch`] runs the whole pipeline against a
//!   [`PoiSource`](boucle_core::PoiSource).

#![forbid(unsafe_code)]

mod catalog;
mod corridor;
mod dedup;
mod names;
mod search;

pub use catalog::{CatalogError, Category, CategoryCatalog, Classification, TagFilter};
pub use corridor::{CorridorMatch, CorridorProjector, MIN_SEGMENT_M};
pub use dedup::{DedupConfig, PoiDeduplicator};
pub use names::{NAME_KEYS, is_placeholder, normalize_name, resolve_name};
pub use search::{CorridorMatchRequest, CorridorSearch, DEFAULT_CORRIDOR_WIDTH_M};
