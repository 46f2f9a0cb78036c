//! Facade crate for the Boucle route engine.
//!
//! This crate re-exports the core domain types and exposes the loop solver
//! and corridor search behind feature flags.

#![forbid(unsafe_code)]

pub use boucle_core::{
    FeatureGeometry, GeoPoint, OsmType, PoiFeature, PoiMatch, PoiSource, RouteLocation,
    RoutePolyline, RouteSnapshot, RoutingError, RoutingProvider, Tags, TravelProfile, geometry,
};

#[cfg(feature = "solver")]
pub use boucle_solver::{
    CancellationToken, LoopSearch, LoopSearchConfig, LoopSearchError, LoopSearchRequest,
    LoopSearchResult, WaypointOrderer, WaypointOrderingRequest,
};

#[cfg(feature = "poi")]
pub use boucle_poi::{CategoryCatalog, CorridorMatchRequest, CorridorSearch, PoiDeduplicator};
