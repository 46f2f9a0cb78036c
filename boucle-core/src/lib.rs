//! Core domain types and boundaries for the Boucle routing engine.
//!
//! This crate holds the vocabulary shared by every other member of the
//! workspace: geographic points, route polylines, points of interest, the
//! spherical geometry helpers in [`geometry`], and the two traits through
//! which the engine reaches the outside world: [`RoutingProvider`] for road
//! geometry and [`PoiSource`] for raw points of interest.
//!
//! Everything here is synchronous and free of shared mutable state.

pub mod geometry;
mod poi;
mod point;
mod polyline;
pub mod routing;
mod source;

pub use poi::{FeatureGeometry, OsmType, PoiFeature, PoiMatch, Tags};
pub use point::{GeoPoint, RouteLocation};
pub use polyline::RoutePolyline;
pub use routing::{RouteSnapshot, RoutingError, RoutingProvider, TravelProfile, UnknownTravelProfile};
pub use source::PoiSource;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
