//! Realise concrete road geometry for an ordered list of locations.
//!
//! The [`RoutingProvider`] trait abstracts the external road-network engine.
//! Callers hand it an ordered slice of [`RouteLocation`](crate::RouteLocation)
//! values and receive a [`RouteSnapshot`] describing the road polyline, its
//! length and an estimated travel time.
//!
//! The trait is synchronous so the optimisation core stays embeddable in
//! synchronous contexts; network-backed adapters block internally.

mod error;
mod provider;

pub use error::RoutingError;
pub use provider::{RouteSnapshot, RoutingProvider, TravelProfile, UnknownTravelProfile};
