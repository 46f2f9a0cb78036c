//! HTTP adapters for the Boucle engine.
//!
//! Responsibilities:
//! - Route through an OSRM service behind the
//!   [`RoutingProvider`](boucle_core::RoutingProvider) trait.
//! - Query an Overpass API instance for catalog features and expose them as
//!   a [`PoiSource`](boucle_core::PoiSource).
//!
//! Boundaries:
//! - Do not encode domain rules (those live in `boucle-core`, `boucle-solver`
//!   and `boucle-poi`).
//! - Present synchronous APIs; async HTTP is driven on an owned runtime.
//!
//! Invariants:
//! - Thread-safe by default where feasible.
//! - No global mutable state.

mod blocking;
mod error;
pub mod overpass;
pub mod routing;

pub use error::ProviderBuildError;
