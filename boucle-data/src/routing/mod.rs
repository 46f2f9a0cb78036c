//! HTTP routing through an OSRM service.
//!
//! This module provides [`OsrmRoutingProvider`], an implementation of
//! [`boucle_core::RoutingProvider`] that fetches road geometry, distance and
//! travel time from the OSRM Route API.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use boucle_data::routing::{OsrmProviderConfig, OsrmRoutingProvider};
//!
//! let config = OsrmProviderConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_user_agent("my-app/1.0");
//! let provider = OsrmRoutingProvider::with_config(config)?;
//! # Ok::<(), boucle_data::ProviderBuildError>(())
//! ```

mod osrm;
mod provider;

pub use provider::{DEFAULT_USER_AGENT, OsrmProviderConfig, OsrmRoutingProvider};
