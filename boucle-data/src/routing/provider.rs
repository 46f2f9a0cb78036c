//! `RoutingProvider` backed by OSRM's Route API.
//!
//! The [`RoutingProvider`] trait is synchronous so the solver stays
//! embeddable in synchronous contexts. This provider bridges the async HTTP
//! call to the sync interface by blocking on a Tokio runtime internally.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use boucle_core::{GeoPoint, RouteLocation, RoutingProvider, TravelProfile};
//! use boucle_data::routing::OsrmRoutingProvider;
//!
//! let provider = OsrmRoutingProvider::new("http://localhost:5000")?;
//! let stops = [
//!     RouteLocation::unlabelled(GeoPoint::new(48.8566, 2.3522)),
//!     RouteLocation::unlabelled(GeoPoint::new(48.8606, 2.3376)),
//! ];
//! let snapshot = provider.route(&stops, TravelProfile::Walking, Duration::from_secs(5))?;
//! println!("{:.0} m in {:?}", snapshot.distance_m, snapshot.eta);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use boucle_core::{
    GeoPoint, RouteLocation, RoutePolyline, RouteSnapshot, RoutingError, RoutingProvider,
    TravelProfile,
};
use log::debug;

use super::osrm::RouteResponse;
use crate::ProviderBuildError;
use crate::blocking::BlockingClient;

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "boucle-routing/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`OsrmRoutingProvider`].
#[derive(Debug, Clone)]
pub struct OsrmProviderConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Upper bound on any single request.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OsrmProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OsrmProviderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout ceiling.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Routing provider calling an OSRM Route service over HTTP.
///
/// Each call is bounded by the smaller of the configured timeout and the
/// timeout passed to [`RoutingProvider::route`].
///
/// # Runtime requirements
///
/// When called from within an existing Tokio runtime, the runtime should be
/// multi-threaded. Inside a `current_thread` runtime the provider falls back
/// to its own runtime, which may deadlock if the caller's runtime drives IO
/// or timers this request depends on.
#[derive(Debug)]
pub struct OsrmRoutingProvider {
    http: BlockingClient,
    config: OsrmProviderConfig,
}

impl OsrmRoutingProvider {
    /// Create a new provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(OsrmProviderConfig::new(base_url))
    }

    /// Create a new provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: OsrmProviderConfig) -> Result<Self, ProviderBuildError> {
        let http = BlockingClient::new(&config.user_agent, config.timeout)?;
        Ok(Self { http, config })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &OsrmProviderConfig {
        &self.config
    }

    /// Build the OSRM Route API URL for the given locations.
    ///
    /// The URL format is
    /// `{base_url}/route/v1/{profile}/{coordinates}?overview=full&geometries=geojson`
    /// where coordinates are semicolon-separated `lon,lat` pairs.
    fn build_route_url(&self, locations: &[RouteLocation], profile: TravelProfile) -> String {
        let coords = locations
            .iter()
            .map(|location| format!("{},{}", location.point.lon, location.point.lat))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson",
            self.config.base_url.trim_end_matches('/'),
            profile.osrm_profile(),
            coords
        )
    }

    async fn fetch_route_async(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<RouteSnapshot, RoutingError> {
        let response = self
            .http
            .client()
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| convert_reqwest_error(&err, url, timeout))?
            .error_for_status()
            .map_err(|err| convert_reqwest_error(&err, url, timeout))?;

        let route_response: RouteResponse =
            response
                .json()
                .await
                .map_err(|err| RoutingError::ParseError {
                    message: err.to_string(),
                })?;

        convert_response(route_response)
    }
}

/// Convert a reqwest error to a `RoutingError`.
fn convert_reqwest_error(error: &reqwest::Error, url: &str, timeout: Duration) -> RoutingError {
    if error.is_timeout() {
        return RoutingError::Timeout {
            url: url.to_owned(),
            timeout,
        };
    }

    if let Some(status) = error.status() {
        return RoutingError::HttpError {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    RoutingError::NetworkError {
        url: url.to_owned(),
        message: error.to_string(),
    }
}

/// Convert an OSRM response to a `RouteSnapshot` using its first route.
fn convert_response(response: RouteResponse) -> Result<RouteSnapshot, RoutingError> {
    if !response.is_ok() {
        return Err(RoutingError::ServiceError {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| RoutingError::ParseError {
            message: "OSRM response contains no route".to_owned(),
        })?;

    if !route.distance.is_finite() || route.distance < 0.0 {
        return Err(RoutingError::ParseError {
            message: format!("OSRM route has invalid distance {}", route.distance),
        });
    }
    let eta = Duration::try_from_secs_f64(route.duration).map_err(|err| {
        RoutingError::ParseError {
            message: format!("OSRM route has invalid duration {}: {err}", route.duration),
        }
    })?;

    let polyline: RoutePolyline = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lon, lat]| GeoPoint::new(lat, lon))
        .collect();

    Ok(RouteSnapshot {
        polyline,
        distance_m: route.distance,
        eta,
    })
}

impl RoutingProvider for OsrmRoutingProvider {
    fn route(
        &self,
        locations: &[RouteLocation],
        profile: TravelProfile,
        timeout: Duration,
    ) -> Result<RouteSnapshot, RoutingError> {
        if locations.len() < 2 {
            return Err(RoutingError::TooFewLocations {
                count: locations.len(),
            });
        }

        let url = self.build_route_url(locations, profile);
        let effective = timeout.min(self.config.timeout);
        if effective.is_zero() {
            return Err(RoutingError::Timeout { url, timeout });
        }

        debug!("requesting {} from OSRM", url);
        self.http.block_on(self.fetch_route_async(&url, effective))
    }
}
