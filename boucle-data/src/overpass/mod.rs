//! Fetch catalog features from an Overpass API instance.
//!
//! [`build_query`] renders the catalog into Overpass QL, [`parse_response`]
//! turns the JSON answer into [`PoiFeature`]s and [`OverpassClient`] does
//! both over HTTP. The client also implements [`PoiSource`] so it can feed
//! a [`CorridorSearch`](boucle_poi::CorridorSearch) directly.
//!
//! # Example
//!
//! ```no_run
//! use boucle_core::{GeoPoint, RoutePolyline};
//! use boucle_data::overpass::{OverpassClient, OverpassConfig};
//! use boucle_poi::CorridorSearch;
//!
//! let client = OverpassClient::with_config(OverpassConfig::default())?;
//! let route = RoutePolyline::new(vec![GeoPoint::new(48.85, 2.35), GeoPoint::new(48.86, 2.36)]);
//! let matches = CorridorSearch::new().find(&route, &client);
//! println!("{} points of interest", matches.len());
//! # Ok::<(), boucle_data::ProviderBuildError>(())
//! ```

mod query;
mod response;

use std::sync::Arc;
use std::time::Duration;

use boucle_core::{PoiFeature, PoiSource};
use boucle_poi::CategoryCatalog;
use geo::Rect;
use log::{debug, warn};
use thiserror::Error;

use crate::ProviderBuildError;
use crate::blocking::BlockingClient;

pub use query::build_query;
pub use response::parse_response;

use response::OverpassResponse;

/// Public Overpass API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Default user agent for Overpass requests.
pub const DEFAULT_USER_AGENT: &str = "boucle-overpass/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors from Overpass requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverpassError {
    /// The request timed out.
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout {
        /// Endpoint contacted.
        url: String,
        /// Timeout applied.
        timeout: Duration,
    },
    /// The server answered with an error status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Endpoint contacted.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },
    /// The server could not be reached.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Endpoint contacted.
        url: String,
        /// Error detail.
        message: String,
    },
    /// The server reported a runtime error in its response body.
    #[error("Overpass reported an error: {message}")]
    Remark {
        /// The server's remark.
        message: String,
    },
    /// The body was not valid Overpass JSON.
    #[error("failed to parse Overpass response: {message}")]
    Parse {
        /// Parser detail.
        message: String,
    },
}

/// Configuration for [`OverpassClient`].
#[derive(Debug, Clone)]
pub struct OverpassConfig {
    /// Interpreter endpoint URL.
    pub endpoint: String,
    /// Request timeout; also sent to the server as the query timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Catalog whose filters are queried.
    pub catalog: Arc<CategoryCatalog>,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            catalog: CategoryCatalog::standard(),
        }
    }
}

impl OverpassConfig {
    /// Create a configuration for the given endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
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

    /// Query a different catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<CategoryCatalog>) -> Self {
        self.catalog = catalog;
        self
    }
}

/// Blocking Overpass API client.
#[derive(Debug)]
pub struct OverpassClient {
    http: BlockingClient,
    config: OverpassConfig,
}

impl OverpassClient {
    /// Create a client for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(OverpassConfig::new(endpoint))
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: OverpassConfig) -> Result<Self, ProviderBuildError> {
        let http = BlockingClient::new(&config.user_agent, config.timeout)?;
        Ok(Self { http, config })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &OverpassConfig {
        &self.config
    }

    /// Fetch catalog features inside `bbox`.
    ///
    /// # Errors
    ///
    /// Returns [`OverpassError`] when the request fails or the body cannot
    /// be parsed.
    pub fn fetch(&self, bbox: &Rect<f64>) -> Result<Vec<PoiFeature>, OverpassError> {
        let query = build_query(bbox, &self.config.catalog, self.config.timeout.as_secs().max(1));
        debug!("querying {} for {:?}", self.config.endpoint, bbox);
        self.http.block_on(self.fetch_async(query))
    }

    async fn fetch_async(&self, query: String) -> Result<Vec<PoiFeature>, OverpassError> {
        let url = self.config.endpoint.as_str();
        let response = self
            .http
            .client()
            .post(url)
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err))?;

        let body: OverpassResponse = response.json().await.map_err(|err| OverpassError::Parse {
            message: err.to_string(),
        })?;
        body.into_features()
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error) -> OverpassError {
        let url = self.config.endpoint.clone();
        if error.is_timeout() {
            return OverpassError::Timeout {
                url,
                timeout: self.config.timeout,
            };
        }
        if let Some(status) = error.status() {
            return OverpassError::Http {
                url,
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        OverpassError::Network {
            url,
            message: error.to_string(),
        }
    }
}

impl PoiSource for OverpassClient {
    /// Fetch features, logging failures and yielding nothing on error.
    fn features_in_bbox(&self, bbox: &Rect<f64>) -> Box<dyn Iterator<Item = PoiFeature> + Send + '_> {
        match self.fetch(bbox) {
            Ok(features) => Box::new(features.into_iter()),
            Err(err) => {
                warn!("Overpass query failed: {err}");
                Box::new(std::iter::empty())
            }
        }
    }
}
