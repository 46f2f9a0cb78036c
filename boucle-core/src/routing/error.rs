//! Failures reported by routing providers.

use std::time::Duration;

use thiserror::Error;

/// Errors from [`crate::routing::RoutingProvider::route`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// Fewer than two locations were provided.
    ///
    /// A route needs at least an origin and a destination. Callers should
    /// pre-filter input to avoid this condition.
    #[error("at least two locations are required, got {count}")]
    TooFewLocations {
        /// Number of locations received.
        count: usize,
    },
    /// The request did not complete within its timeout.
    #[error("routing request to {url} timed out after {timeout:?}")]
    Timeout {
        /// URL of the request that timed out.
        url: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },
    /// The routing service answered with an HTTP error status.
    #[error("routing service at {url} returned HTTP {status}: {message}")]
    HttpError {
        /// URL of the failed request.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },
    /// The routing service could not be reached.
    #[error("network error contacting {url}: {message}")]
    NetworkError {
        /// URL of the failed request.
        url: String,
        /// Error detail.
        message: String,
    },
    /// The routing service rejected the request with a service code.
    #[error("routing service error {code}: {message}")]
    ServiceError {
        /// Service-specific status code, e.g. `NoRoute`.
        code: String,
        /// Service-provided message.
        message: String,
    },
    /// The response could not be decoded.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Decoder error detail.
        message: String,
    },
}
