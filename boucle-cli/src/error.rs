//! Error types emitted by the Boucle CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use boucle_data::ProviderBuildError;
use boucle_data::overpass::OverpassError;
use boucle_solver::LoopSearchError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors emitted by the Boucle CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// An option has a value the engine cannot use.
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the request file failed.
    #[error("failed to open request at {path:?}: {source}")]
    OpenRequest {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Request JSON could not be decoded.
    #[error("failed to parse request JSON at {path:?}: {source}")]
    ParseRequest {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Constructing an HTTP client for a remote service failed.
    #[error("failed to build client for {url:?}: {source}")]
    BuildClient {
        url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// The loop search produced no usable loop.
    #[error("loop search failed: {source}")]
    Search {
        #[source]
        source: LoopSearchError,
    },
    /// Fetching points of interest from Overpass failed.
    #[error("failed to fetch features from {endpoint:?}: {source}")]
    FetchFeatures {
        endpoint: String,
        #[source]
        source: OverpassError,
    },
    /// Serializing the response failed.
    #[error("failed to serialize response: {0}")]
    SerializeResponse(#[source] serde_json::Error),
    /// Writing the response failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
