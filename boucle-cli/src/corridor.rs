//! `corridor` command: points of interest along a route.

use std::io::Write;
use std::time::Duration;

use boucle_core::{PoiFeature, PoiMatch};
use boucle_data::overpass::{DEFAULT_ENDPOINT, OverpassClient, OverpassConfig};
use boucle_poi::{CorridorMatchRequest, CorridorSearch, DEFAULT_CORRIDOR_WIDTH_M};
use camino::Utf8PathBuf;
use clap::Parser;
use geo::Rect;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::require_existing;
use crate::request::{load_request, write_response};
use crate::{
    ARG_CORRIDOR_WIDTH, ARG_OVERPASS_ENDPOINT, ARG_OVERPASS_TIMEOUT_SECS, ARG_REQUEST, CliError,
    ENV_CORRIDOR_REQUEST,
};

const DEFAULT_OVERPASS_TIMEOUT_SECS: u64 = 60;

/// CLI arguments for the `corridor` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "corridor",
    long_about = "Find points of interest within a corridor around the route \
                 of a JSON-encoded CorridorMatchRequest. Requests without \
                 features are completed from an Overpass endpoint.",
    about = "Find points of interest along a route"
)]
#[ortho_config(prefix = "BOUCLE")]
pub(crate) struct CorridorArgs {
    /// Path to a JSON file containing a CorridorMatchRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Corridor half-width in metres; overrides the request.
    #[arg(long = ARG_CORRIDOR_WIDTH, value_name = "metres")]
    #[serde(default)]
    pub(crate) corridor_width: Option<f64>,
    /// Overpass API interpreter URL.
    #[arg(long = ARG_OVERPASS_ENDPOINT, value_name = "url")]
    #[serde(default)]
    pub(crate) overpass_endpoint: Option<String>,
    /// Overpass request timeout, in seconds.
    #[arg(long = ARG_OVERPASS_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) overpass_timeout_secs: Option<u64>,
}

impl CorridorArgs {
    pub(crate) fn into_config(self) -> Result<CorridorConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CorridorConfig::try_from(merged)
    }
}

/// Resolved `corridor` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CorridorConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) corridor_width_m: Option<f64>,
    pub(crate) overpass_endpoint: String,
    pub(crate) overpass_timeout: Duration,
}

impl TryFrom<CorridorArgs> for CorridorConfig {
    type Error = CliError;

    fn try_from(args: CorridorArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_CORRIDOR_REQUEST,
        })?;
        if let Some(width) = args.corridor_width {
            validate_width(width)?;
        }
        let overpass_timeout = Duration::from_secs(
            args.overpass_timeout_secs
                .unwrap_or(DEFAULT_OVERPASS_TIMEOUT_SECS),
        );
        Ok(Self {
            request_path,
            corridor_width_m: args.corridor_width,
            overpass_endpoint: args
                .overpass_endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()),
            overpass_timeout,
        })
    }
}

fn validate_width(width: f64) -> Result<(), CliError> {
    if width.is_finite() && width >= 0.0 {
        Ok(())
    } else {
        Err(CliError::InvalidArgument {
            field: ARG_CORRIDOR_WIDTH,
            reason: format!("must be a non-negative number of metres, got {width}"),
        })
    }
}

/// Points of interest found along the route, ordered by distance along it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CorridorResponse {
    pub(crate) corridor_width_m: f64,
    pub(crate) matches: Vec<PoiMatch>,
}

/// Supplies features when the request carries none.
pub(crate) trait FeatureFetcher {
    fn fetch(
        &self,
        config: &CorridorConfig,
        bbox: &Rect<f64>,
    ) -> Result<Vec<PoiFeature>, CliError>;
}

pub(crate) struct OverpassFetcher;

impl FeatureFetcher for OverpassFetcher {
    fn fetch(
        &self,
        config: &CorridorConfig,
        bbox: &Rect<f64>,
    ) -> Result<Vec<PoiFeature>, CliError> {
        let endpoint = config.overpass_endpoint.clone();
        let overpass = OverpassConfig::new(endpoint.as_str()).with_timeout(config.overpass_timeout);
        let client = OverpassClient::with_config(overpass).map_err(|source| {
            CliError::BuildClient {
                url: endpoint.clone(),
                source,
            }
        })?;
        client
            .fetch(bbox)
            .map_err(|source| CliError::FetchFeatures { endpoint, source })
    }
}

pub(crate) fn run_corridor(args: CorridorArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_corridor_with(args, &OverpassFetcher, &mut stdout)
}

pub(crate) fn run_corridor_with(
    args: CorridorArgs,
    fetcher: &dyn FeatureFetcher,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.request_path, ARG_REQUEST)?;
    let request: CorridorMatchRequest = load_request(&config.request_path)?;
    let response = execute_corridor(&config, request, fetcher)?;
    write_response(writer, &response)
}

fn execute_corridor(
    config: &CorridorConfig,
    request: CorridorMatchRequest,
    fetcher: &dyn FeatureFetcher,
) -> Result<CorridorResponse, CliError> {
    let width = config
        .corridor_width_m
        .or(request.corridor_width_m)
        .unwrap_or(DEFAULT_CORRIDOR_WIDTH_M);
    validate_width(width)?;
    let search = CorridorSearch::new().with_corridor_width(width);

    let features = if request.features.is_empty() {
        match request.route.bounding_rect(width) {
            Some(bbox) => fetcher.fetch(config, &bbox)?,
            None => Vec::new(),
        }
    } else {
        request.features
    };
    let matches = search.find(&request.route, features.as_slice());
    info!(
        "{} points of interest within {width:.0} m of the route",
        matches.len()
    );
    Ok(CorridorResponse {
        corridor_width_m: width,
        matches,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<CorridorConfig, CliError> {
    let merged = CorridorArgs::merge_from_layers(layers).map_err(CliError::from)?;
    CorridorConfig::try_from(merged)
}
