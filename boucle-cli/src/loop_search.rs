//! `loop` command: round-trip search through an OSRM routing service.

use std::io::Write;
use std::time::Duration;

use boucle_core::RoutingProvider;
use boucle_data::routing::{OsrmProviderConfig, OsrmRoutingProvider};
use boucle_solver::{
    DEFAULT_BUDGET, DEFAULT_TOLERANCE, LoopSearch, LoopSearchConfig, LoopSearchRequest,
    LoopSearchResult,
};
use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::require_existing;
use crate::request::{load_request, write_response};
use crate::{
    ARG_BUDGET_SECS, ARG_OSRM_BASE_URL, ARG_REQUEST, ARG_TOLERANCE, CliError, ENV_LOOP_REQUEST,
};

/// CLI arguments for the `loop` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "loop",
    long_about = "Search for a round trip described by a JSON-encoded \
                 LoopSearchRequest. Candidate loops are routed through an \
                 OSRM instance within a wall-clock budget and the best one \
                 is printed.",
    about = "Search for a round trip of a target length"
)]
#[ortho_config(prefix = "BOUCLE")]
pub(crate) struct LoopArgs {
    /// Path to a JSON file containing a LoopSearchRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Wall-clock budget for the whole search, in seconds.
    #[arg(long = ARG_BUDGET_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) budget_secs: Option<u64>,
    /// Accepted relative deviation from the target distance.
    #[arg(long = ARG_TOLERANCE, value_name = "fraction")]
    #[serde(default)]
    pub(crate) tolerance: Option<f64>,
}

impl LoopArgs {
    pub(crate) fn into_config(self) -> Result<LoopConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LoopConfig::try_from(merged)
    }
}

/// Resolved `loop` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LoopConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) osrm_base_url: String,
    pub(crate) budget: Duration,
    pub(crate) tolerance: f64,
}

impl LoopConfig {
    fn search_config(&self) -> LoopSearchConfig {
        LoopSearchConfig {
            budget: self.budget,
            tolerance: self.tolerance,
            ..LoopSearchConfig::default()
        }
    }
}

impl TryFrom<LoopArgs> for LoopConfig {
    type Error = CliError;

    fn try_from(args: LoopArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_LOOP_REQUEST,
        })?;
        let budget = args.budget_secs.map_or(DEFAULT_BUDGET, Duration::from_secs);
        if budget.is_zero() {
            return Err(CliError::InvalidArgument {
                field: ARG_BUDGET_SECS,
                reason: "must be at least one second".to_owned(),
            });
        }
        let tolerance = args.tolerance.unwrap_or(DEFAULT_TOLERANCE);
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(CliError::InvalidArgument {
                field: ARG_TOLERANCE,
                reason: format!("must be a positive fraction, got {tolerance}"),
            });
        }
        let osrm_base_url = args
            .osrm_base_url
            .unwrap_or_else(|| OsrmProviderConfig::default().base_url);
        Ok(Self {
            request_path,
            osrm_base_url,
            budget,
            tolerance,
        })
    }
}

/// Builds the routing provider for the current loop invocation.
pub(crate) trait RoutingProviderBuilder {
    fn build(&self, config: &LoopConfig) -> Result<Box<dyn RoutingProvider>, CliError>;
}

pub(crate) struct OsrmProviderBuilder;

impl RoutingProviderBuilder for OsrmProviderBuilder {
    fn build(&self, config: &LoopConfig) -> Result<Box<dyn RoutingProvider>, CliError> {
        let provider = OsrmRoutingProvider::new(config.osrm_base_url.clone()).map_err(|source| {
            CliError::BuildClient {
                url: config.osrm_base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(provider))
    }
}

pub(crate) fn run_loop(args: LoopArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_loop_with(args, &OsrmProviderBuilder, &mut stdout)
}

pub(crate) fn run_loop_with(
    args: LoopArgs,
    builder: &dyn RoutingProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.request_path, ARG_REQUEST)?;
    let request: LoopSearchRequest = load_request(&config.request_path)?;
    let result = execute_loop(&config, &request, builder)?;
    write_response(writer, &result)
}

fn execute_loop(
    config: &LoopConfig,
    request: &LoopSearchRequest,
    builder: &dyn RoutingProviderBuilder,
) -> Result<LoopSearchResult, CliError> {
    let provider = builder.build(config)?;
    let search = LoopSearch::with_config(&*provider, config.search_config());
    let result = search
        .search(request)
        .map_err(|source| CliError::Search { source })?;
    info!(
        "loop of {:.0} m found after {} routed candidates",
        result.distance_m, result.diagnostics.routed
    );
    Ok(result)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<LoopConfig, CliError> {
    let merged = LoopArgs::merge_from_layers(layers).map_err(CliError::from)?;
    LoopConfig::try_from(merged)
}
