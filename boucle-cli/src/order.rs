//! `order` command: waypoint ordering for a trip or a loop.

use std::io::Write;

use boucle_core::RouteLocation;
use boucle_solver::{
    MAX_EXACT_WAYPOINTS, OrdererConfig, OrderingMode, WaypointOrderer, WaypointOrderingRequest,
    path_length_m,
};
use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::require_existing;
use crate::request::{load_request, write_response};
use crate::{ARG_EXACT_LIMIT, ARG_REQUEST, CliError, ENV_ORDER_REQUEST};

/// CLI arguments for the `order` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "order",
    long_about = "Order the waypoints of a JSON-encoded WaypointOrderingRequest. \
                 Small sets are ordered exactly; larger ones greedily.",
    about = "Order waypoints to minimise the distance travelled"
)]
#[ortho_config(prefix = "BOUCLE")]
pub(crate) struct OrderArgs {
    /// Path to a JSON file containing a WaypointOrderingRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Largest waypoint count ordered exactly.
    #[arg(long = ARG_EXACT_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) exact_limit: Option<usize>,
}

impl OrderArgs {
    pub(crate) fn into_config(self) -> Result<OrderConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        OrderConfig::try_from(merged)
    }
}

/// Resolved `order` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrderConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) exact_limit: usize,
}

impl TryFrom<OrderArgs> for OrderConfig {
    type Error = CliError;

    fn try_from(args: OrderArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_ORDER_REQUEST,
        })?;
        let exact_limit = args.exact_limit.unwrap_or(MAX_EXACT_WAYPOINTS);
        if exact_limit > MAX_EXACT_WAYPOINTS {
            return Err(CliError::InvalidArgument {
                field: ARG_EXACT_LIMIT,
                reason: format!("must not exceed {MAX_EXACT_WAYPOINTS}, got {exact_limit}"),
            });
        }
        Ok(Self {
            request_path,
            exact_limit,
        })
    }
}

/// Ordered waypoints and the great-circle length of the resulting path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct OrderResponse {
    pub(crate) ordered: Vec<RouteLocation>,
    pub(crate) distance_m: f64,
}

pub(crate) fn run_order(args: OrderArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_order_with(args, &mut stdout)
}

pub(crate) fn run_order_with(args: OrderArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.request_path, ARG_REQUEST)?;
    let request: WaypointOrderingRequest = load_request(&config.request_path)?;
    let response = execute_order(&config, &request);
    write_response(writer, &response)
}

pub(crate) fn execute_order(config: &OrderConfig, request: &WaypointOrderingRequest) -> OrderResponse {
    let orderer =
        WaypointOrderer::with_config(OrdererConfig::default().with_exact_limit(config.exact_limit));
    let ordered = orderer.order(request);
    let destination = match request.mode {
        OrderingMode::Route => request.destination,
        OrderingMode::Loop => Some(request.start),
    };
    let distance_m = path_length_m(request.start, &ordered, destination);
    info!(
        "ordered {} of {} waypoints over {distance_m:.0} m",
        ordered.len(),
        request.waypoints.len()
    );
    OrderResponse {
        ordered,
        distance_m,
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<OrderConfig, CliError> {
    let merged = OrderArgs::merge_from_layers(layers).map_err(CliError::from)?;
    OrderConfig::try_from(merged)
}
