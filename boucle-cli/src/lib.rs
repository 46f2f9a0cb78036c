//! Command-line interface for the Boucle route engine.
//!
//! Each subcommand reads a JSON request file, runs one engine operation and
//! prints the JSON response on stdout:
//!
//! - `order` orders waypoints for a one-way trip or a loop.
//! - `loop` searches for a round trip of a target length through OSRM.
//! - `corridor` finds points of interest along a route, fetching them from
//!   Overpass when the request carries none.
//!
//! Options are layered by `ortho_config`: CLI flags override `BOUCLE_`
//! environment variables, which override configuration files.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod corridor;
mod error;
mod fs;
mod loop_search;
mod order;
mod request;

pub use error::CliError;

use corridor::CorridorArgs;
use loop_search::LoopArgs;
use order::OrderArgs;

const ARG_REQUEST: &str = "request";
const ARG_EXACT_LIMIT: &str = "exact-limit";
const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
const ARG_BUDGET_SECS: &str = "budget-secs";
const ARG_TOLERANCE: &str = "tolerance";
const ARG_CORRIDOR_WIDTH: &str = "corridor-width";
const ARG_OVERPASS_ENDPOINT: &str = "overpass-endpoint";
const ARG_OVERPASS_TIMEOUT_SECS: &str = "overpass-timeout-secs";
const ENV_ORDER_REQUEST: &str = "BOUCLE_CMDS_ORDER_REQUEST_PATH";
const ENV_LOOP_REQUEST: &str = "BOUCLE_CMDS_LOOP_REQUEST_PATH";
const ENV_CORRIDOR_REQUEST: &str = "BOUCLE_CMDS_CORRIDOR_REQUEST_PATH";

/// Run the Boucle CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when argument parsing, configuration, request
/// loading, the engine operation or writing the response fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Order(args) => order::run_order(args),
        Command::Loop(args) => loop_search::run_loop(args),
        Command::Corridor(args) => corridor::run_corridor(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "boucle",
    about = "Plan loops, order waypoints and find points of interest along routes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Order waypoints to minimise the distance travelled.
    Order(OrderArgs),
    /// Search for a round trip of a target length.
    Loop(LoopArgs),
    /// Find points of interest along a route.
    Corridor(CorridorArgs),
}

#[cfg(test)]
mod tests;
