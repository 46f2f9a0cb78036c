//! Optimisation core of the Boucle routing engine.
//!
//! - [`WaypointOrderer`] orders waypoints exactly (bitmask dynamic programme
//!   up to [`MAX_EXACT_WAYPOINTS`]) or greedily beyond that.
//! - [`LoopCandidateGenerator`] places deterministic synthetic loop shapes
//!   around a start point and discards implausible ones.
//! - [`LoopRouteScorer`] measures self-overlap and distance error of a
//!   realised loop, ranked by [`is_better`].
//! - [`LoopSearch`] drives a [`RoutingProvider`](boucle_core::RoutingProvider)
//!   over the candidates within a wall-clock budget.
//!
//! Everything except the search is pure and synchronous.

#![forbid(unsafe_code)]

mod candidates;
mod ordering;
mod scoring;
mod search;

pub use candidates::{
    CANDIDATE_COUNT, CandidateConfig, LoopCandidate, LoopCandidateGenerator, PlannedLoop,
    candidate_seed,
};
pub use ordering::{
    LOOP_END_WEIGHT, MAX_EXACT_WAYPOINTS, MIN_SEPARATION_M, OrdererConfig, OrderingMode,
    ROUTE_END_WEIGHT, WaypointOrderer, WaypointOrderingRequest, normalize_waypoints, path_length_m,
};
pub use scoring::{
    CandidateScore, LoopRouteScorer, OVERLAP_EPSILON, OverlapLabel, OverlapResult,
    OverlapThresholds, QUANTIZATION_DEG, distance_error_km, is_better,
};
pub use search::{
    DEFAULT_BUDGET, DEFAULT_TOLERANCE, LoopSearch, LoopSearchConfig, LoopSearchError,
    LoopSearchRequest, LoopSearchResult, SearchDiagnostics, StopReason,
};
pub use tokio_util::sync::CancellationToken;
