//! Loop search: route planned candidates and keep the best realised loop.
//!
//! Candidates are routed one at a time in generation order. Each provider
//! call receives the remaining wall-clock budget as its timeout. Routing
//! failures are logged and skipped; loops whose realised distance misses the
//! target by more than the tolerance are rejected. The search stops when the
//! budget elapses, the cancellation token fires or candidates run out, and
//! returns the best loop seen so far.


use std::time::{Duration, Instant};

use boucle_core::{GeoPoint, RouteLocation, RoutePolyline, RoutingProvider, TravelProfile};
use log::{debug, info, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::candidates::{CandidateConfig, LoopCandidate, LoopCandidateGenerator, PlannedLoop};
use crate::ordering::{OrdererConfig, WaypointOrderer};
use crate::scoring::{CandidateScore, LoopRouteScorer, OverlapResult, OverlapThresholds, is_better};

/// Default wall-clock budget for one search.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(12);

/// Default accepted deviation from the target distance, as a fraction.
pub const DEFAULT_TOLERANCE: f64 = 0.15;

/// Configuration for [`LoopSearch`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LoopSearchConfig {
    /// Wall-clock budget shared by every provider call.
    pub budget: Duration,
    /// Accepted relative deviation of the realised distance.
    pub tolerance: f64,
    /// Candidate generation parameters.
    pub candidates: CandidateConfig,
    /// Waypoint ordering parameters.
    pub orderer: OrdererConfig,
    /// Overlap label boundaries.
    pub thresholds: OverlapThresholds,
}

impl Default for LoopSearchConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            tolerance: DEFAULT_TOLERANCE,
            candidates: CandidateConfig::default(),
            orderer: OrdererConfig::default(),
            thresholds: OverlapThresholds::default(),
        }
    }
}

/// A request for a loop of roughly `target_distance_km`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoopSearchRequest {
    /// Start and finish of the loop.
    pub start: GeoPoint,
    /// Desired length in kilometres.
    pub target_distance_km: f64,
    /// Locations the loop must visit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub waypoints: Vec<RouteLocation>,
    /// Travel mode.
    #[cfg_attr(feature = "serde", serde(default))]
    pub profile: TravelProfile,
    /// Counter selecting a different, still deterministic, candidate set.
    #[cfg_attr(feature = "serde", serde(default))]
    pub variation: u64,
}

impl LoopSearchRequest {
    /// Construct a request without waypoints.
    #[must_use]
    pub const fn new(start: GeoPoint, target_distance_km: f64, profile: TravelProfile) -> Self {
        Self {
            start,
            target_distance_km,
            waypoints: Vec::new(),
            profile,
            variation: 0,
        }
    }

    fn validate(&self) -> Result<(), LoopSearchError> {
        if !self.start.is_valid() {
            return Err(LoopSearchError::InvalidRequest {
                reason: format!("start {:?} is not a valid coordinate", self.start),
            });
        }
        if !self.target_distance_km.is_finite() || self.target_distance_km <= 0.0 {
            return Err(LoopSearchError::InvalidRequest {
                reason: format!(
                    "target distance must be positive, got {}",
                    self.target_distance_km
                ),
            });
        }
        Ok(())
    }
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StopReason {
    /// Every planned candidate was tried within the budget.
    #[default]
    Exhausted,
    /// The wall-clock budget ran out.
    BudgetElapsed,
    /// The caller cancelled the search.
    Cancelled,
}

/// Counters describing a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchDiagnostics {
    /// Wall-clock time spent.
    pub elapsed: Duration,
    /// Candidates generated.
    pub generated: usize,
    /// Candidates surviving the length estimate.
    pub prefiltered: usize,
    /// Candidates the provider routed successfully.
    pub routed: usize,
    /// Candidates the provider failed to route.
    pub failed: usize,
    /// Routed candidates outside the distance tolerance.
    pub rejected: usize,
    /// Why the search stopped.
    pub stop_reason: StopReason,
}

/// The best loop found.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoopSearchResult {
    /// Road geometry from the start back to the start.
    pub polyline: RoutePolyline,
    /// Realised length in metres.
    pub distance_m: f64,
    /// Estimated travel time.
    pub eta: Duration,
    /// Self-overlap of the geometry.
    pub overlap: OverlapResult,
    /// Locations visited between leaving and returning to the start.
    pub ordered: Vec<RouteLocation>,
    /// Candidate that produced the loop.
    pub candidate: LoopCandidate,
    /// Search counters.
    pub diagnostics: SearchDiagnostics,
}

/// Errors from [`LoopSearch::search`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoopSearchError {
    /// The request itself is unusable.
    #[error("invalid loop request: {reason}")]
    InvalidRequest {
        /// What was wrong.
        reason: String,
    },
    /// No candidate produced an acceptable loop.
    #[error(
        "no satisfactory loop found ({} routed, {} failed, {} rejected; stopped: {:?})",
        .diagnostics.routed,
        .diagnostics.failed,
        .diagnostics.rejected,
        .diagnostics.stop_reason
    )]
    NoSatisfactoryLoop {
        /// Search counters.
        diagnostics: SearchDiagnostics,
    },
}

/// Searches for a loop of a target length using a [`RoutingProvider`].
#[derive(Debug)]
pub struct LoopSearch<P>
where
    P: RoutingProvider,
{
    provider: P,
    config: LoopSearchConfig,
    generator: LoopCandidateGenerator,
    scorer: LoopRouteScorer,
}

struct Best {
    score: CandidateScore,
    result: LoopSearchResult,
}

impl<P> LoopSearch<P>
where
    P: RoutingProvider,
{
    /// Construct a search using default configuration.
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, LoopSearchConfig::default())
    }

    /// Construct a search with explicit configuration.
    pub fn with_config(provider: P, config: LoopSearchConfig) -> Self {
        let generator = LoopCandidateGenerator::with_config(
            config.candidates.clone(),
            WaypointOrderer::with_config(config.orderer),
        );
        let scorer = LoopRouteScorer::with_thresholds(config.thresholds);
        Self {
            provider,
            config,
            generator,
            scorer,
        }
    }

    /// Active configuration.
    pub const fn config(&self) -> &LoopSearchConfig {
        &self.config
    }

    /// Search without external cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`LoopSearchError::InvalidRequest`] for an invalid start or
    /// target, and [`LoopSearchError::NoSatisfactoryLoop`] when no candidate
    /// produced an acceptable loop.
    pub fn search(&self, request: &LoopSearchRequest) -> Result<LoopSearchResult, LoopSearchError> {
        self.search_with_cancellation(request, &CancellationToken::new())
    }

    /// Search, stopping early once `cancel` fires.
    ///
    /// # Errors
    ///
    /// See [`LoopSearch::search`].
    pub fn search_with_cancellation(
        &self,
        request: &LoopSearchRequest,
        cancel: &CancellationToken,
    ) -> Result<LoopSearchResult, LoopSearchError> {
        request.validate()?;
        let started_at = Instant::now();
        let deadline = started_at.checked_add(self.config.budget);

        let planned = self.generator.plan(
            request.start,
            request.target_distance_km,
            &request.waypoints,
            request.variation,
        );
        let mut diagnostics = SearchDiagnostics {
            generated: self.config.candidates.count,
            prefiltered: planned.len(),
            ..SearchDiagnostics::default()
        };
        let mut best: Option<Best> = None;

        for plan in planned {
            if cancel.is_cancelled() {
                diagnostics.stop_reason = StopReason::Cancelled;
                break;
            }
            let remaining = deadline.map_or(Duration::MAX, |d| d.saturating_duration_since(Instant::now()));
            if remaining.is_zero() {
                diagnostics.stop_reason = StopReason::BudgetElapsed;
                break;
            }
            if let Some(candidate) = self.evaluate(request, plan, remaining, &mut diagnostics) {
                if best.as_ref().is_none_or(|b| is_better(&candidate.score, &b.score)) {
                    best = Some(candidate);
                }
            }
        }

        if diagnostics.stop_reason == StopReason::Exhausted
            && deadline.is_some_and(|d| Instant::now() >= d)
        {
            diagnostics.stop_reason = StopReason::BudgetElapsed;
        }
        diagnostics.elapsed = started_at.elapsed();
        match best {
            Some(Best { mut result, .. }) => {
                info!(
                    "loop search picked candidate {} ({:.2} km, overlap {:.3}) after {:?}",
                    result.candidate.index,
                    result.distance_m / 1_000.0,
                    result.overlap.ratio,
                    diagnostics.elapsed
                );
                result.diagnostics = diagnostics;
                Ok(result)
            }
            None => {
                info!("loop search found no satisfactory loop: {diagnostics:?}");
                Err(LoopSearchError::NoSatisfactoryLoop { diagnostics })
            }
        }
    }

    #[expect(clippy::float_arithmetic, reason = "distance tolerance check")]
    fn evaluate(
        &self,
        request: &LoopSearchRequest,
        plan: PlannedLoop,
        remaining: Duration,
        diagnostics: &mut SearchDiagnostics,
    ) -> Option<Best> {
        let index = plan.candidate.index;
        let start = RouteLocation::new(request.start, "start");
        let mut locations = Vec::with_capacity(plan.ordered.len() + 2);
        locations.push(start.clone());
        locations.extend(plan.ordered.iter().cloned());
        locations.push(start);

        let snapshot = match self.provider.route(&locations, request.profile, remaining) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                diagnostics.failed += 1;
                warn!("loop candidate {index} could not be routed: {err}");
                return None;
            }
        };
        diagnostics.routed += 1;

        let target_km = request.target_distance_km;
        let actual_km = snapshot.distance_m / 1_000.0;
        if !actual_km.is_finite() || (actual_km - target_km).abs() > target_km * self.config.tolerance {
            diagnostics.rejected += 1;
            debug!("loop candidate {index} realised {actual_km:.2} km for a {target_km:.2} km target");
            return None;
        }

        let (overlap, score) = self
            .scorer
            .score(&snapshot.polyline, snapshot.distance_m, target_km);
        debug!(
            "loop candidate {index}: {actual_km:.2} km, overlap {:.3} ({:?})",
            overlap.ratio, overlap.label
        );
        Some(Best {
            score,
            result: LoopSearchResult {
                polyline: snapshot.polyline,
                distance_m: snapshot.distance_m,
                eta: snapshot.eta,
                overlap,
                ordered: plan.ordered,
                candidate: plan.candidate,
                diagnostics: SearchDiagnostics::default(),
            },
        })
    }
}
