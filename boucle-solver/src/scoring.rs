//! Score realised loops by self-overlap and distance error.
//!
//! Overlap is measured on the road polyline: endpoints are snapped to a
//! 1e-5° grid (about a metre) and each segment is keyed by its unordered
//! endpoint pair. A segment is an overlap segment when another segment, in
//! either direction, has both endpoints in the same or an adjacent grid
//! cell, so vertices straddling a cell boundary still match. Segments whose
//! own endpoints share or touch a cell are too short to compare and are
//! skipped.

use std::collections::HashMap;

use boucle_core::RoutePolyline;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Grid size used to snap polyline vertices, in degrees.
pub const QUANTIZATION_DEG: f64 = 1e-5;

/// Overlap ratios closer than this are treated as equal by [`is_better`].
pub const OVERLAP_EPSILON: f64 = 0.0001;

/// Ratio boundaries between overlap labels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverlapThresholds {
    /// Ratios strictly below this are [`OverlapLabel::Low`].
    pub low_below: f64,
    /// Ratios strictly below this (and not low) are
    /// [`OverlapLabel::Medium`].
    pub medium_below: f64,
}

impl Default for OverlapThresholds {
    fn default() -> Self {
        Self {
            low_below: 0.05,
            medium_below: 0.40,
        }
    }
}

impl OverlapThresholds {
    /// Label for `ratio`.
    #[must_use]
    pub fn label(&self, ratio: f64) -> OverlapLabel {
        if ratio < self.low_below {
            OverlapLabel::Low
        } else if ratio < self.medium_below {
            OverlapLabel::Medium
        } else {
            OverlapLabel::High
        }
    }
}

/// Coarse description of how much a loop doubles back on itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OverlapLabel {
    /// Little or no repeated road.
    Low,
    /// Some repeated road.
    Medium,
    /// Mostly out-and-back.
    High,
}

/// Self-overlap of a polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OverlapResult {
    /// `overlap_segments_count / segments_count`, in `[0, 1]`.
    pub ratio: f64,
    /// Non-degenerate segments considered.
    pub segments_count: usize,
    /// Segments whose key occurs more than once.
    pub overlap_segments_count: usize,
    /// Label derived from `ratio`.
    pub label: OverlapLabel,
}

/// Ranking key of a realised loop.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CandidateScore {
    /// Overlap ratio of the road polyline.
    pub overlap_ratio: f64,
    /// Absolute difference between realised and target distance, in km.
    pub distance_error_km: f64,
}

/// Whether `a` ranks strictly ahead of `b`.
///
/// Lower overlap wins when it is lower by more than [`OVERLAP_EPSILON`];
/// otherwise the smaller distance error wins.
///
/// # Examples
/// ```
/// use boucle_solver::{CandidateScore, is_better};
///
/// let cleaner = CandidateScore { overlap_ratio: 0.15, distance_error_km: 5.0 };
/// let closer = CandidateScore { overlap_ratio: 0.20, distance_error_km: 0.1 };
/// assert!(is_better(&cleaner, &closer));
/// assert!(!is_better(&closer, &cleaner));
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "epsilon comparison")]
pub fn is_better(a: &CandidateScore, b: &CandidateScore) -> bool {
    if a.overlap_ratio < b.overlap_ratio - OVERLAP_EPSILON {
        return true;
    }
    if b.overlap_ratio < a.overlap_ratio - OVERLAP_EPSILON {
        return false;
    }
    a.distance_error_km < b.distance_error_km
}

/// `|actual_km − target_km|`.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "distance error")]
pub fn distance_error_km(actual_km: f64, target_km: f64) -> f64 {
    (actual_km - target_km).abs()
}

/// Scores realised loops against a target distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopRouteScorer {
    thresholds: OverlapThresholds,
}

impl LoopRouteScorer {
    /// Construct a scorer with default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a scorer with explicit thresholds.
    #[must_use]
    pub const fn with_thresholds(thresholds: OverlapThresholds) -> Self {
        Self { thresholds }
    }

    /// Measure the self-overlap of `polyline`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "ratio of segment counts"
    )]
    pub fn overlap(&self, polyline: &RoutePolyline) -> OverlapResult {
        let keys: Vec<SegmentKey> = polyline
            .segments()
            .map(|(a, b)| (quantize(a.lat, a.lon), quantize(b.lat, b.lon)))
            .filter(|&(a, b)| !within_one_cell(a, b))
            .filter_map(|(a, b)| segment_key(a, b))
            .collect();
        let mut counts: HashMap<SegmentKey, usize> = HashMap::with_capacity(keys.len());
        for key in &keys {
            *counts.entry(*key).or_default() += 1;
        }
        let overlap_segments_count = keys
            .iter()
            .filter(|key| {
                nearby_keys(**key)
                    .iter()
                    .filter_map(|nearby| counts.get(nearby))
                    .sum::<usize>()
                    > 1
            })
            .count();
        let segments_count = keys.len();
        let ratio = if segments_count == 0 {
            0.0
        } else {
            overlap_segments_count as f64 / segments_count as f64
        };
        OverlapResult {
            ratio,
            segments_count,
            overlap_segments_count,
            label: self.thresholds.label(ratio),
        }
    }

    /// Score a realised loop of `actual_m` metres against `target_km`.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "metre to kilometre conversion")]
    pub fn score(&self, polyline: &RoutePolyline, actual_m: f64, target_km: f64) -> (OverlapResult, CandidateScore) {
        let overlap = self.overlap(polyline);
        let score = CandidateScore {
            overlap_ratio: overlap.ratio,
            distance_error_km: distance_error_km(actual_m / 1_000.0, target_km),
        };
        (overlap, score)
    }
}

type GridPoint = (i64, i64);
type SegmentKey = (GridPoint, GridPoint);

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    reason = "snapping coordinates to an integer grid"
)]
fn quantize(lat: f64, lon: f64) -> GridPoint {
    (
        (lat / QUANTIZATION_DEG).round() as i64,
        (lon / QUANTIZATION_DEG).round() as i64,
    )
}

fn segment_key(a: GridPoint, b: GridPoint) -> Option<SegmentKey> {
    match a.cmp(&b) {
        std::cmp::Ordering::Equal => None,
        std::cmp::Ordering::Less => Some((a, b)),
        std::cmp::Ordering::Greater => Some((b, a)),
    }
}

fn within_one_cell(a: GridPoint, b: GridPoint) -> bool {
    a.0.abs_diff(b.0) <= 1 && a.1.abs_diff(b.1) <= 1
}

fn adjacent_cells((lat, lon): GridPoint) -> impl Iterator<Item = GridPoint> {
    (-1..=1).flat_map(move |d_lat| (-1..=1).map(move |d_lon| (lat + d_lat, lon + d_lon)))
}

/// Distinct keys whose endpoints each lie in a cell adjacent to `key`'s.
fn nearby_keys((a, b): SegmentKey) -> Vec<SegmentKey> {
    let mut keys: Vec<SegmentKey> = adjacent_cells(a)
        .flat_map(|near_a| adjacent_cells(b).filter_map(move |near_b| segment_key(near_a, near_b)))
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}
