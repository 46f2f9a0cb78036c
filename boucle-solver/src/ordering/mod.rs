//! Order waypoints into a short visiting sequence.
//!
//! Waypoints are always normalised first (see [`normalize_waypoints`]). Up to
//! [`MAX_EXACT_WAYPOINTS`] survivors are ordered exactly with a bitmask
//! dynamic programme over visited subsets; larger sets fall back to a greedy
//! nearest-neighbour walk biased towards the destination.
//!
//! Ordering never fails: degenerate input yields a shorter (possibly empty)
//! sequence instead of an error.

mod exact;
mod greedy;
mod normalize;


use boucle_core::geometry::haversine_distance;
use boucle_core::{GeoPoint, RouteLocation};
use log::warn;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use normalize::normalize_waypoints;

/// Largest waypoint count ordered with the exact dynamic programme.
///
/// The subset table holds `2^n × n` entries, so this ceiling is a hard
/// limit. [`OrdererConfig::exact_limit`] may lower it but never raise it.
pub const MAX_EXACT_WAYPOINTS: usize = 12;

/// Minimum separation between waypoints, and from the start, in metres.
pub const MIN_SEPARATION_M: f64 = 15.0;

/// Destination bias applied by the greedy fallback for point-to-point routes.
pub const ROUTE_END_WEIGHT: f64 = 0.35;

/// Destination bias applied by the greedy fallback for loops.
pub const LOOP_END_WEIGHT: f64 = 0.18;

/// Shape of the trip being ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OrderingMode {
    /// From the start to a (possibly absent) destination.
    #[default]
    Route,
    /// From the start back to the start.
    Loop,
}

/// Tunables for [`WaypointOrderer`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OrdererConfig {
    /// Waypoint count up to which ordering is exact; capped at
    /// [`MAX_EXACT_WAYPOINTS`].
    pub exact_limit: usize,
    /// Greedy destination bias for [`OrderingMode::Route`].
    pub route_end_weight: f64,
    /// Greedy destination bias for [`OrderingMode::Loop`].
    pub loop_end_weight: f64,
    /// Minimum separation used during normalisation, in metres.
    pub min_separation_m: f64,
}

impl Default for OrdererConfig {
    fn default() -> Self {
        Self {
            exact_limit: MAX_EXACT_WAYPOINTS,
            route_end_weight: ROUTE_END_WEIGHT,
            loop_end_weight: LOOP_END_WEIGHT,
            min_separation_m: MIN_SEPARATION_M,
        }
    }
}

impl OrdererConfig {
    /// Lower the exact-ordering ceiling. Values above
    /// [`MAX_EXACT_WAYPOINTS`] are clamped.
    #[must_use]
    pub fn with_exact_limit(mut self, limit: usize) -> Self {
        self.exact_limit = limit.min(MAX_EXACT_WAYPOINTS);
        self
    }

    fn effective_exact_limit(&self) -> usize {
        self.exact_limit.min(MAX_EXACT_WAYPOINTS)
    }

    const fn end_weight(&self, mode: OrderingMode) -> f64 {
        match mode {
            OrderingMode::Route => self.route_end_weight,
            OrderingMode::Loop => self.loop_end_weight,
        }
    }
}

/// Input to [`WaypointOrderer::order`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WaypointOrderingRequest {
    /// Trip origin.
    pub start: GeoPoint,
    /// Trip destination. Ignored in loop mode; absent means the last leg is
    /// free.
    #[cfg_attr(feature = "serde", serde(default))]
    pub destination: Option<GeoPoint>,
    /// Waypoints to visit, in any order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub waypoints: Vec<RouteLocation>,
    /// Trip shape.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: OrderingMode,
    /// Keep the caller's order and only normalise.
    #[cfg_attr(feature = "serde", serde(default))]
    pub preserve_order: bool,
}

/// Orders waypoints to minimise the travelled distance.
///
/// # Examples
/// ```
/// use boucle_core::{GeoPoint, RouteLocation};
/// use boucle_solver::WaypointOrderer;
///
/// let start = GeoPoint::new(48.0, 2.0);
/// let far = RouteLocation::new(GeoPoint::new(48.0, 2.2), "far");
/// let near = RouteLocation::new(GeoPoint::new(48.0, 2.1), "near");
/// let ordered = WaypointOrderer::new().order_for_route(start, None, &[far, near]);
/// let labels: Vec<_> = ordered.iter().map(|l| l.label.as_str()).collect();
/// assert_eq!(labels, ["near", "far"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WaypointOrderer {
    config: OrdererConfig,
}

impl WaypointOrderer {
    /// Construct an orderer with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(OrdererConfig::default())
    }

    /// Construct an orderer with explicit configuration.
    #[must_use]
    pub const fn with_config(config: OrdererConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &OrdererConfig {
        &self.config
    }

    /// Order the waypoints of `request`.
    #[must_use]
    pub fn order(&self, request: &WaypointOrderingRequest) -> Vec<RouteLocation> {
        if request.preserve_order {
            return self.preserve_order(request.start, &request.waypoints);
        }
        let destination = match request.mode {
            OrderingMode::Route => request.destination,
            OrderingMode::Loop => Some(request.start),
        };
        self.order_with(request.start, destination, &request.waypoints, request.mode)
    }

    /// Order waypoints for a trip from `start` to `destination`.
    #[must_use]
    pub fn order_for_route(
        &self,
        start: GeoPoint,
        destination: Option<GeoPoint>,
        waypoints: &[RouteLocation],
    ) -> Vec<RouteLocation> {
        self.order_with(start, destination, waypoints, OrderingMode::Route)
    }

    /// Order waypoints for a loop returning to `start`.
    #[must_use]
    pub fn order_for_loop(&self, start: GeoPoint, waypoints: &[RouteLocation]) -> Vec<RouteLocation> {
        self.order_with(start, Some(start), waypoints, OrderingMode::Loop)
    }

    /// Normalise waypoints without reordering them.
    #[must_use]
    pub fn preserve_order(&self, start: GeoPoint, waypoints: &[RouteLocation]) -> Vec<RouteLocation> {
        normalize_waypoints(start, waypoints, self.config.min_separation_m)
    }

    fn order_with(
        &self,
        start: GeoPoint,
        destination: Option<GeoPoint>,
        waypoints: &[RouteLocation],
        mode: OrderingMode,
    ) -> Vec<RouteLocation> {
        let normalized = normalize_waypoints(start, waypoints, self.config.min_separation_m);
        if normalized.len() <= 1 {
            return normalized;
        }
        let points: Vec<GeoPoint> = normalized.iter().map(|l| l.point).collect();

        if points.len() <= self.config.effective_exact_limit() {
            if let Some(order) = exact::exact_order(start, destination, &points) {
                return permute(normalized, &order);
            }
            warn!(
                "exact ordering of {} waypoints produced no finite path; using greedy order",
                points.len()
            );
        }
        let order = greedy::greedy_order(start, destination, &points, self.config.end_weight(mode));
        permute(normalized, &order)
    }
}

/// Length of `start → ordered… → destination` along great circles, in
/// metres. An absent destination adds nothing.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "accumulating leg lengths")]
pub fn path_length_m(start: GeoPoint, ordered: &[RouteLocation], destination: Option<GeoPoint>) -> f64 {
    let mut total = 0.0;
    let mut current = start;
    for location in ordered {
        total += haversine_distance(current, location.point);
        current = location.point;
    }
    if let Some(end) = destination {
        total += haversine_distance(current, end);
    }
    total
}

/// Rearrange `locations` into `order`; indices outside the slice are skipped.
fn permute(locations: Vec<RouteLocation>, order: &[usize]) -> Vec<RouteLocation> {
    let mut slots: Vec<Option<RouteLocation>> = locations.into_iter().map(Some).collect();
    order
        .iter()
        .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
        .collect()
}
