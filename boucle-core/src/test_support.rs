//! Deterministic doubles for the routing and POI boundaries, used by unit
//! and behaviour tests across the workspace.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use geo::Rect;

use crate::geometry::{haversine_distance, interpolate, path_length};
use crate::{
    GeoPoint, PoiFeature, PoiSource, RouteLocation, RoutePolyline, RouteSnapshot, RoutingError,
    RoutingProvider, TravelProfile,
};

/// In-memory `PoiSource` performing a linear scan.
#[derive(Default, Debug, Clone)]
pub struct MemoryPoiSource {
    features: Vec<PoiFeature>,
}

impl MemoryPoiSource {
    /// Create a source from a collection of features.
    pub fn with_features<I>(features: I) -> Self
    where
        I: IntoIterator<Item = PoiFeature>,
    {
        Self {
            features: features.into_iter().collect(),
        }
    }
}

impl PoiSource for MemoryPoiSource {
    fn features_in_bbox(&self, bbox: &Rect<f64>) -> Box<dyn Iterator<Item = PoiFeature> + Send + '_> {
        self.features.as_slice().features_in_bbox(bbox)
    }
}

/// Routes along straight great-circle chords between locations.
///
/// Each leg is densified so that consecutive polyline points are at most
/// `step_m` apart. ETAs use a fixed speed per profile.
#[derive(Debug, Clone, Copy)]
pub struct StraightLineRoutingProvider {
    step_m: f64,
}

impl Default for StraightLineRoutingProvider {
    fn default() -> Self {
        Self { step_m: 100.0 }
    }
}

impl StraightLineRoutingProvider {
    /// Create a provider densifying legs every `step_m` metres.
    #[must_use]
    pub const fn with_step(step_m: f64) -> Self {
        Self { step_m }
    }

    /// Nominal speed for `profile`, in metres per second.
    #[must_use]
    pub const fn speed_mps(profile: TravelProfile) -> f64 {
        match profile {
            TravelProfile::Walking => 1.4,
            TravelProfile::Cycling => 4.5,
            TravelProfile::Driving => 13.9,
        }
    }

    fn densify(&self, locations: &[RouteLocation]) -> Vec<GeoPoint> {
        let mut points = Vec::new();
        for pair in locations.windows(2) {
            let [from, to] = pair else { continue };
            let leg = haversine_distance(from.point, to.point);
            let pieces = if self.step_m > 0.0 {
                (leg / self.step_m).ceil().max(1.0) as usize
            } else {
                1
            };
            for i in 0..pieces {
                points.push(interpolate(from.point, to.point, i as f64 / pieces as f64));
            }
        }
        if let Some(last) = locations.last() {
            points.push(last.point);
        }
        points
    }
}

impl RoutingProvider for StraightLineRoutingProvider {
    fn route(
        &self,
        locations: &[RouteLocation],
        profile: TravelProfile,
        _timeout: Duration,
    ) -> Result<RouteSnapshot, RoutingError> {
        if locations.len() < 2 {
            return Err(RoutingError::TooFewLocations {
                count: locations.len(),
            });
        }
        let points = self.densify(locations);
        let distance_m = path_length(&points);
        Ok(RouteSnapshot {
            polyline: RoutePolyline::new(points),
            distance_m,
            eta: Duration::from_secs_f64(distance_m / Self::speed_mps(profile)),
        })
    }
}

/// Scripted answer returned by [`StubRoutingProvider`].
#[derive(Debug, Clone)]
pub enum StubReply {
    /// Delegate to a [`StraightLineRoutingProvider`].
    Straight,
    /// Fail with the given error.
    Fail(RoutingError),
    /// Return a fixed snapshot.
    Snapshot(RouteSnapshot),
    /// Sleep, then delegate to the straight-line provider.
    Delayed(Duration),
}

/// `RoutingProvider` replaying a script of replies, one per call.
///
/// Once the script runs out every call is answered with
/// [`StubReply::Straight`]. The provider counts calls so tests can assert
/// how many candidates were routed.
#[derive(Debug, Default)]
pub struct StubRoutingProvider {
    script: Mutex<VecDeque<StubReply>>,
    calls: AtomicUsize,
    straight: StraightLineRoutingProvider,
}

impl StubRoutingProvider {
    /// Create a provider replaying `replies` in order.
    pub fn scripted<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = StubReply>,
    {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Create a provider that fails every call with `error`.
    #[must_use]
    pub fn always_failing(error: RoutingError) -> Self {
        Self::scripted(std::iter::repeat_n(StubReply::Fail(error), 64))
    }

    /// Number of `route` calls received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> StubReply {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(StubReply::Straight)
    }
}

impl RoutingProvider for StubRoutingProvider {
    fn route(
        &self,
        locations: &[RouteLocation],
        profile: TravelProfile,
        timeout: Duration,
    ) -> Result<RouteSnapshot, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_reply() {
            StubReply::Straight => self.straight.route(locations, profile, timeout),
            StubReply::Fail(error) => Err(error),
            StubReply::Snapshot(snapshot) => Ok(snapshot),
            StubReply::Delayed(delay) => {
                thread::sleep(delay);
                self.straight.route(locations, profile, timeout)
            }
        }
    }
}
