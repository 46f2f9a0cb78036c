//! Routing provider trait, travel profiles and route snapshots.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{RouteLocation, RoutePolyline};

use super::error::RoutingError;

/// Mode of travel requested from the routing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TravelProfile {
    /// On foot.
    Walking,
    /// By bicycle.
    #[default]
    Cycling,
    /// By car.
    Driving,
}

impl TravelProfile {
    /// Every profile, in declaration order.
    pub const ALL: [Self; 3] = [Self::Walking, Self::Cycling, Self::Driving];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Cycling => "cycling",
            Self::Driving => "driving",
        }
    }

    /// Profile segment used in OSRM service URLs.
    ///
    /// # Examples
    /// ```
    /// use boucle_core::TravelProfile;
    ///
    /// assert_eq!(TravelProfile::Cycling.osrm_profile(), "bike");
    /// ```
    #[must_use]
    pub const fn osrm_profile(self) -> &'static str {
        match self {
            Self::Walking => "foot",
            Self::Cycling => "bike",
            Self::Driving => "car",
        }
    }
}

impl fmt::Display for TravelProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognised travel profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown travel profile: {0}")]
pub struct UnknownTravelProfile(pub String);

impl FromStr for TravelProfile {
    type Err = UnknownTravelProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walking" | "walk" | "foot" => Ok(Self::Walking),
            "cycling" | "bike" | "bicycle" => Ok(Self::Cycling),
            "driving" | "car" => Ok(Self::Driving),
            _ => Err(UnknownTravelProfile(s.to_owned())),
        }
    }
}

/// Road geometry realised by a [`RoutingProvider`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteSnapshot {
    /// Road polyline from the first to the last location.
    pub polyline: RoutePolyline,
    /// Length of the route in metres.
    pub distance_m: f64,
    /// Estimated travel time.
    pub eta: Duration,
}

/// Realise a road route through an ordered list of locations.
///
/// Implementations must visit the locations in the order given and return
/// `Err(RoutingError::TooFewLocations)` for fewer than two locations. The
/// `timeout` bounds the whole call; callers pass their remaining budget.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use boucle_core::{
///     GeoPoint, RouteLocation, RoutePolyline, RouteSnapshot, RoutingError, RoutingProvider,
///     TravelProfile,
/// };
///
/// struct Teleport;
///
/// impl RoutingProvider for Teleport {
///     fn route(
///         &self,
///         locations: &[RouteLocation],
///         _profile: TravelProfile,
///         _timeout: Duration,
///     ) -> Result<RouteSnapshot, RoutingError> {
///         if locations.len() < 2 {
///             return Err(RoutingError::TooFewLocations { count: locations.len() });
///         }
///         let polyline: RoutePolyline = locations.iter().map(|l| l.point).collect();
///         Ok(RouteSnapshot { polyline, distance_m: 0.0, eta: Duration::ZERO })
///     }
/// }
///
/// let a = RouteLocation::unlabelled(GeoPoint::new(48.0, 2.0));
/// let b = RouteLocation::unlabelled(GeoPoint::new(48.1, 2.0));
/// let snapshot = Teleport.route(&[a, b], TravelProfile::Walking, Duration::from_secs(1))?;
/// assert_eq!(snapshot.polyline.len(), 2);
/// # Ok::<(), RoutingError>(())
/// ```
pub trait RoutingProvider: Send + Sync {
    /// Route through `locations` in order using `profile`.
    ///
    /// # Errors
    ///
    /// Returns a [`RoutingError`] when the input is too short, the service is
    /// unreachable or slow, or its answer cannot be used.
    fn route(
        &self,
        locations: &[RouteLocation],
        profile: TravelProfile,
        timeout: Duration,
    ) -> Result<RouteSnapshot, RoutingError>;
}

impl<P: RoutingProvider + ?Sized> RoutingProvider for &P {
    fn route(
        &self,
        locations: &[RouteLocation],
        profile: TravelProfile,
        timeout: Duration,
    ) -> Result<RouteSnapshot, RoutingError> {
        (**self).route(locations, profile, timeout)
    }
}
