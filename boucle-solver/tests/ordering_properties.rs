//! Property-based tests for waypoint ordering.
//!
//! # Invariants tested
//!
//! - **Optimality:** exact ordering matches brute force for small inputs.
//! - **Permutation:** the output is a reordering of the normalised input.
//! - **Totality:** invalid coordinates never cause a panic.


use std::collections::HashSet;

use boucle_core::{GeoPoint, RouteLocation};
use boucle_solver::{WaypointOrderer, normalize_waypoints, path_length_m, MIN_SEPARATION_M};
use proptest::prelude::*;

use ordering_support::{brute_force_length, scattered_waypoints};

const START: GeoPoint = GeoPoint::new(48.0, 2.0);

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn exact_route_ordering_is_optimal(seed in any::<u64>(), count in 2_usize..=6, with_end in any::<bool>()) {
        let waypoints = scattered_waypoints(START, count, 0.05, seed);
        let destination = with_end.then_some(GeoPoint::new(48.0, 2.1));
        let normalized = normalize_waypoints(START, &waypoints, MIN_SEPARATION_M);

        let ordered = WaypointOrderer::new().order_for_route(START, destination, &waypoints);
        let optimal = brute_force_length(START, destination, &normalized);
        prop_assert!((path_length_m(START, &ordered, destination) - optimal).abs() < 1e-6);
    }

    #[test]
    fn exact_loop_ordering_is_optimal(seed in any::<u64>(), count in 2_usize..=6) {
        let waypoints = scattered_waypoints(START, count, 0.05, seed);
        let normalized = normalize_waypoints(START, &waypoints, MIN_SEPARATION_M);

        let ordered = WaypointOrderer::new().order_for_loop(START, &waypoints);
        let optimal = brute_force_length(START, Some(START), &normalized);
        prop_assert!((path_length_m(START, &ordered, Some(START)) - optimal).abs() < 1e-6);
    }

    #[test]
    fn ordering_is_a_permutation(seed in any::<u64>(), count in 0_usize..=20) {
        let waypoints = scattered_waypoints(START, count, 0.05, seed);
        let normalized = normalize_waypoints(START, &waypoints, MIN_SEPARATION_M);
        let ordered = WaypointOrderer::new().order_for_loop(START, &waypoints);

        let expected: HashSet<String> = normalized.iter().map(|l| l.label.clone()).collect();
        let actual: HashSet<String> = ordered.iter().map(|l| l.label.clone()).collect();
        prop_assert_eq!(ordered.len(), normalized.len());
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn invalid_coordinates_never_panic(
        lat in prop_oneof![Just(f64::NAN), Just(f64::INFINITY), -200.0_f64..200.0],
        lon in prop_oneof![Just(f64::NEG_INFINITY), -400.0_f64..400.0],
    ) {
        let waypoints = vec![
            RouteLocation::new(GeoPoint::new(lat, lon), "odd"),
            RouteLocation::new(GeoPoint::new(48.01, 2.01), "fine"),
        ];
        let ordered = WaypointOrderer::new().order_for_route(START, None, &waypoints);
        prop_assert!(ordered.iter().all(|l| l.point.is_valid()));
        prop_assert!(ordered.iter().any(|l| l.label == "fine"));
    }
}
