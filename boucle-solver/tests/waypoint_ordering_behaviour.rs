//! Behavioural tests for `WaypointOrderer` using rstest-bdd.

use std::cell::RefCell;

use boucle_core::{GeoPoint, RouteLocation};
use boucle_solver::{OrderingMode, WaypointOrderer, WaypointOrderingRequest};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const START: GeoPoint = GeoPoint::new(48.0, 2.0);

#[derive(Debug)]
struct OrderingWorld {
    request: RefCell<WaypointOrderingRequest>,
    ordered: RefCell<Vec<RouteLocation>>,
}

impl OrderingWorld {
    fn labels(&self) -> Vec<String> {
        self.ordered
            .borrow()
            .iter()
            .map(|location| location.label.clone())
            .collect()
    }
}

#[fixture]
fn world() -> OrderingWorld {
    OrderingWorld {
        request: RefCell::new(WaypointOrderingRequest {
            start: START,
            destination: None,
            waypoints: Vec::new(),
            mode: OrderingMode::Route,
            preserve_order: false,
        }),
        ordered: RefCell::new(Vec::new()),
    }
}

fn location(lat: f64, lon: f64, label: &str) -> RouteLocation {
    RouteLocation::new(GeoPoint::new(lat, lon), label)
}

#[given("a start west of three waypoints on a line")]
fn given_line(world: &OrderingWorld) {
    world.request.borrow_mut().waypoints = vec![
        location(48.0, 2.3, "far"),
        location(48.0, 2.1, "near"),
        location(48.0, 2.2, "mid"),
    ];
}

#[given("a start with a waypoint, its near duplicate and an invalid waypoint")]
fn given_duplicates(world: &OrderingWorld) {
    world.request.borrow_mut().waypoints = vec![
        location(48.0, 2.1, "a"),
        location(48.000_01, 2.100_01, "a-again"),
        location(95.0, 2.1, "bad"),
    ];
}

#[when("the waypoints are ordered for a route to a destination further east")]
fn when_route(world: &OrderingWorld) {
    {
        let mut request = world.request.borrow_mut();
        request.mode = OrderingMode::Route;
        request.destination = Some(GeoPoint::new(48.0, 2.4));
    }
    run(world);
}

#[when("the waypoints are ordered for a loop")]
fn when_loop(world: &OrderingWorld) {
    world.request.borrow_mut().mode = OrderingMode::Loop;
    run(world);
}

#[when("the waypoints are normalised in the given order")]
fn when_preserved(world: &OrderingWorld) {
    world.request.borrow_mut().preserve_order = true;
    run(world);
}

fn run(world: &OrderingWorld) {
    let ordered = WaypointOrderer::new().order(&world.request.borrow());
    world.ordered.replace(ordered);
}

#[then("the visiting order is near, mid, far")]
fn then_travel_order(world: &OrderingWorld) {
    assert_eq!(world.labels(), ["near", "mid", "far"]);
}

#[then("only the first waypoint remains")]
fn then_first_only(world: &OrderingWorld) {
    assert_eq!(world.labels(), ["a"]);
}

#[then("the visiting order is far, near, mid")]
fn then_given_order(world: &OrderingWorld) {
    assert_eq!(world.labels(), ["far", "near", "mid"]);
}

#[scenario(path = "tests/features/waypoint_ordering.feature", index = 0)]
fn travel_order(world: OrderingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/waypoint_ordering.feature", index = 1)]
fn duplicates_dropped(world: OrderingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/waypoint_ordering.feature", index = 2)]
fn preserved_order(world: OrderingWorld) {
    let _ = world;
}
