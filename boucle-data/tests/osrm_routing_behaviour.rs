//! Behavioural tests for [`OsrmRoutingProvider`] against a canned local
//! HTTP server.

use std::cell::RefCell;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use boucle_core::{
    GeoPoint, RouteLocation, RouteSnapshot, RoutingError, RoutingProvider, TravelProfile,
};
use boucle_data::routing::OsrmRoutingProvider;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

mod support;

const ROUTE_BODY: &str = r#"{"code": "Ok", "routes": [{"distance": 1234.5, "duration": 275.0,
    "geometry": {"type": "LineString", "coordinates": [[2.3522, 48.8566], [2.3376, 48.8606]]}}]}"#;

#[derive(Default)]
struct RoutingWorld {
    base_url: RefCell<String>,
    requests: RefCell<Option<Receiver<support::SeenRequest>>>,
    result: RefCell<Option<Result<RouteSnapshot, RoutingError>>>,
}

impl RoutingWorld {
    fn serve(&self, status: &str, body: &str) {
        let server = support::serve_once(status, body);
        self.base_url.replace(server.base_url);
        self.requests.replace(Some(server.requests));
    }

    fn result(&self) -> Result<RouteSnapshot, RoutingError> {
        self.result
            .borrow()
            .clone()
            .expect("a route should have been requested")
    }
}

#[fixture]
fn world() -> RoutingWorld {
    RoutingWorld::default()
}

#[given("an OSRM service returning a two point route")]
fn given_route(world: &RoutingWorld) {
    world.serve("200 OK", ROUTE_BODY);
}

#[given("an OSRM service answering NoRoute")]
fn given_no_route(world: &RoutingWorld) {
    world.serve("200 OK", r#"{"code": "NoRoute", "message": "Impossible route"}"#);
}

#[given("an OSRM service that is not running")]
fn given_closed(world: &RoutingWorld) {
    world.base_url.replace(support::closed_port_url());
}

#[when("a cycling route between two stops is requested")]
fn when_requested(world: &RoutingWorld) {
    let provider =
        OsrmRoutingProvider::new(world.base_url.borrow().as_str()).expect("provider should build");
    let stops = [
        RouteLocation::new(GeoPoint::new(48.8566, 2.3522), "start"),
        RouteLocation::new(GeoPoint::new(48.8606, 2.3376), "end"),
    ];
    let result = provider.route(&stops, TravelProfile::Cycling, Duration::from_secs(5));
    world.result.replace(Some(result));
}

#[then("the snapshot has the service distance and duration")]
fn then_snapshot(world: &RoutingWorld) {
    let snapshot = world.result().expect("route should succeed");
    assert!((snapshot.distance_m - 1234.5).abs() < f64::EPSILON);
    assert_eq!(snapshot.eta, Duration::from_secs(275));
    assert_eq!(
        snapshot.polyline.points(),
        &[GeoPoint::new(48.8566, 2.3522), GeoPoint::new(48.8606, 2.3376)]
    );
}

#[then("the request used the bike profile with GeoJSON geometry")]
fn then_request_line(world: &RoutingWorld) {
    let requests = world.requests.borrow();
    let seen = requests
        .as_ref()
        .expect("server should be running")
        .recv_timeout(Duration::from_secs(5))
        .expect("server should report the request");
    assert_eq!(
        seen.line,
        "GET /route/v1/bike/2.3522,48.8566;2.3376,48.8606?overview=full&geometries=geojson HTTP/1.1"
    );
    assert!(seen.body.is_empty());
}

#[then("the request fails with service code NoRoute")]
fn then_service_error(world: &RoutingWorld) {
    let err = world.result().expect_err("route should fail");
    assert_eq!(
        err,
        RoutingError::ServiceError {
            code: "NoRoute".to_owned(),
            message: "Impossible route".to_owned(),
        }
    );
}

#[then("the request fails with a network error")]
fn then_network_error(world: &RoutingWorld) {
    let err = world.result().expect_err("route should fail");
    assert!(matches!(err, RoutingError::NetworkError { .. }), "got {err:?}");
}

#[scenario(path = "tests/features/osrm_routing.feature", index = 0)]
fn successful_route(world: RoutingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/osrm_routing.feature", index = 1)]
fn service_error(world: RoutingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/osrm_routing.feature", index = 2)]
fn unreachable_service(world: RoutingWorld) {
    let _ = world;
}
