//! Behavioural tests for `LoopSearch` using rstest-bdd.

use std::cell::RefCell;

use boucle_core::test_support::{StraightLineRoutingProvider, StubRoutingProvider};
use boucle_core::{
    GeoPoint, RouteLocation, RouteSnapshot, RoutingError, RoutingProvider, TravelProfile,
};
use boucle_solver::{
    CancellationToken, LoopSearch, LoopSearchError, LoopSearchRequest, LoopSearchResult,
    SearchDiagnostics, StopReason,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const PARIS: GeoPoint = GeoPoint::new(48.8566, 2.3522);
const METRES_PER_KM: f64 = 1_000.0;

#[derive(Debug)]
enum ProviderChoice {
    Straight(StraightLineRoutingProvider),
    Failing(StubRoutingProvider),
}

impl Default for ProviderChoice {
    fn default() -> Self {
        Self::Straight(StraightLineRoutingProvider::default())
    }
}

impl RoutingProvider for ProviderChoice {
    fn route(
        &self,
        locations: &[RouteLocation],
        profile: TravelProfile,
        timeout: std::time::Duration,
    ) -> Result<RouteSnapshot, RoutingError> {
        match self {
            Self::Straight(provider) => provider.route(locations, profile, timeout),
            Self::Failing(provider) => provider.route(locations, profile, timeout),
        }
    }
}

#[derive(Debug)]
struct SearchWorld {
    provider: RefCell<ProviderChoice>,
    request: RefCell<LoopSearchRequest>,
    cancel: CancellationToken,
    outcome: RefCell<Option<Result<LoopSearchResult, LoopSearchError>>>,
}

impl SearchWorld {
    fn new() -> Self {
        Self {
            provider: RefCell::new(ProviderChoice::default()),
            request: RefCell::new(LoopSearchRequest::new(PARIS, 1.0, TravelProfile::Walking)),
            cancel: CancellationToken::new(),
            outcome: RefCell::new(None),
        }
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn expect_outcome(&self) -> Result<LoopSearchResult, LoopSearchError> {
        self.outcome
            .borrow()
            .as_ref()
            .cloned()
            .expect("outcome should be recorded before assertions")
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn expect_result(&self) -> LoopSearchResult {
        self.expect_outcome().expect("expected a loop")
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn expect_failure_diagnostics(&self) -> SearchDiagnostics {
        match self.expect_outcome().expect_err("expected search failure") {
            LoopSearchError::NoSatisfactoryLoop { diagnostics } => diagnostics,
            LoopSearchError::InvalidRequest { reason } => {
                panic!("unexpected invalid request: {reason}")
            }
        }
    }
}

#[fixture]
fn world() -> SearchWorld {
    SearchWorld::new()
}

#[given("a straight-line routing provider")]
fn given_straight_provider(world: &SearchWorld) {
    world.provider.replace(ProviderChoice::default());
}

#[given("a routing provider that always fails")]
fn given_failing_provider(world: &SearchWorld) {
    world
        .provider
        .replace(ProviderChoice::Failing(StubRoutingProvider::always_failing(
            RoutingError::Timeout {
                url: "http://routing.invalid/route".to_owned(),
                timeout: std::time::Duration::from_secs(1),
            },
        )));
}

#[given("a 10 km cycling loop request from central Paris")]
fn given_paris_request(world: &SearchWorld) {
    world
        .request
        .replace(LoopSearchRequest::new(PARIS, 10.0, TravelProfile::Cycling));
}

#[given("the search has been cancelled")]
fn given_cancelled(world: &SearchWorld) {
    world.cancel.cancel();
}

#[when("the loop search runs")]
fn when_search_runs(world: &SearchWorld) {
    let provider = world.provider.replace(ProviderChoice::default());
    let search = LoopSearch::new(provider);
    let outcome = search.search_with_cancellation(&world.request.borrow(), &world.cancel);
    world.outcome.replace(Some(outcome));
}

#[expect(clippy::float_arithmetic, reason = "metre to kilometre conversion")]
#[then("a loop within 15 percent of the target is returned")]
fn then_loop_within_tolerance(world: &SearchWorld) {
    let km = world.expect_result().distance_m / METRES_PER_KM;
    assert!((8.5..=11.5).contains(&km), "distance {km} km");
}

#[then("the loop starts and ends at the start point")]
fn then_closed_loop(world: &SearchWorld) {
    let result = world.expect_result();
    assert_eq!(result.polyline.points().first(), Some(&PARIS));
    assert_eq!(result.polyline.points().last(), Some(&PARIS));
}

#[then("the search fails with no satisfactory loop")]
fn then_no_loop(world: &SearchWorld) {
    assert!(matches!(
        world.expect_outcome(),
        Err(LoopSearchError::NoSatisfactoryLoop { .. })
    ));
}

#[then("every planned candidate was counted as failed")]
fn then_all_failed(world: &SearchWorld) {
    let diagnostics = world.expect_failure_diagnostics();
    assert!(diagnostics.prefiltered > 0);
    assert_eq!(diagnostics.failed, diagnostics.prefiltered);
    assert_eq!(diagnostics.routed, 0);
}

#[then("the search stopped because it was cancelled")]
fn then_cancelled(world: &SearchWorld) {
    let diagnostics = world.expect_failure_diagnostics();
    assert_eq!(diagnostics.stop_reason, StopReason::Cancelled);
    assert_eq!(diagnostics.routed + diagnostics.failed, 0);
}

#[scenario(path = "tests/features/loop_search.feature", index = 0)]
fn loop_found(world: SearchWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/loop_search.feature", index = 1)]
fn routing_failures(world: SearchWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/loop_search.feature", index = 2)]
fn cancelled_search(world: SearchWorld) {
    let _ = world;
}
