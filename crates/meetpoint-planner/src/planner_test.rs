use std::sync::Arc;

use chrono::Utc;
use meetpoint_core::{
    Location, Point, ProviderError, RankBy, StoredLocation, TransportMode, Venue, VenueCategory,
};
use uuid::Uuid;

use super::*;
use crate::rank::RESULTS_CAP;
use crate::test_support::{venue, FakePlaces, FakeStore, FakeTravel};

const HOME: Point = Point::new(0.0, 0.0);
const COWORKER: Point = Point::new(0.0, 0.001);

fn session() -> Session {
    Session::new(Uuid::from_u128(42), "me")
}

fn own_home() -> LocationSet {
    let mut set = LocationSet::new("me");
    set.add(Location::new(HOME.lat, HOME.lng, "home")).unwrap();
    set
}

fn coworker_row() -> StoredLocation {
    StoredLocation {
        user_id: "coworker".to_string(),
        lat: COWORKER.lat,
        lng: COWORKER.lng,
        address: "coworker".to_string(),
        is_primary: true,
        position: 0,
        updated_at: Utc::now(),
    }
}

fn venues(prefix: &str, n: usize) -> Vec<Venue> {
    (0..n).map(|i| venue(&format!("{prefix}{i}"), &format!("Venue {i}"))).collect()
}

fn request(budget_minutes: u32, rank_by: RankBy) -> FindRequest {
    FindRequest::new(
        TransportMode::Driving,
        budget_minutes,
        VenueCategory::default(),
        rank_by,
    )
}

fn planner(places: FakePlaces, travel: FakeTravel, store: Arc<FakeStore>) -> MeetingPlanner {
    MeetingPlanner::new(Arc::new(places), Arc::new(travel), store).with_max_concurrency(4)
}

#[tokio::test]
async fn find_for_member_takes_own_origins_from_the_single_team_read() {
    let store = Arc::new(FakeStore::default());
    let mut own_row = coworker_row();
    own_row.user_id = "me".to_string();
    own_row.lat = HOME.lat;
    own_row.lng = HOME.lng;
    own_row.address = "home".to_string();
    store.seed(session().team_id, vec![own_row, coworker_row()]);
    let places = FakePlaces::default()
        .with(HOME, venues("h", 1))
        .with(COWORKER, venues("c", 1));
    let travel = FakeTravel::new(|_, _, _| Ok(300));
    let planner = planner(places, travel, store.clone());

    let outcome = planner
        .find_for_member(&session(), &request(10, RankBy::Max))
        .await
        .unwrap();
    assert_eq!(store.read_count(), 1);
    let ids: Vec<&str> = outcome.results().iter().map(|r| r.candidate.id.as_str()).collect();
    assert_eq!(ids, ["h0", "c0"]);
    let owners: Vec<bool> = outcome.results()[0]
        .per_origin_times
        .iter()
        .map(|t| t.is_own_origin)
        .collect();
    assert_eq!(owners, [true, false]);
}

#[tokio::test]
async fn find_for_member_without_rows_is_no_origins() {
    let store = Arc::new(FakeStore::default());
    let planner = planner(
        FakePlaces::default(),
        FakeTravel::new(|_, _, _| Ok(60)),
        store.clone(),
    );
    let err = planner
        .find_for_member(&session(), &request(10, RankBy::Max))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::NoOrigins));
    assert_eq!(store.read_count(), 1);
}

#[tokio::test]
async fn every_collected_candidate_survives_when_all_times_fit() {
    let store = Arc::new(FakeStore::default());
    store.seed(session().team_id, vec![coworker_row()]);
    let places = FakePlaces::default()
        .with(HOME, venues("h", 4))
        .with(COWORKER, venues("c", 3));
    let travel = FakeTravel::new(|_, _, _| Ok(300));

    let outcome = planner(places, travel, store)
        .find(&session(), &own_home(), &request(10, RankBy::Max))
        .await
        .unwrap();

    let FindOutcome::Found {
        results,
        total_feasible,
        considered,
    } = outcome
    else {
        panic!("expected results, got {outcome:?}");
    };
    assert_eq!(considered, 7);
    assert_eq!(total_feasible, 7);
    let ids: Vec<&str> = results.iter().map(|r| r.candidate.id.as_str()).collect();
    assert_eq!(ids, ["h0", "h1", "h2", "h3", "c0", "c1", "c2"]);
    for r in &results {
        assert_eq!(r.max_time_minutes, 5);
        assert_eq!(r.per_origin_times.len(), 2);
        assert!(r.per_origin_times[0].is_own_origin);
        assert!(!r.per_origin_times[1].is_own_origin);
    }
}

#[tokio::test]
async fn results_are_capped_but_total_is_reported() {
    let store = Arc::new(FakeStore::default());
    let places = FakePlaces::default().with(HOME, venues("v", 25));
    let travel = FakeTravel::new(|_, _, _| Ok(300));

    let outcome = planner(places, travel, store)
        .find(&session(), &own_home(), &request(10, RankBy::Avg))
        .await
        .unwrap();
    let FindOutcome::Found {
        results,
        total_feasible,
        ..
    } = &outcome
    else {
        panic!("expected results");
    };
    assert_eq!(results.len(), RESULTS_CAP);
    assert_eq!(*total_feasible, 25);
    assert_eq!(outcome.results().len(), RESULTS_CAP);
}

#[tokio::test]
async fn empty_origin_set_is_an_error() {
    let store = Arc::new(FakeStore::default());
    let travel = FakeTravel::new(|_, _, _| Ok(1));
    let err = planner(FakePlaces::default(), travel, store)
        .find(&session(), &LocationSet::new("me"), &request(10, RankBy::Max))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::NoOrigins));
}

#[tokio::test]
async fn other_members_alone_are_enough_origins() {
    let store = Arc::new(FakeStore::default());
    store.seed(session().team_id, vec![coworker_row()]);
    let places = FakePlaces::default().with(COWORKER, venues("c", 1));
    let travel = FakeTravel::new(|_, _, _| Ok(60));

    let outcome = planner(places, travel, store)
        .find(&session(), &LocationSet::new("me"), &request(10, RankBy::Max))
        .await
        .unwrap();
    assert_eq!(outcome.results().len(), 1);
}

#[tokio::test]
async fn no_candidates_is_distinct_from_none_within_budget() {
    let store = Arc::new(FakeStore::default());
    let travel = FakeTravel::new(|_, _, _| Ok(60));
    let empty = planner(FakePlaces::default().with(HOME, Vec::new()), travel, store.clone())
        .find(&session(), &own_home(), &request(10, RankBy::Max))
        .await
        .unwrap();
    assert_eq!(empty, FindOutcome::NoCandidates);

    let slow = FakeTravel::new(|_, _, _| Ok(601));
    let filtered = planner(FakePlaces::default().with(HOME, venues("v", 3)), slow, store)
        .find(&session(), &own_home(), &request(10, RankBy::Max))
        .await
        .unwrap();
    assert_eq!(filtered, FindOutcome::NoneWithinBudget { considered: 3 });
    assert_ne!(empty.message(), filtered.message());
}

#[tokio::test]
async fn travel_failures_fall_back_to_the_budget() {
    let store = Arc::new(FakeStore::default());
    store.seed(session().team_id, vec![coworker_row()]);
    let places = FakePlaces::default().with(HOME, venues("v", 1));
    let travel = FakeTravel::new(|origin, _, _| {
        if (origin.lng - COWORKER.lng).abs() < 1e-9 {
            Err(ProviderError::Unavailable("boom".to_string()))
        } else {
            Ok(0)
        }
    });

    let outcome = planner(places, travel, store)
        .find(&session(), &own_home(), &request(10, RankBy::Avg))
        .await
        .unwrap();
    let result = &outcome.results()[0];
    assert_eq!(result.max_time_seconds, 600);
    assert!((result.avg_time_seconds - 300.0).abs() < f64::EPSILON);
    assert!(result.per_origin_times[1].is_fallback);
}

#[tokio::test]
async fn invalid_request_is_rejected_before_any_call() {
    let store = Arc::new(FakeStore::default());
    let travel = Arc::new(FakeTravel::new(|_, _, _| Ok(1)));
    let planner = MeetingPlanner::new(Arc::new(FakePlaces::default()), travel.clone(), store);
    let err = planner
        .find(&session(), &own_home(), &request(0, RankBy::Max))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::InvalidRequest(_)));
    assert_eq!(travel.call_count(), 0);
}

#[test]
fn outcome_messages_name_the_corrective_action() {
    assert!(FindOutcome::NoCandidates.message().contains("radius"));
    assert!(FindOutcome::NoneWithinBudget { considered: 4 }
        .message()
        .contains("time budget"));
}
