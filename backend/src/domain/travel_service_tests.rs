//! Tests for the travel request service.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::Duration;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    FixtureStatusChangeNotifier, MockStatusChangeNotifier, MockTravelRequestRepository,
    MockUserRepository, NotificationError,
};
use crate::domain::{Decision, ErrorCode, NewTravelRequest, TravelRequestPatch, UserRole};
use crate::outbound::memory::{InMemoryTravelRequestRepository, InMemoryUserRepository};
use crate::test_support::{MutableClock, fixture_now, paris_request, user_named};

type MockedService =
    TravelRequestService<MockTravelRequestRepository, MockUserRepository, MockStatusChangeNotifier>;

fn service(
    travels: MockTravelRequestRepository,
    users: MockUserRepository,
    notifier: MockStatusChangeNotifier,
) -> MockedService {
    TravelRequestService::new(
        Arc::new(travels),
        Arc::new(users),
        Arc::new(notifier),
        Arc::new(MutableClock::new(fixture_now())),
    )
}

fn users_returning(user: User) -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(user.clone())));
    users
}

fn travels_returning(request: TravelRequest) -> MockTravelRequestRepository {
    let mut travels = MockTravelRequestRepository::new();
    travels
        .expect_find_by_id()
        .returning(move |_| Ok(Some(request.clone())));
    travels
}

fn content(departure_in_days: i64, return_in_days: Option<i64>) -> NewTravelRequest {
    NewTravelRequest {
        traveler_name: "Ada Lovelace".to_owned(),
        destination: "Paris".to_owned(),
        departure: fixture_now() + Duration::days(departure_in_days),
        return_date: return_in_days.map(|days| fixture_now() + Duration::days(days)),
    }
}

fn status_change(
    caller: &User,
    request: &TravelRequest,
    status: TravelStatus,
) -> ChangeTravelStatusRequest {
    ChangeTravelStatusRequest {
        caller_id: *caller.id(),
        request_id: request.id().to_string(),
        status,
    }
}

#[tokio::test]
async fn create_persists_a_solicited_request_for_the_owner() {
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let mut travels = MockTravelRequestRepository::new();
    travels
        .expect_create()
        .times(1)
        .withf(|request: &TravelRequest| request.revision() == 1)
        .return_once(|_| Ok(()));

    let created = service(travels, users_returning(ada.clone()), MockStatusChangeNotifier::new())
        .create(CreateTravelRequest {
            owner_id: *ada.id(),
            content: content(30, None),
        })
        .await
        .expect("create succeeds");

    assert_eq!(created.status(), TravelStatus::Solicited);
    assert_eq!(created.destination(), "Paris");
    assert_eq!(created.owner(), &ada);
    assert_eq!(created.created_at(), fixture_now());
    assert_eq!(created.updated_at(), fixture_now());
}

#[rstest]
#[case::departure_today(0, None, "future_dates_only")]
#[case::departure_in_the_past(-1, None, "future_dates_only")]
#[case::return_before_departure(10, Some(5), "invalid_date_range")]
#[case::return_equals_departure(10, Some(10), "invalid_date_range")]
#[tokio::test]
async fn create_rejects_invalid_dates_before_touching_stores(
    #[case] departure_in_days: i64,
    #[case] return_in_days: Option<i64>,
    #[case] expected_code: &str,
) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().times(0);
    let mut travels = MockTravelRequestRepository::new();
    travels.expect_create().times(0);

    let error = service(travels, users, MockStatusChangeNotifier::new())
        .create(CreateTravelRequest {
            owner_id: UserId::random(),
            content: content(departure_in_days, return_in_days),
        })
        .await
        .expect_err("invalid dates");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.detail_code(), Some(expected_code));
}

#[tokio::test]
async fn create_for_an_unknown_owner_is_not_found() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));
    let mut travels = MockTravelRequestRepository::new();
    travels.expect_create().times(0);

    let error = service(travels, users, MockStatusChangeNotifier::new())
        .create(CreateTravelRequest {
            owner_id: UserId::random(),
            content: content(30, None),
        })
        .await
        .expect_err("unknown owner");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn update_by_someone_else_is_unauthorized() {
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let mut travels = travels_returning(paris_request(ada));
    travels.expect_update().times(0);

    let error = service(travels, MockUserRepository::new(), MockStatusChangeNotifier::new())
        .update(UpdateTravelRequest {
            request_id: TravelRequestId::random(),
            caller_id: UserId::random(),
            patch: TravelRequestPatch {
                destination: Some("Rome".to_owned()),
                ..TravelRequestPatch::default()
            },
        })
        .await
        .expect_err("not the owner");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn update_of_a_decided_request_is_not_modifiable() {
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let admin = user_named("Grace Hopper", UserRole::Admin);
    let approved =
        paris_request(ada.clone()).decided(Decision::Approve, *admin.id(), fixture_now());
    let mut travels = travels_returning(approved);
    travels.expect_update().times(0);

    let error = service(travels, MockUserRepository::new(), MockStatusChangeNotifier::new())
        .update(UpdateTravelRequest {
            request_id: TravelRequestId::random(),
            caller_id: *ada.id(),
            patch: TravelRequestPatch {
                destination: Some("Rome".to_owned()),
                ..TravelRequestPatch::default()
            },
        })
        .await
        .expect_err("terminal status");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.detail_code(), Some("not_modifiable"));
}

#[tokio::test]
async fn update_changes_only_supplied_fields_and_advances_updated_at() {
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let original = paris_request(ada.clone());
    let mut travels = travels_returning(original.clone());
    travels
        .expect_update()
        .times(1)
        .withf(|request: &TravelRequest, expected: &u32| {
            *expected == 1 && request.revision() == 2
        })
        .return_once(|_, _| Ok(()));
    let clock = Arc::new(MutableClock::new(fixture_now()));
    clock.advance(Duration::hours(2));
    let service = TravelRequestService::new(
        Arc::new(travels),
        Arc::new(MockUserRepository::new()),
        Arc::new(MockStatusChangeNotifier::new()),
        clock,
    );

    let updated = service
        .update(UpdateTravelRequest {
            request_id: original.id(),
            caller_id: *ada.id(),
            patch: TravelRequestPatch {
                destination: Some("Lisbon".to_owned()),
                ..TravelRequestPatch::default()
            },
        })
        .await
        .expect("update succeeds");

    assert_eq!(updated.destination(), "Lisbon");
    assert_eq!(updated.traveler_name(), original.traveler_name());
    assert_eq!(updated.departure(), original.departure());
    assert_eq!(updated.return_date(), original.return_date());
    assert_eq!(updated.updated_at(), fixture_now() + Duration::hours(2));
    assert_eq!(updated.created_at(), original.created_at());
}

#[tokio::test]
async fn update_losing_a_revision_race_is_a_conflict() {
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let mut travels = travels_returning(paris_request(ada.clone()));
    travels
        .expect_update()
        .return_once(|_, _| Err(TravelRequestRepositoryError::revision_mismatch(1_u32, 2_u32)));

    let error = service(travels, MockUserRepository::new(), MockStatusChangeNotifier::new())
        .update(UpdateTravelRequest {
            request_id: TravelRequestId::random(),
            caller_id: *ada.id(),
            patch: TravelRequestPatch {
                destination: Some("Rome".to_owned()),
                ..TravelRequestPatch::default()
            },
        })
        .await
        .expect_err("stale revision");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.detail_code(), Some("revision_mismatch"));
}

#[tokio::test]
async fn admin_approval_stamps_the_request_and_notifies_the_owner() {
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let admin = user_named("Grace Hopper", UserRole::Admin);
    let request = paris_request(ada);
    let mut travels = travels_returning(request.clone());
    travels
        .expect_update()
        .times(1)
        .withf(|request: &TravelRequest, expected: &u32| {
            *expected == 1 && request.status() == TravelStatus::Approved
        })
        .return_once(|_, _| Ok(()));
    let mut notifier = MockStatusChangeNotifier::new();
    notifier
        .expect_notify_status_change()
        .times(1)
        .withf(|request: &TravelRequest, previous: &TravelStatus| {
            request.status() == TravelStatus::Approved && *previous == TravelStatus::Solicited
        })
        .return_once(|_, _| Ok(()));

    let approved = service(travels, users_returning(admin.clone()), notifier)
        .change_status(status_change(&admin, &request, TravelStatus::Approved))
        .await
        .expect("approval succeeds");

    let stamp = approved.approved().expect("approval stamp");
    assert_eq!(stamp.by, *admin.id());
    assert_eq!(stamp.at, fixture_now());
    assert!(approved.canceled().is_none());
}

#[tokio::test]
async fn non_admin_status_change_is_unauthorized_and_silent() {
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let bob = user_named("Bob Common", UserRole::Common);
    let request = paris_request(ada);
    let mut travels = travels_returning(request.clone());
    travels.expect_update().times(0);
    let mut notifier = MockStatusChangeNotifier::new();
    notifier.expect_notify_status_change().times(0);

    let error = service(travels, users_returning(bob.clone()), notifier)
        .change_status(status_change(&bob, &request, TravelStatus::Approved))
        .await
        .expect_err("not an admin");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.detail_code(), Some("not_admin"));
}

#[tokio::test]
async fn malformed_request_id_is_an_invalid_request() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().times(0);

    let error = service(MockTravelRequestRepository::new(), users, MockStatusChangeNotifier::new())
        .change_status(ChangeTravelStatusRequest {
            caller_id: UserId::random(),
            request_id: "not-a-uuid".to_owned(),
            status: TravelStatus::Approved,
        })
        .await
        .expect_err("malformed id");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case(TravelStatus::Approved)]
#[case(TravelStatus::Canceled)]
#[case(TravelStatus::Solicited)]
#[tokio::test]
async fn approved_requests_reject_every_status_change(#[case] target: TravelStatus) {
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let admin = user_named("Grace Hopper", UserRole::Admin);
    let approved = paris_request(ada).decided(Decision::Approve, *admin.id(), fixture_now());
    let mut travels = travels_returning(approved.clone());
    travels.expect_update().times(0);

    let error = service(travels, users_returning(admin.clone()), MockStatusChangeNotifier::new())
        .change_status(status_change(&admin, &approved, target))
        .await
        .expect_err("already approved");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.detail_code(), Some("already_approved"));
}

fn travels_in_sequence(responses: Vec<TravelRequest>) -> MockTravelRequestRepository {
    let queue = Mutex::new(VecDeque::from(responses));
    let mut travels = MockTravelRequestRepository::new();
    travels.expect_find_by_id().returning(move |_| {
        Ok(queue.lock().expect("queue poisoned").pop_front())
    });
    travels
}

#[tokio::test]
async fn losing_an_approval_race_reports_already_approved() {
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let admin = user_named("Grace Hopper", UserRole::Admin);
    let rival = user_named("Katherine Johnson", UserRole::Admin);
    let request = paris_request(ada);
    let won_by_rival = request
        .clone()
        .decided(Decision::Approve, *rival.id(), fixture_now());
    let mut travels = travels_in_sequence(vec![request.clone(), won_by_rival]);
    travels
        .expect_update()
        .return_once(|_, _| Err(TravelRequestRepositoryError::revision_mismatch(1_u32, 2_u32)));
    let mut notifier = MockStatusChangeNotifier::new();
    notifier.expect_notify_status_change().times(0);

    let error = service(travels, users_returning(admin.clone()), notifier)
        .change_status(status_change(&admin, &request, TravelStatus::Approved))
        .await
        .expect_err("lost the race");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.detail_code(), Some("already_approved"));
}

#[tokio::test]
async fn losing_a_status_race_to_a_content_edit_is_a_generic_conflict() {
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let admin = user_named("Grace Hopper", UserRole::Admin);
    let request = paris_request(ada);
    let patch = TravelRequestPatch {
        destination: Some("Rome".to_owned()),
        ..TravelRequestPatch::default()
    };
    let edited = apply_patch(&request, &patch, fixture_now())
        .expect("valid patch")
        .request;
    let mut travels = travels_in_sequence(vec![request.clone(), edited]);
    travels
        .expect_update()
        .return_once(|_, _| Err(TravelRequestRepositoryError::revision_mismatch(1_u32, 2_u32)));

    let error = service(travels, users_returning(admin.clone()), MockStatusChangeNotifier::new())
        .change_status(status_change(&admin, &request, TravelStatus::Canceled))
        .await
        .expect_err("lost the race");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.detail_code(), Some("revision_mismatch"));
}

#[tokio::test]
async fn notifier_failures_do_not_fail_the_status_change() {
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let admin = user_named("Grace Hopper", UserRole::Admin);
    let request = paris_request(ada);
    let mut travels = travels_returning(request.clone());
    travels.expect_update().return_once(|_, _| Ok(()));
    let mut notifier = MockStatusChangeNotifier::new();
    notifier
        .expect_notify_status_change()
        .return_once(|_, _| Err(NotificationError::delivery("mail relay down")));

    let canceled = service(travels, users_returning(admin.clone()), notifier)
        .change_status(status_change(&admin, &request, TravelStatus::Canceled))
        .await
        .expect("cancel succeeds");

    assert_eq!(canceled.status(), TravelStatus::Canceled);
}

#[tokio::test]
async fn get_by_someone_else_is_unauthorized() {
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let request = paris_request(ada);

    let error = service(
        travels_returning(request.clone()),
        MockUserRepository::new(),
        MockStatusChangeNotifier::new(),
    )
    .get(&UserId::random(), &request.id())
    .await
    .expect_err("not the owner");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn get_of_a_missing_request_is_not_found() {
    let mut travels = MockTravelRequestRepository::new();
    travels.expect_find_by_id().return_once(|_| Ok(None));

    let error = service(travels, MockUserRepository::new(), MockStatusChangeNotifier::new())
        .get(&UserId::random(), &TravelRequestId::random())
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn list_own_lists_the_callers_requests() {
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let expected_owner = *ada.id();
    let mut travels = MockTravelRequestRepository::new();
    travels
        .expect_list_by_owner()
        .times(1)
        .withf(move |owner: &UserId, _filters: &TravelRequestFilters| *owner == expected_owner)
        .return_once(|_, _| Ok(Vec::new()));

    let listed = service(travels, MockUserRepository::new(), MockStatusChangeNotifier::new())
        .list_own(ada.id(), TravelRequestFilters::default())
        .await
        .expect("list succeeds");

    assert!(listed.is_empty());
}

#[tokio::test]
async fn list_all_requires_an_administrator() {
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let mut travels = MockTravelRequestRepository::new();
    travels.expect_list().times(0);

    let error = service(travels, users_returning(ada.clone()), MockStatusChangeNotifier::new())
        .list_all(ada.id(), TravelRequestFilters::default())
        .await
        .expect_err("not an admin");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn repository_outages_surface_as_service_unavailable() {
    let mut travels = MockTravelRequestRepository::new();
    travels
        .expect_find_by_id()
        .return_once(|_| Err(TravelRequestRepositoryError::connection("pool timed out")));

    let error = service(travels, MockUserRepository::new(), MockStatusChangeNotifier::new())
        .get(&UserId::random(), &TravelRequestId::random())
        .await
        .expect_err("outage");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_approvals_yield_one_winner() {
    let users = Arc::new(InMemoryUserRepository::new());
    let travels = Arc::new(InMemoryTravelRequestRepository::new(Arc::clone(&users)));
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let grace = user_named("Grace Hopper", UserRole::Admin);
    let katherine = user_named("Katherine Johnson", UserRole::Admin);
    for user in [&ada, &grace, &katherine] {
        users.create(user).await.expect("seed user");
    }
    let request = paris_request(ada);
    travels.create(&request).await.expect("seed request");

    let service = Arc::new(TravelRequestService::new(
        travels,
        users,
        Arc::new(FixtureStatusChangeNotifier),
        Arc::new(MutableClock::new(fixture_now())),
    ));
    let approve = |admin: User| {
        let service = Arc::clone(&service);
        let change = status_change(&admin, &request, TravelStatus::Approved);
        tokio::spawn(async move { service.change_status(change).await })
    };
    let first = approve(grace);
    let second = approve(katherine);
    let outcomes = [
        first.await.expect("task completes"),
        second.await.expect("task completes"),
    ];

    let winners = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let losers: Vec<_> = outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().err())
        .collect();
    assert_eq!(winners, 1);
    assert_eq!(losers.len(), 1);
    assert!(
        losers
            .iter()
            .all(|error| error.detail_code() == Some("already_approved"))
    );
    let stored = service
        .get(request.owner_id(), &request.id())
        .await
        .expect("stored request");
    assert_eq!(stored.status(), TravelStatus::Approved);
    assert_eq!(stored.revision(), 2);
}
