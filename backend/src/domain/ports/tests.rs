//! Behaviour shared by port definitions.

use super::*;
use crate::domain::{TravelRequest, TravelRequestFilters, TravelRequestId, UserRole};
use crate::test_support::{paris_request, user_named};
use actix_rt::System;
use async_trait::async_trait;
use rstest::rstest;
use std::sync::Mutex;

#[derive(Default)]
struct RecordingTravelRepository {
    seen_filters: Mutex<Vec<TravelRequestFilters>>,
    stored: Vec<TravelRequest>,
}

#[async_trait]
impl TravelRequestRepository for RecordingTravelRepository {
    async fn create(&self, _request: &TravelRequest) -> Result<(), TravelRequestRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &TravelRequestId,
    ) -> Result<Option<TravelRequest>, TravelRequestRepositoryError> {
        Ok(self.stored.iter().find(|request| request.id() == *id).cloned())
    }

    async fn update(
        &self,
        _request: &TravelRequest,
        _expected_revision: u32,
    ) -> Result<(), TravelRequestRepositoryError> {
        Ok(())
    }

    async fn list(
        &self,
        filters: &TravelRequestFilters,
    ) -> Result<Vec<TravelRequest>, TravelRequestRepositoryError> {
        self.seen_filters
            .lock()
            .expect("filters poisoned")
            .push(filters.clone());
        Ok(self
            .stored
            .iter()
            .filter(|request| filters.matches(request))
            .cloned()
            .collect())
    }
}

#[rstest]
fn list_by_owner_scopes_the_filters() {
    let ada = user_named("Ada Lovelace", UserRole::Common);
    let grace = user_named("Grace Hopper", UserRole::Common);
    let repo = RecordingTravelRepository {
        stored: vec![paris_request(ada.clone()), paris_request(grace)],
        ..RecordingTravelRepository::default()
    };

    System::new().block_on(async {
        let listed = repo
            .list_by_owner(ada.id(), &TravelRequestFilters::default())
            .await
            .expect("list succeeds");
        assert_eq!(listed.len(), 1);
        assert!(listed.iter().all(|request| request.is_owned_by(ada.id())));
    });

    let seen = repo.seen_filters.lock().expect("filters poisoned");
    assert_eq!(seen.first().and_then(|filters| filters.owner), Some(*ada.id()));
}

#[rstest]
fn revision_mismatch_reports_both_revisions() {
    let err = TravelRequestRepositoryError::revision_mismatch(3_u32, 4_u32);
    assert_eq!(
        err.to_string(),
        "travel request revision mismatch: expected 3, found 4"
    );
}

#[rstest]
fn duplicate_email_names_the_address() {
    let err = UserPersistenceError::duplicate_email("ada@example.com");
    assert!(err.to_string().contains("ada@example.com"));
}

#[rstest]
fn missing_signing_key_has_nullary_constructor() {
    assert_eq!(
        CredentialError::missing_signing_key(),
        CredentialError::MissingSigningKey
    );
}

#[rstest]
fn fixture_notifier_accepts_everything() {
    let request = paris_request(user_named("Ada Lovelace", UserRole::Common));
    System::new().block_on(async {
        FixtureStatusChangeNotifier
            .notify_status_change(&request, crate::domain::TravelStatus::Solicited)
            .await
            .expect("fixture never fails");
    });
}
