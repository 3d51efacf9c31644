//! In-memory travel request store with optimistic revision checks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::InMemoryUserRepository;
use crate::domain::ports::{TravelRequestRepository, TravelRequestRepositoryError};
use crate::domain::{TravelRequest, TravelRequestFilters, TravelRequestId, TravelRequestRecord};

type Records = HashMap<TravelRequestId, TravelRequestRecord>;

/// Travel store holding flat records and rehydrating owners from the user
/// store on read.
///
/// Lock order is always travel records, then users.
#[derive(Debug)]
pub struct InMemoryTravelRequestRepository {
    records: Mutex<Records>,
    users: Arc<InMemoryUserRepository>,
}

impl InMemoryTravelRequestRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            records: Mutex::new(Records::new()),
            users,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Records>, TravelRequestRepositoryError> {
        self.records
            .lock()
            .map_err(|_| TravelRequestRepositoryError::query("travel store lock poisoned"))
    }

    fn hydrate(
        &self,
        record: TravelRequestRecord,
    ) -> Result<TravelRequest, TravelRequestRepositoryError> {
        let owner = self
            .users
            .get(&record.owner_id)
            .map_err(|err| TravelRequestRepositoryError::query(err.to_string()))?
            .ok_or_else(|| {
                TravelRequestRepositoryError::query(format!(
                    "owner {} of travel request {} is missing",
                    record.owner_id, record.id
                ))
            })?;
        TravelRequest::restore(record, owner)
            .map_err(|err| TravelRequestRepositoryError::query(err.to_string()))
    }
}

#[async_trait]
impl TravelRequestRepository for InMemoryTravelRequestRepository {
    async fn create(&self, request: &TravelRequest) -> Result<(), TravelRequestRepositoryError> {
        let mut records = self.lock()?;
        if records.contains_key(&request.id()) {
            return Err(TravelRequestRepositoryError::query(format!(
                "travel request {} already exists",
                request.id()
            )));
        }
        records.insert(request.id(), request.to_record());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &TravelRequestId,
    ) -> Result<Option<TravelRequest>, TravelRequestRepositoryError> {
        let record = self.lock()?.get(id).cloned();
        record.map(|record| self.hydrate(record)).transpose()
    }

    async fn update(
        &self,
        request: &TravelRequest,
        expected_revision: u32,
    ) -> Result<(), TravelRequestRepositoryError> {
        let mut records = self.lock()?;
        let stored = records
            .get_mut(&request.id())
            .ok_or_else(|| TravelRequestRepositoryError::missing(request.id().to_string()))?;
        if stored.revision != expected_revision {
            return Err(TravelRequestRepositoryError::revision_mismatch(
                expected_revision,
                stored.revision,
            ));
        }
        *stored = request.to_record();
        Ok(())
    }

    async fn list(
        &self,
        filters: &TravelRequestFilters,
    ) -> Result<Vec<TravelRequest>, TravelRequestRepositoryError> {
        let mut records: Vec<TravelRequestRecord> = self
            .lock()?
            .values()
            .filter(|record| filters.owner.is_none_or(|owner| record.owner_id == owner))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });

        let offset = usize::try_from(filters.page.offset()).unwrap_or(usize::MAX);
        let page_size = usize::try_from(filters.page.page_size()).unwrap_or(usize::MAX);
        let mut matched = Vec::new();
        for record in records {
            let request = self.hydrate(record)?;
            if filters.matches(&request) {
                matched.push(request);
            }
        }
        Ok(matched.into_iter().skip(offset).take(page_size).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::UserRepository;
    use crate::domain::{
        Decision, PageRequest, TravelRequestPatch, TravelStatus, User, UserRole, apply_patch,
    };
    use crate::test_support::{fixture_now, paris_request, user_named};

    async fn seeded(users: &[&User]) -> InMemoryTravelRequestRepository {
        let user_store = Arc::new(InMemoryUserRepository::new());
        for user in users {
            user_store.create(user).await.expect("seed user");
        }
        InMemoryTravelRequestRepository::new(user_store)
    }

    #[rstest]
    #[tokio::test]
    async fn find_by_id_embeds_the_owner() {
        let ada = user_named("Ada Lovelace", UserRole::Common);
        let repo = seeded(&[&ada]).await;
        let request = paris_request(ada.clone());
        repo.create(&request).await.expect("insert");

        let found = repo
            .find_by_id(&request.id())
            .await
            .expect("lookup")
            .expect("request present");

        assert_eq!(found, request);
        assert_eq!(found.owner().email(), ada.email());
    }

    #[rstest]
    #[tokio::test]
    async fn update_with_stale_revision_is_rejected() {
        let ada = user_named("Ada Lovelace", UserRole::Common);
        let admin = user_named("Grace Hopper", UserRole::Admin);
        let repo = seeded(&[&ada, &admin]).await;
        let request = paris_request(ada);
        repo.create(&request).await.expect("insert");

        let approved = request
            .clone()
            .decided(Decision::Approve, *admin.id(), fixture_now());
        repo.update(&approved, 1).await.expect("first write wins");

        let canceled = request.decided(Decision::Cancel, *admin.id(), fixture_now());
        let err = repo.update(&canceled, 1).await.expect_err("stale write");

        assert_eq!(err, TravelRequestRepositoryError::revision_mismatch(1_u32, 2_u32));
        let stored = repo
            .find_by_id(&approved.id())
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(stored.status(), TravelStatus::Approved);
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_unknown_request_is_missing() {
        let ada = user_named("Ada Lovelace", UserRole::Common);
        let repo = seeded(&[&ada]).await;
        let request = paris_request(ada);

        let err = repo.update(&request, 1).await.expect_err("missing");

        assert!(matches!(err, TravelRequestRepositoryError::Missing { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn list_orders_newest_first_and_pages() {
        let ada = user_named("Ada Lovelace", UserRole::Common);
        let repo = seeded(&[&ada]).await;
        for hours in 0..3 {
            let request = paris_request(ada.clone());
            let patch = TravelRequestPatch {
                destination: Some(format!("Paris {hours}")),
                ..TravelRequestPatch::default()
            };
            let shifted = apply_patch(&request, &patch, fixture_now())
                .expect("valid patch")
                .request;
            let record = TravelRequestRecord {
                created_at: fixture_now() + Duration::hours(hours),
                ..shifted.to_record()
            };
            let request = TravelRequest::restore(record, ada.clone()).expect("restore");
            repo.create(&request).await.expect("insert");
        }

        let filters = TravelRequestFilters {
            page: PageRequest::new(Some(1), Some(2)),
            ..TravelRequestFilters::default()
        };
        let first_page = repo.list(&filters).await.expect("list");
        let destinations: Vec<_> = first_page.iter().map(TravelRequest::destination).collect();
        assert_eq!(destinations, vec!["Paris 2", "Paris 1"]);

        let filters = TravelRequestFilters {
            page: PageRequest::new(Some(2), Some(2)),
            ..TravelRequestFilters::default()
        };
        let second_page = repo.list(&filters).await.expect("list");
        assert_eq!(second_page.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn list_by_owner_excludes_other_owners() {
        let ada = user_named("Ada Lovelace", UserRole::Common);
        let grace = user_named("Grace Hopper", UserRole::Common);
        let repo = seeded(&[&ada, &grace]).await;
        repo.create(&paris_request(ada.clone())).await.expect("insert");
        repo.create(&paris_request(grace)).await.expect("insert");

        let listed = repo
            .list_by_owner(ada.id(), &TravelRequestFilters::default())
            .await
            .expect("list");

        assert_eq!(listed.len(), 1);
        assert!(listed.iter().all(|request| request.is_owned_by(ada.id())));
    }
}
