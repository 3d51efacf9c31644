//! Travel request domain service.
//!
//! Implements the [`TravelRequestCommand`] and [`TravelRequestQuery`] driving
//! ports. Writes go through the repository's optimistic revision check, so
//! two administrators deciding the same request cannot both succeed.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::ports::{
    ChangeTravelStatusRequest, CreateTravelRequest, StatusChangeNotifier, TravelRequestCommand,
    TravelRequestQuery, TravelRequestRepository, TravelRequestRepositoryError,
    UpdateTravelRequest, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Error, PolicyDecision, TravelRequest, TravelRequestFilters, TravelRequestId, TravelStatus,
    TravelValidationError, User, UserId, apply_patch, can_transition,
};

fn map_travel_repository_error(error: TravelRequestRepositoryError) -> Error {
    match error {
        TravelRequestRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("travel repository unavailable: {message}"))
        }
        TravelRequestRepositoryError::Query { message } => {
            Error::internal(format!("travel repository error: {message}"))
        }
        TravelRequestRepositoryError::RevisionMismatch { expected, actual } => {
            revision_conflict(expected, actual)
        }
        TravelRequestRepositoryError::Missing { id } => {
            Error::not_found(format!("travel request {id} not found"))
        }
    }
}

fn map_user_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message }
        | UserPersistenceError::DuplicateEmail { email: message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Missing { id } => Error::not_found(format!("user {id} not found")),
    }
}

fn map_validation_error(error: TravelValidationError) -> Error {
    let code = error.code();
    Error::invalid_request(error.to_string()).with_reason(code)
}

fn revision_conflict(expected: u32, actual: u32) -> Error {
    Error::conflict("travel request was modified concurrently").with_details(json!({
        "code": "revision_mismatch",
        "expectedRevision": expected,
        "actualRevision": actual,
    }))
}

fn request_not_found(id: impl std::fmt::Display) -> Error {
    Error::not_found(format!("travel request {id} not found"))
}

fn not_owner() -> Error {
    Error::unauthorized("only the owner may access this travel request").with_reason("not_owner")
}

/// Travel workflow service over a travel store, a user store, and a notifier.
#[derive(Clone)]
pub struct TravelRequestService<T, U, N> {
    travels: Arc<T>,
    users: Arc<U>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<T, U, N> TravelRequestService<T, U, N> {
    /// Create a service over the given adapters.
    pub fn new(travels: Arc<T>, users: Arc<U>, notifier: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            travels,
            users,
            notifier,
            clock,
        }
    }
}

impl<T, U, N> TravelRequestService<T, U, N>
where
    T: TravelRequestRepository,
    U: UserRepository,
    N: StatusChangeNotifier,
{
    async fn load_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    async fn load_request(&self, id: &TravelRequestId) -> Result<TravelRequest, Error> {
        self.travels
            .find_by_id(id)
            .await
            .map_err(map_travel_repository_error)?
            .ok_or_else(|| request_not_found(id))
    }

    /// Explain why a status write lost its revision race.
    ///
    /// The winner either decided the request, in which case the policy now
    /// denies, or edited content, which leaves only a generic conflict.
    async fn lost_status_race(
        &self,
        caller: &User,
        id: &TravelRequestId,
        target: TravelStatus,
        expected: u32,
        actual: u32,
    ) -> Error {
        match self.load_request(id).await {
            Ok(current) => match can_transition(caller.role(), caller.id(), &current, target) {
                PolicyDecision::Deny(reason) => reason.into_error(),
                PolicyDecision::Allow(_) => revision_conflict(expected, actual),
            },
            Err(error) => error,
        }
    }

    async fn notify(&self, request: &TravelRequest, previous: TravelStatus) {
        if let Err(error) = self.notifier.notify_status_change(request, previous).await {
            warn!(
                request_id = %request.id(),
                status = %request.status(),
                %error,
                "status change notification failed"
            );
        }
    }
}

#[async_trait]
impl<T, U, N> TravelRequestCommand for TravelRequestService<T, U, N>
where
    T: TravelRequestRepository,
    U: UserRepository,
    N: StatusChangeNotifier,
{
    async fn create(&self, request: CreateTravelRequest) -> Result<TravelRequest, Error> {
        let now = self.clock.utc();
        request.content.validate(now).map_err(map_validation_error)?;
        let owner = self.load_user(&request.owner_id).await?;

        let travel = TravelRequest::create(TravelRequestId::random(), owner, request.content, now)
            .map_err(map_validation_error)?;
        self.travels
            .create(&travel)
            .await
            .map_err(map_travel_repository_error)?;

        info!(
            request_id = %travel.id(),
            owner_id = %travel.owner_id(),
            "travel request created"
        );
        Ok(travel)
    }

    async fn update(&self, request: UpdateTravelRequest) -> Result<TravelRequest, Error> {
        let current = self.load_request(&request.request_id).await?;
        if !current.is_owned_by(&request.caller_id) {
            return Err(not_owner());
        }
        if current.status() != TravelStatus::Solicited {
            return Err(Error::conflict(format!(
                "travel request is {} and can no longer be modified",
                current.status()
            ))
            .with_reason("not_modifiable"));
        }

        let expected_revision = current.revision();
        let outcome = apply_patch(&current, &request.patch, self.clock.utc())
            .map_err(map_validation_error)?;
        self.travels
            .update(&outcome.request, expected_revision)
            .await
            .map_err(map_travel_repository_error)?;

        debug!(
            request_id = %outcome.request.id(),
            changed = ?outcome.changed,
            revision = outcome.request.revision(),
            "travel request updated"
        );
        Ok(outcome.request)
    }

    async fn change_status(
        &self,
        request: ChangeTravelStatusRequest,
    ) -> Result<TravelRequest, Error> {
        let id = Uuid::parse_str(request.request_id.trim())
            .map(TravelRequestId::from_uuid)
            .map_err(|_| {
                Error::invalid_request(format!("invalid travel request id: {}", request.request_id))
                    .with_reason("invalid_id")
            })?;
        let caller = self.load_user(&request.caller_id).await?;
        let current = self.load_request(&id).await?;

        let decision = match can_transition(caller.role(), caller.id(), &current, request.status) {
            PolicyDecision::Allow(decision) => decision,
            PolicyDecision::Deny(reason) => {
                debug!(
                    request_id = %id,
                    caller_id = %caller.id(),
                    reason = reason.code(),
                    "status change denied"
                );
                return Err(reason.into_error());
            }
        };

        let previous = current.status();
        let expected_revision = current.revision();
        let decided = current.decided(decision, *caller.id(), self.clock.utc());
        match self.travels.update(&decided, expected_revision).await {
            Ok(()) => {}
            Err(TravelRequestRepositoryError::RevisionMismatch { expected, actual }) => {
                debug!(request_id = %id, expected, actual, "status change lost revision race");
                return Err(self
                    .lost_status_race(&caller, &id, request.status, expected, actual)
                    .await);
            }
            Err(error) => return Err(map_travel_repository_error(error)),
        }

        info!(
            request_id = %decided.id(),
            actor_id = %caller.id(),
            from = %previous,
            to = %decided.status(),
            "travel request status changed"
        );
        self.notify(&decided, previous).await;
        Ok(decided)
    }
}

#[async_trait]
impl<T, U, N> TravelRequestQuery for TravelRequestService<T, U, N>
where
    T: TravelRequestRepository,
    U: UserRepository,
    N: StatusChangeNotifier,
{
    async fn get(
        &self,
        caller_id: &UserId,
        request_id: &TravelRequestId,
    ) -> Result<TravelRequest, Error> {
        let request = self.load_request(request_id).await?;
        if !request.is_owned_by(caller_id) {
            return Err(not_owner());
        }
        Ok(request)
    }

    async fn list_own(
        &self,
        caller_id: &UserId,
        filters: TravelRequestFilters,
    ) -> Result<Vec<TravelRequest>, Error> {
        self.travels
            .list_by_owner(caller_id, &filters)
            .await
            .map_err(map_travel_repository_error)
    }

    async fn list_all(
        &self,
        caller_id: &UserId,
        filters: TravelRequestFilters,
    ) -> Result<Vec<TravelRequest>, Error> {
        let caller = self.load_user(caller_id).await?;
        if !caller.role().is_admin() {
            return Err(Error::unauthorized("only administrators may list all travel requests")
                .with_reason("not_admin"));
        }
        self.travels
            .list(&filters)
            .await
            .map_err(map_travel_repository_error)
    }
}

#[cfg(test)]
#[path = "travel_service_tests.rs"]
mod tests;
