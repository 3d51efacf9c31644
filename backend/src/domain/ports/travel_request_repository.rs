//! Port for travel request persistence with optimistic revision checks.

use async_trait::async_trait;

use crate::domain::{TravelRequest, TravelRequestFilters, TravelRequestId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by travel request repository adapters.
    pub enum TravelRequestRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "travel request repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "travel request repository query failed: {message}",
        /// The stored revision moved on since the request was loaded.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "travel request revision mismatch: expected {expected}, found {actual}",
        /// The request to update does not exist.
        Missing { id: String } => "travel request {id} does not exist",
    }
}

/// Travel store port.
///
/// Reads return requests with their owner embedded.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TravelRequestRepository: Send + Sync {
    /// Insert a new request.
    async fn create(&self, request: &TravelRequest) -> Result<(), TravelRequestRepositoryError>;

    /// Fetch a request by identifier.
    async fn find_by_id(
        &self,
        id: &TravelRequestId,
    ) -> Result<Option<TravelRequest>, TravelRequestRepositoryError>;

    /// Replace a stored request if its stored revision still equals
    /// `expected_revision`; otherwise fail with `RevisionMismatch`.
    async fn update(
        &self,
        request: &TravelRequest,
        expected_revision: u32,
    ) -> Result<(), TravelRequestRepositoryError>;

    /// List requests matching `filters`, newest first, one page at a time.
    async fn list(
        &self,
        filters: &TravelRequestFilters,
    ) -> Result<Vec<TravelRequest>, TravelRequestRepositoryError>;

    /// List one owner's requests matching `filters`.
    async fn list_by_owner(
        &self,
        owner: &UserId,
        filters: &TravelRequestFilters,
    ) -> Result<Vec<TravelRequest>, TravelRequestRepositoryError> {
        let scoped = filters.clone().with_owner(*owner);
        self.list(&scoped).await
    }
}
