//! Driving port for travel request reads.

use async_trait::async_trait;

use crate::domain::{Error, TravelRequest, TravelRequestFilters, TravelRequestId, UserId};

/// Travel workflow reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TravelRequestQuery: Send + Sync {
    /// Fetch one request; only its owner may read it.
    async fn get(
        &self,
        caller_id: &UserId,
        request_id: &TravelRequestId,
    ) -> Result<TravelRequest, Error>;

    /// List the caller's own requests.
    async fn list_own(
        &self,
        caller_id: &UserId,
        filters: TravelRequestFilters,
    ) -> Result<Vec<TravelRequest>, Error>;

    /// List requests across owners; administrators only.
    async fn list_all(
        &self,
        caller_id: &UserId,
        filters: TravelRequestFilters,
    ) -> Result<Vec<TravelRequest>, Error>;
}
