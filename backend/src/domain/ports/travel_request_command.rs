//! Driving port for travel request mutations.

use async_trait::async_trait;

use crate::domain::{
    Error, NewTravelRequest, TravelRequest, TravelRequestId, TravelRequestPatch, TravelStatus,
    UserId,
};

/// Request to create a travel request for `owner_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTravelRequest {
    pub owner_id: UserId,
    pub content: NewTravelRequest,
}

/// Request to change content fields of an existing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTravelRequest {
    pub request_id: TravelRequestId,
    pub caller_id: UserId,
    pub patch: TravelRequestPatch,
}

/// Request to move a travel request to a terminal status.
///
/// `request_id` is raw caller input; the service rejects malformed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeTravelStatusRequest {
    pub caller_id: UserId,
    pub request_id: String,
    pub status: TravelStatus,
}

/// Travel workflow mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TravelRequestCommand: Send + Sync {
    /// Validate and persist a new `Solicited` request.
    async fn create(&self, request: CreateTravelRequest) -> Result<TravelRequest, Error>;

    /// Apply an owner's partial update while the request is `Solicited`.
    async fn update(&self, request: UpdateTravelRequest) -> Result<TravelRequest, Error>;

    /// Approve or cancel a request as an administrator.
    async fn change_status(&self, request: ChangeTravelStatusRequest)
    -> Result<TravelRequest, Error>;
}
