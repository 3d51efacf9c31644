//! Request and response payloads for the travel request endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, NewTravelRequest, PageRequest, StatusStamp, TravelRequest, TravelRequestFilters,
    TravelRequestPatch, TravelStatus, UserId,
};
use crate::inbound::http::users::UserResponse;
use crate::inbound::http::validation::{
    FieldName, parse_optional_rfc3339_timestamp, parse_optional_status, parse_optional_uuid,
    parse_rfc3339_timestamp, parse_status,
};

const DEPARTURE_DATE: FieldName = FieldName::new("departureDate");
const RETURN_DATE: FieldName = FieldName::new("returnDate");
const STATUS: FieldName = FieldName::new("status");
const START_DATE: FieldName = FieldName::new("startDate");
const END_DATE: FieldName = FieldName::new("endDate");
const USER_ID: FieldName = FieldName::new("userId");

/// Body for `POST /api/v1/travels`. Dates are RFC 3339 timestamps.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTravelRequestBody {
    #[schema(example = "Ada Lovelace")]
    pub traveler_name: String,
    #[schema(example = "Paris")]
    pub destination_name: String,
    #[schema(example = "2030-05-01T09:00:00Z")]
    pub departure_date: String,
    #[serde(default)]
    #[schema(example = "2030-05-10T18:00:00Z")]
    pub return_date: Option<String>,
}

impl TryFrom<CreateTravelRequestBody> for NewTravelRequest {
    type Error = Error;

    fn try_from(body: CreateTravelRequestBody) -> Result<Self, Self::Error> {
        Ok(Self {
            traveler_name: body.traveler_name,
            destination: body.destination_name,
            departure: parse_rfc3339_timestamp(&body.departure_date, DEPARTURE_DATE)?,
            return_date: parse_optional_rfc3339_timestamp(body.return_date.as_deref(), RETURN_DATE)?,
        })
    }
}

/// Body for `PUT /api/v1/travels/{id}`. Omitted fields keep their stored
/// value; `destinationName` is required.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTravelRequestBody {
    #[serde(default)]
    pub traveler_name: Option<String>,
    #[serde(default)]
    pub destination_name: Option<String>,
    #[serde(default)]
    pub departure_date: Option<String>,
    #[serde(default)]
    pub return_date: Option<String>,
}

impl TryFrom<UpdateTravelRequestBody> for TravelRequestPatch {
    type Error = Error;

    fn try_from(body: UpdateTravelRequestBody) -> Result<Self, Self::Error> {
        Ok(Self {
            traveler_name: body.traveler_name,
            destination: body.destination_name,
            departure: parse_optional_rfc3339_timestamp(
                body.departure_date.as_deref(),
                DEPARTURE_DATE,
            )?,
            return_date: parse_optional_rfc3339_timestamp(body.return_date.as_deref(), RETURN_DATE)?,
        })
    }
}

/// Body for `PATCH /api/v1/travels/{id}/status`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ChangeStatusBody {
    /// `APPROVED` or `CANCELED` (`REJECTED` is accepted as `CANCELED`).
    #[schema(example = "APPROVED")]
    pub status: String,
}

impl ChangeStatusBody {
    pub(crate) fn target(&self) -> Result<TravelStatus, Error> {
        parse_status(&self.status, STATUS)
    }
}

/// Listing filters shared by the owner and admin listings.
///
/// `userId` narrows the admin listing to one owner; the owner listing always
/// scopes to the caller.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TravelListQuery {
    /// `SOLICITED`, `APPROVED` or `CANCELED`.
    pub status: Option<String>,
    /// Earliest departure, RFC 3339, inclusive.
    pub start_date: Option<String>,
    /// Latest departure, RFC 3339, inclusive.
    pub end_date: Option<String>,
    /// Case-insensitive destination substring.
    pub destination_name: Option<String>,
    /// One-based page number.
    pub page: Option<u32>,
    /// Results per page, clamped to 1..=100.
    pub page_size: Option<u32>,
    /// Owner filter for the admin listing.
    pub user_id: Option<String>,
}

impl TryFrom<TravelListQuery> for TravelRequestFilters {
    type Error = Error;

    fn try_from(query: TravelListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            owner: parse_optional_uuid(query.user_id.as_deref(), USER_ID)?.map(UserId::from_uuid),
            status: parse_optional_status(query.status.as_deref(), STATUS)?,
            departure_from: parse_optional_rfc3339_timestamp(query.start_date.as_deref(), START_DATE)?,
            departure_until: parse_optional_rfc3339_timestamp(query.end_date.as_deref(), END_DATE)?,
            destination: query.destination_name,
            page: PageRequest::new(query.page, query.page_size),
        })
    }
}

/// Travel request as returned to clients, with its owner embedded.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TravelRequestResponse {
    #[schema(example = "9b2f8c1e-3d4a-4f6b-8e7d-1a2b3c4d5e6f")]
    pub id: String,
    pub user_id: String,
    pub traveler_name: String,
    pub destination_name: String,
    pub departure_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    #[schema(example = "SOLICITED")]
    pub status: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub canceled_by: Option<String>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: u32,
    pub user: UserResponse,
}

fn stamp_parts(stamp: Option<&StatusStamp>) -> (Option<String>, Option<DateTime<Utc>>) {
    stamp.map_or((None, None), |stamp| (Some(stamp.by.to_string()), Some(stamp.at)))
}

impl From<&TravelRequest> for TravelRequestResponse {
    fn from(request: &TravelRequest) -> Self {
        let (approved_by, approved_at) = stamp_parts(request.approved());
        let (canceled_by, canceled_at) = stamp_parts(request.canceled());
        Self {
            id: request.id().to_string(),
            user_id: request.owner_id().to_string(),
            traveler_name: request.traveler_name().to_owned(),
            destination_name: request.destination().to_owned(),
            departure_date: request.departure(),
            return_date: request.return_date(),
            status: request.status().as_str().to_owned(),
            approved_by,
            approved_at,
            canceled_by,
            canceled_at,
            created_at: request.created_at(),
            updated_at: request.updated_at(),
            revision: request.revision(),
            user: UserResponse::from(request.owner()),
        }
    }
}
