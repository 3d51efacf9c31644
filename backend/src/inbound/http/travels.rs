//! Travel request handlers.
//!
//! ```text
//! POST  /api/v1/travels
//! GET   /api/v1/travels?status=APPROVED&page=1&pageSize=10
//! GET   /api/v1/travels/{id}
//! PUT   /api/v1/travels/{id}
//! PATCH /api/v1/travels/{id}/status
//! GET   /api/v1/admin/travels?userId=...
//! ```
//!
//! Every route requires a bearer credential. Handlers translate payloads
//! into domain values and delegate to the travel ports.

use actix_web::{HttpResponse, get, patch, post, put, web};

use crate::domain::ports::{ChangeTravelStatusRequest, CreateTravelRequest, UpdateTravelRequest};
use crate::domain::{
    Error, NewTravelRequest, TravelRequest, TravelRequestFilters, TravelRequestId,
    TravelRequestPatch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::travels_dto::{
    ChangeStatusBody, CreateTravelRequestBody, TravelListQuery, TravelRequestResponse,
    UpdateTravelRequestBody,
};
use crate::inbound::http::validation::{FieldName, parse_uuid};

fn parse_request_id(raw: &str) -> Result<TravelRequestId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(TravelRequestId::from_uuid)
}

fn to_responses(requests: &[TravelRequest]) -> Vec<TravelRequestResponse> {
    requests.iter().map(TravelRequestResponse::from).collect()
}

/// Create a travel request owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/travels",
    request_body = CreateTravelRequestBody,
    responses(
        (status = 201, description = "Travel request created", body = TravelRequestResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Owner not found", body = ErrorSchema)
    ),
    tags = ["travels"],
    operation_id = "createTravelRequest"
)]
#[post("/travels")]
pub async fn create_travel(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateTravelRequestBody>,
) -> ApiResult<HttpResponse> {
    let content = NewTravelRequest::try_from(payload.into_inner())?;
    let created = state
        .travel
        .create(CreateTravelRequest {
            owner_id: *caller.user_id(),
            content,
        })
        .await?;
    Ok(HttpResponse::Created().json(TravelRequestResponse::from(&created)))
}

/// List the caller's own travel requests, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/travels",
    params(TravelListQuery),
    responses(
        (status = 200, description = "Travel requests", body = [TravelRequestResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["travels"],
    operation_id = "listTravelRequests"
)]
#[get("/travels")]
pub async fn list_travels(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<TravelListQuery>,
) -> ApiResult<web::Json<Vec<TravelRequestResponse>>> {
    let filters = TravelRequestFilters::try_from(query.into_inner())?;
    let requests = state
        .travel_query
        .list_own(caller.user_id(), filters)
        .await?;
    Ok(web::Json(to_responses(&requests)))
}

/// Fetch one of the caller's travel requests.
#[utoipa::path(
    get,
    path = "/api/v1/travels/{id}",
    params(("id" = String, Path, description = "Travel request identifier")),
    responses(
        (status = 200, description = "Travel request", body = TravelRequestResponse),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 401, description = "Unauthorised or not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["travels"],
    operation_id = "getTravelRequest"
)]
#[get("/travels/{id}")]
pub async fn get_travel(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<TravelRequestResponse>> {
    let request_id = parse_request_id(&path.into_inner())?;
    let request = state
        .travel_query
        .get(caller.user_id(), &request_id)
        .await?;
    Ok(web::Json(TravelRequestResponse::from(&request)))
}

/// Change content fields of a `SOLICITED` request owned by the caller.
#[utoipa::path(
    put,
    path = "/api/v1/travels/{id}",
    params(("id" = String, Path, description = "Travel request identifier")),
    request_body = UpdateTravelRequestBody,
    responses(
        (status = 200, description = "Updated travel request", body = TravelRequestResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised or not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "No longer modifiable or edited concurrently", body = ErrorSchema)
    ),
    tags = ["travels"],
    operation_id = "updateTravelRequest"
)]
#[put("/travels/{id}")]
pub async fn update_travel(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateTravelRequestBody>,
) -> ApiResult<web::Json<TravelRequestResponse>> {
    let request_id = parse_request_id(&path.into_inner())?;
    let patch = TravelRequestPatch::try_from(payload.into_inner())?;
    let updated = state
        .travel
        .update(UpdateTravelRequest {
            request_id,
            caller_id: *caller.user_id(),
            patch,
        })
        .await?;
    Ok(web::Json(TravelRequestResponse::from(&updated)))
}

/// Approve or cancel a travel request. Administrators only.
#[utoipa::path(
    patch,
    path = "/api/v1/travels/{id}/status",
    params(("id" = String, Path, description = "Travel request identifier")),
    request_body = ChangeStatusBody,
    responses(
        (status = 204, description = "Status changed"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised, not an admin, or own request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Already approved or canceled", body = ErrorSchema)
    ),
    tags = ["travels"],
    operation_id = "changeTravelRequestStatus"
)]
#[patch("/travels/{id}/status")]
pub async fn change_travel_status(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<ChangeStatusBody>,
) -> ApiResult<HttpResponse> {
    let status = payload.target()?;
    state
        .travel
        .change_status(ChangeTravelStatusRequest {
            caller_id: *caller.user_id(),
            request_id: path.into_inner(),
            status,
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List travel requests across owners. Administrators only.
#[utoipa::path(
    get,
    path = "/api/v1/admin/travels",
    params(TravelListQuery),
    responses(
        (status = 200, description = "Travel requests", body = [TravelRequestResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised or not an admin", body = ErrorSchema)
    ),
    tags = ["travels"],
    operation_id = "listAllTravelRequests"
)]
#[get("/admin/travels")]
pub async fn list_all_travels(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<TravelListQuery>,
) -> ApiResult<web::Json<Vec<TravelRequestResponse>>> {
    let filters = TravelRequestFilters::try_from(query.into_inner())?;
    let requests = state
        .travel_query
        .list_all(caller.user_id(), filters)
        .await?;
    Ok(web::Json(to_responses(&requests)))
}

#[cfg(test)]
#[path = "travels_tests.rs"]
mod tests;
