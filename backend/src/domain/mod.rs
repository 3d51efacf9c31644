//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, the pure rules that govern them, and the services that
//! implement the driving ports. Keep types immutable and document invariants
//! in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User (alias to `user::User`): account identity, role, and credentials.
//! - TravelRequest (alias to `travel::TravelRequest`): the approval aggregate.
//! - can_transition: pure status transition policy.
//! - AuthService / TravelRequestService: driving port implementations.

pub mod auth;
pub mod auth_service;
pub mod error;
pub mod notification;
pub mod ports;
pub mod trace_id;
pub mod travel;
pub mod travel_policy;
pub mod travel_service;
pub mod user;

pub use self::auth::{
    AccessToken, AuthValidationError, LoginCredentials, PASSWORD_MIN, Registration,
};
pub use self::auth_service::AuthService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::notification::{StatusChangeNotice, status_change_notice};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::travel::{
    DEFAULT_PAGE_SIZE, Decision, MAX_PAGE_SIZE, NewTravelRequest, PageRequest, PatchOutcome,
    PatchedField, StatusStamp, TravelRequest, TravelRequestFilters, TravelRequestId,
    TravelRequestPatch, TravelRequestRecord, TravelStatus, TravelValidationError, apply_patch,
};
pub use self::travel_policy::{DenyReason, PolicyDecision, can_transition};
pub use self::travel_service::TravelRequestService;
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, Email, PasswordDigest, StoredUser, User, UserDraft, UserId,
    UserRole, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
