//! Authorization and state rules for travel request status changes.
//!
//! [`can_transition`] is pure so every rule can be exercised without stores.
//! Rules are evaluated in a fixed order and the first failing rule wins.

use crate::domain::{Decision, Error, TravelRequest, TravelStatus, UserId, UserRole};

/// Reason a status change was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Caller is not an administrator.
    NotAdmin,
    /// Caller owns the request.
    OwnRequest,
    /// Request is already approved.
    AlreadyApproved,
    /// Request is already canceled.
    AlreadyCanceled,
    /// Target status is not a terminal status.
    InvalidTarget,
}

impl DenyReason {
    /// Stable machine code carried in error details.
    pub fn code(self) -> &'static str {
        match self {
            Self::NotAdmin => "not_admin",
            Self::OwnRequest => "own_request",
            Self::AlreadyApproved => "already_approved",
            Self::AlreadyCanceled => "already_canceled",
            Self::InvalidTarget => "invalid_status_transition",
        }
    }

    /// Map the refusal onto the domain error taxonomy.
    pub fn into_error(self) -> Error {
        let error = match self {
            Self::NotAdmin => Error::unauthorized("only administrators can change request status"),
            Self::OwnRequest => {
                Error::unauthorized("administrators cannot change the status of their own request")
            }
            Self::AlreadyApproved => Error::conflict("travel request is already approved"),
            Self::AlreadyCanceled => Error::conflict("travel request is already canceled"),
            Self::InvalidTarget => {
                Error::invalid_request("status can only change to APPROVED or CANCELED")
            }
        };
        error.with_reason(self.code())
    }
}

/// Outcome of evaluating the transition policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow(Decision),
    Deny(DenyReason),
}

/// Decide whether `caller_id` with `caller_role` may move `request` to
/// `target`.
///
/// # Examples
/// ```
/// use backend::domain::{DenyReason, PolicyDecision, TravelStatus, UserRole};
/// # use backend::domain::can_transition;
/// # fn check(request: &backend::domain::TravelRequest, caller: &backend::domain::UserId) {
/// let decision = can_transition(UserRole::Common, caller, request, TravelStatus::Approved);
/// assert_eq!(decision, PolicyDecision::Deny(DenyReason::NotAdmin));
/// # }
/// ```
pub fn can_transition(
    caller_role: UserRole,
    caller_id: &UserId,
    request: &TravelRequest,
    target: TravelStatus,
) -> PolicyDecision {
    if !caller_role.is_admin() {
        return PolicyDecision::Deny(DenyReason::NotAdmin);
    }
    if request.is_owned_by(caller_id) {
        return PolicyDecision::Deny(DenyReason::OwnRequest);
    }
    match request.status() {
        TravelStatus::Approved => return PolicyDecision::Deny(DenyReason::AlreadyApproved),
        TravelStatus::Canceled => return PolicyDecision::Deny(DenyReason::AlreadyCanceled),
        TravelStatus::Solicited => {}
    }
    match Decision::for_target(target) {
        Some(decision) => PolicyDecision::Allow(decision),
        None => PolicyDecision::Deny(DenyReason::InvalidTarget),
    }
}
