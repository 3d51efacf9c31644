//! Partial updates of travel request content.
//!
//! [`apply_patch`] is pure: it validates the merged result against the
//! stored request and returns a new value plus the set of fields that
//! actually changed. Ownership and status checks belong to the caller.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::TravelValidationError;
use super::request::{TravelRequest, check_date_range, check_future, require_text};

/// Content fields a caller may supply on update. `None` keeps the stored
/// value, except for `destination`, which every update must carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TravelRequestPatch {
    pub traveler_name: Option<String>,
    pub destination: Option<String>,
    pub departure: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
}

/// Content field touched by a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PatchedField {
    TravelerName,
    Destination,
    Departure,
    ReturnDate,
}

/// Result of applying a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub request: TravelRequest,
    pub changed: BTreeSet<PatchedField>,
}

/// Merged content handed back to the aggregate.
#[derive(Debug, Clone)]
pub(super) struct Content {
    pub(super) traveler_name: String,
    pub(super) destination: String,
    pub(super) departure: DateTime<Utc>,
    pub(super) return_date: Option<DateTime<Utc>>,
}

/// Merge `patch` over `current`, validate, and bump `updated_at` and the
/// revision.
///
/// - A missing or blank destination fails with `InvalidDestination`.
/// - A supplied traveler name must not be blank.
/// - A supplied departure must lie strictly after `now`.
/// - The effective departure must precede the effective return date.
pub fn apply_patch(
    current: &TravelRequest,
    patch: &TravelRequestPatch,
    now: DateTime<Utc>,
) -> Result<PatchOutcome, TravelValidationError> {
    let destination = match patch.destination.as_deref() {
        Some(value) => require_text(value, TravelValidationError::InvalidDestination)?,
        None => return Err(TravelValidationError::InvalidDestination),
    };
    let traveler_name = match patch.traveler_name.as_deref() {
        Some(value) => require_text(value, TravelValidationError::InvalidTravelerName)?,
        None => current.traveler_name().to_owned(),
    };
    if let Some(departure) = patch.departure {
        check_future(departure, now)?;
    }
    let departure = patch.departure.unwrap_or_else(|| current.departure());
    let return_date = patch.return_date.or_else(|| current.return_date());
    check_date_range(departure, return_date)?;

    let mut changed = BTreeSet::new();
    if traveler_name != current.traveler_name() {
        changed.insert(PatchedField::TravelerName);
    }
    if destination != current.destination() {
        changed.insert(PatchedField::Destination);
    }
    if departure != current.departure() {
        changed.insert(PatchedField::Departure);
    }
    if return_date != current.return_date() {
        changed.insert(PatchedField::ReturnDate);
    }

    let request = current.clone().with_content(
        Content {
            traveler_name,
            destination,
            departure,
            return_date,
        },
        now,
    );
    Ok(PatchOutcome { request, changed })
}
