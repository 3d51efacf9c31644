//! Travel request aggregate.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TravelValidationError;
use super::status::{Decision, TravelStatus};
use crate::domain::{User, UserId};

/// Stable travel request identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TravelRequestId(Uuid);

impl TravelRequestId {
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TravelRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Actor and instant recorded together when a request reaches a terminal
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStamp {
    pub by: UserId,
    pub at: DateTime<Utc>,
}

/// Caller-supplied content for a new travel request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTravelRequest {
    pub traveler_name: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

impl NewTravelRequest {
    /// Check content rules that do not depend on the owner.
    ///
    /// Rules run in order: destination, traveler name, future departure,
    /// then departure before return.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), TravelValidationError> {
        require_text(&self.destination, TravelValidationError::InvalidDestination)?;
        require_text(&self.traveler_name, TravelValidationError::InvalidTravelerName)?;
        check_future(self.departure, now)?;
        check_date_range(self.departure, self.return_date)
    }
}

/// Flat stored form of a travel request, without the embedded owner.
///
/// Persistence adapters read and write this shape and rehydrate the
/// aggregate with [`TravelRequest::restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelRequestRecord {
    pub id: TravelRequestId,
    pub owner_id: UserId,
    pub traveler_name: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: TravelStatus,
    pub approved: Option<StatusStamp>,
    pub canceled: Option<StatusStamp>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: u32,
}

/// Travel request owned by a single user.
///
/// ## Invariants
/// - `departure < return_date` whenever `return_date` is set.
/// - `approved` is set exactly when status is `Approved`; `canceled` exactly
///   when status is `Canceled`.
/// - The owner never changes after creation.
/// - `revision` starts at 1 and grows by one on every persisted update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelRequest {
    id: TravelRequestId,
    owner: User,
    traveler_name: String,
    destination: String,
    departure: DateTime<Utc>,
    return_date: Option<DateTime<Utc>>,
    status: TravelStatus,
    approved: Option<StatusStamp>,
    canceled: Option<StatusStamp>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    revision: u32,
}

pub(super) fn require_text(
    value: &str,
    error: TravelValidationError,
) -> Result<String, TravelValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(error)
    } else {
        Ok(trimmed.to_owned())
    }
}

pub(super) fn check_date_range(
    departure: DateTime<Utc>,
    return_date: Option<DateTime<Utc>>,
) -> Result<(), TravelValidationError> {
    match return_date {
        Some(return_date) if departure >= return_date => {
            Err(TravelValidationError::InvalidDateRange)
        }
        _ => Ok(()),
    }
}

pub(super) fn check_future(
    departure: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), TravelValidationError> {
    if departure > now {
        Ok(())
    } else {
        Err(TravelValidationError::FutureDatesOnly)
    }
}

impl TravelRequest {
    /// Validate caller input and build a new `Solicited` request at revision 1.
    pub fn create(
        id: TravelRequestId,
        owner: User,
        input: NewTravelRequest,
        now: DateTime<Utc>,
    ) -> Result<Self, TravelValidationError> {
        input.validate(now)?;

        Ok(Self {
            id,
            owner,
            traveler_name: input.traveler_name.trim().to_owned(),
            destination: input.destination.trim().to_owned(),
            departure: input.departure,
            return_date: input.return_date,
            status: TravelStatus::Solicited,
            approved: None,
            canceled: None,
            created_at: now,
            updated_at: now,
            revision: 1,
        })
    }

    /// Rehydrate a stored request with its owner.
    pub fn restore(record: TravelRequestRecord, owner: User) -> Result<Self, TravelValidationError> {
        if record.owner_id != *owner.id() {
            return Err(TravelValidationError::OwnerMismatch);
        }
        let consistent = match record.status {
            TravelStatus::Solicited => record.approved.is_none() && record.canceled.is_none(),
            TravelStatus::Approved => record.approved.is_some() && record.canceled.is_none(),
            TravelStatus::Canceled => record.canceled.is_some() && record.approved.is_none(),
        };
        if !consistent {
            return Err(TravelValidationError::InconsistentStatus {
                status: record.status,
            });
        }
        check_date_range(record.departure, record.return_date)?;

        Ok(Self {
            id: record.id,
            owner,
            traveler_name: record.traveler_name,
            destination: record.destination,
            departure: record.departure,
            return_date: record.return_date,
            status: record.status,
            approved: record.approved,
            canceled: record.canceled,
            created_at: record.created_at,
            updated_at: record.updated_at,
            revision: record.revision,
        })
    }

    /// Flatten into the stored form.
    pub fn to_record(&self) -> TravelRequestRecord {
        TravelRequestRecord {
            id: self.id,
            owner_id: *self.owner.id(),
            traveler_name: self.traveler_name.clone(),
            destination: self.destination.clone(),
            departure: self.departure,
            return_date: self.return_date,
            status: self.status,
            approved: self.approved,
            canceled: self.canceled,
            created_at: self.created_at,
            updated_at: self.updated_at,
            revision: self.revision,
        }
    }

    /// Record an administrator decision and advance the revision.
    ///
    /// Callers must have cleared the transition policy first; this only
    /// stamps the outcome.
    #[must_use]
    pub fn decided(mut self, decision: Decision, actor: UserId, now: DateTime<Utc>) -> Self {
        let stamp = Some(StatusStamp { by: actor, at: now });
        match decision {
            Decision::Approve => self.approved = stamp,
            Decision::Cancel => self.canceled = stamp,
        }
        self.status = decision.resulting_status();
        self.updated_at = now;
        self.revision += 1;
        self
    }

    pub(super) fn with_content(
        mut self,
        content: super::patch::Content,
        now: DateTime<Utc>,
    ) -> Self {
        self.traveler_name = content.traveler_name;
        self.destination = content.destination;
        self.departure = content.departure;
        self.return_date = content.return_date;
        self.updated_at = now;
        self.revision += 1;
        self
    }

    pub fn id(&self) -> TravelRequestId {
        self.id
    }

    pub fn owner(&self) -> &User {
        &self.owner
    }

    pub fn owner_id(&self) -> &UserId {
        self.owner.id()
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.owner.id() == user_id
    }

    pub fn traveler_name(&self) -> &str {
        self.traveler_name.as_str()
    }

    pub fn destination(&self) -> &str {
        self.destination.as_str()
    }

    pub fn departure(&self) -> DateTime<Utc> {
        self.departure
    }

    pub fn return_date(&self) -> Option<DateTime<Utc>> {
        self.return_date
    }

    pub fn status(&self) -> TravelStatus {
        self.status
    }

    pub fn approved(&self) -> Option<&StatusStamp> {
        self.approved.as_ref()
    }

    pub fn canceled(&self) -> Option<&StatusStamp> {
        self.canceled.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }
}
