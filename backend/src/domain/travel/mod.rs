//! Travel requests: the aggregate, its status machine, partial updates, and
//! listing filters.

mod filters;
mod patch;
mod request;
mod status;

pub use filters::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageRequest, TravelRequestFilters};
pub use patch::{PatchOutcome, PatchedField, TravelRequestPatch, apply_patch};
pub use request::{
    NewTravelRequest, StatusStamp, TravelRequest, TravelRequestId, TravelRequestRecord,
};
pub use status::{Decision, TravelStatus};

/// Validation failures raised while building or changing a travel request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TravelValidationError {
    #[error("destination name is required")]
    InvalidDestination,
    #[error("traveler name is required")]
    InvalidTravelerName,
    #[error("departure date must be in the future")]
    FutureDatesOnly,
    #[error("departure date must be before the return date")]
    InvalidDateRange,
    #[error("unknown travel request status: {value}")]
    UnknownStatus { value: String },
    #[error("stored owner does not match the loaded user")]
    OwnerMismatch,
    #[error("stored decision fields do not match status {status}")]
    InconsistentStatus { status: TravelStatus },
}

impl TravelValidationError {
    /// Stable machine code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDestination => "invalid_destination",
            Self::InvalidTravelerName => "invalid_traveler_name",
            Self::FutureDatesOnly => "future_dates_only",
            Self::InvalidDateRange => "invalid_date_range",
            Self::UnknownStatus { .. } => "invalid_status",
            Self::OwnerMismatch => "owner_mismatch",
            Self::InconsistentStatus { .. } => "inconsistent_status",
        }
    }
}
