//! Travel request status values.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::TravelValidationError;

/// Lifecycle status of a travel request.
///
/// `Solicited` is the initial state; `Approved` and `Canceled` are terminal.
/// `REJECTED` is accepted on input as an alias of `CANCELED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TravelStatus {
    Solicited,
    Approved,
    Canceled,
}

impl TravelStatus {
    /// Stable wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solicited => "SOLICITED",
            Self::Approved => "APPROVED",
            Self::Canceled => "CANCELED",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Solicited)
    }
}

impl std::str::FromStr for TravelStatus {
    type Err = TravelValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SOLICITED" => Ok(Self::Solicited),
            "APPROVED" => Ok(Self::Approved),
            "CANCELED" | "CANCELLED" | "REJECTED" => Ok(Self::Canceled),
            _ => Err(TravelValidationError::UnknownStatus {
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for TravelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TravelStatus> for String {
    fn from(value: TravelStatus) -> Self {
        value.as_str().to_owned()
    }
}

impl TryFrom<String> for TravelStatus {
    type Error = TravelValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Terminal outcome an administrator can record against a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Cancel,
}

impl Decision {
    /// Decision that moves a request into `target`, if `target` is terminal.
    pub fn for_target(target: TravelStatus) -> Option<Self> {
        match target {
            TravelStatus::Solicited => None,
            TravelStatus::Approved => Some(Self::Approve),
            TravelStatus::Canceled => Some(Self::Cancel),
        }
    }

    pub fn resulting_status(self) -> TravelStatus {
        match self {
            Self::Approve => TravelStatus::Approved,
            Self::Cancel => TravelStatus::Canceled,
        }
    }
}
