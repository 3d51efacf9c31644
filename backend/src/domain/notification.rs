//! Owner notifications for terminal status changes.

use chrono::{DateTime, Utc};

use crate::domain::{Email, TravelRequest, TravelStatus};

const DATE_FORMAT: &str = "%d/%m/%Y";

/// Message addressed to the owner of a travel request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChangeNotice {
    pub recipient: Email,
    pub status: TravelStatus,
    pub message: String,
}

fn format_date(value: DateTime<Utc>) -> String {
    value.format(DATE_FORMAT).to_string()
}

/// Build the notice for `request` having moved from `previous`.
///
/// Returns `None` unless the request now sits in a terminal status that
/// differs from `previous`.
pub fn status_change_notice(
    request: &TravelRequest,
    previous: TravelStatus,
) -> Option<StatusChangeNotice> {
    let status = request.status();
    if !status.is_terminal() || status == previous {
        return None;
    }

    let owner = request.owner();
    let message = match status {
        TravelStatus::Approved => {
            let dates = match request.return_date() {
                Some(return_date) => format!(
                    "{} to {}",
                    format_date(request.departure()),
                    format_date(return_date)
                ),
                None => format_date(request.departure()),
            };
            format!(
                "Hello {}, your travel request to {} was APPROVED. Dates: {dates}",
                owner.name(),
                request.destination(),
            )
        }
        TravelStatus::Canceled => format!(
            "Hello {}, your travel request to {} was CANCELED.",
            owner.name(),
            request.destination(),
        ),
        TravelStatus::Solicited => return None,
    };

    Some(StatusChangeNotice {
        recipient: owner.email().clone(),
        status,
        message,
    })
}
