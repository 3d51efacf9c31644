//! Notifier that writes each owner notice as a structured log record.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{NotificationError, StatusChangeNotifier};
use crate::domain::{TravelRequest, TravelStatus, status_change_notice};

/// Logs approval and cancellation notices addressed to the request owner.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatusChangeNotifier;

#[async_trait]
impl StatusChangeNotifier for TracingStatusChangeNotifier {
    async fn notify_status_change(
        &self,
        request: &TravelRequest,
        previous: TravelStatus,
    ) -> Result<(), NotificationError> {
        let Some(notice) = status_change_notice(request, previous) else {
            return Ok(());
        };
        info!(
            target: "notifications",
            recipient = %notice.recipient,
            request_id = %request.id(),
            status = %notice.status,
            message = %notice.message,
            "travel request status notice"
        );
        Ok(())
    }
}
