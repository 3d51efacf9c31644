//! Port for notifying owners about terminal status changes.

use async_trait::async_trait;

use crate::domain::{TravelRequest, TravelStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification adapters.
    pub enum NotificationError {
        /// Delivery failed.
        Delivery { message: String } => "notification delivery failed: {message}",
    }
}

/// Notifier port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusChangeNotifier: Send + Sync {
    /// Notify the owner of `request`, which just moved from `previous`.
    ///
    /// Adapters must stay silent unless the request entered a terminal
    /// status different from `previous`.
    async fn notify_status_change(
        &self,
        request: &TravelRequest,
        previous: TravelStatus,
    ) -> Result<(), NotificationError>;
}

/// Notifier that drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureStatusChangeNotifier;

#[async_trait]
impl StatusChangeNotifier for FixtureStatusChangeNotifier {
    async fn notify_status_change(
        &self,
        _request: &TravelRequest,
        _previous: TravelStatus,
    ) -> Result<(), NotificationError> {
        Ok(())
    }
}
