//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, hasher, credential issuer, notifier) are
//! implemented by outbound adapters; driving ports (login, registration,
//! travel command/query) are implemented by domain services and called by
//! inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_issuer;
mod login_service;
mod password_hasher;
mod status_change_notifier;
mod travel_request_command;
mod travel_request_query;
mod travel_request_repository;
mod user_repository;

#[cfg(test)]
pub use credential_issuer::MockCredentialIssuer;
pub use credential_issuer::{CredentialError, CredentialIssuer};
#[cfg(test)]
pub use login_service::{MockLoginService, MockUserRegistration};
pub use login_service::{LoginService, UserRegistration};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use status_change_notifier::MockStatusChangeNotifier;
pub use status_change_notifier::{
    FixtureStatusChangeNotifier, NotificationError, StatusChangeNotifier,
};
#[cfg(test)]
pub use travel_request_command::MockTravelRequestCommand;
pub use travel_request_command::{
    ChangeTravelStatusRequest, CreateTravelRequest, TravelRequestCommand, UpdateTravelRequest,
};
#[cfg(test)]
pub use travel_request_query::MockTravelRequestQuery;
pub use travel_request_query::TravelRequestQuery;
#[cfg(test)]
pub use travel_request_repository::MockTravelRequestRepository;
pub use travel_request_repository::{TravelRequestRepository, TravelRequestRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};

#[cfg(test)]
mod tests;
