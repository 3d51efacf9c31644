//! Driving ports for registration and authentication use-cases.
//!
//! Inbound adapters call these to register users, exchange credentials for a
//! bearer token, and resolve a presented token back to a user id without
//! knowing the backing infrastructure.

use async_trait::async_trait;

use crate::domain::{AccessToken, Error, LoginCredentials, Registration, User, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and issue a bearer credential.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error>;

    /// Resolve a presented bearer credential to the user it was issued for.
    fn verify_access_token(&self, token: &str) -> Result<UserId, Error>;
}

/// Domain use-case port for creating accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRegistration: Send + Sync {
    /// Register a new, active user.
    async fn register(&self, registration: &Registration) -> Result<User, Error>;
}
