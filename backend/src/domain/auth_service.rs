//! Registration and authentication domain service.
//!
//! Implements the [`LoginService`] and [`UserRegistration`] driving ports on
//! top of the user repository, password hasher, and credential issuer ports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CredentialError, CredentialIssuer, LoginService, PasswordHashError, PasswordHasher,
    UserPersistenceError, UserRegistration, UserRepository,
};
use crate::domain::{
    AccessToken, Error, LoginCredentials, Registration, User, UserDraft, UserId,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

fn map_user_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => user_already_exists(),
        UserPersistenceError::Missing { id } => Error::not_found(format!("user {id} not found")),
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn map_credential_error(error: CredentialError) -> Error {
    match error {
        CredentialError::MissingSigningKey => {
            Error::unauthorized("credential signing is not configured")
                .with_reason("configuration_error")
        }
        CredentialError::Signing { message } => {
            Error::internal(format!("failed to issue credential: {message}"))
        }
        CredentialError::Invalid { .. } => {
            Error::unauthorized("invalid bearer token").with_reason("invalid_token")
        }
        CredentialError::Expired => {
            Error::unauthorized("bearer token has expired").with_reason("token_expired")
        }
    }
}

fn user_already_exists() -> Error {
    Error::conflict("a user with this email already exists").with_reason("user_already_exists")
}

/// Account service backed by a user store, a hasher, and a credential issuer.
#[derive(Clone)]
pub struct AuthService<U, H, C> {
    users: Arc<U>,
    hasher: Arc<H>,
    issuer: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<U, H, C> AuthService<U, H, C> {
    /// Create a service over the given adapters.
    pub fn new(users: Arc<U>, hasher: Arc<H>, issuer: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            issuer,
            clock,
        }
    }
}

#[async_trait]
impl<U, H, C> UserRegistration for AuthService<U, H, C>
where
    U: UserRepository,
    H: PasswordHasher,
    C: CredentialIssuer,
{
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let existing = self
            .users
            .find_by_email(registration.email())
            .await
            .map_err(map_user_repository_error)?;
        if existing.is_some() {
            debug!(email = %registration.email(), "registration rejected: email taken");
            return Err(user_already_exists());
        }

        let password = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hash_error)?;

        let user = User::new(UserDraft {
            id: UserId::random(),
            name: registration.name().clone(),
            email: registration.email().clone(),
            password,
            role: registration.role(),
            created_at: self.clock.utc(),
        });
        self.users
            .create(&user)
            .await
            .map_err(map_user_repository_error)?;

        info!(user_id = %user.id(), role = %user.role(), "user registered");
        Ok(user)
    }
}

#[async_trait]
impl<U, H, C> LoginService for AuthService<U, H, C>
where
    U: UserRepository,
    H: PasswordHasher,
    C: CredentialIssuer,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error> {
        let Some(user) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_repository_error)?
        else {
            debug!("login rejected: unknown email");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !user.is_active() {
            debug!(user_id = %user.id(), "login rejected: inactive user");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let verified = match self
            .hasher
            .verify(credentials.password(), user.password())
            .await
        {
            Ok(verified) => verified,
            Err(PasswordHashError::MalformedDigest { message }) => {
                warn!(user_id = %user.id(), %message, "stored password digest is unreadable");
                false
            }
            Err(error) => return Err(map_hash_error(error)),
        };
        if !verified {
            debug!(user_id = %user.id(), "login rejected: password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let token = self.issuer.issue(user.id()).map_err(map_credential_error)?;
        info!(user_id = %user.id(), expires_at = %token.expires_at, "access token issued");
        Ok(token)
    }

    fn verify_access_token(&self, token: &str) -> Result<UserId, Error> {
        self.issuer.verify(token).map_err(map_credential_error)
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
