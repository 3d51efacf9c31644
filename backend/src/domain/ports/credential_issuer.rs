//! Port for issuing and verifying signed bearer credentials.

use crate::domain::{AccessToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential adapters.
    pub enum CredentialError {
        /// No signing key is configured.
        MissingSigningKey => "credential signing key is not configured",
        /// Signing failed.
        Signing { message: String } => "failed to sign credential: {message}",
        /// The presented credential is malformed, forged, or has a bad subject.
        Invalid { message: String } => "invalid credential: {message}",
        /// The presented credential is past its expiry.
        Expired => "credential has expired",
    }
}

/// Credential issuer port. Stateless, so the methods are synchronous.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialIssuer: Send + Sync {
    /// Issue a credential for `user_id`.
    fn issue(&self, user_id: &UserId) -> Result<AccessToken, CredentialError>;

    /// Verify `token` and return the user it was issued for.
    fn verify(&self, token: &str) -> Result<UserId, CredentialError>;
}
