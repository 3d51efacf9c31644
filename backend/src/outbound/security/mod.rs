//! Credential adapters: Argon2id password hashing and HS256 bearer tokens.

mod argon2_password_hasher;
mod jwt_credentials;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use jwt_credentials::{ACCESS_TOKEN_TTL_HOURS, JwtCredentialIssuer};
