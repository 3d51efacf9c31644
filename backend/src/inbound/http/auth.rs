//! Bearer credential extraction for protected handlers.
//!
//! Handlers take [`AuthenticatedUser`] as an argument; the extractor reads
//! the `Authorization: Bearer <token>` header and asks the login port to
//! resolve it to a user id.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};

use crate::domain::{AccessToken, Error, UserId};

use super::state::HttpState;

/// Caller identity derived from a verified bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    pub fn user_id(&self) -> &UserId {
        &self.0
    }
}

fn missing_token() -> Error {
    Error::unauthorized("missing bearer credential").with_reason("missing_token")
}

/// Extract the token from an `Authorization` header value.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(AccessToken::TOKEN_TYPE) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(missing_token)?
        .to_str()
        .map_err(|_| missing_token())?;
    let token = bearer_token(header).ok_or_else(missing_token)?;
    state
        .login
        .verify_access_token(token)
        .map(AuthenticatedUser)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
