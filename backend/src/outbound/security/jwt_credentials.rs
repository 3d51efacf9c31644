//! HS256 bearer credentials.
//!
//! Tokens carry `sub` (user id), `iat`, and `exp`. Expiry is checked against
//! the injected clock rather than the library's wall clock.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{CredentialError, CredentialIssuer};
use crate::domain::{AccessToken, UserId};

/// Lifetime of an issued access token.
pub const ACCESS_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies HS256 tokens with a shared secret.
pub struct JwtCredentialIssuer {
    keys: Option<SigningKeys>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtCredentialIssuer {
    /// Build an issuer; a missing or blank secret makes every call fail with
    /// [`CredentialError::MissingSigningKey`].
    pub fn new(secret: Option<&str>, clock: Arc<dyn Clock>) -> Self {
        let keys = secret
            .filter(|secret| !secret.trim().is_empty())
            .map(|secret| SigningKeys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            });
        Self {
            keys,
            ttl: Duration::hours(ACCESS_TOKEN_TTL_HOURS),
            clock,
        }
    }

    fn keys(&self) -> Result<&SigningKeys, CredentialError> {
        self.keys.as_ref().ok_or(CredentialError::MissingSigningKey)
    }
}

impl CredentialIssuer for JwtCredentialIssuer {
    fn issue(&self, user_id: &UserId) -> Result<AccessToken, CredentialError> {
        let keys = self.keys()?;
        let issued_at = self.clock.utc();
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|err| CredentialError::signing(err.to_string()))?;
        Ok(AccessToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<UserId, CredentialError> {
        let keys = self.keys()?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let claims = decode::<Claims>(token, &keys.decoding, &validation)
            .map_err(|err| CredentialError::invalid(err.to_string()))?
            .claims;

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| CredentialError::invalid("expiry out of range"))?;
        if expires_at <= self.clock.utc() {
            return Err(CredentialError::Expired);
        }
        UserId::new(&claims.sub).map_err(|err| CredentialError::invalid(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::test_support::{MutableClock, fixture_now};

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        Arc::new(MutableClock::new(fixture_now()))
    }

    fn issuer(secret: &str, clock: &Arc<MutableClock>) -> JwtCredentialIssuer {
        JwtCredentialIssuer::new(Some(secret), Arc::clone(clock) as Arc<dyn Clock>)
    }

    #[rstest]
    fn issued_tokens_resolve_to_their_subject(clock: Arc<MutableClock>) {
        let issuer = issuer("test-secret", &clock);
        let user_id = UserId::random();

        let token = issuer.issue(&user_id).expect("issue");

        assert_eq!(token.expires_at, fixture_now() + Duration::hours(24));
        assert_eq!(issuer.verify(&token.token).expect("verify"), user_id);
    }

    #[rstest]
    fn tokens_expire_after_a_day(clock: Arc<MutableClock>) {
        let issuer = issuer("test-secret", &clock);
        let token = issuer.issue(&UserId::random()).expect("issue");

        clock.advance(Duration::hours(ACCESS_TOKEN_TTL_HOURS));

        assert_eq!(issuer.verify(&token.token), Err(CredentialError::Expired));
    }

    #[rstest]
    fn tokens_signed_with_another_key_are_invalid(clock: Arc<MutableClock>) {
        let token = issuer("other-secret", &clock)
            .issue(&UserId::random())
            .expect("issue");

        let err = issuer("test-secret", &clock)
            .verify(&token.token)
            .expect_err("forged");

        assert!(matches!(err, CredentialError::Invalid { .. }));
    }

    #[rstest]
    fn garbage_is_invalid(clock: Arc<MutableClock>) {
        let err = issuer("test-secret", &clock)
            .verify("not.a.token")
            .expect_err("garbage");

        assert!(matches!(err, CredentialError::Invalid { .. }));
    }

    #[rstest]
    #[case(None)]
    #[case(Some("   "))]
    fn missing_secret_disables_issuance(clock: Arc<MutableClock>, #[case] secret: Option<&str>) {
        let issuer = JwtCredentialIssuer::new(secret, clock);

        assert_eq!(
            issuer.issue(&UserId::random()),
            Err(CredentialError::MissingSigningKey)
        );
        assert_eq!(issuer.verify("anything"), Err(CredentialError::MissingSigningKey));
    }
}
