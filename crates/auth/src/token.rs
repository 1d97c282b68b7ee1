//! HS256 session token codec.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::debug;

use crate::{Identity, RawClaims, Role, Session, SessionClaims, TokenValidationError, validate_claims};

/// Verifies a bearer token and yields trusted claims.
///
/// `now` is injected so callers (and tests) control the clock.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenValidationError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenIssueError {
    #[error("session ttl must be positive")]
    InvalidTtl,

    #[error("issue time out of range")]
    InvalidTimestamp,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

/// Shared-secret (HS256) token codec.
#[derive(Clone)]
pub struct Hs256JwtValidator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();

        // Time checks run in `validate_claims` against the injected clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a session for `identity` bound to `role`, valid for `ttl` from `now`.
    pub fn issue(
        &self,
        identity: &Identity,
        role: Role,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Session, TokenIssueError> {
        if ttl <= Duration::zero() {
            return Err(TokenIssueError::InvalidTtl);
        }

        // Tokens carry whole seconds; keep the in-memory claims identical.
        let issued_at = DateTime::<Utc>::from_timestamp(now.timestamp(), 0)
            .ok_or(TokenIssueError::InvalidTimestamp)?;
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(TokenIssueError::InvalidTimestamp)?;

        let claims = SessionClaims {
            sub: identity.id.clone(),
            email: Some(identity.email.clone()),
            role,
            issued_at,
            expires_at,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenIssueError::Encoding(e.to_string()))?;

        debug!(sub = %claims.sub, role = %role, expires_at = %expires_at, "issued session token");

        Ok(Session { token, claims })
    }
}

impl core::fmt::Debug for Hs256JwtValidator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256JwtValidator").finish_non_exhaustive()
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenValidationError> {
        let decoded = jsonwebtoken::decode::<RawClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;

        let claims = SessionClaims::try_from(decoded.claims)?;
        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use motorhub_core::IdentityId;
    use serde_json::json;

    use super::*;

    fn identity() -> Identity {
        Identity::new(IdentityId::parse("uid-7").unwrap(), "seller@example.com", "Sam Seller")
    }

    #[test]
    fn issued_token_round_trips() {
        let codec = Hs256JwtValidator::new("test-secret");
        let now = Utc::now();
        let session = codec.issue(&identity(), Role::Vendor, now, Duration::minutes(10)).unwrap();

        let claims = codec.validate(&session.token, now).unwrap();
        assert_eq!(claims, session.claims);
        assert_eq!(claims.role, Role::Vendor);
        assert_eq!(claims.email.as_deref(), Some("seller@example.com"));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = Hs256JwtValidator::new("test-secret");
        let now = Utc::now();
        let session = codec.issue(&identity(), Role::Customer, now, Duration::minutes(10)).unwrap();

        let later = now + Duration::minutes(11);
        assert_eq!(codec.validate(&session.token, later), Err(TokenValidationError::Expired));
    }

    #[test]
    fn wrong_secret_is_malformed() {
        let issuer = Hs256JwtValidator::new("secret-a");
        let verifier = Hs256JwtValidator::new("secret-b");
        let now = Utc::now();
        let session = issuer.issue(&identity(), Role::Admin, now, Duration::minutes(5)).unwrap();

        assert!(matches!(
            verifier.validate(&session.token, now),
            Err(TokenValidationError::Malformed(_))
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = Hs256JwtValidator::new("test-secret");
        assert!(matches!(
            codec.validate("not.a.token", Utc::now()),
            Err(TokenValidationError::Malformed(_))
        ));
    }

    #[test]
    fn foreign_role_claim_is_rejected_after_decode() {
        let secret = "test-secret";
        let now = Utc::now().timestamp();
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &json!({ "sub": "uid-9", "role": "owner", "iat": now - 5, "exp": now + 600 }),
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let codec = Hs256JwtValidator::new(secret);
        assert!(matches!(
            codec.validate(&token, Utc::now()),
            Err(TokenValidationError::UnknownRole(_))
        ));
    }

    #[test]
    fn non_positive_ttl_is_refused() {
        let codec = Hs256JwtValidator::new("test-secret");
        let err = codec.issue(&identity(), Role::Customer, Utc::now(), Duration::zero()).unwrap_err();
        assert_eq!(err, TokenIssueError::InvalidTtl);
    }
}
