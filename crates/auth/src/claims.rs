use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use motorhub_core::IdentityId;

use crate::Role;

/// Session token claims (transport-agnostic).
///
/// This is the set of claims MotorHub trusts once a token has been decoded
/// and its role claim coerced into [`Role`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / identity-provider user id.
    pub sub: IdentityId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Role bound to the session at issuance time.
    pub role: Role,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token carries no role claim")]
    MissingRole,

    #[error("token carries unrecognised role claim {0}")]
    UnknownRole(String),
}

/// Deterministically validate session claims against `now`.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// the token codec before this is called.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

/// Claims exactly as they come out of the decoder.
///
/// Identity providers put whatever they like in the role claim (strings in
/// any casing, arrays, numbers). Nothing downstream ever sees this type:
/// it is converted into [`SessionClaims`] right after decode.
#[derive(Debug, Clone, Deserialize)]
pub struct RawClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<serde_json::Value>,
    pub iat: i64,
    pub exp: i64,
}

impl TryFrom<RawClaims> for SessionClaims {
    type Error = TokenValidationError;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let sub = IdentityId::parse(raw.sub)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;

        let role = match raw.role {
            None | Some(serde_json::Value::Null) => return Err(TokenValidationError::MissingRole),
            Some(serde_json::Value::String(s)) => s
                .parse::<Role>()
                .map_err(|_| TokenValidationError::UnknownRole(format!("'{s}'")))?,
            Some(other) => return Err(TokenValidationError::UnknownRole(other.to_string())),
        };

        let issued_at = DateTime::<Utc>::from_timestamp(raw.iat, 0)
            .ok_or_else(|| TokenValidationError::Malformed("iat out of range".to_string()))?;
        let expires_at = DateTime::<Utc>::from_timestamp(raw.exp, 0)
            .ok_or_else(|| TokenValidationError::Malformed("exp out of range".to_string()))?;

        Ok(SessionClaims {
            sub,
            email: raw.email,
            role,
            issued_at,
            expires_at,
        })
    }
}

/// A signed session token plus the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub claims: SessionClaims,
}

impl Session {
    pub fn role(&self) -> Role {
        self.claims.role
    }
}
