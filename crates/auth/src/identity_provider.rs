//! Identity provider contract (sign-in and token refresh).

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use motorhub_core::IdentityId;

use crate::{
    Hs256JwtValidator, JwtValidator, Session, TokenIssueError, TokenValidationError, UserStore,
    UserStoreError,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityProviderError {
    #[error("unknown identity '{0}'")]
    UnknownIdentity(IdentityId),

    #[error("invalid session: {0}")]
    InvalidSession(#[from] TokenValidationError),

    #[error(transparent)]
    Issue(#[from] TokenIssueError),

    #[error(transparent)]
    Store(#[from] UserStoreError),
}

/// Issues sessions bound to the role currently held in the user store.
pub trait IdentityProvider: Send + Sync {
    fn sign_in(&self, id: &IdentityId, now: DateTime<Utc>) -> Result<Session, IdentityProviderError>;

    /// Exchange a still-valid session for a fresh one.
    ///
    /// The new session carries the *current* role, which is how clients get
    /// rid of a stale role after a promotion.
    fn refresh(&self, token: &str, now: DateTime<Utc>) -> Result<Session, IdentityProviderError>;
}

/// In-process identity provider over a [`UserStore`] and the HS256 codec.
///
/// Used by the API refresh endpoint, by tests, and for local development.
/// Credential checks (passwords, OAuth) are the managed provider's concern.
#[derive(Debug, Clone)]
pub struct LocalIdentityProvider<S> {
    store: S,
    codec: Hs256JwtValidator,
    ttl: Duration,
}

impl<S> LocalIdentityProvider<S>
where
    S: UserStore,
{
    pub fn new(store: S, codec: Hs256JwtValidator, ttl: Duration) -> Self {
        Self { store, codec, ttl }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &Hs256JwtValidator {
        &self.codec
    }
}

impl<S> IdentityProvider for LocalIdentityProvider<S>
where
    S: UserStore,
{
    fn sign_in(&self, id: &IdentityId, now: DateTime<Utc>) -> Result<Session, IdentityProviderError> {
        let record = self
            .store
            .get(id)?
            .ok_or_else(|| IdentityProviderError::UnknownIdentity(id.clone()))?;

        let session = self.codec.issue(&record.identity, record.role, now, self.ttl)?;
        debug!(sub = %id, role = %record.role, "signed in");
        Ok(session)
    }

    fn refresh(&self, token: &str, now: DateTime<Utc>) -> Result<Session, IdentityProviderError> {
        let claims = self.codec.validate(token, now).inspect_err(|e| {
            warn!(error = %e, "refresh rejected");
        })?;

        let record = self
            .store
            .get(&claims.sub)?
            .ok_or_else(|| IdentityProviderError::UnknownIdentity(claims.sub.clone()))?;

        if record.role != claims.role {
            debug!(sub = %claims.sub, from = %claims.role, to = %record.role, "refresh picked up role change");
        }

        Ok(self.codec.issue(&record.identity, record.role, now, self.ttl)?)
    }
}
