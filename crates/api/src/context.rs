use motorhub_auth::{Role, SessionClaims};
use motorhub_core::IdentityId;

/// Execution context for a request: the caller resolved by the
/// authentication middleware.
///
/// Immutable; role guards only ever read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    identity_id: IdentityId,
    email: Option<String>,
    role: Role,
}

impl PrincipalContext {
    pub fn new(identity_id: IdentityId, email: Option<String>, role: Role) -> Self {
        Self {
            identity_id,
            email,
            role,
        }
    }

    pub fn identity_id(&self) -> &IdentityId {
        &self.identity_id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl From<SessionClaims> for PrincipalContext {
    fn from(claims: SessionClaims) -> Self {
        Self::new(claims.sub, claims.email, claims.role)
    }
}
