use serde::{Deserialize, Serialize};

use motorhub_core::IdentityId;

use crate::Role;

/// Identity as reported by the external identity provider.
///
/// Read-only to this system; the provider owns these fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub email: String,
    pub display_name: String,
    pub email_verified: bool,
}

impl Identity {
    pub fn new(id: IdentityId, email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            display_name: display_name.into(),
            email_verified: false,
        }
    }

    pub fn verified(mut self) -> Self {
        self.email_verified = true;
        self
    }
}

/// An identity together with the role it currently acts under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub identity: Identity,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn new(identity: Identity, role: Role) -> Self {
        Self { identity, role }
    }
}
