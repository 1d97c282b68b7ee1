//! `motorhub-auth` — role model, session tokens and authorization policy.
//!
//! This crate is intentionally decoupled from HTTP; the API crate wires it
//! into axum and the navigation crate reuses the same role model client-side.

pub mod authorize;
pub mod claims;
pub mod identity_provider;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user_store;

pub use authorize::{AuthorizationExplanation, AuthzError, authorize_roles, explain_authorization};
pub use claims::{RawClaims, Session, SessionClaims, TokenValidationError, validate_claims};
pub use identity_provider::{IdentityProvider, IdentityProviderError, LocalIdentityProvider};
pub use principal::{AuthenticatedUser, Identity};
pub use roles::{Role, UnknownRole, join_roles};
pub use token::{Hs256JwtValidator, JwtValidator, TokenIssueError};
pub use user_store::{
    InMemoryUserStore, PromotionError, RoleChange, UserRecord, UserStore, UserStoreError, promote_role,
};
