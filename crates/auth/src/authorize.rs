use serde::Serialize;
use thiserror::Error;

use crate::{Role, join_roles};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// Roles were required but nothing upstream resolved a caller.
    ///
    /// This is an ordering/configuration bug (authentication did not run
    /// before the guard), not a normal caller error.
    #[error("Access denied. No authenticated user on request context.")]
    MissingPrincipal,

    #[error("Access denied. Required roles: {}. User role: {}.", join_roles(.required), .actual)]
    AccessDenied { required: Vec<Role>, actual: Role },
}

impl AuthzError {
    /// Audit message surfaced to the caller.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, AuthzError::MissingPrincipal)
    }
}

/// Decide whether a caller's role satisfies a declared role requirement.
///
/// - No IO
/// - No panics
/// - Empty `allowed` means "no restriction"
pub fn authorize_roles(allowed: &[Role], caller: Option<Role>) -> Result<(), AuthzError> {
    if allowed.is_empty() {
        return Ok(());
    }

    let Some(actual) = caller else {
        return Err(AuthzError::MissingPrincipal);
    };

    if allowed.contains(&actual) {
        Ok(())
    } else {
        Err(AuthzError::AccessDenied {
            required: allowed.to_vec(),
            actual,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of a role decision.
///
/// Answers "why was this request allowed/denied?" without re-running the
/// request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationExplanation {
    pub granted: bool,
    pub reason: String,
    pub required_roles: Vec<Role>,
    pub caller_role: Option<Role>,
    pub suggestions: Vec<String>,
}

pub fn explain_authorization(allowed: &[Role], caller: Option<Role>) -> AuthorizationExplanation {
    let decision = authorize_roles(allowed, caller);

    let (granted, reason, suggestions) = match (&decision, caller) {
        (Ok(()), _) if allowed.is_empty() => (
            true,
            "Route declares no role restriction".to_string(),
            Vec::new(),
        ),
        (Ok(()), Some(role)) => (
            true,
            format!("Role '{role}' is one of the declared roles"),
            Vec::new(),
        ),
        (Ok(()), None) => (true, "Allowed".to_string(), Vec::new()),
        (Err(AuthzError::MissingPrincipal), _) => (
            false,
            "No authenticated user was resolved before the role check".to_string(),
            vec!["Ensure authentication middleware runs before the role guard".to_string()],
        ),
        (Err(e @ AuthzError::AccessDenied { .. }), _) => (
            false,
            e.message(),
            vec![
                format!("Ask an administrator for one of: {}", join_roles(allowed)),
                "Refresh the session after a role change".to_string(),
            ],
        ),
    };

    AuthorizationExplanation {
        granted,
        reason,
        required_roles: allowed.to_vec(),
        caller_role: caller,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn empty_requirement_allows_anyone() {
        assert_eq!(authorize_roles(&[], None), Ok(()));
        assert_eq!(authorize_roles(&[], Some(Role::Customer)), Ok(()));
    }

    #[test]
    fn vendor_passes_vendor_or_admin_route() {
        assert_eq!(authorize_roles(&[Role::Admin, Role::Vendor], Some(Role::Vendor)), Ok(()));
    }

    #[test]
    fn customer_denied_with_audit_message() {
        let err = authorize_roles(&[Role::Admin, Role::Vendor], Some(Role::Customer)).unwrap_err();
        assert_eq!(
            err.message(),
            "Access denied. Required roles: admin, vendor. User role: customer."
        );
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn missing_principal_is_configuration_error() {
        let err = authorize_roles(&[Role::Admin], None).unwrap_err();
        assert_eq!(err, AuthzError::MissingPrincipal);
        assert!(err.is_configuration_error());
    }

    #[test]
    fn explanation_reports_denial() {
        let e = explain_authorization(&[Role::Admin], Some(Role::Vendor));
        assert!(!e.granted);
        assert_eq!(e.reason, "Access denied. Required roles: admin. User role: vendor.");
        assert_eq!(e.caller_role, Some(Role::Vendor));
        assert!(!e.suggestions.is_empty());
    }

    #[test]
    fn explanation_reports_unrestricted_route() {
        let e = explain_authorization(&[], Some(Role::Customer));
        assert!(e.granted);
        assert!(e.suggestions.is_empty());
    }

    fn role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    fn role_set() -> impl Strategy<Value = Vec<Role>> {
        prop::sample::subsequence(Role::ALL.to_vec(), 0..=3)
    }

    proptest! {
        /// Property: a role outside the declared set is never allowed.
        #[test]
        fn roles_outside_set_are_denied(allowed in role_set(), caller in role()) {
            let decision = authorize_roles(&allowed, Some(caller));
            if allowed.is_empty() || allowed.contains(&caller) {
                prop_assert!(decision.is_ok());
            } else {
                let is_access_denied = matches!(decision, Err(AuthzError::AccessDenied { .. }));
                prop_assert!(is_access_denied);
            }
        }

        /// Property: the decision is a pure function of its inputs.
        #[test]
        fn decision_is_deterministic(allowed in role_set(), caller in prop::option::of(role())) {
            prop_assert_eq!(authorize_roles(&allowed, caller), authorize_roles(&allowed, caller));
        }
    }
}
