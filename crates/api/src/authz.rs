//! API-side role guard.
//!
//! Enforces each route's declared roles before the handler runs, reading only
//! the [`PrincipalContext`] placed on the request by the authentication
//! middleware. No IO.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::MethodRouter,
};
use tracing::{error, warn};

use motorhub_auth::{AuthzError, Role, authorize_roles};

use crate::app::errors;
use crate::context::PrincipalContext;

/// Roles declared on a route; empty means any authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedRoles(pub &'static [Role]);

/// Check the resolved caller against the declared roles.
///
/// Returns the 403 response to send when the caller is not allowed.
pub fn authorize_request(
    allowed: &[Role],
    principal: Option<&PrincipalContext>,
    route: &str,
) -> Result<(), Response> {
    authorize_roles(allowed, principal.map(PrincipalContext::role)).map_err(|e| {
        match (&e, principal) {
            (AuthzError::MissingPrincipal, _) => error!(
                route,
                "role guard reached without an authenticated principal; authentication middleware is missing or misordered"
            ),
            (_, Some(p)) => warn!(route, identity = %p.identity_id(), reason = %e, "access denied"),
            (_, None) => warn!(route, reason = %e, "access denied"),
        }
        errors::forbidden(e.message())
    })
}

pub async fn role_guard(State(allowed): State<AllowedRoles>, req: Request, next: Next) -> Response {
    let route = format!("{} {}", req.method(), req.uri().path());
    if let Err(denied) = authorize_request(allowed.0, req.extensions().get::<PrincipalContext>(), &route) {
        return denied;
    }
    next.run(req).await
}

/// Wrap a method router so its handlers only run for `roles`.
pub fn guarded(method_router: MethodRouter, roles: &'static [Role]) -> MethodRouter {
    method_router.route_layer(axum::middleware::from_fn_with_state(AllowedRoles(roles), role_guard))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use motorhub_core::IdentityId;
    use proptest::prelude::*;

    use super::*;

    fn principal(role: Role) -> PrincipalContext {
        PrincipalContext::new(IdentityId::parse("uid-1").unwrap(), None, role)
    }

    async fn body(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn undeclared_roles_allow_everyone() {
        assert!(authorize_request(&[], None, "GET /x").is_ok());
        assert!(authorize_request(&[], Some(&principal(Role::Customer)), "GET /x").is_ok());
    }

    #[test]
    fn repeated_checks_agree() {
        let p = principal(Role::Vendor);
        let first = authorize_request(&[Role::Admin, Role::Vendor], Some(&p), "POST /listings").is_ok();
        let second = authorize_request(&[Role::Admin, Role::Vendor], Some(&p), "POST /listings").is_ok();
        assert!(first && second);
    }

    #[tokio::test]
    async fn denied_caller_gets_forbidden_body() {
        let resp = authorize_request(&[Role::Admin, Role::Vendor], Some(&principal(Role::Customer)), "POST /listings")
            .unwrap_err();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let body = body(resp).await;
        assert_eq!(body["error"], "Forbidden");
        assert_eq!(body["code"], "ACCESS_DENIED");
        assert_eq!(
            body["message"],
            "Access denied. Required roles: admin, vendor. User role: customer."
        );
    }

    proptest! {
        #[test]
        fn outcome_matches_declared_roles(
            allowed in prop::sample::subsequence(Role::ALL.to_vec(), 0..=3),
            caller in prop::sample::select(Role::ALL.to_vec()),
        ) {
            let granted = authorize_request(&allowed, Some(&principal(caller)), "GET /p").is_ok();
            prop_assert_eq!(granted, allowed.is_empty() || allowed.contains(&caller));
        }
    }

    #[tokio::test]
    async fn missing_principal_is_forbidden_not_unauthorized() {
        let resp = authorize_request(&[Role::Admin], None, "GET /admin/dashboard").unwrap_err();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(body(resp).await["code"], "ACCESS_DENIED");
    }
}
