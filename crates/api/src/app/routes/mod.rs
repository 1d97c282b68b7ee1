//! Protected routes and the table declaring which roles may call them.

use axum::{
    Router,
    routing::{MethodRouter, get, post, put},
};
use serde::Serialize;

use motorhub_auth::Role;

use crate::authz;

pub mod admin;
pub mod dashboards;
pub mod listings;
pub mod session;
pub mod system;

/// One protected endpoint and the roles allowed to call it.
///
/// An empty `allowed_roles` means any authenticated caller.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RouteDeclaration {
    pub method: &'static str,
    pub path: &'static str,
    pub allowed_roles: &'static [Role],
    #[serde(skip)]
    handler: fn() -> MethodRouter,
}

const ANY: &[Role] = &[];
const ADMIN: &[Role] = &[Role::Admin];
const ADMIN_OR_VENDOR: &[Role] = &[Role::Admin, Role::Vendor];
const CUSTOMER_OR_ADMIN: &[Role] = &[Role::Customer, Role::Admin];

/// Every protected route, in one place. The router is built from this table.
pub static DECLARED_ROUTES: &[RouteDeclaration] = &[
    RouteDeclaration {
        method: "GET",
        path: "/whoami",
        allowed_roles: ANY,
        handler: || get(system::whoami),
    },
    RouteDeclaration {
        method: "GET",
        path: "/listings",
        allowed_roles: ANY,
        handler: || get(listings::list_listings),
    },
    RouteDeclaration {
        method: "POST",
        path: "/listings",
        allowed_roles: ADMIN_OR_VENDOR,
        handler: || post(listings::create_listing),
    },
    RouteDeclaration {
        method: "GET",
        path: "/orders",
        allowed_roles: CUSTOMER_OR_ADMIN,
        handler: || get(dashboards::orders),
    },
    RouteDeclaration {
        method: "GET",
        path: "/vendor/dashboard",
        allowed_roles: ADMIN_OR_VENDOR,
        handler: || get(dashboards::vendor_dashboard),
    },
    RouteDeclaration {
        method: "GET",
        path: "/admin/dashboard",
        allowed_roles: ADMIN,
        handler: || get(dashboards::admin_dashboard),
    },
    RouteDeclaration {
        method: "PUT",
        path: "/admin/users/:id/role",
        allowed_roles: ADMIN,
        handler: || put(admin::set_user_role),
    },
    RouteDeclaration {
        method: "GET",
        path: "/admin/rbac/routes",
        allowed_roles: ADMIN,
        handler: || get(admin::list_route_declarations),
    },
    RouteDeclaration {
        method: "GET",
        path: "/admin/rbac/explain",
        allowed_roles: ANY,
        handler: || get(admin::explain_route_access),
    },
];

/// Find the declaration for `method` + `path` (path as declared, e.g. `/admin/users/:id/role`).
pub fn find_declaration(method: &str, path: &str) -> Option<&'static RouteDeclaration> {
    DECLARED_ROUTES
        .iter()
        .find(|d| d.method.eq_ignore_ascii_case(method) && d.path == path)
}

/// Router for all authenticated endpoints, each wrapped in its role guard.
pub fn router() -> Router {
    DECLARED_ROUTES.iter().fold(Router::new(), |router, decl| {
        router.route(decl.path, authz::guarded((decl.handler)(), decl.allowed_roles))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn declarations_are_unique() {
        let mut seen = HashSet::new();
        for d in DECLARED_ROUTES {
            assert!(seen.insert((d.method, d.path)), "duplicate declaration {} {}", d.method, d.path);
        }
    }

    #[test]
    fn admin_area_is_admin_only() {
        for d in DECLARED_ROUTES.iter().filter(|d| d.path.starts_with("/admin/") && d.path != "/admin/rbac/explain") {
            assert_eq!(d.allowed_roles, ADMIN, "{} {}", d.method, d.path);
        }
    }

    #[test]
    fn lookup_is_case_insensitive_on_method() {
        let d = find_declaration("post", "/listings").unwrap();
        assert_eq!(d.allowed_roles, &[Role::Admin, Role::Vendor]);
        assert!(find_declaration("DELETE", "/listings").is_none());
    }

    #[test]
    fn declarations_serialize_without_handler() {
        let v = serde_json::to_value(find_declaration("GET", "/admin/dashboard").unwrap()).unwrap();
        assert_eq!(v, serde_json::json!({
            "method": "GET",
            "path": "/admin/dashboard",
            "allowed_roles": ["admin"],
        }));
    }
}
