//! Admin routes: role promotion and RBAC audit.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use motorhub_auth::{Role, explain_authorization, promote_role};
use motorhub_core::IdentityId;

use crate::app::routes::{DECLARED_ROUTES, find_declaration};
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub method: String,
    pub path: String,
}

/// PUT /admin/users/:id/role - Promote (or demote) a user
pub async fn set_user_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<SetRoleRequest>,
) -> axum::response::Response {
    let target = match IdentityId::parse(id) {
        Ok(t) => t,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, errors::VALIDATION_ERROR, e.to_string()),
    };

    // Unknown role strings are rejected, never coerced.
    let role = match body.role.parse::<Role>() {
        Ok(r) => r,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, errors::VALIDATION_ERROR, e.to_string()),
    };

    match promote_role(
        &*services.users,
        principal.identity_id(),
        principal.role(),
        &target,
        role,
    ) {
        Ok(record) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "identity_id": record.identity.id.to_string(),
                "role": record.role,
                "updated_at": record.updated_at,
            })),
        )
            .into_response(),
        Err(e) => errors::promotion_error_to_response(e),
    }
}

/// GET /admin/rbac/routes - Every protected route and its allowed roles
pub async fn list_route_declarations() -> impl IntoResponse {
    Json(serde_json::json!({ "routes": DECLARED_ROUTES }))
}

/// GET /admin/rbac/explain?method=X&path=Y - Why the caller can/cannot use a route
pub async fn explain_route_access(
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<ExplainQuery>,
) -> axum::response::Response {
    let Some(decl) = find_declaration(&query.method, &query.path) else {
        return errors::json_error(
            StatusCode::NOT_FOUND,
            errors::NOT_FOUND,
            format!("no declared route {} {}", query.method, query.path),
        );
    };

    let explanation = explain_authorization(decl.allowed_roles, Some(principal.role()));

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "route": decl,
            "explanation": explanation,
        })),
    )
        .into_response()
}
