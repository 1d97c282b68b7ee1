//! Role landing pages.

use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

/// GET /orders - order history of the caller (orders live in the commerce backend)
pub async fn orders(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "customer": principal.identity_id().to_string(),
        "orders": [],
    }))
}

/// GET /vendor/dashboard
pub async fn vendor_dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> impl IntoResponse {
    let own = services.listings_by(principal.identity_id());
    Json(serde_json::json!({
        "vendor": principal.identity_id().to_string(),
        "listing_count": own.len(),
        "listings": own,
    }))
}

/// GET /admin/dashboard
pub async fn admin_dashboard(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let users = match services.users.list() {
        Ok(u) => u,
        Err(e) => return errors::store_error_to_response(e),
    };

    let mut by_role = serde_json::Map::new();
    for role in motorhub_auth::Role::ALL {
        let count = users.iter().filter(|u| u.role == role).count();
        by_role.insert(role.as_str().to_string(), count.into());
    }

    Json(serde_json::json!({
        "user_count": users.len(),
        "users_by_role": by_role,
        "listing_count": services.listings().len(),
    }))
    .into_response()
}
