//! Session refresh. Public route: it validates the bearer token itself so
//! that sessions rejected as stale can still be exchanged.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use motorhub_auth::IdentityProvider;

use crate::app::{errors, services::AppServices};
use crate::middleware::extract_bearer;

/// POST /auth/refresh - Exchange a valid session for one carrying the current role
pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let token = match extract_bearer(&headers) {
        Ok(t) => t,
        Err(msg) => return errors::unauthorized(errors::AUTHENTICATION_REQUIRED, msg),
    };

    let session = match services.identity.refresh(token, Utc::now()) {
        Ok(s) => s,
        Err(e) => return errors::identity_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "token": session.token,
            "role": session.role(),
            "expires_at": session.claims.expires_at,
        })),
    )
        .into_response()
}
