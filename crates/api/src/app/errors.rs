use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use motorhub_auth::{IdentityProviderError, PromotionError, UserStoreError};

pub const AUTHENTICATION_REQUIRED: &str = "AUTHENTICATION_REQUIRED";
pub const STALE_SESSION: &str = "STALE_SESSION";
pub const INVALID_SESSION: &str = "INVALID_SESSION";
pub const ACCESS_DENIED: &str = "ACCESS_DENIED";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const CONFLICT: &str = "CONFLICT";
pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Uniform error body: `{ "error": <status text>, "message": ..., "code": ... }`.
pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": message.into(),
            "code": code,
        })),
    )
        .into_response()
}

pub fn unauthorized(code: &'static str, message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, code, message)
}

pub fn forbidden(message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, ACCESS_DENIED, message)
}

pub fn store_error_to_response(err: UserStoreError) -> axum::response::Response {
    match err {
        UserStoreError::NotFound(id) => {
            json_error(StatusCode::NOT_FOUND, NOT_FOUND, format!("user '{id}' not found"))
        }
        UserStoreError::AlreadyRegistered(id) => json_error(
            StatusCode::CONFLICT,
            CONFLICT,
            format!("user '{id}' is already registered"),
        ),
        UserStoreError::Unavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, STORE_UNAVAILABLE, msg)
        }
    }
}

pub fn promotion_error_to_response(err: PromotionError) -> axum::response::Response {
    match err {
        PromotionError::NotAdmin(_) => forbidden(err.to_string()),
        PromotionError::SelfPromotion => json_error(StatusCode::CONFLICT, CONFLICT, err.to_string()),
        PromotionError::Store(e) => store_error_to_response(e),
    }
}

pub fn identity_error_to_response(err: IdentityProviderError) -> axum::response::Response {
    match err {
        IdentityProviderError::UnknownIdentity(_) | IdentityProviderError::InvalidSession(_) => {
            unauthorized(INVALID_SESSION, err.to_string())
        }
        IdentityProviderError::Issue(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR, e.to_string())
        }
        IdentityProviderError::Store(e) => store_error_to_response(e),
    }
}
