use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    pub price_cents: u64,
}

/// GET /listings
pub async fn list_listings(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(serde_json::json!({ "listings": services.listings() }))
}

/// POST /listings
pub async fn create_listing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateListingRequest>,
) -> axum::response::Response {
    match services.create_listing(principal.identity_id().clone(), body.title, body.price_cents) {
        Ok(listing) => (StatusCode::CREATED, Json(listing)).into_response(),
        Err(e) => errors::json_error(StatusCode::BAD_REQUEST, errors::VALIDATION_ERROR, e.to_string()),
    }
}
