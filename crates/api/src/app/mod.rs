//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: shared state (user store, identity provider, listings)
//! - `routes/`: HTTP routes + handlers, plus the declared route → roles table
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tower::ServiceBuilder;

use motorhub_auth::{Hs256JwtValidator, UserStore};

use crate::config::ApiConfig;
use crate::middleware;

pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(config: &ApiConfig, users: Arc<dyn UserStore>) -> Router {
    let codec = Hs256JwtValidator::new(config.jwt_secret.as_bytes());
    let auth_state = middleware::AuthState {
        jwt: Arc::new(codec.clone()),
        users: users.clone(),
    };

    let services = Arc::new(services::AppServices::new(config, users, codec));

    // Protected routes: authentication first, then each route's role guard.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/refresh", post(routes::session::refresh))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
