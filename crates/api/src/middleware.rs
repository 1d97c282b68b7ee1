//! Authentication middleware (runs before any role guard).

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{debug, warn};

use motorhub_auth::{JwtValidator, UserStore};

use crate::app::errors;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub users: Arc<dyn UserStore>,
}

/// Resolve the caller from the bearer token and attach a [`PrincipalContext`].
///
/// A token whose role no longer matches the user store is rejected as stale:
/// the client must refresh before it is trusted again.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers())
        .map_err(|msg| errors::unauthorized(errors::AUTHENTICATION_REQUIRED, msg))?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        debug!(error = %e, "rejected bearer token");
        errors::unauthorized(errors::AUTHENTICATION_REQUIRED, format!("Invalid session: {e}"))
    })?;

    match state.users.get_role(&claims.sub) {
        Ok(Some(current)) if current == claims.role => {}
        Ok(Some(current)) => {
            warn!(sub = %claims.sub, token_role = %claims.role, current_role = %current, "stale session role");
            return Err(errors::unauthorized(
                errors::STALE_SESSION,
                "Session role is out of date. Refresh the session.",
            ));
        }
        Ok(None) => {
            warn!(sub = %claims.sub, "token subject is not a registered user");
            return Err(errors::unauthorized(
                errors::STALE_SESSION,
                "Session does not belong to a registered user.",
            ));
        }
        Err(e) => return Err(errors::store_error_to_response(e)),
    }

    req.extensions_mut().insert(PrincipalContext::from(claims));

    Ok(next.run(req).await)
}

pub(crate) fn extract_bearer(headers: &HeaderMap) -> Result<&str, &'static str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing authorization token")?;

    let header = header
        .to_str()
        .map_err(|_| "Invalid authorization header")?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or("Invalid authorization format. Use: Bearer {token}")?
        .trim();

    if token.is_empty() {
        return Err("Missing authorization token");
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(extract_bearer(&HeaderMap::new()).is_err());
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert!(extract_bearer(&headers("Basic dXNlcjpwYXNz")).is_err());
        assert!(extract_bearer(&headers("Bearer    ")).is_err());
    }
}
