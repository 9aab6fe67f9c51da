//! Request gate and CORS.
//!
//! The gate runs before every handler: it looks up the access level the
//! policy table assigns to the request, authenticates the bearer token when
//! one is present, and either attaches a [`PrincipalContext`] or rejects the
//! request with 401/403. It never redirects.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header::InvalidHeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::debug;

use stockdesk_auth::{AccessDenied, Decision, JwtValidator, Principal, RoutePolicy};

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct GateState {
    pub jwt: Arc<dyn JwtValidator>,
    pub policy: Arc<RoutePolicy>,
}

pub async fn request_gate(State(state): State<GateState>, mut req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let access = state.policy.requirement(&method, &path);

    let principal = match extract_bearer(req.headers()) {
        Some(token) => match state.jwt.validate(token, Utc::now()) {
            Ok(claims) => Some(Principal::from(claims)),
            // Public routes ignore bad tokens; protected routes reject them.
            Err(e) if access.requires_identity() => {
                debug!(%method, %path, error = %e, "request rejected: invalid token");
                return json_error(StatusCode::UNAUTHORIZED, "invalid_token", e.to_string());
            }
            Err(_) => None,
        },
        None => None,
    };

    match access.check(principal.as_ref()) {
        Decision::Allow => {
            if let Some(principal) = principal {
                req.extensions_mut().insert(PrincipalContext::from(principal));
            }
            next.run(req).await
        }
        Decision::Deny(denied) => {
            debug!(%method, %path, reason = %denied, "request rejected");
            access_denied_response(&denied)
        }
    }
}

pub fn access_denied_response(denied: &AccessDenied) -> Response {
    match denied {
        AccessDenied::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", denied.to_string())
        }
        AccessDenied::Forbidden { .. } => {
            json_error(StatusCode::FORBIDDEN, "forbidden", denied.to_string())
        }
    }
}

/// `Authorization: Bearer <token>`; anything else counts as no token.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

/// Single-origin CORS with credentials.
///
/// Request headers are mirrored rather than wildcarded: browsers reject
/// `Access-Control-Allow-Headers: *` together with credentials.
pub fn cors_layer(allowed_origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin = HeaderValue::from_str(allowed_origin)?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bearer_tokens_only() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));

        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn cors_layer_rejects_unprintable_origin() {
        assert!(cors_layer("http://localhost:5173").is_ok());
        assert!(cors_layer("http://bad\norigin").is_err());
    }
}
