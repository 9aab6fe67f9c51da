use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::errors;
use crate::context::PrincipalContext;

/// GET /actuator/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "UP" }))
}

/// GET /api/whoami
pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "username": principal.username(),
        "role": principal.role(),
        "authority": principal.role().authority(),
    }))
}

pub async fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "no such route")
}
