use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, routing::post, Json, Router};
use chrono::Utc;

use crate::app::dto::{CredentialsRequest, LoginResponse};
use crate::app::extract::ApiJson;
use crate::app::routes::companies;
use crate::app::{errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        // Same handler as /api/companies/register; the web client posts here.
        .route("/register", post(companies::register))
}

/// POST /api/auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<CredentialsRequest>,
) -> axum::response::Response {
    match services.identity.login(&body.username, &body.password, Utc::now()).await {
        Ok(session) => Json(LoginResponse::from(session)).into_response(),
        Err(e) => errors::identity_error_to_response(e),
    }
}
