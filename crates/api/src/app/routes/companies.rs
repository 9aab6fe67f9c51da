//! Company self-service: registration, profile and dashboard summary.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use super::company_owner;
use crate::app::dto::{AccountResponse, CredentialsRequest, SummaryResponse};
use crate::app::extract::ApiJson;
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/me", get(me))
        .route("/me/summary", get(summary))
}

/// POST /api/companies/register (also mounted at /api/auth/register)
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<CredentialsRequest>,
) -> axum::response::Response {
    match services.identity.register_company(&body.username, &body.password).await {
        Ok(account) => (StatusCode::CREATED, Json(AccountResponse::from(account))).into_response(),
        Err(e) => errors::identity_error_to_response(e),
    }
}

/// GET /api/companies/me
pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.companies.get_by_username(principal.username()).await {
        Ok(account) => Json(AccountResponse::from(account)).into_response(),
        Err(e) => errors::company_error_to_response(e),
    }
}

/// GET /api/companies/me/summary
pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let owner = match company_owner(&services, &principal).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match services.inventory.summary(owner).await {
        Ok(summary) => Json(SummaryResponse::from(summary)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}
