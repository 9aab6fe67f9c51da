//! Admin company management.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use tracing::info;

use stockdesk_core::UserId;

use crate::app::dto::{AccountResponse, UpdateStatusRequest};
use crate::app::extract::{parse_id, ApiJson};
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/companies", get(list_companies))
        .route("/companies/:id/status", put(update_status))
}

/// GET /api/admin/companies
pub async fn list_companies(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.companies.list_companies().await {
        Ok(accounts) => Json(
            accounts
                .into_iter()
                .map(AccountResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::company_error_to_response(e),
    }
}

/// PUT /api/admin/companies/:id/status
pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateStatusRequest>,
) -> axum::response::Response {
    let id: UserId = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match services.companies.set_active(id, body.active).await {
        Ok(account) => {
            info!(admin = principal.username(), company = %account.username, active = account.active, "company status changed");
            Json(AccountResponse::from(account)).into_response()
        }
        Err(e) => errors::company_error_to_response(e),
    }
}
