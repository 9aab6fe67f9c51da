//! Purchase records. Totals are computed server-side.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use stockdesk_core::PurchaseId;

use super::company_owner;
use crate::app::dto::TradeRequest;
use crate::app::extract::{parse_id, ApiJson};
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/api/purchases", get(list).post(create))
        .route("/api/purchases/:id", put(update).delete(delete))
}

/// GET /api/purchases
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let owner = match company_owner(&services, &principal).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match services.inventory.list_purchases(owner).await {
        Ok(purchases) => Json(purchases).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

/// POST /api/purchases
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<TradeRequest>,
) -> axum::response::Response {
    let owner = match company_owner(&services, &principal).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let draft = match body.into_draft() {
        Ok(draft) => draft,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.inventory.create_purchase(owner, draft).await {
        Ok(purchase) => (StatusCode::CREATED, Json(purchase)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

/// PUT /api/purchases/:id
pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<TradeRequest>,
) -> axum::response::Response {
    let owner = match company_owner(&services, &principal).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let id: PurchaseId = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let draft = match body.into_draft() {
        Ok(draft) => draft,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.inventory.update_purchase(owner, id, draft).await {
        Ok(purchase) => Json(purchase).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

/// DELETE /api/purchases/:id
pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let owner = match company_owner(&services, &principal).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let id: PurchaseId = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match services.inventory.delete_purchase(owner, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}
