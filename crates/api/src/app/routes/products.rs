//! Company products with on-hand stock.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use stockdesk_core::ProductId;

use super::company_owner;
use crate::app::dto::ProductRequest;
use crate::app::extract::{parse_id, ApiJson};
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route("/api/products/:id", put(update).delete(delete))
}

/// GET /api/products
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let owner = match company_owner(&services, &principal).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match services.inventory.list_products(owner).await {
        Ok(products) => Json(products).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

/// POST /api/products
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<ProductRequest>,
) -> axum::response::Response {
    let owner = match company_owner(&services, &principal).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let draft = match body.into_draft() {
        Ok(draft) => draft,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.inventory.create_product(owner, draft).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

/// PUT /api/products/:id
pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ProductRequest>,
) -> axum::response::Response {
    let owner = match company_owner(&services, &principal).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let id: ProductId = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let draft = match body.into_draft() {
        Ok(draft) => draft,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.inventory.update_product(owner, id, draft).await {
        Ok(product) => Json(product).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

/// DELETE /api/products/:id
pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let owner = match company_owner(&services, &principal).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let id: ProductId = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match services.inventory.delete_product(owner, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}
