//! Company categories.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use stockdesk_core::CategoryId;

use super::company_owner;
use crate::app::dto::CategoryRequest;
use crate::app::extract::{parse_id, ApiJson};
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/api/categories", get(list).post(create))
        .route("/api/categories/:id", put(update).delete(delete))
}

/// GET /api/categories
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let owner = match company_owner(&services, &principal).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    match services.inventory.list_categories(owner).await {
        Ok(categories) => Json(categories).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

/// POST /api/categories
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> axum::response::Response {
    let owner = match company_owner(&services, &principal).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let draft = match body.into_draft() {
        Ok(draft) => draft,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.inventory.create_category(owner, draft).await {
        Ok(category) => (StatusCode::CREATED, Json(category)).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

/// PUT /api/categories/:id
pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> axum::response::Response {
    let owner = match company_owner(&services, &principal).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let id: CategoryId = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let draft = match body.into_draft() {
        Ok(draft) => draft,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.inventory.update_category(owner, id, draft).await {
        Ok(category) => Json(category).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

/// DELETE /api/categories/:id
pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let owner = match company_owner(&services, &principal).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let id: CategoryId = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match services.inventory.delete_category(owner, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}
