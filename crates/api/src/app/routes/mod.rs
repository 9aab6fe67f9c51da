use axum::{response::Response, routing::get, Router};

use stockdesk_core::UserId;

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub mod admin;
pub mod auth;
pub mod categories;
pub mod companies;
pub mod products;
pub mod purchases;
pub mod sales;
pub mod system;

/// Router for every `/api` endpoint. Access rules are applied by the request
/// gate, not here.
pub fn router() -> Router {
    Router::new()
        .route("/api/whoami", get(system::whoami))
        .nest("/api/auth", auth::router())
        .nest("/api/companies", companies::router())
        .nest("/api/admin", admin::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(purchases::router())
        .merge(sales::router())
}

/// The company whose inventory the caller may touch: the caller's own,
/// provided it is still active.
pub(crate) async fn company_owner(services: &AppServices, principal: &PrincipalContext) -> Result<UserId, Response> {
    services
        .companies
        .active_company(principal.username())
        .await
        .map_err(errors::company_scope_error_to_response)
}
