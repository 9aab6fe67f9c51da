//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: account store, JWT codec and service construction
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses
//! - `extract.rs`: JSON body and path id extraction

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use stockdesk_auth::RoutePolicy;
use stockdesk_infra::config::AppConfig;

use crate::middleware;

pub mod dto;
pub mod extract;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
///
/// Every request, including unknown paths, passes through CORS and then the
/// request gate before reaching a handler.
pub fn build_app(config: &AppConfig, services: AppServices) -> anyhow::Result<Router> {
    let gate = middleware::GateState {
        jwt: services.jwt.clone(),
        policy: Arc::new(RoutePolicy::standard()),
    };
    let cors = middleware::cors_layer(&config.cors_allowed_origin)
        .with_context(|| format!("invalid CORS origin '{}'", config.cors_allowed_origin))?;

    Ok(Router::new()
        .route("/actuator/health", get(routes::system::health))
        .merge(routes::router())
        .fallback(routes::system::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(Extension(Arc::new(services)))
                .layer(axum::middleware::from_fn_with_state(gate, middleware::request_gate)),
        ))
}
