use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use stockdesk_core::DomainError;
use stockdesk_infra::accounts::StoreError;
use stockdesk_infra::companies::CompanyError;
use stockdesk_infra::identity::IdentityError;
use stockdesk_infra::inventory::InventoryError;

pub fn company_error_to_response(err: CompanyError) -> axum::response::Response {
    match err {
        CompanyError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        CompanyError::InvalidRole => json_error(StatusCode::BAD_REQUEST, "invalid_role", err.to_string()),
        CompanyError::Disabled => json_error(StatusCode::FORBIDDEN, "account_disabled", err.to_string()),
        CompanyError::Store(e) => store_error_to_response(e),
    }
}

/// Errors from resolving the calling company. A non-company caller gets 403.
pub fn company_scope_error_to_response(err: CompanyError) -> axum::response::Response {
    match err {
        CompanyError::NotFound | CompanyError::InvalidRole => {
            json_error(StatusCode::FORBIDDEN, "forbidden", "company account required")
        }
        other => company_error_to_response(other),
    }
}

pub fn inventory_error_to_response(err: InventoryError) -> axum::response::Response {
    match err {
        InventoryError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        InventoryError::Duplicate(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        InventoryError::UnknownCategory(_) => {
            json_error(StatusCode::BAD_REQUEST, "unknown_category", err.to_string())
        }
        InventoryError::CategoryInUse(_) => json_error(StatusCode::CONFLICT, "category_in_use", err.to_string()),
        InventoryError::Store(e) => store_error_to_response(e),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", err.to_string()),
        other => json_error(StatusCode::BAD_REQUEST, "validation_error", other.to_string()),
    }
}

pub fn identity_error_to_response(err: IdentityError) -> axum::response::Response {
    match err {
        IdentityError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        IdentityError::UsernameTaken(_) => json_error(StatusCode::CONFLICT, "conflict", err.to_string()),
        IdentityError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", err.to_string())
        }
        IdentityError::AccountDisabled => json_error(StatusCode::FORBIDDEN, "account_disabled", err.to_string()),
        IdentityError::Store(e) => store_error_to_response(e),
        IdentityError::Password(e) => internal_error("password_error", &e),
        IdentityError::Token(e) => internal_error("token_error", &e),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::UsernameTaken(_) | StoreError::Duplicate { .. } => {
            json_error(StatusCode::CONFLICT, "conflict", err.to_string())
        }
        StoreError::Missing(_) => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        other => internal_error("store_error", &other),
    }
}

/// Logs the full error and returns a generic 500 so store details stay server-side.
fn internal_error(code: &'static str, err: &dyn std::error::Error) -> axum::response::Response {
    error!(error = %err, code, "request failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, code, "internal server error")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
