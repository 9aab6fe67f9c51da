//! Request extractors whose rejections use the API's JSON error shape.

use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use std::str::FromStr;

use axum::response::Response;

use stockdesk_core::DomainError;

use crate::app::errors::{domain_error_to_response, json_error};

/// `axum::Json` with `{"error", "message"}` rejections instead of plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection_response(rejection)),
        }
    }
}

pub fn json_rejection_response(rejection: JsonRejection) -> Response {
    let code = match &rejection {
        JsonRejection::JsonDataError(_) => "validation_error",
        JsonRejection::JsonSyntaxError(_) => "malformed_json",
        JsonRejection::MissingJsonContentType(_) => "unsupported_media_type",
        _ => "bad_request",
    };
    json_error(rejection.status(), code, rejection.body_text())
}

/// Parse a path segment into a typed id; failures become 400 `invalid_id`.
pub fn parse_id<I>(raw: &str) -> Result<I, Response>
where
    I: FromStr<Err = DomainError>,
{
    raw.parse().map_err(domain_error_to_response)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::http::header::CONTENT_TYPE;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Named {
        #[allow(dead_code)]
        name: String,
    }

    async fn extract(content_type: Option<&str>, body: &'static str) -> Result<ApiJson<Named>, Response> {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        let req = builder.body(Body::from(body)).unwrap();
        ApiJson::<Named>::from_request(req, &()).await
    }

    async fn error_code(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["message"].is_string());
        value["error"].as_str().unwrap().to_string()
    }

    #[test]
    fn parse_id_rejects_non_positive_ids() {
        use stockdesk_core::SaleId;

        assert_eq!(parse_id::<SaleId>("7").unwrap(), SaleId::new(7));
        for raw in ["0", "-3", "seven"] {
            assert_eq!(parse_id::<SaleId>(raw).unwrap_err().status(), StatusCode::BAD_REQUEST, "{raw}");
        }
    }

    #[tokio::test]
    async fn accepts_well_formed_bodies() {
        assert!(extract(Some("application/json"), r#"{"name":"acme"}"#).await.is_ok());
    }

    #[tokio::test]
    async fn syntax_errors_are_json() {
        let response = extract(Some("application/json"), "{not json").await.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "malformed_json");
    }

    #[tokio::test]
    async fn missing_fields_are_validation_errors() {
        let response = extract(Some("application/json"), r#"{"other":1}"#).await.unwrap_err();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(response).await, "validation_error");
    }

    #[tokio::test]
    async fn wrong_content_type_is_reported() {
        let response = extract(None, r#"{"name":"acme"}"#).await.unwrap_err();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(error_code(response).await, "unsupported_media_type");
    }
}
