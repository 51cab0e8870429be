//! Request extractors with bookshelf error semantics.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

pub const INVALID_JSON_BODY: &str = "invalid JSON body";

/// JSON request body decoded regardless of `Content-Type`.
///
/// Any read or decode failure is rejected with `400 invalid JSON body`.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "failed to read request body");
            AppError::bad_request(INVALID_JSON_BODY)
        })?;

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            tracing::debug!(error = %e, "failed to decode request body");
            AppError::bad_request(INVALID_JSON_BODY)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, response::IntoResponse};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default)]
        name: String,
    }

    async fn extract(body: &'static str) -> Result<Payload, AppError> {
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))
            .unwrap();
        JsonBody::<Payload>::from_request(req, &()).await.map(|b| b.0)
    }

    #[tokio::test]
    async fn decodes_without_content_type() {
        let payload = extract(r#"{"name":"dune"}"#).await.unwrap();
        assert_eq!(payload.name, "dune");
    }

    #[tokio::test]
    async fn missing_fields_fall_back_to_defaults() {
        let payload = extract("{}").await.unwrap();
        assert_eq!(payload.name, "");
    }

    #[tokio::test]
    async fn truncated_json_is_bad_request() {
        let err = extract(r#"{"name":"#).await.unwrap_err();
        assert!(matches!(&err, AppError::BadRequest(m) if m == INVALID_JSON_BODY));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrong_field_type_is_bad_request() {
        let err = extract(r#"{"name":42}"#).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
