//! HTTP handler for `/process-url`.

use axum::{routing::post, Json, Router};
use bookshelf_http::{
    error::{AppError, AppResult},
    extract::JsonBody,
};
use serde::{Deserialize, Serialize};

use super::normalizer::{normalize, Operation, ParsedUrl};
use crate::utils;

pub const URL_REQUIRED: &str = "`url` is required";
pub const OPERATION_REQUIRED: &str = "`operation` is required";
pub const OPERATION_UNSUPPORTED: &str = "`operation` must be one of: canonical, redirection, all";
pub const INVALID_URL: &str = "invalid URL (must include scheme and host)";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessUrlRequest {
    pub url: String,
    pub operation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessUrlResponse {
    pub processed_url: String,
}

pub fn router() -> Router {
    let prefix = utils::log_prefix("urls");
    tracing::debug!(target: "bookshelf.routes", %prefix, "registering url routes");

    Router::new().route("/process-url", post(process_url))
}

async fn process_url(
    JsonBody(request): JsonBody<ProcessUrlRequest>,
) -> AppResult<Json<ProcessUrlResponse>> {
    let response = process_request(&request)?;
    tracing::debug!(
        operation = %request.operation.trim(),
        processed_url = %response.processed_url,
        "url processed"
    );
    Ok(Json(response))
}

/// Validate a request and run the normalizer; shared by the HTTP handler and the CLI.
pub fn process_request(request: &ProcessUrlRequest) -> AppResult<ProcessUrlResponse> {
    let url = request.url.trim();
    let operation = request.operation.trim();

    if url.is_empty() {
        return Err(AppError::bad_request(URL_REQUIRED));
    }
    if operation.is_empty() {
        return Err(AppError::bad_request(OPERATION_REQUIRED));
    }
    let operation: Operation = operation
        .parse()
        .map_err(|_| AppError::bad_request(OPERATION_UNSUPPORTED))?;

    let parsed = ParsedUrl::parse(url).map_err(|e| {
        tracing::debug!(error = %e, "rejected url");
        AppError::bad_request(INVALID_URL)
    })?;

    Ok(ProcessUrlResponse {
        processed_url: normalize(&parsed, operation),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use bookshelf_http::error::ErrorBody;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn post_json(body: &'static str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri("/process-url")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn processes_known_operations() {
        let cases = [
            (
                r#"{"url":"https://BYFOOD.com/food-EXPeriences?query=abc/","operation":"all"}"#,
                "https://www.byfood.com/food-experiences",
            ),
            (
                r#"{"url":"https://BYFOOD.com/food-EXPeriences?query=abc/","operation":"canonical"}"#,
                "https://BYFOOD.com/food-EXPeriences",
            ),
            (
                r#"{"url":"https://BYFOOD.com/food-EXPeriences?query=ABC/","operation":"redirection"}"#,
                "https://www.byfood.com/food-experiences?query=abc/",
            ),
            (
                r#"{"url":"  https://a.com/x/  ","operation":" canonical "}"#,
                "https://a.com/x",
            ),
            (
                r#"{"url":"https://a.com/A B/","operation":"all"}"#,
                "https://www.byfood.com/a%20b",
            ),
        ];

        for (body, want) in cases {
            let (status, bytes) = post_json(body).await;
            assert_eq!(status, StatusCode::OK, "body: {}", body);
            let response: ProcessUrlResponse = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(response.processed_url, want);
        }
    }

    #[tokio::test]
    async fn rejects_bad_requests() {
        let cases = [
            (r#"{"url":"#, "invalid JSON body"),
            (r#"{"url":1,"operation":"all"}"#, "invalid JSON body"),
            (r#"{"operation":"all"}"#, URL_REQUIRED),
            (r#"{"url":"   ","operation":"all"}"#, URL_REQUIRED),
            (r#"{"url":"https://byfood.com/x"}"#, OPERATION_REQUIRED),
            (r#"{"url":"https://byfood.com/x","operation":"nope"}"#, OPERATION_UNSUPPORTED),
            (r#"{"url":"not a url","operation":"all"}"#, INVALID_URL),
            (r#"{"url":"byfood.com/abc","operation":"all"}"#, INVALID_URL),
            (r#"{"url":"https://","operation":"all"}"#, INVALID_URL),
            (r#"{"url":"https://a.com:abc/x","operation":"all"}"#, INVALID_URL),
            (r#"{"url":"https://a.com/%zz","operation":"canonical"}"#, INVALID_URL),
            (r#"{"url":"https://a{b}.com/","operation":"redirection"}"#, INVALID_URL),
        ];

        for (body, want) in cases {
            let (status, bytes) = post_json(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            let error: ErrorBody = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(error.error, want, "body: {}", body);
        }
    }

    #[test]
    fn operation_is_checked_before_url() {
        let request = ProcessUrlRequest {
            url: "not a url".to_string(),
            operation: "nope".to_string(),
        };
        let err = process_request(&request).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == OPERATION_UNSUPPORTED));
    }
}
