//! Request routing, tagging, and the content-type guard

use axum::body::Bytes;
use axum::extract::{Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use snapkv_core::Error;
use snapkv_engine::StoreHandle;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Header carrying the request id on both request and response
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const JSON_MEDIA_TYPE: &str = "application/json";

/// Build the application router
///
/// Methods outside POST, PUT, GET and DELETE get 405 on every path. A
/// supported method that matches no route gets 404.
pub fn router(store: StoreHandle) -> Router {
    Router::new()
        .route(
            "/api/v1/my/keys",
            post(create).delete(delete_all).fallback(not_found),
        )
        .route("/api/v1/my/keys/:key", get(get_key).fallback(not_found))
        .fallback(not_found)
        .layer(middleware::from_fn(tag_request))
        .with_state(store)
}

/// Handler failures mapped onto status codes
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Body was not a non-empty JSON object of strings
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    /// The store could not serve the request
    #[error(transparent)]
    Store(#[from] Error),

    /// The store rejected the operation
    #[error("Operation was not applied")]
    NotApplied,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(Error::Timeout { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) | ApiError::NotApplied => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(target: "snapkv::http", error = %self, status = status.as_u16(), "Request failed");
        } else {
            warn!(target: "snapkv::http", error = %self, status = status.as_u16(), "Request rejected");
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// POST: store the first entry of a JSON object body
async fn create(State(store): State<StoreHandle>, body: Bytes) -> Result<StatusCode, ApiError> {
    let (key, value) = first_entry(&body)?;
    debug!(target: "snapkv::http", key = %key, "Create");
    if store.create(key, value).await? {
        Ok(StatusCode::CREATED)
    } else {
        Err(ApiError::NotApplied)
    }
}

/// GET: exact-key lookup
async fn get_key(
    State(store): State<StoreHandle>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    match store.get(key).await? {
        Some(entry) => Ok((StatusCode::OK, Json(entry)).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

/// DELETE: clear the store
async fn delete_all(State(store): State<StoreHandle>) -> Result<StatusCode, ApiError> {
    if store.delete_all().await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotApplied)
    }
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Parse `{"k": "v", ...}` and take the entry with the smallest key.
fn first_entry(body: &[u8]) -> Result<(String, String), ApiError> {
    let entries: BTreeMap<String, String> =
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    entries
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::BadRequest("object has no entries".to_string()))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|media| media.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
        .unwrap_or(false)
}

fn is_supported_method(method: &Method) -> bool {
    [Method::POST, Method::PUT, Method::GET, Method::DELETE].contains(method)
}

fn request_id_of(headers: &HeaderMap) -> Uuid {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .unwrap_or_else(Uuid::new_v4)
}

/// Tag, guard, and log every request
async fn tag_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = request_id_of(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    info!(target: "snapkv::http", %request_id, %method, path = %path, "Request received");

    let mut response = if !is_json(request.headers()) {
        warn!(target: "snapkv::http", %request_id, "Unsupported media type");
        StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response()
    } else if !is_supported_method(&method) {
        warn!(target: "snapkv::http", %request_id, %method, "Method not allowed");
        StatusCode::METHOD_NOT_ALLOWED.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        headers.insert(REQUEST_ID_HEADER, value);
    }

    info!(
        target: "snapkv::http",
        %request_id,
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_entry_smallest_key() {
        let (key, value) = first_entry(br#"{"b":"2","a":"1"}"#).unwrap();
        assert_eq!(key, "a");
        assert_eq!(value, "1");
    }

    #[test]
    fn test_first_entry_rejects_bad_bodies() {
        assert!(matches!(first_entry(b"{}"), Err(ApiError::BadRequest(_))));
        assert!(matches!(first_entry(b""), Err(ApiError::BadRequest(_))));
        assert!(matches!(first_entry(b"[1,2]"), Err(ApiError::BadRequest(_))));
        assert!(matches!(first_entry(br#"{"k":1}"#), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_is_json() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(is_json(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        assert!(is_json(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!is_json(&headers));
    }

    #[test]
    fn test_supported_methods() {
        for method in [Method::POST, Method::PUT, Method::GET, Method::DELETE] {
            assert!(is_supported_method(&method));
        }
        for method in [Method::PATCH, Method::HEAD, Method::OPTIONS] {
            assert!(!is_supported_method(&method));
        }
    }

    #[test]
    fn test_request_id_echo_or_generate() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(request_id_of(&headers), id);

        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert_ne!(request_id_of(&headers).to_string(), "not-a-uuid");
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Store(Error::StoreClosed).status(), StatusCode::INTERNAL_SERVER_ERROR);
        let timeout = Error::Timeout {
            op: snapkv_core::OperationType::Get,
            after: std::time::Duration::from_millis(5),
        };
        assert_eq!(ApiError::Store(timeout).status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
