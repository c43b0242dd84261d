//! API key authentication middleware.
//!
//! REST routes require the shared key in the `X-API-Key` header. A missing or
//! wrong key yields 403 with the `UNAUTHORIZED` envelope. The observer
//! WebSocket route is mounted outside this layer.
//!
//! ```text
//! Request → api_key_middleware → Handler
//!              │
//!              └─ 403 {"status":"error","error":{"code":"UNAUTHORIZED",...}}
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::adapters::http::response::ErrorResponse;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// The expected API key. Never logged or displayed.
#[derive(Clone)]
pub struct ApiKey(Arc<SecretString>);

impl ApiKey {
    pub fn new(key: SecretString) -> Self {
        Self(Arc::new(key))
    }

    /// Constant-time comparison against a presented key.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0
            .expose_secret()
            .as_bytes()
            .ct_eq(candidate.as_bytes())
            .into()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Rejects requests whose `X-API-Key` header does not match.
pub async fn api_key_middleware(
    State(api_key): State<ApiKey>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    match presented {
        Some(key) if api_key.matches(key) => next.run(request).await,
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "Rejected request with invalid API key");
            ErrorResponse::unauthorized().into_response_with(StatusCode::FORBIDDEN)
        }
        None => {
            tracing::debug!(path = %request.uri().path(), "Rejected request without API key");
            ErrorResponse::unauthorized().into_response_with(StatusCode::FORBIDDEN)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn key(value: &str) -> ApiKey {
        ApiKey::new(SecretString::new(value.to_string()))
    }

    fn app() -> Router {
        Router::new()
            .route("/protected", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(
                key("test-key-123"),
                api_key_middleware,
            ))
    }

    #[test]
    fn matches_only_exact_key() {
        let api_key = key("secret");
        assert!(api_key.matches("secret"));
        assert!(!api_key.matches("secret "));
        assert!(!api_key.matches("secre"));
        assert!(!api_key.matches(""));
    }

    #[test]
    fn debug_does_not_leak_key() {
        assert!(!format!("{:?}", key("secret")).contains("secret"));
    }

    #[tokio::test]
    async fn valid_key_passes_through() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(API_KEY_HEADER, "test-key-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_key_is_forbidden() {
        let response = app()
            .oneshot(Request::builder().uri("/protected").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn wrong_key_is_forbidden() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(API_KEY_HEADER, "nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
