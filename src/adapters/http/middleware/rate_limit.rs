//! Rate limiting middleware for message submission.
//!
//! Enforces a per-client-IP limit using the `RateLimiter` port. Status is
//! returned in standard headers:
//! - `X-RateLimit-Limit`: Maximum requests allowed in the window
//! - `X-RateLimit-Remaining`: Requests remaining in the current window
//! - `X-RateLimit-Reset`: Unix timestamp when the window resets
//! - `Retry-After`: Seconds to wait (only on 429 response)
//!
//! # Example
//!
//! ```ignore
//! let limiter: Arc<dyn RateLimiter> = Arc::new(InMemoryRateLimiter::per_minute(5));
//!
//! let app = Router::new()
//!     .route("/api/messages", post(submit_message))
//!     .route_layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::adapters::http::response::ErrorResponse;
use crate::ports::{RateLimitKey, RateLimitResult, RateLimiter};

/// Rate limiter middleware state.
pub type RateLimiterState = Arc<dyn RateLimiter>;

/// Resource name used in keys for message submission.
pub const SUBMIT_RESOURCE: &str = "submit";

/// Standard rate limit header names.
pub mod headers {
    use super::HeaderName;

    pub static X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
    pub static X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
    pub static X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");
}

/// Per-IP rate limiting for the routes it is layered on.
///
/// Requests whose client IP cannot be determined are let through. Limiter
/// backend errors fail open.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiterState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(client_ip) = extract_client_ip(&request, connect_info.as_ref()) else {
        tracing::debug!("No client IP, skipping rate limit");
        return next.run(request).await;
    };

    let key = RateLimitKey::ip(SUBMIT_RESOURCE, &client_ip);
    let status = match limiter.check(&key).await {
        Ok(RateLimitResult::Allowed(status)) => Some(status),
        Ok(RateLimitResult::Denied(denied)) => {
            tracing::info!(client_ip = %client_ip, "Submit rate limit exceeded");
            return rate_limit_response(denied.limit, denied.retry_after_secs);
        }
        Err(e) => {
            tracing::warn!("Rate limiter unavailable: {}", e);
            None
        }
    };

    let mut response = next.run(request).await;

    if let Some(status) = status {
        let headers = response.headers_mut();
        headers.insert(headers::X_RATELIMIT_LIMIT.clone(), HeaderValue::from(status.limit));
        headers.insert(
            headers::X_RATELIMIT_REMAINING.clone(),
            HeaderValue::from(status.remaining),
        );
        headers.insert(
            headers::X_RATELIMIT_RESET.clone(),
            HeaderValue::from(status.reset_at.as_unix_secs()),
        );
    }

    response
}

/// Extract client IP from request, checking forwarded headers first.
///
/// Order of precedence:
/// 1. X-Forwarded-For header (first IP in list)
/// 2. X-Real-IP header
/// 3. ConnectInfo socket address
fn extract_client_ip<B>(
    request: &axum::http::Request<B>,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> Option<String> {
    if let Some(forwarded) = request
        .headers()
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(first_ip) = forwarded.split(',').next().map(str::trim) {
            if !first_ip.is_empty() {
                return Some(first_ip.to_string());
            }
        }
    }

    if let Some(real_ip) = request
        .headers()
        .get("X-Real-IP")
        .and_then(|h| h.to_str().ok())
    {
        return Some(real_ip.trim().to_string());
    }

    connect_info.map(|ci| ci.0.ip().to_string())
}

/// Create a 429 Too Many Requests response.
fn rate_limit_response(limit: u32, retry_after_secs: u32) -> Response {
    let mut response = ErrorResponse::rate_limited(retry_after_secs)
        .into_response_with(StatusCode::TOO_MANY_REQUESTS);

    let headers = response.headers_mut();
    headers.insert(headers::X_RATELIMIT_LIMIT.clone(), HeaderValue::from(limit));
    headers.insert(headers::X_RATELIMIT_REMAINING.clone(), HeaderValue::from(0u32));
    headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rate_limiter::InMemoryRateLimiter;
    use axum::{body::Body, http::Request, middleware, routing::post, Router};
    use tower::ServiceExt;

    fn app(limit: u32) -> Router {
        let limiter: RateLimiterState = Arc::new(InMemoryRateLimiter::per_minute(limit));
        Router::new()
            .route("/submit", post(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
    }

    fn request_from(ip: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/submit")
            .header("X-Forwarded-For", ip)
            .body(Body::empty())
            .unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // IP Extraction Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn extract_ip_from_x_forwarded_for() {
        let request = Request::builder()
            .uri("/test")
            .header("X-Forwarded-For", "1.2.3.4, 5.6.7.8")
            .body(())
            .unwrap();

        assert_eq!(extract_client_ip(&request, None), Some("1.2.3.4".to_string()));
    }

    #[test]
    fn extract_ip_from_x_real_ip() {
        let request = Request::builder()
            .uri("/test")
            .header("X-Real-IP", "9.8.7.6")
            .body(())
            .unwrap();

        assert_eq!(extract_client_ip(&request, None), Some("9.8.7.6".to_string()));
    }

    #[test]
    fn extract_ip_falls_back_to_connect_info() {
        let request = Request::builder().uri("/test").body(()).unwrap();
        let addr: SocketAddr = "127.0.0.1:4000".parse().unwrap();

        assert_eq!(
            extract_client_ip(&request, Some(&ConnectInfo(addr))),
            Some("127.0.0.1".to_string())
        );
        assert_eq!(extract_client_ip(&request, None), None);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Middleware Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn allowed_request_carries_rate_limit_headers() {
        let response = app(5).oneshot(request_from("1.1.1.1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-limit"], "5");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "4");
    }

    #[tokio::test]
    async fn request_over_limit_gets_429_with_retry_after() {
        let app = app(1);

        let first = app.clone().oneshot(request_from("1.1.1.1")).await.unwrap();
        let second = app.oneshot(request_from("1.1.1.1")).await.unwrap();

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key(header::RETRY_AFTER));
    }

    #[tokio::test]
    async fn limits_are_per_client_ip() {
        let app = app(1);

        app.clone().oneshot(request_from("1.1.1.1")).await.unwrap();
        let other = app.oneshot(request_from("2.2.2.2")).await.unwrap();

        assert_eq!(other.status(), StatusCode::OK);
    }
}
