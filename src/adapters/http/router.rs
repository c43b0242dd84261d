//! Top-level router assembly.
//!
//! ```text
//! GET  /                              banner            (public)
//! GET  /health                        liveness          (public)
//! GET  /api/ws/:session_id            observer socket   (public)
//! POST /api/messages                  submit            (API key, rate limited)
//! GET  /api/messages/session/:id      list by session   (API key)
//! GET  /api/messages/search           keyword search    (API key)
//! ```

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::adapters::websocket::{websocket_router, WebSocketState};
use crate::application::SessionGateway;

use super::message::{message_routes, MessageHandlers};
use super::middleware::{api_key_middleware, ApiKey, RateLimiterState};
use super::response::ErrorResponse;

/// Cross-cutting settings for the HTTP surface.
#[derive(Clone)]
pub struct HttpSettings {
    pub api_key: ApiKey,
    /// `None` disables submit rate limiting.
    pub submit_limiter: Option<RateLimiterState>,
    pub request_timeout: Duration,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
}

/// Builds the complete application router.
pub fn build_router(gateway: Arc<SessionGateway>, settings: HttpSettings) -> Router {
    let api = Router::new()
        .nest(
            "/api/messages",
            message_routes(MessageHandlers::new(gateway.clone()), settings.submit_limiter),
        )
        .layer(middleware::from_fn_with_state(
            settings.api_key,
            api_key_middleware,
        ))
        .layer(TimeoutLayer::new(settings.request_timeout));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api)
        .merge(websocket_router(WebSocketState::new(gateway)))
        .layer(cors_layer(&settings.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Message relay is running" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(AnyOrigin).allow_headers(AnyOrigin);
    if origins.is_empty() {
        return layer.allow_origin(AnyOrigin);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", detail);

    ErrorResponse::internal().into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
}
