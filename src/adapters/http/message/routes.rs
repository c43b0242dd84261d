//! HTTP routes for message endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::adapters::http::middleware::{rate_limit_middleware, RateLimiterState};

use super::handlers::{get_session_messages, search_messages, submit_message, MessageHandlers};

/// Creates the message router, mounted at `/api/messages`.
///
/// When `submit_limiter` is set, only the submit route is rate limited.
pub fn message_routes(handlers: MessageHandlers, submit_limiter: Option<RateLimiterState>) -> Router {
    let mut submit = Router::new().route("/", post(submit_message));
    if let Some(limiter) = submit_limiter {
        submit = submit.route_layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
    }

    Router::new()
        .route("/session/:session_id", get(get_session_messages))
        .route("/search", get(search_messages))
        .merge(submit)
        .with_state(handlers)
}
