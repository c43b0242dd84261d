//! HTTP handlers for message endpoints.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Response,
    Json,
};

use crate::adapters::http::response::{ApiSuccess, ErrorResponse};
use crate::application::{SessionGateway, SubmitMessageCommand};
use crate::domain::foundation::{SessionId, ValidationError};
use crate::domain::message::MessageError;

use super::dto::{SearchParams, SessionMessagesParams, SubmitMessageRequest};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct MessageHandlers {
    gateway: Arc<SessionGateway>,
}

impl MessageHandlers {
    pub fn new(gateway: Arc<SessionGateway>) -> Self {
        Self { gateway }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/messages - Submit a message
pub async fn submit_message(
    State(handlers): State<MessageHandlers>,
    payload: Result<Json<SubmitMessageRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => return handle_rejection(rejection.body_text()),
    };

    let cmd = match SubmitMessageCommand::try_from(req) {
        Ok(cmd) => cmd,
        Err(e) => return handle_validation_error(e),
    };

    match handlers.gateway.submit_message(cmd).await {
        Ok(view) => ApiSuccess::new(view).into_response_with(StatusCode::CREATED),
        Err(e) => handle_message_error(e),
    }
}

/// GET /api/messages/session/:session_id - List a session's messages
pub async fn get_session_messages(
    State(handlers): State<MessageHandlers>,
    Path(session_id): Path<String>,
    params: Result<Query<SessionMessagesParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return handle_rejection(rejection.body_text()),
    };

    let query = match session_id
        .parse::<SessionId>()
        .and_then(|id| params.into_query(id))
    {
        Ok(query) => query,
        Err(e) => return handle_validation_error(e),
    };

    match handlers.gateway.get_messages(query).await {
        Ok(views) => ApiSuccess::new(views).into_response_with(StatusCode::OK),
        Err(e) => handle_message_error(e),
    }
}

/// GET /api/messages/search - Search message content
pub async fn search_messages(
    State(handlers): State<MessageHandlers>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return handle_rejection(rejection.body_text()),
    };

    match handlers.gateway.search_messages(params.into()).await {
        Ok(views) => ApiSuccess::new(views).into_response_with(StatusCode::OK),
        Err(e) => handle_message_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error mapping
// ════════════════════════════════════════════════════════════════════════════

fn handle_rejection(reason: String) -> Response {
    ErrorResponse::invalid_format("Invalid message format")
        .with_details(serde_json::json!({ "reason": reason }))
        .into_response_with(StatusCode::UNPROCESSABLE_ENTITY)
}

fn handle_validation_error(error: ValidationError) -> Response {
    handle_message_error(MessageError::from(error))
}

fn handle_message_error(error: MessageError) -> Response {
    match error {
        MessageError::ProhibitedContent => ErrorResponse::prohibited_content(error.message())
            .into_response_with(StatusCode::BAD_REQUEST),
        MessageError::DuplicateId(_) => {
            ErrorResponse::duplicate_id().into_response_with(StatusCode::BAD_REQUEST)
        }
        MessageError::InvalidQuery { field, message } => ErrorResponse::invalid_format(message)
            .with_details(serde_json::json!({ "field": field }))
            .into_response_with(StatusCode::UNPROCESSABLE_ENTITY),
        // Already logged by the application layer; details stay server-side
        MessageError::Storage(_) => {
            ErrorResponse::internal().into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
