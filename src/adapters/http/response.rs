//! Response envelope shared by every REST endpoint.
//!
//! Success: `{"status": "success", "data": ...}`
//! Error:   `{"status": "error", "error": {"code", "message", "details"?}}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ErrorCode;

/// Successful response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSuccess<T> {
    pub status: String,
    pub data: T,
}

impl<T: Serialize> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data,
        }
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Error details inside the envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn prohibited_content(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProhibitedContent, message)
    }

    pub fn duplicate_id() -> Self {
        Self::new(ErrorCode::DuplicateId, "The message_id already exists")
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFormat, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::Unauthorized, "Could not validate API Key")
    }

    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::new(ErrorCode::RateLimited, "Rate limit exceeded")
            .with_details(serde_json::json!({ "retry_after_secs": retry_after_secs }))
    }

    pub fn internal() -> Self {
        Self::new(ErrorCode::InternalError, "An unexpected error occurred.")
    }

    /// Wraps the error in the envelope and pairs it with a status code.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(ErrorEnvelope::new(self))).into_response()
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub status: String,
    pub error: ErrorResponse,
}

impl ErrorEnvelope {
    pub fn new(error: ErrorResponse) -> Self {
        Self {
            status: "error".to_string(),
            error,
        }
    }
}
