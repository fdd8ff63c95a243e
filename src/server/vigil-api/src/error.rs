//! API error types.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Errors returned by API handlers.
///
/// Every variant aborts the request. None of them is ever turned into a
/// negative policy verdict.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The payload carried a value of the wrong type, e.g. a numeric
    /// `password`. This is a caller bug, not a weak password.
    #[error("invalid input type: {0}")]
    InvalidInputType(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The body could not be read as JSON.
    #[error("{message}")]
    MalformedRequest {
        /// Status chosen by the extractor (400, 415, 422).
        status: StatusCode,
        /// Extractor message.
        message: String,
    },
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error.
    pub error: String,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInputType(_) => StatusCode::BAD_REQUEST,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::MalformedRequest { status, .. } => *status,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = status.as_u16(), error = %self, "request rejected");

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
