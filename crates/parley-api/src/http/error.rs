//! Application error type mapping to HTTP status codes.
//!
//! Bodies are plain text. Template failures are the caller's fault
//! (bad persona input) and carry their detail; upstream failures map to
//! a generic 502 -- the original error is logged, never leaked to the
//! client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use parley_types::error::ChatError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// A failed chat exchange.
    Chat(ChatError),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Chat(ChatError::Template(e)) => {
                (StatusCode::BAD_REQUEST, format!("invalid persona: {e}"))
            }
            AppError::Chat(ChatError::Upstream(e)) => {
                error!(error = %e, "upstream completion call failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "completion service unavailable".to_string(),
                )
            }
            AppError::Chat(ChatError::EmptyResponse) => {
                error!("upstream returned an empty completion");
                (
                    StatusCode::BAD_GATEWAY,
                    "completion service returned no content".to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}
