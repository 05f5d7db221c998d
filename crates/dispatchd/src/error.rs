//! Daemon-side error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Anything a lifecycle operation can fail with: a domain rejection, or an
/// infrastructure fault the caller cannot fix.
#[derive(Error, Debug)]
pub enum OpError {
    #[error(transparent)]
    Domain(#[from] fleet_core::Error),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// HTTP-facing error carrying the structured `{"error", "message"}` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "bad_request",
            message: message.into(),
        }
    }
}

impl From<OpError> for ApiError {
    fn from(err: OpError) -> Self {
        match err {
            OpError::Domain(domain) => {
                use fleet_core::Error::*;
                let status = match &domain {
                    IllegalTransition { .. } => StatusCode::CONFLICT,
                    Forbidden { .. } => StatusCode::FORBIDDEN,
                    ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    ScheduleConflict { .. } => StatusCode::CONFLICT,
                    NotFound { .. } => StatusCode::NOT_FOUND,
                };
                Self {
                    status,
                    kind: domain.kind(),
                    message: domain.to_string(),
                }
            }
            OpError::Storage(e) => {
                error!("storage error: {}", e);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    kind: "internal",
                    message: "internal storage error".to_string(),
                }
            }
            OpError::Join(e) => {
                error!("blocking task failed: {}", e);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    kind: "internal",
                    message: "internal error".to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.kind,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}
