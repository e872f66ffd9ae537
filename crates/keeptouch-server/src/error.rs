//! HTTP error types for the `KeepTouch` server.
//!
//! Maps domain errors from `keeptouch-core` into HTTP responses. Every
//! error produces a JSON body whose `error` field is a human-readable
//! message, plus a machine-readable `kind`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use keeptouch_core::error::LeadError;

/// Application-level error returned from HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Client sent invalid input.
    #[error("{0}")]
    BadRequest(String),
    /// Missing or wrong bearer credential.
    #[error("{0}")]
    Unauthorized(String),
    /// The route exists but not for this method.
    #[error("Method not allowed")]
    MethodNotAllowed,
    /// Internal or configuration failure. The message is shown to clients
    /// as-is, so it must never carry credentials or upstream detail.
    #[error("{0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = ErrorBody {
            error: self.to_string(),
            kind,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<LeadError> for AppError {
    fn from(err: LeadError) -> Self {
        match err {
            LeadError::MissingField { .. } => Self::BadRequest(err.to_string()),
            LeadError::Repository { ref reason } => {
                tracing::error!(reason = %reason, "lead repository failure");
                Self::Internal("Failed to save".to_owned())
            }
        }
    }
}
