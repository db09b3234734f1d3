//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Services never recover from these; they are returned immediately and the
/// HTTP layer maps each variant to a status code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Any other storage failure (query error, decode of a row, I/O).
    ///
    /// Returns HTTP 500; details are logged, not sent to the client.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Storage handle was never initialized or has been closed.
    ///
    /// Returns HTTP 503 Service Unavailable.
    #[error("Database connection is not established")]
    ConnectionUnavailable,

    /// No live (non-deleted) profile with the requested id.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Profile not found")]
    ProfileNotFound,

    /// A search map used a key outside the searchable column allow-list.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Unknown search field: {0}")]
    InvalidField(String),

    /// Malformed merge patch, codec failure, or a search value of the wrong type.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl AppError {
    /// Shorthand for wrapping any displayable codec error.
    pub fn decode(err: impl std::fmt::Display) -> Self {
        AppError::Decode(err.to_string())
    }
}

/// Request bodies that axum's `Json` extractor refuses (bad syntax, wrong
/// shape, missing content type) are reported like any other decode failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Decode(rejection.body_text())
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `ProfileNotFound` → 404 Not Found
/// - `InvalidField` → 400 Bad Request
/// - `Decode` → 400 Bad Request
/// - `ConnectionUnavailable` → 503 Service Unavailable
/// - `Database` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::ProfileNotFound => {
                (StatusCode::NOT_FOUND, "profile_not_found", self.to_string())
            }
            AppError::InvalidField(_) => (StatusCode::BAD_REQUEST, "invalid_field", self.to_string()),
            AppError::Decode(ref msg) => (StatusCode::BAD_REQUEST, "decode_error", msg.clone()),
            AppError::ConnectionUnavailable => {
                tracing::error!("request rejected: {}", self);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "connection_unavailable",
                    self.to_string(),
                )
            }
            AppError::Database(ref err) => {
                tracing::error!(error = %err, "database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
