//! Error types for web handlers.
//!
//! Bridges the domain error taxonomy to HTTP responses via Axum's
//! `IntoResponse`. Classification follows the retry semantics of each
//! failure: rejections map to 4xx, transient faults to 5xx so the webhook
//! sender knows a retry may help.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use roomledger_core::ConfirmationError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// Wraps domain errors with an HTTP status, a stable machine-readable code,
/// and a user-facing message. End users only ever see generic text; the
/// diagnostic detail goes to the structured log, not the response body.
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attach a source error for logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), "CONFLICT".to_string())
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message.into(),
            "SERVICE_UNAVAILABLE".to_string(),
        )
    }

    /// The HTTP status this error renders as.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Map domain failures to HTTP semantics for the client callback path.
///
/// The webhook path does NOT use this mapping wholesale: most rejections
/// there are acknowledged with 200 so the gateway stops redelivering. See
/// `handlers::webhook`.
impl From<ConfirmationError> for AppError {
    fn from(err: ConfirmationError) -> Self {
        match &err {
            ConfirmationError::Authentication => {
                Self::bad_request("payment verification failed, contact support")
            }
            ConfirmationError::BookingNotFound { booking_id } => {
                Self::not_found("Booking", booking_id)
            }
            ConfirmationError::RoomNotFound { room_id, .. } => Self::not_found("Room", room_id),
            ConfirmationError::InvalidState { .. } => {
                Self::conflict("booking is not awaiting confirmation").with_source(err.into())
            }
            ConfirmationError::InventoryExhausted { .. } => {
                Self::conflict("no rooms available for this booking").with_source(err.into())
            }
            ConfirmationError::Transient { .. } => {
                Self::unavailable("confirmation could not be completed, please retry")
                    .with_source(err.into())
            }
            ConfirmationError::Configuration(_) | ConfirmationError::Store(_) => {
                Self::internal("An internal error occurred").with_source(err.into())
            }
        }
    }
}
