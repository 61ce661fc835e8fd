//! # API Error Types
//!
//! What clients see when a request fails.
//!
//! ## Outcome Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CatalogError::kind()          HTTP     message                        │
//! │  ─────────────────────         ────     ─────────────────────────────  │
//! │  NotFound                      404      "Book not found."              │
//! │  Conflict (AlreadyReserved)    409      "Book is already reserved."    │
//! │  Conflict (NotReserved)        409      "Book is not reserved."        │
//! │  ValidationFailed              400      "Validation failed."           │
//! │  StorageFailure                500      generic, details only logged   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! ```json
//! {
//!   "statusCode": 409,
//!   "code": "CONFLICT",
//!   "message": "Book is already reserved.",
//!   "detail": "Book 1 is already reserved",
//!   "traceId": "5f0c..."
//! }
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use shelf_core::{CoreError, ValidationError};
use shelf_db::{CatalogError, Outcome};

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Request conflicts with the book's current state (409)
    Conflict,

    /// Input validation failed (400)
    ValidationError,

    /// Request could not be parsed (400)
    BadRequest,

    /// Storage or other internal failure (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ValidationError | ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error returned from handlers.
#[derive(Debug, Clone, thiserror::Error)]
#[error("[{code:?}] {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub detail: Option<String>,
}

/// Error envelope as written to the response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub status_code: u16,
    pub code: ErrorCode,
    pub message: String,
    pub detail: Option<String>,
    pub trace_id: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            detail: None,
        }
    }

    /// Attaches a detail string.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    /// Creates a bad request error.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BadRequest, "Invalid request.").with_detail(detail)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

/// Converts catalog errors to API errors.
impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let detail = err.to_string();
        match (err.kind(), &err) {
            (Outcome::NotFound, _) => ApiError::not_found("Book not found.").with_detail(detail),
            (Outcome::Conflict, CatalogError::Core(CoreError::AlreadyReserved { .. })) => {
                ApiError::new(ErrorCode::Conflict, "Book is already reserved.").with_detail(detail)
            }
            (Outcome::Conflict, CatalogError::Core(CoreError::NotReserved { .. })) => {
                ApiError::new(ErrorCode::Conflict, "Book is not reserved.").with_detail(detail)
            }
            (Outcome::Conflict, _) => ApiError::new(
                ErrorCode::Conflict,
                "Reservation state can only change through reserve or unreserve.",
            )
            .with_detail(detail),
            (Outcome::ValidationFailed, _) => {
                ApiError::new(ErrorCode::ValidationError, "Validation failed.").with_detail(detail)
            }
            (Outcome::StorageFailure, _) => {
                // Log the actual error but return a generic message
                tracing::error!(error = %detail, "Storage failure");
                let error = ApiError::new(ErrorCode::Internal, "An internal server error occurred.");
                if cfg!(debug_assertions) {
                    error.with_detail(detail)
                } else {
                    error
                }
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::new(ErrorCode::ValidationError, "Validation failed.").with_detail(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let trace_id = Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(%trace_id, code = ?self.code, message = %self.message, "Request failed");
        } else {
            tracing::warn!(%trace_id, code = ?self.code, status = status.as_u16(), "Request rejected");
        }

        let body = ApiErrorResponse {
            status_code: status.as_u16(),
            code: self.code,
            message: self.message,
            detail: self.detail,
            trace_id,
        };

        (status, Json(body)).into_response()
    }
}
