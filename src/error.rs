//! Error handling for the identity backend.
//!
//! Every failure in the crate is mapped exactly once to a caller-visible
//! response and logged once at the boundary. Authentication failures and
//! infrastructure failures deliberately collapse to generic messages on the
//! wire: the internal kind is retained for diagnostics only.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::error::AppError;
//!
//! async fn handler() -> Result<String, AppError> {
//!     let record = directory.find_by_id(&id).await?;
//!     Ok(record.username)
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

// ============================================================================
// Error Kinds
// ============================================================================

/// Error categories with their HTTP status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input (400)
    Validation,
    /// Missing, invalid, or expired credential; failed proof of secret (401)
    Auth,
    /// No such record (404)
    NotFound,
    /// Duplicate unique key (409)
    Conflict,
    /// Storage or crypto subsystem failure (500)
    Infrastructure,
}

impl ErrorKind {
    /// HTTP status code for this kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Auth => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the caller may see the specific message for this kind.
    ///
    /// Auth and infrastructure failures always collapse to a generic body so
    /// the response does not reveal which internal check failed.
    pub fn expose_message(&self) -> bool {
        matches!(self, Self::Validation | Self::NotFound | Self::Conflict)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation_error"),
            Self::Auth => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Infrastructure => write!(f, "internal_error"),
        }
    }
}

// ============================================================================
// AppError
// ============================================================================

/// Application error carried through handlers to the response boundary.
#[derive(Debug)]
pub struct AppError {
    /// Category; determines status code and exposure.
    pub kind: ErrorKind,
    /// Message; shown to the caller only when the kind allows it.
    pub message: String,
    /// Internal details, logged but never sent to the caller.
    pub details: Option<String>,
}

impl AppError {
    /// Create an error with an explicit kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Missing or malformed input (400).
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Generic authorization denial (401).
    ///
    /// The message is for logs; the wire body is always the same.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    /// No such record (404).
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Duplicate unique key (409).
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Storage or crypto failure (500). The source is logged, not exposed.
    pub fn infrastructure(message: impl Into<String>, source: impl fmt::Display) -> Self {
        Self {
            kind: ErrorKind::Infrastructure,
            message: message.into(),
            details: Some(source.to_string()),
        }
    }

    /// Attach internal details (logged but not exposed).
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn log(&self) {
        let details = self.details.as_deref().unwrap_or("none");
        match self.kind {
            ErrorKind::Infrastructure => {
                tracing::error!(
                    error_kind = %self.kind,
                    message = %self.message,
                    details = %details,
                    "Infrastructure error"
                );
            }
            ErrorKind::Auth => {
                tracing::warn!(
                    error_kind = %self.kind,
                    message = %self.message,
                    "Authorization denied"
                );
            }
            _ => {
                tracing::debug!(
                    error_kind = %self.kind,
                    message = %self.message,
                    "Client error"
                );
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for AppError {}

// ============================================================================
// Response mapping
// ============================================================================

/// JSON error body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ErrorResponse {
    /// Error code (kind)
    pub error: String,
    /// Human-readable message
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.kind.status_code();
        let message = if self.kind.expose_message() {
            self.message
        } else {
            match self.kind {
                ErrorKind::Auth => "Unauthorized".to_string(),
                _ => "An internal error occurred".to_string(),
            }
        };

        let body = ErrorResponse {
            error: self.kind.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<crate::validation::ValidationError> for AppError {
    fn from(err: crate::validation::ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<crate::password::VaultError> for AppError {
    fn from(err: crate::password::VaultError) -> Self {
        AppError::infrastructure("Password hashing failed", err)
    }
}

impl From<crate::token::IssueError> for AppError {
    fn from(err: crate::token::IssueError) -> Self {
        AppError::infrastructure("Credential issuance failed", err)
    }
}

impl From<crate::token::TokenRejection> for AppError {
    fn from(rejection: crate::token::TokenRejection) -> Self {
        // Every rejection kind collapses to the same outward denial; the
        // kind survives only in the log line.
        AppError::unauthorized(format!("credential rejected: {}", rejection.kind_str()))
    }
}

impl From<crate::directory::DirectoryError> for AppError {
    fn from(err: crate::directory::DirectoryError) -> Self {
        use crate::directory::DirectoryError;
        match err {
            DirectoryError::Conflict { ref username } => {
                AppError::conflict(format!("Username '{}' is already registered", username))
            }
            DirectoryError::NotFound => AppError::not_found("User not found"),
            DirectoryError::Unavailable(source) => {
                AppError::infrastructure("User store unavailable", source)
            }
        }
    }
}

/// Result type alias for handlers returning AppError.
pub type Result<T> = std::result::Result<T, AppError>;

// ============================================================================
// Tests
// ============================================================================
