//! Input validation for request payloads.
//!
//! All user input is validated before any handler logic runs. Request types
//! implement [`Validate`] declaratively and are extracted through
//! [`ValidatedJson`], so a handler never sees a payload that failed its
//! checks.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::validation::{Validate, ValidationError, validate_length};
//!
//! struct CreateUser {
//!     username: String,
//!     secret: String,
//! }
//!
//! impl Validate for CreateUser {
//!     fn validate(&self) -> Result<(), ValidationError> {
//!         validate_username(&self.username)?;
//!         validate_length(&self.secret, 8, 128, "secret")?;
//!         Ok(())
//!     }
//! }
//! ```

use std::fmt;

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::AppError;

// ============================================================================
// Validation Errors
// ============================================================================

/// Validation error with field context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Field that failed validation (if applicable)
    pub field: Option<String>,
    /// Error code for programmatic handling
    pub code: ValidationErrorCode,
    /// Human-readable message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(code: ValidationErrorCode, message: impl Into<String>) -> Self {
        Self {
            field: None,
            code,
            message: message.into(),
        }
    }

    /// Create a validation error for a specific field.
    pub fn for_field(
        field: impl Into<String>,
        code: ValidationErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: Some(field.into()),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validation error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// Value is required but missing/empty
    Required,
    /// Value is too short
    TooShort,
    /// Value is too long
    TooLong,
    /// Value contains invalid characters
    InvalidCharacters,
}

impl fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::TooShort => write!(f, "too_short"),
            Self::TooLong => write!(f, "too_long"),
            Self::InvalidCharacters => write!(f, "invalid_characters"),
        }
    }
}

/// Trait for validatable request types.
pub trait Validate {
    /// Validate the instance, returning an error if invalid.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Check if the instance is valid (convenience method).
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

// ============================================================================
// String Validators
// ============================================================================

/// Validate that a string is not empty after trimming.
pub fn validate_required(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::for_field(
            field,
            ValidationErrorCode::Required,
            "Field is required",
        ));
    }
    Ok(())
}

/// Validate string length bounds.
pub fn validate_length(
    value: &str,
    min: usize,
    max: usize,
    field: &str,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::for_field(
            field,
            ValidationErrorCode::TooShort,
            format!("Must be at least {} characters", min),
        ));
    }
    if len > max {
        return Err(ValidationError::for_field(
            field,
            ValidationErrorCode::TooLong,
            format!("Must be at most {} characters", max),
        ));
    }
    Ok(())
}

/// Validate a username: required, 3-64 chars after trimming, restricted to
/// letters, digits, underscores, dots, and hyphens.
pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    validate_required(trimmed, "username")?;
    validate_length(trimmed, 3, 64, "username")?;
    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == '-')
    {
        return Err(ValidationError::for_field(
            "username",
            ValidationErrorCode::InvalidCharacters,
            "Only letters, numbers, underscores, dots, and hyphens allowed",
        ));
    }
    Ok(())
}

// ============================================================================
// Axum Extractor
// ============================================================================

/// Validated JSON extractor.
///
/// Deserializes the JSON body and runs [`Validate::validate`] before the
/// handler executes. Invalid payloads are rejected with a 400 response.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "JSON parsing failed");
            AppError::validation("Failed to parse JSON body")
        })?;

        value.validate().map_err(|error| {
            tracing::debug!(
                field = ?error.field,
                code = %error.code,
                message = %error.message,
                "Validation failed"
            );
            AppError::from(error)
        })?;

        Ok(ValidatedJson(value))
    }
}

// ============================================================================
// Tests
// ============================================================================
