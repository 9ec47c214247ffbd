//! Account operations: registration, login, password change.
//!
//! These handlers tie the user directory, the password vault, and the
//! credential issuer together. Registration and login are the public entry
//! points; the password change runs behind the gate and requires proof of
//! the current secret before anything is written.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::directory::{NewUser, Role};
use crate::error::AppError;
use crate::gate::AuthContext;
use crate::observability::SecurityEvent;
use crate::routes::AppState;
use crate::security_event;
use crate::users::UserResponse;
use crate::validation::{validate_required, validate_username, Validate, ValidatedJson, ValidationError};

// ============================================================================
// Registration
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub display_name: String,
    pub secret: String,
    pub role: Option<Role>,
    pub linked_employee_ref: Option<String>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)?;
        validate_required(&self.display_name, "display_name")?;
        validate_required(&self.secret, "secret")?;
        Ok(())
    }
}

/// Register a new user account.
///
/// The username must be unused; the secret must satisfy the length policy
/// before it is hashed. The response never contains the hash.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    // Secret policy (minimum 8 chars) is enforced before hashing
    state.secret_policy.validate(&input.secret)?;

    let username = input.username.trim().to_string();
    if state.directory.find_by_username(&username).await?.is_some() {
        return Err(AppError::conflict(format!(
            "Username '{}' is already registered",
            username
        )));
    }

    let password_hash = state.vault.hash(&input.secret).await?;

    let record = state
        .directory
        .create(NewUser {
            username,
            display_name: input.display_name,
            password_hash,
            role: input.role.unwrap_or(state.config.default_role),
            linked_employee_ref: input.linked_employee_ref,
        })
        .await?;

    security_event!(
        SecurityEvent::UserRegistered,
        user_id = %record.id,
        username = %record.username,
        role = %record.role,
        "New user registered"
    );

    Ok((StatusCode::CREATED, Json(UserResponse::from(record))))
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub secret: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_required(&self.username, "username")?;
        validate_required(&self.secret, "secret")?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Signed bearer credential
    pub token: String,
    /// Validity window in seconds
    pub expires_in: u64,
}

/// Authenticate a user and issue a credential.
///
/// An unknown username and a wrong secret produce the same denial; neither
/// reveals which check failed.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let record = match state
        .directory
        .find_by_username(input.username.trim())
        .await?
    {
        Some(record) => record,
        None => {
            security_event!(
                SecurityEvent::AuthenticationFailure,
                username = %input.username,
                "Authentication failed"
            );
            return Err(AppError::unauthorized("invalid username or secret"));
        }
    };

    if !state
        .vault
        .verify(&input.secret, &record.password_hash)
        .await?
    {
        security_event!(
            SecurityEvent::AuthenticationFailure,
            username = %input.username,
            "Authentication failed"
        );
        return Err(AppError::unauthorized("invalid username or secret"));
    }

    let token = state.issuer.issue(&record.id)?;

    security_event!(
        SecurityEvent::AuthenticationSuccess,
        user_id = %record.id,
        username = %record.username,
        "User authenticated"
    );
    security_event!(
        SecurityEvent::CredentialIssued,
        user_id = %record.id,
        expires_in = state.issuer.lifetime().as_secs(),
        "Credential issued"
    );

    Ok(Json(LoginResponse {
        token,
        expires_in: state.issuer.lifetime().as_secs(),
    }))
}

// ============================================================================
// Password change
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_secret: String,
    pub new_secret: String,
}

impl Validate for ChangePasswordRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_required(&self.current_secret, "current_secret")?;
        validate_required(&self.new_secret, "new_secret")?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ChangePasswordResponse {
    pub message: String,
}

/// Change a user's password.
///
/// The current secret must verify against the stored hash before the new
/// secret is hashed and persisted; a mismatch leaves the stored hash
/// untouched and yields a generic denial.
pub async fn change_password(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ChangePasswordResponse>, AppError> {
    let record = state
        .directory
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let proof = state
        .vault
        .verify(&input.current_secret, &record.password_hash)
        .await?;
    if !proof {
        security_event!(
            SecurityEvent::AuthenticationFailure,
            user_id = %record.id,
            actor = %ctx.user_id,
            reason = "current_secret_mismatch",
            "Password change rejected"
        );
        return Err(AppError::unauthorized("current secret does not match"));
    }

    state.secret_policy.validate(&input.new_secret)?;

    let new_hash = state.vault.hash(&input.new_secret).await?;
    state.directory.update_password(&record.id, new_hash).await?;

    security_event!(
        SecurityEvent::PasswordChanged,
        user_id = %record.id,
        actor = %ctx.user_id,
        "Password changed"
    );

    Ok(Json(ChangePasswordResponse {
        message: "Password updated successfully".to_string(),
    }))
}

// ============================================================================
// Tests
// ============================================================================
