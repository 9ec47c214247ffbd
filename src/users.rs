//! User record management: list, fetch, update, delete.
//!
//! All routes here run behind the gate; the acting user's id comes from the
//! request's [`AuthContext`] and is recorded in the audit log for every
//! mutation. Responses carry [`UserResponse`], which never includes the
//! password hash.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::{Role, UserRecord, UserUpdate};
use crate::error::AppError;
use crate::gate::AuthContext;
use crate::observability::SecurityEvent;
use crate::routes::AppState;
use crate::security_event;
use crate::validation::{validate_required, validate_username, Validate, ValidatedJson, ValidationError};

// ============================================================================
// Response shape
// ============================================================================

/// A user record as exposed over the API: everything except the hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub linked_employee_ref: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            display_name: record.display_name,
            role: record.role,
            linked_employee_ref: record.linked_employee_ref,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List all users.
pub async fn list_users(
    State(state): State<AppState>,
    _ctx: AuthContext,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state
        .directory
        .list()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    Ok(Json(users))
}

/// Fetch a single user by id.
pub async fn get_user(
    State(state): State<AppState>,
    _ctx: AuthContext,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let record = state
        .directory
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(UserResponse::from(record)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    pub display_name: String,
    pub role: Option<Role>,
    pub linked_employee_ref: Option<String>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)?;
        validate_required(&self.display_name, "display_name")?;
        Ok(())
    }
}

/// Update a user's profile fields.
///
/// Never touches the password hash; uniqueness is preserved by the store.
pub async fn update_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let record = state
        .directory
        .update(
            &id,
            UserUpdate {
                username: input.username,
                display_name: input.display_name,
                role: input.role,
                linked_employee_ref: input.linked_employee_ref,
            },
        )
        .await?;

    security_event!(
        SecurityEvent::UserModified,
        user_id = %record.id,
        actor = %ctx.user_id,
        "User updated"
    );

    Ok(Json(UserResponse::from(record)))
}

/// Delete a user by id. Deletion is final.
pub async fn delete_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let record = state.directory.delete(&id).await?;

    security_event!(
        SecurityEvent::UserDeleted,
        user_id = %record.id,
        actor = %ctx.user_id,
        "User deleted"
    );

    Ok(Json(UserResponse::from(record)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::NewUser;
    use crate::error::ErrorKind;
    use crate::routes::test_state;

    async fn seeded_state() -> (AppState, UserRecord) {
        let state = test_state();
        let record = state
            .directory
            .create(NewUser {
                username: "ada".to_string(),
                display_name: "Ada Lovelace".to_string(),
                password_hash: "$2b$04$fakefakefakefakefakefake".to_string(),
                role: Role::User,
                linked_employee_ref: None,
            })
            .await
            .unwrap();
        (state, record)
    }

    fn actor() -> AuthContext {
        AuthContext {
            user_id: "actor-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_strips_hash() {
        let (state, _) = seeded_state().await;
        let users = list_users(State(state), actor()).await.unwrap();
        assert_eq!(users.0.len(), 1);

        let rendered = serde_json::to_string(&users.0).unwrap();
        assert!(!rendered.contains("password_hash"));
        assert!(!rendered.contains("$2b$"));
    }

    #[tokio::test]
    async fn test_get_user() {
        let (state, record) = seeded_state().await;

        let user = get_user(State(state.clone()), actor(), Path(record.id.clone()))
            .await
            .unwrap();
        assert_eq!(user.0.username, "ada");

        let err = get_user(State(state), actor(), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_user() {
        let (state, record) = seeded_state().await;

        let updated = update_user(
            State(state),
            actor(),
            Path(record.id.clone()),
            ValidatedJson(UpdateUserRequest {
                username: "ada".to_string(),
                display_name: "Countess of Lovelace".to_string(),
                role: Some(Role::Manager),
                linked_employee_ref: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(updated.0.display_name, "Countess of Lovelace");
        assert_eq!(updated.0.role, Role::Manager);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let (state, _) = seeded_state().await;

        let err = update_user(
            State(state),
            actor(),
            Path("missing".to_string()),
            ValidatedJson(UpdateUserRequest {
                username: "ghost".to_string(),
                display_name: "Ghost".to_string(),
                role: None,
                linked_employee_ref: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let (state, record) = seeded_state().await;

        let deleted = delete_user(State(state.clone()), actor(), Path(record.id.clone()))
            .await
            .unwrap();
        assert_eq!(deleted.0.id, record.id);

        let err = delete_user(State(state), actor(), Path(record.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
