//! User directory: records and the abstract store contract.
//!
//! The credential core does not implement storage. It consumes the
//! [`UserDirectory`] trait, which any backend can provide as long as it
//! keeps the username uniqueness invariant atomic: a create or update that
//! would duplicate a username fails, it never silently overwrites.
//!
//! [`InMemoryDirectory`] is the reference implementation used by the server
//! binary and the tests. A SQL-backed implementation plugs in behind the
//! same trait:
//!
//! ```ignore
//! #[async_trait]
//! impl UserDirectory for PgDirectory {
//!     async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, DirectoryError> {
//!         sqlx::query_as("SELECT * FROM users WHERE username = $1")
//!             .bind(username)
//!             .fetch_optional(&self.pool)
//!             .await
//!             .map_err(|e| DirectoryError::Unavailable(e.to_string()))
//!     }
//!     // ...
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

// ============================================================================
// Role
// ============================================================================

/// Account role.
///
/// `User` is the baseline non-privileged role assigned when registration
/// does not specify one; the default is configurable through
/// `AuthConfig::default_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Manager,
    Technician,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::Manager => write!(f, "MANAGER"),
            Self::Technician => write!(f, "TECHNICIAN"),
            Self::User => write!(f, "USER"),
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "MANAGER" => Ok(Self::Manager),
            "TECHNICIAN" => Ok(Self::Technician),
            "USER" => Ok(Self::User),
            _ => Err(()),
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// Default account status on creation.
pub const STATUS_ACTIVE: &str = "active";

/// A stored user record.
///
/// `password_hash` is only ever written from `PasswordVault` output and is
/// stripped from every API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Opaque unique identifier, assigned at creation, immutable
    pub id: String,
    /// Globally unique username, trimmed
    pub username: String,
    /// Display name
    pub display_name: String,
    /// Hashed secret; never the plaintext
    pub password_hash: String,
    /// Account role
    pub role: Role,
    /// Optional weak reference to an external employee entity
    pub linked_employee_ref: Option<String>,
    /// Account status, defaults to "active"
    pub status: String,
    /// Set by the store on create
    pub created_at: DateTime<Utc>,
    /// Refreshed by the store on every update
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a record. The store assigns id, status, and
/// timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: Role,
    pub linked_employee_ref: Option<String>,
}

/// Input for updating a record. `None` leaves a field unchanged; the
/// password hash is not updatable through this path.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub username: String,
    pub display_name: String,
    pub role: Option<Role>,
    pub linked_employee_ref: Option<String>,
}

// ============================================================================
// Errors
// ============================================================================

/// Store failures, tagged so callers can branch without string matching.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The username is already taken by another record.
    #[error("username '{username}' already exists")]
    Conflict { username: String },

    /// No record with the given identifier.
    #[error("record not found")]
    NotFound,

    /// The storage backend failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// Store contract
// ============================================================================

/// Abstract user-record store.
///
/// Implementations own their concurrency control; `create` and `update`
/// must be atomic with respect to the uniqueness check.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a record by exact username.
    async fn find_by_username(&self, username: &str)
        -> Result<Option<UserRecord>, DirectoryError>;

    /// Find a record by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, DirectoryError>;

    /// List all records.
    async fn list(&self) -> Result<Vec<UserRecord>, DirectoryError>;

    /// Create a record. Fails with [`DirectoryError::Conflict`] when the
    /// username is taken; never overwrites.
    async fn create(&self, new_user: NewUser) -> Result<UserRecord, DirectoryError>;

    /// Update a record. Preserves the uniqueness invariant and refreshes
    /// `updated_at`. Does not touch the password hash.
    async fn update(&self, id: &str, update: UserUpdate) -> Result<UserRecord, DirectoryError>;

    /// Replace the stored password hash. Only the password-change operation
    /// calls this, after re-verifying the current secret.
    async fn update_password(&self, id: &str, password_hash: String)
        -> Result<(), DirectoryError>;

    /// Delete a record by id. Hard delete; deletion is final.
    async fn delete(&self, id: &str) -> Result<UserRecord, DirectoryError>;
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// In-memory [`UserDirectory`] suitable for single-instance deployments and
/// tests.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    records: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, DirectoryError> {
        let records = self.records.read();
        Ok(records
            .values()
            .find(|r| r.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, DirectoryError> {
        Ok(self.records.read().get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<UserRecord>, DirectoryError> {
        let mut all: Vec<UserRecord> = self.records.read().values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn create(&self, new_user: NewUser) -> Result<UserRecord, DirectoryError> {
        let username = new_user.username.trim().to_string();
        let mut records = self.records.write();

        // Uniqueness check and insert under one lock
        if records.values().any(|r| r.username == username) {
            return Err(DirectoryError::Conflict { username });
        }

        let now = Utc::now();
        let record = UserRecord {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            display_name: new_user.display_name,
            password_hash: new_user.password_hash,
            role: new_user.role,
            linked_employee_ref: new_user.linked_employee_ref,
            status: STATUS_ACTIVE.to_string(),
            created_at: now,
            updated_at: now,
        };

        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, update: UserUpdate) -> Result<UserRecord, DirectoryError> {
        let username = update.username.trim().to_string();
        let mut records = self.records.write();

        if !records.contains_key(id) {
            return Err(DirectoryError::NotFound);
        }

        if records
            .values()
            .any(|r| r.username == username && r.id != id)
        {
            return Err(DirectoryError::Conflict { username });
        }

        let record = records.get_mut(id).ok_or(DirectoryError::NotFound)?;
        record.username = username;
        record.display_name = update.display_name;
        if let Some(role) = update.role {
            record.role = role;
        }
        if let Some(employee_ref) = update.linked_employee_ref {
            record.linked_employee_ref = Some(employee_ref);
        }
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    async fn update_password(
        &self,
        id: &str,
        password_hash: String,
    ) -> Result<(), DirectoryError> {
        let mut records = self.records.write();
        let record = records.get_mut(id).ok_or(DirectoryError::NotFound)?;
        record.password_hash = password_hash;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<UserRecord, DirectoryError> {
        self.records
            .write()
            .remove(id)
            .ok_or(DirectoryError::NotFound)
    }
}

// ============================================================================
// Tests
// ============================================================================
