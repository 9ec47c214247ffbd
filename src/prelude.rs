//! Common imports for applications built on portcullis.
//!
//! ```ignore
//! use portcullis::prelude::*;
//! ```

// =============================================================================
// Configuration
// =============================================================================

pub use crate::config::{AuthConfig, AuthConfigBuilder, ConfigError};

// =============================================================================
// Credential core
// =============================================================================

pub use crate::password::{PasswordVault, SecretPolicy, VaultError};
pub use crate::token::{Claims, TokenIssuer, TokenRejection, TokenVerifier, VerifiedToken};
pub use crate::gate::{bearer_token, require_credential, AuthContext};

// =============================================================================
// Directory
// =============================================================================

pub use crate::directory::{
    DirectoryError, InMemoryDirectory, NewUser, Role, UserDirectory, UserRecord, UserUpdate,
};

// =============================================================================
// HTTP surface
// =============================================================================

pub use crate::routes::{build_router, AppState};
pub use crate::users::UserResponse;

// =============================================================================
// Errors & validation
// =============================================================================

pub use crate::error::{AppError, ErrorKind};
pub use crate::validation::{
    validate_length, validate_required, validate_username, Validate, ValidatedJson,
    ValidationError,
};

// =============================================================================
// Observability
// =============================================================================

pub use crate::observability::{ObservabilityConfig, SecurityEvent};

// =============================================================================
// External re-exports for convenience
// =============================================================================

pub use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Router,
};

pub use tracing::{debug, error, info, instrument, trace, warn};
