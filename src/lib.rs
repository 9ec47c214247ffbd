//! # Portcullis
//!
//! Identity and access-control backend for Axum applications.
//!
//! This crate registers users, authenticates them, issues and validates
//! signed bearer credentials, and enforces per-request authorization. No
//! request passes the gate without a valid, unexpired, correctly-signed
//! credential.
//!
//! ## Components
//!
//! - **Password vault**: salted bcrypt hashing with a configurable cost
//!   factor, run on the blocking worker pool
//! - **Credential issuer/verifier**: stateless signed tokens carrying one
//!   identity claim, with a distinguishable rejection taxonomy
//! - **Access gate**: middleware that attaches a typed [`gate::AuthContext`]
//!   to authorized requests
//! - **User directory**: abstract record store preserving the username
//!   uniqueness invariant, with an in-memory reference implementation
//! - **Audit logging**: structured security events via `tracing`
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use portcullis::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     portcullis::observability::init(ObservabilityConfig::from_env());
//!
//!     let config = AuthConfig::from_env()?;
//!     let state = AppState::new(config, Arc::new(InMemoryDirectory::new()));
//!     let app = build_router(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod config;
pub mod directory;
pub mod error;
pub mod gate;
pub mod observability;
pub mod password;
pub mod routes;
pub mod secret;
pub mod token;
pub mod users;
pub mod validation;

pub mod prelude;

// Re-exports
pub use config::{AuthConfig, AuthConfigBuilder, ConfigError};
pub use directory::{InMemoryDirectory, Role, UserDirectory, UserRecord};
pub use error::{AppError, ErrorKind};
pub use gate::AuthContext;
pub use password::PasswordVault;
pub use routes::{build_router, AppState};
pub use token::{TokenIssuer, TokenRejection, TokenVerifier};
