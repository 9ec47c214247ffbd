//! Standalone identity server backed by the in-memory directory.
//!
//! Configuration comes from the environment:
//!
//! - `PORTCULLIS_SIGNING_SECRET` (required)
//! - `PORTCULLIS_TOKEN_LIFETIME_SECS`, `PORTCULLIS_HASH_COST`,
//!   `PORTCULLIS_DEFAULT_ROLE` (optional)
//! - `PORTCULLIS_BIND_ADDR` (default `0.0.0.0:3000`)
//! - `LOG_FORMAT`, `RUST_LOG`

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use portcullis::directory::InMemoryDirectory;
use portcullis::observability::{self, ObservabilityConfig};
use portcullis::{build_router, AppState, AuthConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init(ObservabilityConfig::from_env());

    let config = AuthConfig::from_env().context("failed to load configuration")?;
    info!(
        token_lifetime_secs = config.token_lifetime.as_secs(),
        hash_cost = config.hash_cost,
        default_role = %config.default_role,
        "Starting identity server"
    );

    let state = AppState::new(config, Arc::new(InMemoryDirectory::new()));
    let app = build_router(state);

    let addr =
        std::env::var("PORTCULLIS_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
