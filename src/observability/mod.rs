//! Observability infrastructure.
//!
//! Structured logging for the identity backend. Application code uses the
//! standard `tracing` macros plus [`security_event!`](crate::security_event)
//! for audit-relevant records; this module configures the subscriber once at
//! startup.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::observability::ObservabilityConfig;
//!
//! portcullis::observability::init(ObservabilityConfig::from_env());
//! ```

mod events;

pub use events::{SecurityEvent, Severity};

use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line output
    Text,
    /// JSON lines, one record per event
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Output format for log records
    pub format: LogFormat,
    /// Filter directive; falls back to `RUST_LOG`, then this default
    pub default_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Load configuration from environment variables.
    ///
    /// - `LOG_FORMAT`: `json` or `text` (default `text`)
    /// - `RUST_LOG`: standard filter directives (default `info`)
    pub fn from_env() -> Self {
        let format = match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };
        Self {
            format,
            ..Default::default()
        }
    }

    /// Use JSON output.
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    /// Set the default filter directive.
    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// Call once at startup, before any request is served. Subsequent calls are
/// ignored (the first subscriber wins), which keeps tests that initialize
/// logging independently from panicking.
pub fn init(config: ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already initialized");
    }
}
