//! Authentication configuration.
//!
//! All process-wide parameters of the credential core live here: the signing
//! secret, the token validity window, the password hashing cost, and the
//! default role for new accounts. The struct is built once at startup and
//! injected into constructors; nothing in the crate reads ambient global
//! state after that.
//!
//! # Example
//!
//! ```ignore
//! use portcullis::config::AuthConfig;
//!
//! // From environment variables
//! let config = AuthConfig::from_env()?;
//!
//! // Or programmatically
//! let config = AuthConfig::builder("a-sufficiently-long-signing-secret-value")
//!     .token_lifetime(std::time::Duration::from_secs(15 * 60))
//!     .hash_cost(12)
//!     .build()?;
//! ```

use std::fmt;
use std::time::Duration;

use crate::directory::Role;
use crate::secret::{SigningSecretError, SigningSecretPolicy};

/// Process-wide authentication configuration, immutable after startup.
#[derive(Clone)]
pub struct AuthConfig {
    /// Secret used to sign and verify bearer credentials. Never logged.
    pub signing_secret: String,

    /// Validity window applied to every issued credential.
    pub token_lifetime: Duration,

    /// bcrypt cost factor for password hashing. Verification re-derives the
    /// cost from each stored hash, so changing this does not invalidate
    /// existing hashes.
    pub hash_cost: u32,

    /// Role assigned when registration does not specify one.
    pub default_role: Role,
}

// Manual Debug so the signing secret cannot leak through debug logging.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret", &"<redacted>")
            .field("token_lifetime", &self.token_lifetime)
            .field("hash_cost", &self.hash_cost)
            .field("default_role", &self.default_role)
            .finish()
    }
}

impl AuthConfig {
    /// Create a builder with the given signing secret.
    pub fn builder(signing_secret: impl Into<String>) -> AuthConfigBuilder {
        AuthConfigBuilder {
            signing_secret: signing_secret.into(),
            token_lifetime: Duration::from_secs(60 * 60),
            hash_cost: 10,
            default_role: Role::User,
            secret_policy: SigningSecretPolicy::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `PORTCULLIS_SIGNING_SECRET` (required): credential signing secret
    /// - `PORTCULLIS_TOKEN_LIFETIME_SECS`: validity window (default 3600)
    /// - `PORTCULLIS_HASH_COST`: bcrypt cost factor (default 10)
    /// - `PORTCULLIS_DEFAULT_ROLE`: role for new accounts (default `user`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let signing_secret = std::env::var("PORTCULLIS_SIGNING_SECRET")
            .map_err(|_| ConfigError::MissingSecret)?;

        let mut builder = Self::builder(signing_secret);

        if let Ok(raw) = std::env::var("PORTCULLIS_TOKEN_LIFETIME_SECS") {
            let secs: u64 = raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: "PORTCULLIS_TOKEN_LIFETIME_SECS",
                    value: raw.clone(),
                })?;
            builder = builder.token_lifetime(Duration::from_secs(secs));
        }

        if let Ok(raw) = std::env::var("PORTCULLIS_HASH_COST") {
            let cost: u32 = raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: "PORTCULLIS_HASH_COST",
                    value: raw.clone(),
                })?;
            builder = builder.hash_cost(cost);
        }

        if let Ok(raw) = std::env::var("PORTCULLIS_DEFAULT_ROLE") {
            let role: Role = raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORTCULLIS_DEFAULT_ROLE",
                value: raw.clone(),
            })?;
            builder = builder.default_role(role);
        }

        builder.build()
    }
}

/// Builder for [`AuthConfig`].
#[derive(Clone)]
pub struct AuthConfigBuilder {
    signing_secret: String,
    token_lifetime: Duration,
    hash_cost: u32,
    default_role: Role,
    secret_policy: SigningSecretPolicy,
}

impl AuthConfigBuilder {
    /// Set the credential validity window.
    pub fn token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Set the bcrypt cost factor.
    pub fn hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Set the role assigned when registration omits one.
    pub fn default_role(mut self, role: Role) -> Self {
        self.default_role = role;
        self
    }

    /// Override the signing-secret quality policy.
    pub fn secret_policy(mut self, policy: SigningSecretPolicy) -> Self {
        self.secret_policy = policy;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<AuthConfig, ConfigError> {
        self.secret_policy.validate(&self.signing_secret)?;

        // bcrypt accepts costs 4..=31; anything outside fails at hash time
        if !(4..=31).contains(&self.hash_cost) {
            return Err(ConfigError::InvalidValue {
                name: "hash_cost",
                value: self.hash_cost.to_string(),
            });
        }

        if self.token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "token_lifetime",
                value: "0".to_string(),
            });
        }

        Ok(AuthConfig {
            signing_secret: self.signing_secret,
            token_lifetime: self.token_lifetime,
            hash_cost: self.hash_cost,
            default_role: self.default_role,
        })
    }
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The signing secret environment variable is absent.
    #[error("PORTCULLIS_SIGNING_SECRET environment variable required")]
    MissingSecret,

    /// The signing secret fails the quality policy.
    #[error("signing secret rejected: {0}")]
    WeakSecret(#[from] SigningSecretError),

    /// A parameter is out of range or unparseable.
    #[error("invalid value '{value}' for {name}")]
    InvalidValue {
        /// Parameter or environment variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::SigningSecretValidator;

    fn test_secret() -> String {
        SigningSecretValidator::generate(48)
    }

    #[test]
    fn test_builder_defaults() {
        let config = AuthConfig::builder(test_secret()).build().unwrap();
        assert_eq!(config.token_lifetime, Duration::from_secs(3600));
        assert_eq!(config.hash_cost, 10);
        assert_eq!(config.default_role, Role::User);
    }

    #[test]
    fn test_builder_overrides() {
        let config = AuthConfig::builder(test_secret())
            .token_lifetime(Duration::from_secs(900))
            .hash_cost(12)
            .default_role(Role::Technician)
            .build()
            .unwrap();
        assert_eq!(config.token_lifetime, Duration::from_secs(900));
        assert_eq!(config.hash_cost, 12);
        assert_eq!(config.default_role, Role::Technician);
    }

    #[test]
    fn test_weak_secret_rejected() {
        let result = AuthConfig::builder("short").build();
        assert!(matches!(result, Err(ConfigError::WeakSecret(_))));
    }

    #[test]
    fn test_hash_cost_bounds() {
        let result = AuthConfig::builder(test_secret()).hash_cost(2).build();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let result = AuthConfig::builder(test_secret()).hash_cost(32).build();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_zero_lifetime_rejected() {
        let result = AuthConfig::builder(test_secret())
            .token_lifetime(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AuthConfig::builder(test_secret()).build().unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(&config.signing_secret));
    }
}
