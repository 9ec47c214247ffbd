//! Password vault: one-way hashing and verification of user secrets.
//!
//! Secrets are hashed with bcrypt. The cost factor is configurable and
//! embedded in every produced hash, so verification re-derives it from the
//! stored value and a cost change never invalidates existing hashes. Equal
//! secrets produce different hashes across calls (per-hash random salt).
//!
//! Hashing is deliberately expensive; both operations run on the blocking
//! worker pool so a slow hash cannot stall the async runtime.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::password::PasswordVault;
//!
//! let vault = PasswordVault::new(10);
//! let hashed = vault.hash("correct horse battery staple").await?;
//! assert!(vault.verify("correct horse battery staple", &hashed).await?);
//! ```

use crate::validation::{validate_length, ValidationError};

// ============================================================================
// Secret Policy
// ============================================================================

/// Length bounds enforced on a plaintext secret before it is hashed.
#[derive(Debug, Clone)]
pub struct SecretPolicy {
    /// Minimum secret length in characters
    pub min_length: usize,
    /// Maximum secret length in characters
    pub max_length: usize,
}

impl Default for SecretPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
        }
    }
}

impl SecretPolicy {
    /// Validate a plaintext secret against the policy.
    pub fn validate(&self, secret: &str) -> Result<(), ValidationError> {
        validate_length(secret, self.min_length, self.max_length, "secret")
    }
}

// ============================================================================
// Password Vault
// ============================================================================

/// One-way hashing and verification of user secrets.
#[derive(Debug, Clone)]
pub struct PasswordVault {
    cost: u32,
}

impl PasswordVault {
    /// Create a vault with the given bcrypt cost factor.
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// The configured cost factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a secret.
    ///
    /// Produces a salted bcrypt hash embedding the configured cost. Fails
    /// only on an underlying crypto or worker-pool failure.
    pub async fn hash(&self, secret: &str) -> Result<String, VaultError> {
        let secret = secret.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(secret, cost))
            .await
            .map_err(|e| VaultError::Worker(e.to_string()))?
            .map_err(VaultError::Hash)
    }

    /// Verify a secret against a stored hash.
    ///
    /// Returns `Ok(false)` for a wrong secret and for a stored value that is
    /// not a parseable bcrypt hash; neither is an error. The cost factor is
    /// taken from the stored hash, not from this vault's configuration.
    pub async fn verify(&self, secret: &str, hashed: &str) -> Result<bool, VaultError> {
        let secret = secret.to_owned();
        let hashed = hashed.to_owned();

        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(secret, &hashed))
            .await
            .map_err(|e| VaultError::Worker(e.to_string()))?;

        Ok(outcome.unwrap_or(false))
    }
}

/// Vault failures. A wrong secret is not a failure.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// The hashing primitive failed (entropy or resource failure).
    #[error("hashing failed: {0}")]
    Hash(#[source] bcrypt::BcryptError),

    /// The blocking worker could not complete the operation.
    #[error("hashing worker failed: {0}")]
    Worker(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum bcrypt cost keeps the tests fast; production uses the
    // configured cost (default 10).
    fn vault() -> PasswordVault {
        PasswordVault::new(4)
    }

    #[tokio::test]
    async fn test_hash_is_salted() {
        let vault = vault();
        let a = vault.hash("hunter2hunter2").await.unwrap();
        let b = vault.hash("hunter2hunter2").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_hash_never_equals_plaintext() {
        let vault = vault();
        let hashed = vault.hash("hunter2hunter2").await.unwrap();
        assert_ne!(hashed, "hunter2hunter2");
    }

    #[tokio::test]
    async fn test_verify_roundtrip() {
        let vault = vault();
        let hashed = vault.hash("hunter2hunter2").await.unwrap();
        assert!(vault.verify("hunter2hunter2", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_wrong_secret() {
        let vault = vault();
        let hashed = vault.hash("hunter2hunter2").await.unwrap();
        assert!(!vault.verify("wrong-password", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_garbage_hash_is_false_not_error() {
        let vault = vault();
        assert!(!vault.verify("anything", "not-a-bcrypt-hash").await.unwrap());
    }

    #[tokio::test]
    async fn test_cost_change_keeps_old_hashes_valid() {
        // Hash at cost 4, verify with a vault configured for a higher cost;
        // the stored hash's embedded cost wins.
        let hashed = PasswordVault::new(4).hash("hunter2hunter2").await.unwrap();
        let stricter = PasswordVault::new(6);
        assert!(stricter.verify("hunter2hunter2", &hashed).await.unwrap());
    }

    #[test]
    fn test_secret_policy_bounds() {
        let policy = SecretPolicy::default();
        assert!(policy.validate("12345678").is_ok());
        assert!(policy.validate("1234567").is_err());
        assert!(policy.validate(&"x".repeat(129)).is_err());
    }
}
