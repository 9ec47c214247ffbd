//! Signing-secret validation and generation.
//!
//! The credential signing secret is the single most sensitive value the
//! process holds: anyone who knows it can mint valid credentials. This
//! module validates that a configured secret meets minimum strength
//! requirements before the service starts, and can generate one that does.
//!
//! # Example
//!
//! ```
//! use portcullis::secret::{SigningSecretPolicy, SigningSecretValidator};
//!
//! let policy = SigningSecretPolicy::default();
//! assert!(policy.validate("too-short").is_err());
//!
//! let secret = SigningSecretValidator::generate(48);
//! assert!(policy.validate(&secret).is_ok());
//! ```

use std::collections::HashMap;
use std::fmt;

/// Error type for signing-secret validation failures.
#[derive(Debug, Clone, PartialEq)]
pub enum SigningSecretError {
    /// Secret is too short
    TooShort { actual: usize, minimum: usize },
    /// Secret contains a weak/common pattern
    WeakPattern { pattern: String },
    /// Secret has insufficient entropy
    LowEntropy { actual: f64, minimum: f64 },
}

impl fmt::Display for SigningSecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { actual, minimum } => {
                write!(
                    f,
                    "secret length ({} chars) is below minimum ({} chars)",
                    actual, minimum
                )
            }
            Self::WeakPattern { pattern } => {
                write!(f, "secret contains weak pattern: '{}'", pattern)
            }
            Self::LowEntropy { actual, minimum } => {
                write!(
                    f,
                    "secret entropy ({:.1} bits) is below minimum ({:.1} bits)",
                    actual, minimum
                )
            }
        }
    }
}

impl std::error::Error for SigningSecretError {}

/// Policy for signing-secret validation.
#[derive(Debug, Clone)]
pub struct SigningSecretPolicy {
    /// Minimum secret length in characters
    pub min_length: usize,
    /// Minimum Shannon entropy in bits
    pub min_entropy: f64,
    /// Whether to check for weak patterns
    pub check_weak_patterns: bool,
}

impl Default for SigningSecretPolicy {
    /// 32 characters and 64 bits of entropy; enough to resist brute force
    /// on an HMAC key while accepting any properly generated value.
    fn default() -> Self {
        Self {
            min_length: 32,
            min_entropy: 64.0,
            check_weak_patterns: true,
        }
    }
}

impl SigningSecretPolicy {
    /// A stricter policy for production deployments.
    pub fn strict() -> Self {
        Self {
            min_length: 64,
            min_entropy: 128.0,
            check_weak_patterns: true,
        }
    }

    /// Validate a secret against this policy.
    pub fn validate(&self, secret: &str) -> Result<(), SigningSecretError> {
        if secret.len() < self.min_length {
            return Err(SigningSecretError::TooShort {
                actual: secret.len(),
                minimum: self.min_length,
            });
        }

        if self.check_weak_patterns {
            if let Some(pattern) = find_weak_pattern(secret) {
                return Err(SigningSecretError::WeakPattern {
                    pattern: pattern.to_string(),
                });
            }
        }

        let entropy = SigningSecretValidator::calculate_entropy(secret);
        if entropy < self.min_entropy {
            return Err(SigningSecretError::LowEntropy {
                actual: entropy,
                minimum: self.min_entropy,
            });
        }

        Ok(())
    }
}

/// Check for weak patterns in the secret.
fn find_weak_pattern(secret: &str) -> Option<&'static str> {
    const WEAK_PATTERNS: &[&str] = &[
        "secret", "password", "admin", "123456", "qwerty", "default", "example", "test",
        "changeme", "letmein", "welcome",
    ];

    let secret_lower = secret.to_lowercase();
    WEAK_PATTERNS
        .iter()
        .find(|pattern| secret_lower.contains(*pattern))
        .copied()
}

/// Signing-secret validation and generation utilities.
pub struct SigningSecretValidator;

impl SigningSecretValidator {
    /// Calculate Shannon entropy of a string in bits.
    ///
    /// Higher entropy indicates more randomness; a repeated character gives
    /// close to zero.
    pub fn calculate_entropy(s: &str) -> f64 {
        if s.is_empty() {
            return 0.0;
        }

        let mut char_counts: HashMap<char, usize> = HashMap::new();
        let total = s.chars().count() as f64;

        for c in s.chars() {
            *char_counts.entry(c).or_insert(0) += 1;
        }

        let mut entropy = 0.0;
        for count in char_counts.values() {
            let probability = *count as f64 / total;
            entropy -= probability * probability.log2();
        }

        entropy * total
    }

    /// Generate a cryptographically secure random secret of the given length.
    pub fn generate(length: usize) -> String {
        use rand::Rng;

        const CHARSET: &[u8] =
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";

        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}
