//! Signed bearer credentials: issuance and verification.
//!
//! A credential is a JWT (HS256) carrying exactly one claim the rest of the
//! system trusts: the owning user's id in `sub`, bounded by `exp`. Validity
//! is entirely a function of signature and expiry at verification time;
//! there is no server-side token registry.
//!
//! Verification distinguishes five rejection kinds ([`TokenRejection`]) so
//! that logs and tests can tell them apart, but callers map all of them to
//! the same generic denial. Expiry is checked explicitly here rather than
//! delegated to the JWT library, so a token must pass both the signature
//! check and the independent expiry comparison.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// Clients that lost their token sometimes send the literal string "null"
/// in the Authorization header; it is treated as no credential at all.
pub const ABSENT_PLACEHOLDER: &str = "null";

// ============================================================================
// Claims
// ============================================================================

/// JWT payload. `sub` is optional at the decoding layer so that a
/// structurally valid token without an identity claim can be classified as
/// [`TokenRejection::NoClaim`] instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the owning user's id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiry, Unix seconds
    pub exp: i64,
    /// Issued at, Unix seconds
    pub iat: i64,
}

/// The result of successful verification: the single trusted claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    /// Id of the user the credential was issued to
    pub user_id: String,
}

// ============================================================================
// Rejection taxonomy
// ============================================================================

/// Why a presented credential was rejected.
///
/// The kinds are internally distinguishable for logging and testing; every
/// one of them maps to the same externally observable denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// No credential presented at all
    Missing,
    /// The "null" placeholder, or structural decode failure
    Malformed,
    /// Signature does not verify against the signing key
    InvalidSignature,
    /// Current time is at or past the embedded expiry
    Expired,
    /// Signature and expiry pass but no identity claim is present
    NoClaim,
}

impl TokenRejection {
    /// Stable string form of the kind, for log fields.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Malformed => "malformed",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
            Self::NoClaim => "no_claim",
        }
    }
}

impl std::fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind_str())
    }
}

impl std::error::Error for TokenRejection {}

// ============================================================================
// Issuer
// ============================================================================

/// Mints signed, time-bounded credentials.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    lifetime: Duration,
}

impl TokenIssuer {
    /// Create an issuer from the process configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.signing_secret.as_bytes()),
            lifetime: config.token_lifetime,
        }
    }

    /// The configured validity window.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a credential for the given user id.
    pub fn issue(&self, user_id: &str) -> Result<String, IssueError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: Some(user_id.to_string()),
            exp: iat + self.lifetime.as_secs() as i64,
            iat,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(IssueError)
    }
}

/// Credential issuance failure (signing subsystem).
#[derive(Debug, thiserror::Error)]
#[error("token encoding failed: {0}")]
pub struct IssueError(#[source] jsonwebtoken::errors::Error);

// ============================================================================
// Verifier
// ============================================================================

/// Validates presented credentials and extracts the identity claim.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier from the process configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Expiry is compared explicitly in verify(); the library only
        // checks structure and signature. `exp` stays a required claim so a
        // payload without one is malformed.
        validation.validate_exp = false;

        Self {
            decoding_key: DecodingKey::from_secret(config.signing_secret.as_bytes()),
            validation,
        }
    }

    /// Verify a presented credential.
    ///
    /// Checks, in order: placeholder/structure, signature, expiry, identity
    /// claim. Returns the extracted user id on success.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenRejection> {
        if token.is_empty() || token == ABSENT_PLACEHOLDER {
            return Err(TokenRejection::Malformed);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| Self::classify(&e))?;

        // Independent expiry check: expired at exactly `exp`
        let now = Utc::now().timestamp();
        if now >= data.claims.exp {
            return Err(TokenRejection::Expired);
        }

        match data.claims.sub {
            Some(user_id) if !user_id.is_empty() => Ok(VerifiedToken { user_id }),
            _ => Err(TokenRejection::NoClaim),
        }
    }

    fn classify(err: &jsonwebtoken::errors::Error) -> TokenRejection {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenRejection::InvalidSignature
            }
            // Cannot occur while validate_exp is off; kept for completeness
            ErrorKind::ExpiredSignature => TokenRejection::Expired,
            _ => TokenRejection::Malformed,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::SigningSecretValidator;

    fn config() -> AuthConfig {
        AuthConfig::builder(SigningSecretValidator::generate(48))
            .token_lifetime(Duration::from_secs(3600))
            .build()
            .unwrap()
    }

    fn encode_claims(config: &AuthConfig, claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(config.signing_secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let config = config();
        let issuer = TokenIssuer::new(&config);
        let verifier = TokenVerifier::new(&config);

        let token = issuer.issue("user-42").unwrap();
        let verified = verifier.verify(&token).unwrap();
        assert_eq!(verified.user_id, "user-42");
    }

    #[test]
    fn test_expiry_boundary() {
        let config = config();
        let verifier = TokenVerifier::new(&config);
        let now = Utc::now().timestamp();

        // One second before expiry: valid
        let token = encode_claims(
            &config,
            &Claims {
                sub: Some("user-42".into()),
                exp: now + 1,
                iat: now - 3599,
            },
        );
        assert!(verifier.verify(&token).is_ok());

        // One second past expiry: rejected as expired, nothing else
        let token = encode_claims(
            &config,
            &Claims {
                sub: Some("user-42".into()),
                exp: now - 1,
                iat: now - 3601,
            },
        );
        assert_eq!(verifier.verify(&token), Err(TokenRejection::Expired));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let config = config();
        let issuer = TokenIssuer::new(&config);
        let verifier = TokenVerifier::new(&config);

        let token = issuer.issue("user-42").unwrap();
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        assert_eq!(parts.len(), 3);

        // Corrupt one character of the signature segment, keeping it valid
        // base64url so the failure is the signature check itself
        let sig = &mut parts[2];
        let flipped = if sig.starts_with('A') { "B" } else { "A" };
        sig.replace_range(0..1, flipped);

        let tampered = parts.join(".");
        assert_eq!(
            verifier.verify(&tampered),
            Err(TokenRejection::InvalidSignature)
        );
    }

    #[test]
    fn test_wrong_key_rejected() {
        let config = config();
        let other = AuthConfig::builder(SigningSecretValidator::generate(48))
            .build()
            .unwrap();

        let token = TokenIssuer::new(&other).issue("user-42").unwrap();
        assert_eq!(
            TokenVerifier::new(&config).verify(&token),
            Err(TokenRejection::InvalidSignature)
        );
    }

    #[test]
    fn test_missing_identity_claim() {
        let config = config();
        let verifier = TokenVerifier::new(&config);
        let now = Utc::now().timestamp();

        let token = encode_claims(
            &config,
            &Claims {
                sub: None,
                exp: now + 3600,
                iat: now,
            },
        );
        assert_eq!(verifier.verify(&token), Err(TokenRejection::NoClaim));

        let token = encode_claims(
            &config,
            &Claims {
                sub: Some(String::new()),
                exp: now + 3600,
                iat: now,
            },
        );
        assert_eq!(verifier.verify(&token), Err(TokenRejection::NoClaim));
    }

    #[test]
    fn test_placeholder_and_garbage_are_malformed() {
        let verifier = TokenVerifier::new(&config());

        assert_eq!(verifier.verify("null"), Err(TokenRejection::Malformed));
        assert_eq!(verifier.verify(""), Err(TokenRejection::Malformed));
        assert_eq!(
            verifier.verify("not-a-jwt-at-all"),
            Err(TokenRejection::Malformed)
        );
        assert_eq!(
            verifier.verify("only.two"),
            Err(TokenRejection::Malformed)
        );
    }

    #[test]
    fn test_issued_exp_matches_lifetime() {
        let config = AuthConfig::builder(SigningSecretValidator::generate(48))
            .token_lifetime(Duration::from_secs(900))
            .build()
            .unwrap();
        let issuer = TokenIssuer::new(&config);
        let verifier = TokenVerifier::new(&config);

        let before = Utc::now().timestamp();
        let token = issuer.issue("user-42").unwrap();
        let after = Utc::now().timestamp();

        // Decode through the verifier path to keep a single source of truth
        assert!(verifier.verify(&token).is_ok());

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(config.signing_secret.as_bytes()),
            &verifier.validation,
        )
        .unwrap();
        assert!(data.claims.exp >= before + 900);
        assert!(data.claims.exp <= after + 900);
        assert_eq!(data.claims.exp - data.claims.iat, 900);
    }

    #[test]
    fn test_rejection_kind_strings() {
        assert_eq!(TokenRejection::Missing.kind_str(), "missing");
        assert_eq!(TokenRejection::Expired.kind_str(), "expired");
        assert_eq!(
            TokenRejection::InvalidSignature.kind_str(),
            "invalid_signature"
        );
    }
}
