//! Request-boundary authorization enforcement.
//!
//! Every protected route sits behind [`require_credential`]. The gate pulls
//! the bearer credential out of the `Authorization` header, delegates
//! structural, signature, and expiry checks to the token verifier, and only
//! then lets the inner handler run, with the caller's identity attached to
//! the request as a typed [`AuthContext`].
//!
//! Each request moves through exactly one transition: unchecked to
//! authorized, or unchecked to rejected. Every rejection kind produces the
//! identical generic 401 body; which check failed is visible only in the
//! audit log.
//!
//! # Usage
//!
//! ```ignore
//! use axum::{middleware, routing::get, Router};
//! use portcullis::gate::{require_credential, AuthContext};
//!
//! let protected = Router::new()
//!     .route("/users", get(list_users))
//!     .layer(middleware::from_fn_with_state(state.clone(), require_credential));
//!
//! async fn list_users(ctx: AuthContext) -> String {
//!     format!("hello, {}", ctx.user_id)
//! }
//! ```

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::observability::SecurityEvent;
use crate::routes::AppState;
use crate::security_event;
use crate::token::{TokenRejection, ABSENT_PLACEHOLDER};

// ============================================================================
// Auth context
// ============================================================================

/// Identity attached to a request once the gate has authorized it.
///
/// This is an explicit, typed value threaded through request extensions;
/// handlers receive it as an extractor instead of reading ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Id of the authenticated user, taken from the credential's claim
    pub user_id: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("request reached handler without auth context"))
    }
}

// ============================================================================
// Bearer extraction
// ============================================================================

/// Extract the bearer token from the standard authorization carrier.
///
/// No header at all is `Missing`; a non-Bearer scheme or the `"null"`
/// placeholder is `Malformed`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, TokenRejection> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(TokenRejection::Missing)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(TokenRejection::Malformed)?;

    if token.is_empty() || token == ABSENT_PLACEHOLDER {
        return Err(TokenRejection::Malformed);
    }

    Ok(token)
}

// ============================================================================
// Middleware
// ============================================================================

/// Middleware enforcing a valid credential on every request it wraps.
pub async fn require_credential(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let verified = bearer_token(request.headers())
        .and_then(|token| state.verifier.verify(token))
        .map_err(|rejection| {
            security_event!(
                SecurityEvent::AccessDenied,
                reason = rejection.kind_str(),
                path = %request.uri().path(),
                "Credential rejected at the gate"
            );
            AppError::from(rejection)
        })?;

    security_event!(
        SecurityEvent::AccessGranted,
        user_id = %verified.user_id,
        path = %request.uri().path(),
        "Request authorized"
    );

    request.extensions_mut().insert(AuthContext {
        user_id: verified.user_id,
    });

    Ok(next.run(request).await)
}

// ============================================================================
// Tests
// ============================================================================
