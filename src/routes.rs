//! Router assembly and shared application state.
//!
//! Public routes: health, registration, login. Everything under `/users`
//! requires a valid credential and runs behind the gate.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::account;
use crate::config::AuthConfig;
use crate::directory::UserDirectory;
use crate::gate;
use crate::password::{PasswordVault, SecretPolicy};
use crate::token::{TokenIssuer, TokenVerifier};
use crate::users;

/// Application state shared across handlers.
///
/// Everything in here is immutable after startup apart from whatever the
/// directory implementation keeps behind its own lock.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AuthConfig>,
    pub directory: Arc<dyn UserDirectory>,
    pub vault: PasswordVault,
    pub secret_policy: SecretPolicy,
    pub issuer: TokenIssuer,
    pub verifier: TokenVerifier,
}

impl AppState {
    /// Build the state from configuration and a directory implementation.
    pub fn new(config: AuthConfig, directory: Arc<dyn UserDirectory>) -> Self {
        let issuer = TokenIssuer::new(&config);
        let verifier = TokenVerifier::new(&config);
        let vault = PasswordVault::new(config.hash_cost);

        Self {
            config: Arc::new(config),
            directory,
            vault,
            secret_policy: SecretPolicy::default(),
            issuer,
            verifier,
        }
    }
}

/// Assemble the application router.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(account::register))
        .route("/auth/login", post(account::login));

    let protected = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", put(users::update_user))
        .route("/users/{id}", delete(users::delete_user))
        .route("/users/{id}/password", put(account::change_password))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::require_credential,
        ));

    Router::new().merge(public).merge(protected).with_state(state)
}

/// Liveness check.
async fn health() -> &'static str {
    "OK"
}

// ============================================================================
// Test support
// ============================================================================

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use crate::directory::InMemoryDirectory;
    use crate::secret::SigningSecretValidator;
    use std::time::Duration;

    // Minimum bcrypt cost keeps the test suite fast
    let config = AuthConfig::builder(SigningSecretValidator::generate(48))
        .hash_cost(4)
        .token_lifetime(Duration::from_secs(3600))
        .build()
        .unwrap();

    AppState::new(config, Arc::new(InMemoryDirectory::new()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::token::Claims;

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn register_and_login(state: &AppState) -> (String, String) {
        let router = build_router(state.clone());

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/register",
                serde_json::json!({
                    "username": "ada",
                    "display_name": "Ada Lovelace",
                    "secret": "hunter2hunter2"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        let user_id = created["id"].as_str().unwrap().to_string();

        let response = router
            .oneshot(json_request(
                "POST",
                "/auth/login",
                serde_json::json!({
                    "username": "ada",
                    "secret": "hunter2hunter2"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let login: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).unwrap();

        (user_id, login["token"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_health() {
        let router = build_router(test_state());
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_flow_with_valid_credential() {
        let state = test_state();
        let (user_id, token) = register_and_login(&state).await;
        let router = build_router(state);

        let response = router
            .oneshot(
                Request::get(format!("/users/{}", user_id).as_str())
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["username"], "ada");
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_gate_denial_uniformity() {
        let state = test_state();
        let (_, valid_token) = register_and_login(&state).await;
        let router = build_router(state.clone());

        // Tampered: corrupt one signature character of a valid token
        let mut parts: Vec<String> = valid_token.split('.').map(String::from).collect();
        let flipped = if parts[2].starts_with('A') { "B" } else { "A" };
        parts[2].replace_range(0..1, flipped);
        let tampered = parts.join(".");

        // Expired: signed with the real key, exp in the past
        let now = chrono::Utc::now().timestamp();
        let expired = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &Claims {
                sub: Some("user".to_string()),
                exp: now - 60,
                iat: now - 3660,
            },
            &jsonwebtoken::EncodingKey::from_secret(state.config.signing_secret.as_bytes()),
        )
        .unwrap();

        let cases: Vec<Option<String>> = vec![
            None,                                // missing
            Some("Bearer null".to_string()),     // placeholder
            Some("Bearer not-a-jwt".to_string()), // malformed
            Some(format!("Bearer {}", tampered)), // invalid signature
            Some(format!("Bearer {}", expired)),  // expired
        ];

        let mut bodies = Vec::new();
        for authorization in cases {
            let mut builder = Request::get("/users");
            if let Some(value) = &authorization {
                builder = builder.header(header::AUTHORIZATION, value);
            }
            let response = router
                .clone()
                .oneshot(builder.body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "case {:?} should be denied",
                authorization
            );
            bodies.push(body_bytes(response).await);
        }

        // Every rejection kind yields the identical response body
        for body in &bodies[1..] {
            assert_eq!(body, &bodies[0]);
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_over_http() {
        let state = test_state();
        let router = build_router(state);

        let request = || {
            json_request(
                "POST",
                "/auth/register",
                serde_json::json!({
                    "username": "ada",
                    "display_name": "Ada Lovelace",
                    "secret": "hunter2hunter2"
                }),
            )
        };

        let first = router.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = router.oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_input_is_400() {
        let router = build_router(test_state());

        let response = router
            .oneshot(json_request(
                "POST",
                "/auth/register",
                serde_json::json!({
                    "username": "ada",
                    "display_name": "",
                    "secret": "hunter2hunter2"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_password_change_over_http() {
        let state = test_state();
        let (user_id, token) = register_and_login(&state).await;
        let router = build_router(state);

        let mut request = json_request(
            "PUT",
            &format!("/users/{}/password", user_id),
            serde_json::json!({
                "current_secret": "hunter2hunter2",
                "new_secret": "a-much-better-secret"
            }),
        );
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );

        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Old secret no longer authenticates
        let response = router
            .oneshot(json_request(
                "POST",
                "/auth/login",
                serde_json::json!({
                    "username": "ada",
                    "secret": "hunter2hunter2"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
