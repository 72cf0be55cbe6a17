//! Per-route authorization guard.
//!
//! Each protected route gets its own guard bound to one `(claim, value)` requirement.
//! A request passes through a single linear evaluation, and every failure ends it:
//!
//! 1. `Authorization` header present (401) and shaped `<scheme> <token>` (400)
//! 2. token verified: HMAC algorithms only, valid signature, not expired (400)
//! 3. session record exists for the exact raw token (401, also on store failure)
//! 4. payload readable as a claim mapping (400)
//! 5. claim equals the required value (403)
//!
//! On success the claims are put in request extensions for `AuthorizedClaims`.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::api::v1::extractors::AuthorizedClaims;
use crate::error::AppError;
use crate::middleware::auth::bearer;
use crate::services::auth::store::CredentialStore;
use crate::services::auth::verifier::token_fingerprint;
use crate::services::auth::{ClaimRequirement, ClaimSet, TokenVerifier};
use crate::state::AppState;

#[derive(Clone)]
pub struct AuthGuard {
    requirement: Arc<ClaimRequirement>,
    verifier: Arc<TokenVerifier>,
    store: Arc<dyn CredentialStore>,
}

impl AuthGuard {
    pub fn new(
        requirement: ClaimRequirement,
        verifier: Arc<TokenVerifier>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            requirement: Arc::new(requirement),
            verifier,
            store,
        }
    }

    /// Guard sharing the verifier and store held in `state`.
    pub fn require(state: &AppState, claim: &str, value: &str) -> Self {
        Self::new(
            ClaimRequirement::new(claim, value),
            state.verifier.clone(),
            state.store.clone(),
        )
    }

    pub async fn authorize(&self, headers: &HeaderMap) -> Result<ClaimSet, AppError> {
        let token = bearer::parse_authorization(headers).map_err(|err| {
            tracing::debug!(reason = %err, "authorization header rejected");
            AppError::from(err)
        })?;

        let fingerprint = token_fingerprint(token);

        let verified = self.verifier.verify(token).map_err(|err| {
            if err.is_client_error() {
                tracing::warn!(token = %fingerprint, error = %err, "access token verification failed");
                AppError::InvalidToken
            } else {
                tracing::error!(error = %err, "access token could not be verified");
                AppError::Internal
            }
        })?;

        let algorithm = verified.algorithm;

        // Revocation check: a well-signed token without a live record is unknown to us.
        let known = self.store.contains_token(token).await.map_err(|err| {
            tracing::error!(
                backend = self.store.backend_name(),
                token = %fingerprint,
                error = %err,
                "credential store lookup failed"
            );
            AppError::unauthenticated("unauthorized")
        })?;

        if !known {
            tracing::warn!(token = %fingerprint, "no session record for token");
            return Err(AppError::unauthenticated("unauthorized"));
        }

        let claims = ClaimSet::try_from(verified.payload).map_err(|err| {
            tracing::warn!(token = %fingerprint, error = %err, "unreadable token claims");
            AppError::malformed("token claims are malformed")
        })?;

        if !claims.satisfies(&self.requirement) {
            tracing::warn!(
                token = %fingerprint,
                claim = self.requirement.name(),
                "claim requirement not met"
            );
            return Err(AppError::Forbidden);
        }

        tracing::debug!(
            token = %fingerprint,
            alg = ?algorithm,
            claim = self.requirement.name(),
            claims = claims.len(),
            "authorized"
        );
        Ok(claims)
    }
}

/// Protect `route` with `guard`.
///
/// ```ignore
/// let admin = AuthGuard::require(&state, "admin", "true");
/// router.route("/items", guard::apply(post(create_item), admin));
/// ```
pub fn apply<S>(route: MethodRouter<S>, guard: AuthGuard) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    // route_layer: unmatched methods still get 405 instead of an auth error
    route.route_layer(middleware::from_fn_with_state(guard, guard_middleware))
}

async fn guard_middleware(
    State(guard): State<AuthGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = guard.authorize(req.headers()).await?;

    req.extensions_mut().insert(AuthorizedClaims(claims));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::{
        Json, Router,
        body::Body,
        http::{StatusCode, header},
        routing::get,
    };
    use jsonwebtoken::Algorithm;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::services::auth::store::memory::MemoryCredentialStore;
    use crate::services::auth::verifier::testing::{forge, sign};
    use crate::services::auth::claims::ClaimValue;
    use crate::services::auth::{AlgorithmPolicy, StaticSecret};

    const SECRET: &str = "s3cr3t";

    fn verifier() -> Arc<TokenVerifier> {
        Arc::new(TokenVerifier::new(
            AlgorithmPolicy::hmac(),
            Arc::new(StaticSecret::new(SECRET.into())),
            0,
        ))
    }

    async fn echo(AuthorizedClaims(claims): AuthorizedClaims) -> Json<ClaimSet> {
        Json(claims)
    }

    fn app(store: Arc<MemoryCredentialStore>, claim: &str, value: &str) -> Router {
        let guard = AuthGuard::new(ClaimRequirement::new(claim, value), verifier(), store);
        Router::new().route("/protected", apply(get(echo), guard))
    }

    fn request(authorization: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, authorization: Option<&str>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(request(authorization)).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn admin_token() -> String {
        sign(Algorithm::HS256, SECRET, &json!({"admin": "true"}))
    }

    #[tokio::test]
    async fn scenario_admin_true() {
        let token = admin_token();
        let store = Arc::new(MemoryCredentialStore::with_tokens([token.clone()]));
        let bearer = format!("Bearer {token}");

        let (status, body) = send(&app(store.clone(), "admin", "true"), Some(&bearer)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"admin": "true"}));

        let (status, body) = send(&app(store.clone(), "admin", "false"), Some(&bearer)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");

        store.revoke(&token);
        let (status, _) = send(&app(store.clone(), "admin", "true"), Some(&bearer)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let unsigned = forge(&json!({"alg": "none", "typ": "JWT"}), &json!({"admin": "true"}), b"");
        let store = Arc::new(MemoryCredentialStore::with_tokens([unsigned.clone()]));
        let (status, body) = send(
            &app(store, "admin", "true"),
            Some(&format!("Bearer {unsigned}")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn scheme_word_does_not_affect_the_outcome() {
        let token = admin_token();
        let store = Arc::new(MemoryCredentialStore::with_tokens([token.clone()]));
        let app = app(store, "admin", "true");

        for scheme in ["Bearer", "Token", "JWT", "bearer"] {
            let (status, body) = send(&app, Some(&format!("{scheme} {token}"))).await;
            assert_eq!(status, StatusCode::OK, "{scheme}");
            assert_eq!(body, json!({"admin": "true"}));
        }
    }

    #[tokio::test]
    async fn missing_header_is_unauthenticated() {
        let store = Arc::new(MemoryCredentialStore::with_tokens([admin_token()]));
        let (status, body) = send(&app(store, "admin", "true"), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
        assert_eq!(body["error"]["message"], "missing Authorization header");
    }

    #[tokio::test]
    async fn header_without_separator_is_malformed() {
        let token = admin_token();
        let store = Arc::new(MemoryCredentialStore::with_tokens([token.clone()]));
        let app = app(store, "admin", "true");

        for value in [token.as_str(), "Bearer", "garbage"] {
            let (status, body) = send(&app, Some(value)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{value:?}");
            assert_eq!(body["error"]["code"], "MALFORMED_REQUEST");
        }
    }

    #[tokio::test]
    async fn non_hmac_algorithm_never_authorizes() {
        // Present in the store and carrying the right claim: only the algorithm is wrong.
        let tokens = [
            forge(&json!({"alg": "RS256", "typ": "JWT"}), &json!({"admin": "true"}), b"sig"),
            forge(&json!({"alg": "ES256", "typ": "JWT"}), &json!({"admin": "true"}), b"sig"),
            forge(&json!({"alg": "EdDSA", "typ": "JWT"}), &json!({"admin": "true"}), b"sig"),
        ];
        let store = Arc::new(MemoryCredentialStore::with_tokens(tokens.clone()));
        let app = app(store, "admin", "true");

        for token in &tokens {
            let (status, body) = send(&app, Some(&format!("Bearer {token}"))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["message"], "invalid token");
        }
    }

    #[tokio::test]
    async fn bad_signature_and_expiry_are_invalid_tokens() {
        let now = chrono::Utc::now().timestamp();
        let forged = sign(Algorithm::HS256, "guessed", &json!({"admin": "true"}));
        let expired = sign(
            Algorithm::HS256,
            SECRET,
            &json!({"admin": "true", "exp": now - 60}),
        );
        let store = Arc::new(MemoryCredentialStore::with_tokens([
            forged.clone(),
            expired.clone(),
        ]));
        let app = app(store, "admin", "true");

        for token in [&forged, &expired] {
            let (status, body) = send(&app, Some(&format!("Bearer {token}"))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "INVALID_TOKEN");
        }
    }

    #[tokio::test]
    async fn valid_signature_without_record_is_unauthenticated() {
        let store = Arc::new(MemoryCredentialStore::default());
        let token = admin_token();

        let (status, body) = send(
            &app(store, "admin", "true"),
            Some(&format!("Bearer {token}")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "unauthorized");
    }

    #[tokio::test]
    async fn store_failure_fails_closed() {
        let store = Arc::new(MemoryCredentialStore::unreachable());
        let token = admin_token();

        let (status, _) = send(
            &app(store, "admin", "true"),
            Some(&format!("Bearer {token}")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_claim_is_forbidden() {
        let token = sign(Algorithm::HS256, SECRET, &json!({"sub": "user-1"}));
        let store = Arc::new(MemoryCredentialStore::with_tokens([token.clone()]));

        let (status, _) = send(
            &app(store, "admin", "true"),
            Some(&format!("Bearer {token}")),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn boolean_claim_matches_string_requirement() {
        let token = sign(
            Algorithm::HS512,
            SECRET,
            &json!({"admin": true, "iss": "metalab-events-backend"}),
        );
        let store = Arc::new(MemoryCredentialStore::with_tokens([token.clone()]));
        let bearer = format!("Bearer {token}");

        let (status, body) = send(&app(store.clone(), "admin", "true"), Some(&bearer)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["admin"], true);

        let (status, _) = send(
            &app(store, "iss", "metalab-events-backend"),
            Some(&bearer),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn repeated_and_concurrent_evaluations_agree() {
        let allowed = admin_token();
        let denied = sign(Algorithm::HS256, SECRET, &json!({"admin": "false"}));
        let store = Arc::new(MemoryCredentialStore::with_tokens([
            allowed.clone(),
            denied.clone(),
        ]));
        let app = app(store, "admin", "true");

        let mut handles = Vec::new();
        for i in 0..32 {
            let app = app.clone();
            let bearer = format!("Bearer {}", if i % 2 == 0 { &allowed } else { &denied });
            handles.push(tokio::spawn(async move {
                let res = app.oneshot(request(Some(&bearer))).await.unwrap();
                (i, res.status())
            }));
        }

        for handle in handles {
            let (i, status) = handle.await.unwrap();
            let expected = if i % 2 == 0 {
                StatusCode::OK
            } else {
                StatusCode::FORBIDDEN
            };
            assert_eq!(status, expected);
        }
    }

    #[tokio::test]
    async fn authorize_returns_claims_directly() {
        let token = admin_token();
        let guard = AuthGuard::new(
            ClaimRequirement::new("admin", "true"),
            verifier(),
            Arc::new(MemoryCredentialStore::with_tokens([token.clone()])),
        );

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );

        let first = guard.authorize(&headers).await.unwrap();
        let second = guard.authorize(&headers).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.get("admin"), Some(&ClaimValue::Str("true".to_string())));
    }
}
