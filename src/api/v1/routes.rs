/*
 * Responsibility
 * - URL layout
 * - Which routes are guarded, and by which (claim, value) requirement
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, token::validate_token};
use crate::middleware::auth::{AuthGuard, guard};
use crate::state::AppState;

pub fn routes(state: &AppState, auth_issuer: &str) -> Router<AppState> {
    let issued_by_us = AuthGuard::require(state, "iss", auth_issuer);

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/token/validate",
            guard::apply(get(validate_token), issued_by_us),
        )
}
