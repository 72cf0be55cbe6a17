/*
 * Responsibility
 * - GET /api/token/validate
 * - Reaching the handler means the guard accepted the token; echo what it saw
 */
use axum::Json;
use serde::Serialize;

use crate::api::v1::extractors::AuthorizedClaims;
use crate::services::auth::ClaimSet;

#[derive(Debug, Serialize)]
pub struct ValidateTokenResponse {
    pub valid: bool,
    pub claims: ClaimSet,
}

pub async fn validate_token(
    AuthorizedClaims(claims): AuthorizedClaims,
) -> Json<ValidateTokenResponse> {
    Json(ValidateTokenResponse {
        valid: true,
        claims,
    })
}
