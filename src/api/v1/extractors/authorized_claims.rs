use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::ClaimSet;

/// Claims of a request that passed an `AuthGuard`.
///
/// The guard inserts this into request extensions. A handler on an unguarded route
/// gets 401 instead of running without a principal.
#[derive(Debug, Clone)]
pub struct AuthorizedClaims(pub ClaimSet);

impl<S> FromRequestParts<S> for AuthorizedClaims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthorizedClaims>()
            .cloned()
            .ok_or(AppError::unauthenticated("unauthorized"))
    }
}
