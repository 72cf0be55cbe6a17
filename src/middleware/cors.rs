//! CORS for browser clients.
//!
//! - No allowlist configured: any origin (the frontend is served from elsewhere).
//! - `CORS_ALLOWED_ORIGINS` set: exact-match allowlist.
//!
//! Credentials are never allowed; the bearer token travels in `Authorization`,
//! which must therefore be an allowed request header.

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;
use crate::middleware::http::REQUEST_ID_HEADER;

pub fn apply(router: Router, config: &Config) -> Router {
    let cors = if config.cors_allowed_origins.is_empty() {
        if config.app_env.is_production() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; allowing any origin");
        }
        CorsLayer::new().allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
    }
    .allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ])
    .allow_headers([
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        HeaderName::from_static(REQUEST_ID_HEADER),
    ])
    .max_age(std::time::Duration::from_secs(60 * 10));

    router.layer(cors)
}
