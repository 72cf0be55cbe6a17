//! `Authorization: <scheme> <token>` parsing.
use axum::http::{HeaderMap, header};
use thiserror::Error;

use crate::error::AppError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BearerError {
    #[error("missing Authorization header")]
    Missing,
    #[error("Authorization header is not visible ASCII")]
    NotAscii,
    #[error("Authorization header has no scheme/token separator")]
    NoSeparator,
    #[error("empty bearer token")]
    EmptyToken,
}

impl From<BearerError> for AppError {
    fn from(e: BearerError) -> Self {
        match e {
            BearerError::Missing => AppError::unauthenticated("missing Authorization header"),
            _ => AppError::malformed("malformed Authorization header"),
        }
    }
}

/// Extract the bearer token.
///
/// An empty header counts as absent. The scheme word is not checked. The token is the
/// text between the first space and the next one, so `Bearer a b` yields `a`.
pub fn parse_authorization(headers: &HeaderMap) -> Result<&str, BearerError> {
    let raw = match headers.get(header::AUTHORIZATION) {
        None => return Err(BearerError::Missing),
        Some(v) if v.is_empty() => return Err(BearerError::Missing),
        Some(v) => v.to_str().map_err(|_| BearerError::NotAscii)?,
    };

    let (_scheme, rest) = raw.split_once(' ').ok_or(BearerError::NoSeparator)?;

    let token = rest.split(' ').next().unwrap_or_default();
    if token.is_empty() {
        return Err(BearerError::EmptyToken);
    }

    Ok(token)
}
