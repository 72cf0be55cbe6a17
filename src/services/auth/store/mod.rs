//! Persisted session lookup by raw token string.
//!
//! A record's presence means "this exact token is live". Deleting the record revokes
//! the token even though its signature stays valid.
use async_trait::async_trait;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::cache::CacheError;

#[cfg(test)]
pub mod memory;
pub mod valkey;

pub use valkey::ValkeyCredentialStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Lookup contract the guard depends on.
///
/// - `Ok(true)`:  a record exists for exactly this token
/// - `Ok(false)`: no record (never issued, expired server-side, or revoked)
/// - `Err(_)`:    backend failure; callers must fail closed
#[async_trait]
pub trait CredentialStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn contains_token(&self, token: &str) -> Result<bool, StoreError>;
}
