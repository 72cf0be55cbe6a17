//! Shared HMAC secret and the provider the verifier asks for it.
//!
//! The verifier never holds key material itself: it calls the provider on
//! every verification, so a rotating implementation can be dropped in without
//! touching the guard.
use std::fmt;
use std::sync::Arc;

use jsonwebtoken::DecodingKey;
use thiserror::Error;

/// Raw signing secret. Key material is intentionally not printable via Debug.
#[derive(Clone, PartialEq, Eq)]
pub struct JwtSecret(Arc<[u8]>);

impl JwtSecret {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<String> for JwtSecret {
    fn from(value: String) -> Self {
        Self(Arc::from(value.into_bytes()))
    }
}

impl From<&str> for JwtSecret {
    fn from(value: &str) -> Self {
        Self(Arc::from(value.as_bytes()))
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JwtSecret(<redacted>)")
    }
}

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("signing secret unavailable: {0}")]
    Unavailable(String),
}

pub trait SecretProvider: Send + Sync {
    /// Key used to check HMAC signatures for the token currently being verified.
    fn decoding_key(&self) -> Result<DecodingKey, SecretError>;
}

/// Provider over one secret fixed at startup.
#[derive(Clone, Debug)]
pub struct StaticSecret {
    secret: JwtSecret,
}

impl StaticSecret {
    pub fn new(secret: JwtSecret) -> Self {
        Self { secret }
    }
}

impl SecretProvider for StaticSecret {
    fn decoding_key(&self) -> Result<DecodingKey, SecretError> {
        Ok(DecodingKey::from_secret(self.secret.as_bytes()))
    }
}
