//! Bearer token verification: structure, algorithm allow-list, HMAC signature, time claims.
//!
//! Claim requirements and the session lookup are not done here; the guard sequences those.
use std::sync::Arc;

use base64::Engine as _;
use jsonwebtoken::{Algorithm, Validation};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::services::auth::secret::{SecretError, SecretProvider};

/// Signing algorithms a token may declare in its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmPolicy {
    allowed: Vec<Algorithm>,
}

impl AlgorithmPolicy {
    /// HMAC family only (HS256/HS384/HS512).
    pub fn hmac() -> Self {
        Self::only(vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512])
    }

    pub fn only(allowed: Vec<Algorithm>) -> Self {
        Self { allowed }
    }

    pub fn permits(&self, alg: Algorithm) -> bool {
        self.allowed.contains(&alg)
    }

    pub fn allowed(&self) -> &[Algorithm] {
        &self.allowed
    }
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("malformed token: {0}")]
    Malformed(#[source] jsonwebtoken::errors::Error),
    #[error("disallowed signing algorithm: {0:?}")]
    DisallowedAlgorithm(Algorithm),
    #[error("token rejected: {0}")]
    Rejected(#[source] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Secret(#[from] SecretError),
}

impl VerifyError {
    /// `true` when the caller sent a bad token, `false` when we could not check it.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, VerifyError::Secret(_))
    }
}

/// Signature-checked token. The payload is still raw JSON; the guard reads it as claims
/// only after the session lookup succeeded.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub algorithm: Algorithm,
    pub payload: Value,
}

/// HMAC access-token verifier.
#[derive(Clone)]
pub struct TokenVerifier {
    policy: AlgorithmPolicy,
    secrets: Arc<dyn SecretProvider>,
    leeway_seconds: u64,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("policy", &self.policy)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(
        policy: AlgorithmPolicy,
        secrets: Arc<dyn SecretProvider>,
        leeway_seconds: u64,
    ) -> Self {
        Self {
            policy,
            secrets,
            leeway_seconds,
        }
    }

    pub fn policy(&self) -> &AlgorithmPolicy {
        &self.policy
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedToken, VerifyError> {
        verify(
            token,
            &self.policy,
            self.secrets.as_ref(),
            self.leeway_seconds,
        )
    }
}

/// Verify `token` against `policy` using the key handed out by `secrets`.
///
/// The header is checked against the allow-list before any key is requested, so a
/// token declaring e.g. RS256 or ES256 is refused even if its signature would check
/// out under that algorithm. `alg: none` fails header parsing and is reported as malformed.
///
/// `exp` and `nbf` are validated when present and not required otherwise.
pub fn verify(
    token: &str,
    policy: &AlgorithmPolicy,
    secrets: &dyn SecretProvider,
    leeway_seconds: u64,
) -> Result<VerifiedToken, VerifyError> {
    let header = jsonwebtoken::decode_header(token).map_err(VerifyError::Malformed)?;

    if !policy.permits(header.alg) {
        return Err(VerifyError::DisallowedAlgorithm(header.alg));
    }

    let key = secrets.decoding_key()?;

    let mut validation = Validation::new(header.alg);
    validation.algorithms = policy.allowed().to_vec();
    validation.required_spec_claims.clear();
    validation.validate_exp = true;
    validation.validate_nbf = true;
    // Issuer/audience are route-level claim requirements, not verifier policy.
    validation.validate_aud = false;
    validation.leeway = leeway_seconds;

    let data = jsonwebtoken::decode::<Value>(token, &key, &validation)
        .map_err(VerifyError::Rejected)?;

    Ok(VerifiedToken {
        algorithm: header.alg,
        payload: data.claims,
    })
}

/// Short, non-reversible token identifier for logs. Raw tokens are never logged.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(12);
    encoded
}
