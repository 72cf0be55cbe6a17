/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Clone is cheap (Arc inside); guards are built from it at route registration
 */
use std::sync::Arc;

use crate::services::auth::{CredentialStore, TokenVerifier};

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<TokenVerifier>,
    pub store: Arc<dyn CredentialStore>,
}

impl AppState {
    pub fn new(verifier: Arc<TokenVerifier>, store: Arc<dyn CredentialStore>) -> Self {
        Self { verifier, store }
    }
}
