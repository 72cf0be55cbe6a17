use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::services::auth::store::{CredentialStore, StoreError};
use crate::services::cache::CacheError;

/// In-process session store for tests. `fail` simulates an unreachable backend.
#[derive(Default)]
pub struct MemoryCredentialStore {
    tokens: RwLock<HashSet<String>>,
    fail: bool,
}

impl MemoryCredentialStore {
    pub fn with_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: RwLock::new(tokens.into_iter().map(Into::into).collect()),
            fail: false,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn revoke(&self, token: &str) {
        self.tokens.write().unwrap().remove(token);
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn contains_token(&self, token: &str) -> Result<bool, StoreError> {
        if self.fail {
            return Err(CacheError::BackendConnection("store unreachable".into()).into());
        }
        Ok(self.tokens.read().unwrap().contains(token))
    }
}
