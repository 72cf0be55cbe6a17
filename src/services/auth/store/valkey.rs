use std::sync::Arc;

use async_trait::async_trait;

use crate::services::auth::store::{CredentialStore, StoreError};
use crate::services::cache::{CacheClient, CacheError, ValkeyClient};

/// Session store backed by Valkey (Redis protocol).
///
/// The issuer writes one key per live token, `<prefix>:<token>`, and deletes it (or lets
/// it expire) to revoke. Backend errors surface as `Err`; the guard fails closed on them.
#[derive(Clone)]
pub struct ValkeyCredentialStore<C: CacheClient> {
    cache: Arc<C>,
    prefix: String,
}

impl ValkeyCredentialStore<ValkeyClient> {
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, CacheError> {
        let client = ValkeyClient::new(url).await?;
        Ok(Self::new_with_cache(Arc::new(client), prefix))
    }
}

impl<C: CacheClient> ValkeyCredentialStore<C> {
    pub fn new_with_cache(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, token: &str) -> String {
        format!("{}:{}", self.prefix, token)
    }
}

#[async_trait]
impl<C: CacheClient> CredentialStore for ValkeyCredentialStore<C> {
    fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    async fn contains_token(&self, token: &str) -> Result<bool, StoreError> {
        Ok(self.cache.exists(&self.key(token)).await?)
    }
}
