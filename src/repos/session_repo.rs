/*
 * Responsibility
 * - Point lookup of a live session by its raw token string (users.token)
 * - Rows are created and cleared by the issuing service; nothing is written here
 */
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::repos::error::{RepoError, RepoResult};
use crate::services::auth::store::{CredentialStore, StoreError};

#[derive(Clone, Debug)]
pub struct PgSessionRepo {
    pool: PgPool,
}

impl PgSessionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> RepoResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn token_exists(&self, token: &str) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM users
                WHERE token = $1
            )
            "#,
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::Db)?;

        Ok(exists)
    }
}

#[async_trait]
impl CredentialStore for PgSessionRepo {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn contains_token(&self, token: &str) -> Result<bool, StoreError> {
        Ok(self.token_exists(token).await?)
    }
}
