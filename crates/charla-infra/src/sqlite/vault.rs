//! SQLite-backed auth vault.
//!
//! Implements `AuthVault` from `charla-core` on the `auth_store` table.
//! The token pair is stored under the `access_token` and `refresh_token`
//! keys; the user record is stored as JSON under `user_data`. The three
//! rows are written together so a load either yields a complete identity
//! or nothing.

use chrono::Utc;
use sqlx::Row;
use tracing::warn;

use charla_core::storage::AuthVault;
use charla_types::error::StorageError;
use charla_types::identity::{StoredAuth, TokenPair, User};

use super::pool::DatabasePool;

const KEY_ACCESS: &str = "access_token";
const KEY_REFRESH: &str = "refresh_token";
const KEY_USER: &str = "user_data";

/// SQLite-backed implementation of `AuthVault`.
pub struct SqliteAuthVault {
    pool: DatabasePool,
}

impl SqliteAuthVault {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM auth_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let value: String = row
                    .try_get("value")
                    .map_err(|e| StorageError::Query(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"INSERT INTO auth_store (key, value, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StorageError::Query(e.to_string()))?;

        Ok(())
    }
}

impl AuthVault for SqliteAuthVault {
    async fn load(&self) -> Result<Option<StoredAuth>, StorageError> {
        let access = self.get_value(KEY_ACCESS).await?;
        let refresh = self.get_value(KEY_REFRESH).await?;
        let user = self.get_value(KEY_USER).await?;

        let (Some(access), Some(refresh), Some(user_json)) = (access, refresh, user) else {
            return Ok(None);
        };

        let user: User = match serde_json::from_str(&user_json) {
            Ok(user) => user,
            Err(err) => {
                // A corrupt user record is treated as logged out rather
                // than wedging every startup.
                warn!(error = %err, "Stored user record is unreadable; ignoring saved session");
                return Ok(None);
            }
        };

        Ok(Some(StoredAuth {
            tokens: TokenPair { access, refresh },
            user,
        }))
    }

    async fn store(&self, auth: &StoredAuth) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(&auth.user)
            .map_err(|e| StorageError::Query(format!("failed to serialize user: {e}")))?;

        self.set_value(KEY_ACCESS, &auth.tokens.access).await?;
        self.set_value(KEY_REFRESH, &auth.tokens.refresh).await?;
        self.set_value(KEY_USER, &user_json).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM auth_store WHERE key IN (?, ?, ?)")
            .bind(KEY_ACCESS)
            .bind(KEY_REFRESH)
            .bind(KEY_USER)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The TempDir is returned so it outlives the open pool and cleans up
    // when the test drops it.
    async fn test_vault() -> (SqliteAuthVault, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let vault = SqliteAuthVault::new(DatabasePool::new(&url).await.unwrap());
        (vault, dir)
    }

    fn sample_auth() -> StoredAuth {
        StoredAuth {
            tokens: TokenPair {
                access: "a.b.c".to_string(),
                refresh: "d.e.f".to_string(),
            },
            user: User {
                id: 3,
                username: "ana".to_string(),
                email: "ana@example.com".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_store_load_roundtrip() {
        let (vault, _dir) = test_vault().await;
        vault.store(&sample_auth()).await.unwrap();

        let loaded = vault.load().await.unwrap().unwrap();
        assert_eq!(loaded.tokens.access, "a.b.c");
        assert_eq!(loaded.tokens.refresh, "d.e.f");
        assert_eq!(loaded.user.username, "ana");
    }

    #[tokio::test]
    async fn test_load_empty_returns_none() {
        let (vault, _dir) = test_vault().await;
        assert!(vault.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_overwrites() {
        let (vault, _dir) = test_vault().await;
        vault.store(&sample_auth()).await.unwrap();

        let mut updated = sample_auth();
        updated.tokens.access = "x.y.z".to_string();
        vault.store(&updated).await.unwrap();

        let loaded = vault.load().await.unwrap().unwrap();
        assert_eq!(loaded.tokens.access, "x.y.z");
    }

    #[tokio::test]
    async fn test_clear_removes_identity() {
        let (vault, _dir) = test_vault().await;
        vault.store(&sample_auth()).await.unwrap();
        vault.clear().await.unwrap();
        assert!(vault.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_when_empty_is_noop() {
        let (vault, _dir) = test_vault().await;
        vault.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_partial_row_set_loads_none() {
        let (vault, _dir) = test_vault().await;
        vault.set_value(KEY_ACCESS, "a.b.c").await.unwrap();
        assert!(vault.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_user_record_loads_none() {
        let (vault, _dir) = test_vault().await;
        vault.set_value(KEY_ACCESS, "a.b.c").await.unwrap();
        vault.set_value(KEY_REFRESH, "d.e.f").await.unwrap();
        vault.set_value(KEY_USER, "not json {").await.unwrap();
        assert!(vault.load().await.unwrap().is_none());
    }
}
