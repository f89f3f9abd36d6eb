//! Local SQLite storage for the client.
//!
//! A single chat client still benefits from WAL mode: the interactive loop
//! can read persisted identity while a login or logout is writing it. Reads
//! and writes go through separate pools so every write is serialized on one
//! connection while reads never queue behind it.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Reader/writer pool pair over one SQLite file.
///
/// The writer pool holds exactly one connection; the reader pool is small
/// (4 connections) since this is a single-user client, not a server.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open the database at `database_url`, creating the file if needed,
    /// and bring the schema up to date.
    ///
    /// Migrations run on the writer connection before the read-only pool
    /// opens, so readers never see a half-migrated file.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5))
            .create_if_missing(true);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;

        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options.read_only(true))
            .await?;

        Ok(Self { reader, writer })
    }
}

/// Connection URL for the client database inside [`default_data_dir`].
pub fn default_database_url() -> String {
    format!("sqlite://{}/charla.db?mode=rwc", default_data_dir())
}

/// Data directory: `CHARLA_DATA_DIR` if set, else `~/.charla`.
pub fn default_data_dir() -> String {
    std::env::var("CHARLA_DATA_DIR").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{home}/.charla")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_pool(dir: &tempfile::TempDir, file: &str) -> DatabasePool {
        let url = format!("sqlite://{}?mode=rwc", dir.path().join(file).display());
        DatabasePool::new(&url).await.unwrap()
    }

    #[tokio::test]
    async fn test_migrations_create_auth_store() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_pool(&dir, "fresh.db").await;

        let count: (i64,) = sqlx::query_as(
            "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'auth_store'",
        )
        .fetch_one(&pool.reader)
        .await
        .unwrap();

        assert_eq!(count.0, 1, "auth_store table missing after migration");
    }

    #[tokio::test]
    async fn test_write_visible_through_reader_pool() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_pool(&dir, "split.db").await;

        sqlx::query("INSERT INTO auth_store (key, value, updated_at) VALUES ('k', 'v', 'now')")
            .execute(&pool.writer)
            .await
            .unwrap();

        let row: (String,) = sqlx::query_as("SELECT value FROM auth_store WHERE key = 'k'")
            .fetch_one(&pool.reader)
            .await
            .unwrap();

        assert_eq!(row.0, "v");
    }

    #[tokio::test]
    async fn test_journal_mode_is_wal() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_pool(&dir, "journal.db").await;

        let mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();

        assert_eq!(mode.0.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_default_database_url_shape() {
        let url = default_database_url();
        assert!(url.starts_with("sqlite://"));
        assert!(url.ends_with("charla.db?mode=rwc"));
    }
}
