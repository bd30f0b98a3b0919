//! SQLite pool setup, migrations, and cross-domain maintenance.

use anyhow::{Context as _, Result};
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};

use crate::design::DesignStore;
use crate::files::FileStore;
use crate::messages::MessageStorage;
use crate::project::ProjectStorage;

/// Default timeout for individual SQLite queries.
/// Prevents hung queries from blocking the host indefinitely.
const QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Execute a future with the standard query timeout.
async fn with_timeout<T>(fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "database query timed out after {}s",
            QUERY_TIMEOUT.as_secs()
        )),
    }
}

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("builderd.db");
        let opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);
        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::migrate!("src/storage/migrations")
            .run(pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    // ─── Domain stores ──────────────────────────────────────────────────────

    pub fn projects(&self) -> ProjectStorage {
        ProjectStorage::new(self.pool.clone())
    }

    pub fn files(&self) -> FileStore {
        FileStore::new(self.pool.clone())
    }

    pub fn design(&self) -> DesignStore {
        DesignStore::new(self.pool.clone())
    }

    pub fn messages(&self) -> MessageStorage {
        MessageStorage::new(self.pool.clone())
    }

    // ─── Settings ───────────────────────────────────────────────────────────

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(v,)| v))
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ─── Maintenance ────────────────────────────────────────────────────────

    /// Delete projects untouched for more than `days` days and return the
    /// count. Their files, design elements, and messages go with them via
    /// foreign-key cascade. Pass `0` to skip pruning.
    pub async fn prune_stale_projects(&self, days: u32) -> Result<u64> {
        if days == 0 {
            return Ok(0);
        }
        with_timeout(async {
            let cutoff = (chrono::Utc::now() - chrono::Duration::days(days as i64)).to_rfc3339();
            let n = sqlx::query("DELETE FROM projects WHERE updated_at < ?")
                .bind(&cutoff)
                .execute(&self.pool)
                .await?
                .rows_affected();
            Ok(n)
        })
        .await
    }

    /// Run SQLite VACUUM to reclaim disk space after pruning.
    pub async fn vacuum(&self) -> Result<()> {
        sqlx::query("VACUUM").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-memory pool with the schema applied, for unit tests.
///
/// One connection only, since every connection to `sqlite::memory:` is its
/// own empty database.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true);
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .unwrap();
    // Run the migration SQL directly
    let migration = include_str!("migrations/0001_init.sql");
    for stmt in migration.split(';') {
        let stmt = stmt.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt).execute(&pool).await.unwrap();
        }
    }
    pool
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_and_migrates_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).await.unwrap();
        // Re-opening against the same directory is fine; migrations are
        // recorded and not re-applied.
        drop(storage);
        let storage = Storage::new(dir.path()).await.unwrap();
        assert_eq!(storage.projects().list().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn settings_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).await.unwrap();
        assert!(storage.get_setting("active_project").await.unwrap().is_none());
        storage.set_setting("active_project", "p1").await.unwrap();
        assert_eq!(
            storage.get_setting("active_project").await.unwrap().as_deref(),
            Some("p1")
        );
        storage.set_setting("active_project", "p2").await.unwrap();
        assert_eq!(
            storage.get_setting("active_project").await.unwrap().as_deref(),
            Some("p2")
        );
    }
}
