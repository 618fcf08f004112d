// ABOUTME: Database connection management and shared state
// ABOUTME: Provides the SQLite pool and storage handles used by API handlers

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::storage::{LeadStorage, SqliteLeadStorage, StorageError, StorageResult};

/// Shared database state for API handlers
#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub lead_storage: Arc<SqliteLeadStorage>,
}

impl DbState {
    /// Create new database state from a SQLite pool
    pub fn new(pool: SqlitePool) -> Self {
        let lead_storage = Arc::new(SqliteLeadStorage::new(pool.clone()));
        Self { pool, lead_storage }
    }

    /// Open the database at `path`, configure it, and initialize the schema
    pub async fn connect(path: &Path) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }

        let database_url = format!("sqlite:{}", path.display());
        debug!("Connecting to database at: {}", database_url);

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(StorageError::Sqlx)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(StorageError::Sqlx)?;

        // Configure SQLite settings before first use
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let state = Self::new(pool);
        state.lead_storage.initialize().await?;

        Ok(state)
    }
}
