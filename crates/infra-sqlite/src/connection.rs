// SQLite Connection Pool Setup

use crate::error::map_sqlx_error;
use schemup_core::error::{AppError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Pool settings
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// `sqlite:` URL, `sqlite::memory:` or a plain file path
    pub database_url: String,
    pub max_connections: u32,
    pub busy_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            // Migrations run one transaction at a time
            max_connections: 1,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Create SQLite connection pool with WAL mode and foreign keys enabled
///
/// The database file is created if it does not exist.
pub async fn create_pool(config: &ConnectionConfig) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| AppError::Config(format!("invalid database url {:?}: {}", config.database_url, e)))?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(config.busy_timeout)
        .foreign_keys(true)
        .create_if_missing(true);

    debug!(
        database_url = %config.database_url,
        max_connections = config.max_connections,
        "Opening SQLite pool"
    );

    SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .connect_with(options)
        .await
        .map_err(map_sqlx_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool_in_memory() {
        let pool = create_pool(&ConnectionConfig::default()).await.unwrap();
        assert!(pool.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn test_create_pool_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let config = ConnectionConfig {
            database_url: format!("sqlite://{}", path.display()),
            ..Default::default()
        };

        let pool = create_pool(&config).await.unwrap();
        sqlx::query("SELECT 1").execute(&pool).await.unwrap();

        assert!(path.exists());
    }
}
