// SQLite Ledger Implementation

use crate::error::{map_sqlx_error, map_transaction_error};
use crate::SqliteLedgerTransaction;
use async_trait::async_trait;
use schemup_core::domain::Version;
use schemup_core::error::{AppError, Result};
use schemup_core::port::{Ledger, LedgerTransaction};
use sqlx::SqlitePool;
use tracing::debug;

const CREATE_LEDGER_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_version (
        major INTEGER NOT NULL,
        minor INTEGER NOT NULL,
        fix INTEGER NOT NULL,
        CONSTRAINT schema_version_pkey PRIMARY KEY (major, minor, fix)
    )
"#;

pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_LEDGER_TABLE)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        debug!("Ledger table schema_version ready");
        Ok(())
    }

    async fn begin_transaction(&self) -> Result<Box<dyn LedgerTransaction>> {
        // IMMEDIATE takes the write lock up front: a second runner waits on
        // the busy timeout and then sees the committed ledger row
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(map_transaction_error)?;
        Ok(Box::new(SqliteLedgerTransaction::new(tx)))
    }

    async fn applied_versions(&self) -> Result<Vec<Version>> {
        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        if tables == 0 {
            return Ok(Vec::new());
        }

        let rows: Vec<(i64, i64, i64)> = sqlx::query_as(
            "SELECT major, minor, fix FROM schema_version ORDER BY major, minor, fix",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|(major, minor, fix)| {
                Ok(Version::new(
                    component(major)?,
                    component(minor)?,
                    component(fix)?,
                ))
            })
            .collect()
    }
}

/// Rows written by other tools may hold values a `Version` cannot
fn component(value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| AppError::Database(format!("invalid version component in ledger: {}", value)))
}
