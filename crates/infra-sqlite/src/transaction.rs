// SQLite Ledger Transaction Implementation

use crate::error::{map_execution_error, map_insert_error, map_sqlx_error, map_transaction_error};
use async_trait::async_trait;
use schemup_core::domain::{Statement, Version};
use schemup_core::error::Result;
use schemup_core::port::{LedgerTransaction, Transaction};
use sqlx::{Executor, Sqlite, Transaction as SqlxTransaction};

/// One migration's transaction
///
/// Dropping it without `commit` rolls back (sqlx guard).
pub struct SqliteLedgerTransaction {
    tx: SqlxTransaction<'static, Sqlite>,
}

impl SqliteLedgerTransaction {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteLedgerTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_transaction_error)?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_transaction_error)?;
        Ok(())
    }
}

#[async_trait]
impl LedgerTransaction for SqliteLedgerTransaction {
    async fn is_applied(&mut self, version: Version) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM schema_version WHERE major = ? AND minor = ? AND fix = ?",
        )
        .bind(i64::from(version.major))
        .bind(i64::from(version.minor))
        .bind(i64::from(version.fix))
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(count > 0)
    }

    async fn mark_applied(&mut self, version: Version) -> Result<()> {
        sqlx::query("INSERT INTO schema_version (major, minor, fix) VALUES (?, ?, ?)")
            .bind(i64::from(version.major))
            .bind(i64::from(version.minor))
            .bind(i64::from(version.fix))
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_insert_error(version, e))?;

        Ok(())
    }

    async fn execute(&mut self, statement: &Statement) -> Result<()> {
        // raw_sql runs every command in the section, unlike a prepared query
        // Called through the trait so the future stays Send under async_trait
        Executor::execute(&mut *self.tx, sqlx::raw_sql(&statement.sql))
            .await
            .map_err(|e| map_execution_error(&statement.name, e))?;

        Ok(())
    }
}
