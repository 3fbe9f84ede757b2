// Applied-Version Ledger port

use super::transaction::Transaction;
use crate::domain::{Statement, Version};
use crate::error::Result;
use async_trait::async_trait;

/// Persistent record of applied migration versions
///
/// Implementations back this with a table keyed by (major, minor, fix).
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Create the ledger table if it does not exist
    ///
    /// Must succeed, without touching existing rows, when the table is already there.
    async fn ensure_schema(&self) -> Result<()>;

    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn LedgerTransaction>>;

    /// All recorded versions, ascending
    ///
    /// Read-only: a ledger whose table does not exist yet is empty.
    async fn applied_versions(&self) -> Result<Vec<Version>>;
}

/// Ledger operations within a transaction
///
/// The membership check, the insert and the migration statements all run on
/// the same transaction, so a migration and its ledger row commit together.
#[async_trait]
pub trait LedgerTransaction: Transaction {
    /// Whether `version` has a ledger row (within transaction)
    async fn is_applied(&mut self, version: Version) -> Result<bool>;

    /// Insert the ledger row for `version` (within transaction)
    ///
    /// Fails with `AppError::DuplicateVersion` if the row already exists.
    async fn mark_applied(&mut self, version: Version) -> Result<()>;

    /// Execute one migration statement (within transaction)
    async fn execute(&mut self, statement: &Statement) -> Result<()>;
}
