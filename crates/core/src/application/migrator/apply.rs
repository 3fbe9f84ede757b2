// Apply Use Case

use crate::domain::{Migration, StatementMap, Version};
use crate::error::{AppError, Result};
use crate::port::{Ledger, LedgerTransaction, MigrationSource};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// What a successful run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Versions committed by this run, in order
    pub applied: Vec<Version>,
    /// Versions already in the ledger
    pub skipped: Vec<Version>,
}

impl MigrationReport {
    /// True when the run changed nothing
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

enum Outcome {
    Applied,
    Skipped,
}

/// Execute the apply use case
///
/// Algorithm:
/// 1. Discover migrations (sorted by version)
/// 2. Ensure the ledger table exists, outside any migration transaction
/// 3. For each migration, in its own transaction:
///    begin -> check ledger -> mark -> execute statements -> commit
/// 4. On the first failure roll back that migration and stop
///
/// # Arguments
///
/// * `ledger` - Applied-version ledger (owns transactions)
/// * `source` - Where migrations are loaded from
pub async fn execute(ledger: &dyn Ledger, source: &dyn MigrationSource) -> Result<MigrationReport> {
    let migrations = source.discover().await?;
    info!(
        source = %source.location(),
        count = migrations.len(),
        "Discovered migrations"
    );

    ledger.ensure_schema().await?;

    let mut statements = StatementMap::new();
    let mut report = MigrationReport::default();

    for migration in &migrations {
        match apply_one(ledger, &mut statements, migration).await {
            Ok(Outcome::Applied) => {
                info!(
                    version = %migration.version,
                    source = %migration.source_name,
                    "Migration applied"
                );
                report.applied.push(migration.version);
            }
            Ok(Outcome::Skipped) => {
                info!(
                    version = %migration.version,
                    source = %migration.source_name,
                    "Migration already applied, skipping"
                );
                report.skipped.push(migration.version);
            }
            Err(e) => {
                error!(
                    version = %migration.version,
                    source = %migration.source_name,
                    error = %e,
                    "Migration failed, stopping"
                );
                return Err(e);
            }
        }
    }

    info!(
        applied = report.applied.len(),
        skipped = report.skipped.len(),
        "All migrations processed"
    );

    Ok(report)
}

/// One begin -> check -> mark -> execute -> commit cycle
async fn apply_one(
    ledger: &dyn Ledger,
    statements: &mut StatementMap,
    migration: &Migration,
) -> Result<Outcome> {
    let mut tx = ledger
        .begin_transaction()
        .await
        .map_err(|e| failed(migration, e))?;

    let applied = tx.is_applied(migration.version).await;
    match applied {
        Ok(true) => {
            // Nothing was written; the rollback only releases the transaction
            tx.rollback().await.map_err(|e| failed(migration, e))?;
            return Ok(Outcome::Skipped);
        }
        Ok(false) => {}
        Err(e) => return Err(abort(tx, migration, e).await),
    }

    let body = apply_body(tx.as_mut(), statements, migration).await;
    if let Err(e) = body {
        return Err(abort(tx, migration, e).await);
    }

    tx.commit().await.map_err(|e| failed(migration, e))?;
    Ok(Outcome::Applied)
}

/// Ledger row first, then the script, both on `tx`
async fn apply_body(
    tx: &mut dyn LedgerTransaction,
    statements: &mut StatementMap,
    migration: &Migration,
) -> Result<()> {
    tx.mark_applied(migration.version).await?;

    statements.clear();
    statements.parse(&migration.body)?;

    for statement in statements.iter() {
        debug!(
            version = %migration.version,
            statement = %statement.name,
            "Executing statement"
        );
        tx.execute(statement).await?;
    }

    Ok(())
}

/// Roll back and return the annotated cause
///
/// A failing rollback is logged; the caller still sees the error that caused it.
async fn abort(tx: Box<dyn LedgerTransaction>, migration: &Migration, cause: AppError) -> AppError {
    if let Err(rollback_err) = tx.rollback().await {
        warn!(
            version = %migration.version,
            error = %rollback_err,
            "Rollback failed"
        );
    }
    failed(migration, cause)
}

fn failed(migration: &Migration, cause: AppError) -> AppError {
    AppError::MigrationFailed {
        version: migration.version,
        source_name: migration.source_name.clone(),
        source: Box::new(cause),
    }
}
