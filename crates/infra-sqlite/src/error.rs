// sqlx::Error -> AppError mapping
//
// Lives here because of the orphan rule: core cannot implement
// From<sqlx::Error> for AppError without depending on sqlx.

use schemup_core::domain::Version;
use schemup_core::error::AppError;

// SQLite extended result codes: https://www.sqlite.org/rescode.html
const SQLITE_CONSTRAINT_PRIMARYKEY: &str = "1555";
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";
const SQLITE_BUSY: &str = "5";
const SQLITE_BUSY_SNAPSHOT: &str = "517";
const SQLITE_FULL: &str = "13";

/// Readable description with the SQLite result code when there is one
pub(crate) fn describe(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => match code.as_ref() {
                SQLITE_CONSTRAINT_PRIMARYKEY | SQLITE_CONSTRAINT_UNIQUE => {
                    format!("Unique constraint violation: {} ({})", db_err.message(), code)
                }
                SQLITE_BUSY | SQLITE_BUSY_SNAPSHOT => {
                    format!("Database locked ({}): {}", code, db_err.message())
                }
                SQLITE_FULL => format!("Database full: {}", db_err.message()),
                other => format!("[{}] {}", other, db_err.message()),
            },
            None => db_err.message().to_string(),
        },
        sqlx::Error::RowNotFound => "Row not found".to_string(),
        sqlx::Error::ColumnNotFound(col) => format!("Column not found: {}", col),
        // Connection, pool, protocol errors
        other => other.to_string(),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => matches!(
            db_err.code().as_deref(),
            Some(SQLITE_CONSTRAINT_PRIMARYKEY) | Some(SQLITE_CONSTRAINT_UNIQUE)
        ),
        _ => false,
    }
}

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    AppError::Database(describe(&err))
}

pub(crate) fn map_transaction_error(err: sqlx::Error) -> AppError {
    AppError::TransactionFailure(describe(&err))
}

/// Ledger insert: a key violation means the version is already recorded
pub(crate) fn map_insert_error(version: Version, err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        AppError::DuplicateVersion(version)
    } else {
        map_sqlx_error(err)
    }
}

pub(crate) fn map_execution_error(statement: &str, err: sqlx::Error) -> AppError {
    AppError::ExecutionFailure {
        statement: statement.to_string(),
        cause: describe(&err),
    }
}
