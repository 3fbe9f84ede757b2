// Central Error Type for the Application

use crate::domain::Version;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("No migrations found in {0}")]
    NoMigrationsFound(String),

    #[error("Failed to read migrations from {path}: {source}")]
    DiscoveryIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Version {0} is already recorded in the ledger")]
    DuplicateVersion(Version),

    #[error("Statement {statement:?} failed: {cause}")]
    ExecutionFailure { statement: String, cause: String },

    #[error("Transaction error: {0}")]
    TransactionFailure(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A migration failed inside its transaction; the transaction was rolled back
    #[error("Migration {version} ({source_name}) failed: {source}")]
    MigrationFailed {
        version: Version,
        source_name: String,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// True when discovery found nothing to apply
    ///
    /// Callers that treat an empty migrations directory as a no-op check this
    /// instead of matching on the variant.
    pub fn is_no_migrations(&self) -> bool {
        matches!(self, AppError::NoMigrationsFound(_))
    }

    /// The innermost error, looking through `MigrationFailed`
    pub fn root(&self) -> &AppError {
        match self {
            AppError::MigrationFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// Version of the migration that failed, if any
    pub fn failed_version(&self) -> Option<Version> {
        match self {
            AppError::MigrationFailed { version, .. } => Some(*version),
            _ => None,
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_failed_message_names_version_and_cause() {
        let err = AppError::MigrationFailed {
            version: Version::new(1, 0, 0),
            source_name: "migrations/01-00-0000-broken.sql".to_string(),
            source: Box::new(AppError::ExecutionFailure {
                statement: "main".to_string(),
                cause: "no such table: nope".to_string(),
            }),
        };

        let msg = err.to_string();
        assert!(msg.contains("1.0.0"));
        assert!(msg.contains("01-00-0000-broken.sql"));
        assert!(msg.contains("no such table: nope"));
        assert_eq!(err.failed_version(), Some(Version::new(1, 0, 0)));
        assert!(matches!(err.root(), AppError::ExecutionFailure { .. }));
    }

    #[test]
    fn test_is_no_migrations() {
        assert!(AppError::NoMigrationsFound("migrations".to_string()).is_no_migrations());
        assert!(!AppError::Database("boom".to_string()).is_no_migrations());
    }
}
