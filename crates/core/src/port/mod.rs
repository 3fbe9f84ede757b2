// Port Layer - Interfaces for external dependencies

pub mod ledger;
pub mod migration_source;
pub mod transaction;

// Re-exports
pub use ledger::{Ledger, LedgerTransaction};
pub use migration_source::MigrationSource;
pub use transaction::Transaction;
