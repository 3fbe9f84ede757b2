// schemup Infrastructure - SQLite Adapter
// Implements: Ledger, LedgerTransaction

mod connection;
mod error;
mod ledger;
mod transaction;

pub use connection::{create_pool, ConnectionConfig};
pub use ledger::SqliteLedger;
pub use transaction::SqliteLedgerTransaction;
