// Migrator Service - applies migrations and reports their state

pub mod apply;
pub mod status;

#[cfg(test)]
mod test_support;

pub use apply::MigrationReport;
pub use status::{MigrationState, MigrationStatus};

use crate::error::Result;
use crate::port::{Ledger, MigrationSource};
use std::sync::Arc;

/// Migration runner bound to one ledger
pub struct Migrator {
    ledger: Arc<dyn Ledger>,
}

impl Migrator {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// Apply every migration from `source` that the ledger has not seen
    ///
    /// Stops at the first failing migration. Migrations committed before the
    /// failure stay committed.
    pub async fn run(&self, source: &dyn MigrationSource) -> Result<MigrationReport> {
        apply::execute(self.ledger.as_ref(), source).await
    }

    /// Applied / pending state of every migration in `source`
    pub async fn status(&self, source: &dyn MigrationSource) -> Result<Vec<MigrationStatus>> {
        status::execute(self.ledger.as_ref(), source).await
    }
}
