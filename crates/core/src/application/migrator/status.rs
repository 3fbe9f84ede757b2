// Status Use Case

use crate::domain::Version;
use crate::error::Result;
use crate::port::{Ledger, MigrationSource};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Where a version stands relative to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationState {
    /// In the source and in the ledger
    Applied,
    /// In the source, not yet in the ledger
    Pending,
    /// In the ledger with no matching migration in the source
    Orphaned,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationState::Applied => write!(f, "APPLIED"),
            MigrationState::Pending => write!(f, "PENDING"),
            MigrationState::Orphaned => write!(f, "ORPHANED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub version: Version,
    /// `None` for orphaned ledger rows
    pub source_name: Option<String>,
    pub state: MigrationState,
}

/// Execute the status use case
///
/// Returns one entry per discovered migration plus one per orphaned ledger
/// version, merged ascending by version. Never writes to the ledger.
pub async fn execute(ledger: &dyn Ledger, source: &dyn MigrationSource) -> Result<Vec<MigrationStatus>> {
    let migrations = source.discover().await?;

    let mut applied: BTreeSet<Version> = ledger.applied_versions().await?.into_iter().collect();

    let mut statuses: Vec<MigrationStatus> = migrations
        .into_iter()
        .map(|m| {
            let state = if applied.remove(&m.version) {
                MigrationState::Applied
            } else {
                MigrationState::Pending
            };
            MigrationStatus {
                version: m.version,
                source_name: Some(m.source_name),
                state,
            }
        })
        .collect();

    // Whatever is left in the ledger has no script behind it
    statuses.extend(applied.into_iter().map(|version| MigrationStatus {
        version,
        source_name: None,
        state: MigrationState::Orphaned,
    }));
    statuses.sort_by_key(|s| s.version);

    Ok(statuses)
}
