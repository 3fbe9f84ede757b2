// Migration Record

use super::error::{DomainError, Result};
use super::version::Version;
use serde::{Deserialize, Serialize};

/// A migration script loaded into memory
///
/// Created by a `MigrationSource` and read-only afterwards. Only the version
/// outlives a run, as a row in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    /// Where the script came from (file path for directory sources)
    pub source_name: String,
    pub version: Version,
    /// Raw script text, possibly several statements
    pub body: String,
}

impl Migration {
    pub fn new(source_name: impl Into<String>, version: Version, body: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            version,
            body: body.into(),
        }
    }
}

/// Sort migrations by version and reject duplicate versions
///
/// The sort is stable, so the listing order of the source never leaks into
/// the result once duplicates are excluded.
pub fn into_ordered(mut migrations: Vec<Migration>) -> Result<Vec<Migration>> {
    migrations.sort_by_key(|m| m.version);

    if let Some(pair) = migrations.windows(2).find(|w| w[0].version == w[1].version) {
        return Err(DomainError::ConflictingVersion {
            version: pair[0].version,
            first: pair[0].source_name.clone(),
            second: pair[1].source_name.clone(),
        });
    }

    Ok(migrations)
}
