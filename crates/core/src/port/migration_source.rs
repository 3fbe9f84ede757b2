// Migration Source port

use crate::domain::Migration;
use crate::error::Result;
use async_trait::async_trait;

/// Where migrations come from
#[async_trait]
pub trait MigrationSource: Send + Sync {
    /// Load every migration, sorted ascending by version
    ///
    /// # Errors
    /// * `AppError::NoMigrationsFound` - nothing to load
    /// * `AppError::DiscoveryIo` - the source could not be read
    /// * `AppError::Domain` - a malformed or conflicting version
    async fn discover(&self) -> Result<Vec<Migration>>;

    /// Human-readable location, used in logs
    fn location(&self) -> String;
}
