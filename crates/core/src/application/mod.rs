// Application Layer - Use Cases

pub mod migrator;

// Re-exports
pub use migrator::{MigrationReport, MigrationState, MigrationStatus, Migrator};
