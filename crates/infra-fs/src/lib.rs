// schemup Infrastructure - Filesystem Adapters
// Implements: MigrationSource

pub mod directory_source;

pub use directory_source::DirectorySource;
