// Domain Layer - Pure migration logic and value types

pub mod error;
pub mod migration;
pub mod script;
pub mod version;

// Re-exports
pub use error::DomainError;
pub use migration::Migration;
pub use script::{Statement, StatementMap};
pub use version::Version;
