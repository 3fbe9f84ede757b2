// Domain Error Types

use super::version::Version;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Malformed migration version {input:?}: {reason}")]
    MalformedVersion { input: String, reason: String },

    #[error("Version {version} is declared by both {first} and {second}")]
    ConflictingVersion {
        version: Version,
        first: String,
        second: String,
    },

    #[error("Statement name {0:?} appears more than once in the same script")]
    DuplicateStatementName(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
