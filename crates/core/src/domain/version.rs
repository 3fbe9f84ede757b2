// Version Identifier

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// File extension of migration scripts
pub const MIGRATION_EXTENSION: &str = "sql";

/// Migration version: (major, minor, fix)
///
/// Ordering is lexicographic over the three components, which is exactly the
/// order migrations are applied in. Field order matters for the derived `Ord`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub fix: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, fix: u32) -> Self {
        Self { major, minor, fix }
    }

    /// Parse `M-N-F` with an optional `-description` suffix
    ///
    /// # Examples
    /// ```
    /// use schemup_core::domain::Version;
    ///
    /// let v = Version::parse("03-01-0000-add-peers").unwrap();
    /// assert_eq!(v, Version::new(3, 1, 0));
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let mut tokens = input.splitn(4, '-');

        let mut next = |component: &str| -> Result<u32> {
            let token = tokens.next().ok_or_else(|| DomainError::MalformedVersion {
                input: input.to_string(),
                reason: format!("missing {} component", component),
            })?;
            parse_component(input, component, token)
        };

        let major = next("major")?;
        let minor = next("minor")?;
        let fix = next("fix")?;

        Ok(Self::new(major, minor, fix))
    }

    /// Parse the version out of a migration file name or path
    ///
    /// Only the last path segment is considered and a trailing `.sql` is dropped,
    /// so `migrations/00-02-0000-users.sql` yields `0.2.0`.
    pub fn from_file_name(name: impl AsRef<Path>) -> Result<Self> {
        let path = name.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DomainError::MalformedVersion {
                input: path.display().to_string(),
                reason: "not a valid UTF-8 file name".to_string(),
            })?;

        let stem = file_name
            .strip_suffix(MIGRATION_EXTENSION)
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(file_name);

        Self::parse(stem).map_err(|e| match e {
            DomainError::MalformedVersion { reason, .. } => DomainError::MalformedVersion {
                input: file_name.to_string(),
                reason,
            },
            other => other,
        })
    }
}

fn parse_component(input: &str, component: &str, token: &str) -> Result<u32> {
    // u32::from_str accepts a leading '+', which is not a valid file name token
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::MalformedVersion {
            input: input.to_string(),
            reason: format!("{} component {:?} is not a non-negative integer", component, token),
        });
    }

    token.parse().map_err(|_| DomainError::MalformedVersion {
        input: input.to_string(),
        reason: format!("{} component {:?} is out of range", component, token),
    })
}

impl FromStr for Version {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.fix)
    }
}
