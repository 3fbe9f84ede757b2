//! Runtime configuration
//!
//! Layers, later wins: built-in defaults, optional TOML file, `SCHEMUP_*`
//! environment variables, command-line flags.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemup_infra_sqlite::ConnectionConfig;

const ENV_PREFIX: &str = "SCHEMUP";
const DEFAULT_MIGRATIONS_DIR: &str = "migrations";
const DEFAULT_DATABASE_URL: &str = "sqlite://schemup.db";
const DEFAULT_MAX_CONNECTIONS: i64 = 1;
const DEFAULT_BUSY_TIMEOUT_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, colored
    Pretty,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrateConfig {
    /// Directory holding `<major>-<minor>-<fix>-<description>.sql` files
    pub migrations_dir: PathBuf,
    pub database_url: String,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
    pub log_format: LogFormat,
}

/// Values given on the command line; `None` leaves lower layers alone
#[derive(Debug, Default)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub migrations_dir: Option<PathBuf>,
    pub database_url: Option<String>,
    pub log_format: Option<LogFormat>,
}

impl MigrateConfig {
    /// Build the configuration from every layer
    pub fn load(overrides: &Overrides) -> Result<Self> {
        Self::load_with_env(overrides, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(overrides: &Overrides, env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("migrations_dir", DEFAULT_MIGRATIONS_DIR)?
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("max_connections", DEFAULT_MAX_CONNECTIONS)?
            .set_default("busy_timeout_secs", DEFAULT_BUSY_TIMEOUT_SECS)?
            .set_default("log_format", LogFormat::Pretty.as_str())?;

        if let Some(path) = &overrides.config_file {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        let settings = builder
            .add_source(env)
            .set_override_option(
                "migrations_dir",
                overrides
                    .migrations_dir
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option("database_url", overrides.database_url.clone())?
            .set_override_option("log_format", overrides.log_format.map(|f| f.as_str()))?
            .build()
            .context("Failed to build configuration")?;

        let config: MigrateConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(config.expand_home())
    }

    /// Expand a leading `~` in paths
    fn expand_home(mut self) -> Self {
        self.database_url = shellexpand::tilde(&self.database_url).into_owned();
        if let Some(dir) = self.migrations_dir.to_str() {
            self.migrations_dir = PathBuf::from(shellexpand::tilde(dir).into_owned());
        }
        self
    }

    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            database_url: self.database_url.clone(),
            max_connections: self.max_connections,
            busy_timeout: Duration::from_secs(self.busy_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let config = MigrateConfig::load_with_env(&Overrides::default(), env(&[])).unwrap();

        assert_eq!(config.migrations_dir, PathBuf::from("migrations"));
        assert_eq!(config.database_url, "sqlite://schemup.db");
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.busy_timeout_secs, 5);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_layers_file_env_flags() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("schemup.toml");
        std::fs::write(
            &file,
            r#"
migrations_dir = "db/from-file"
database_url = "sqlite://from-file.db"
busy_timeout_secs = 30
"#,
        )
        .unwrap();

        let overrides = Overrides {
            config_file: Some(file),
            database_url: Some("sqlite://from-flag.db".to_string()),
            ..Default::default()
        };
        let config = MigrateConfig::load_with_env(
            &overrides,
            env(&[
                ("SCHEMUP_MIGRATIONS_DIR", "db/from-env"),
                ("SCHEMUP_DATABASE_URL", "sqlite://from-env.db"),
                ("SCHEMUP_LOG_FORMAT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.migrations_dir, PathBuf::from("db/from-env"));
        assert_eq!(config.database_url, "sqlite://from-flag.db");
        assert_eq!(config.busy_timeout_secs, 30);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.connection().busy_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let overrides = Overrides {
            config_file: Some(PathBuf::from("/definitely/not/here/schemup.toml")),
            ..Default::default()
        };
        assert!(MigrateConfig::load_with_env(&overrides, env(&[])).is_err());
    }

    #[test]
    fn test_invalid_log_format_is_error() {
        let result = MigrateConfig::load_with_env(
            &Overrides::default(),
            env(&[("SCHEMUP_LOG_FORMAT", "xml")]),
        );
        assert!(result.is_err());
    }
}
