// Directory-backed MigrationSource
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use schemup_core::domain::migration;
use schemup_core::domain::version::MIGRATION_EXTENSION;
use schemup_core::domain::{Migration, Version};
use schemup_core::error::{AppError, Result};
use schemup_core::port::MigrationSource;

/// Loads `<major>-<minor>-<fix>-<description>.sql` files from one directory
///
/// Subdirectories are not traversed and files with any other extension are
/// ignored.
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    /// Create a source for `dir`
    ///
    /// # Example
    /// ```ignore
    /// let source = DirectorySource::new("migrations");
    /// let migrations = source.discover().await?;
    /// ```
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> AppError {
        AppError::DiscoveryIo {
            path: path.display().to_string(),
            source,
        }
    }

    /// Regular `.sql` files directly inside the directory
    async fn list_scripts(&self) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| self.io_error(&self.dir, e))?;

        let mut scripts = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| self.io_error(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(MIGRATION_EXTENSION) {
                continue;
            }

            // Follows symlinks, so a linked script counts as a file
            let metadata = tokio::fs::metadata(&path)
                .await
                .map_err(|e| self.io_error(&path, e))?;
            if !metadata.is_file() {
                continue;
            }

            scripts.push(path);
        }

        // Listing order is filesystem-dependent
        scripts.sort();
        Ok(scripts)
    }
}

#[async_trait]
impl MigrationSource for DirectorySource {
    async fn discover(&self) -> Result<Vec<Migration>> {
        let scripts = self.list_scripts().await?;
        if scripts.is_empty() {
            return Err(AppError::NoMigrationsFound(self.location()));
        }

        let mut migrations = Vec::with_capacity(scripts.len());
        for path in scripts {
            let version = Version::from_file_name(&path)?;
            let body = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| self.io_error(&path, e))?;

            debug!(path = %path.display(), version = %version, "Found migration");
            migrations.push(Migration::new(path.display().to_string(), version, body));
        }

        let migrations = migration::into_ordered(migrations)?;

        info!(
            path = %self.dir.display(),
            count = migrations.len(),
            "Loaded migration scripts"
        );

        Ok(migrations)
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}
