//! schemup - apply versioned SQL migrations to a SQLite database

mod config;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::{error, info};

use crate::config::{LogFormat, MigrateConfig, Overrides};
use schemup_core::application::{MigrationState, MigrationStatus, Migrator};
use schemup_infra_fs::DirectorySource;
use schemup_infra_sqlite::{create_pool, SqliteLedger};

/// Exit status for any failed command
const FAILURE_EXIT_CODE: u8 = 2;

#[derive(Parser)]
#[command(name = "schemup")]
#[command(about = "Apply versioned SQL migrations", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(short, long, env = "SCHEMUP_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Database URL (e.g. sqlite://app.db)
    #[arg(short, long, global = true)]
    database: Option<String>,

    /// Directory containing <major>-<minor>-<fix>-<description>.sql files
    #[arg(short, long, global = true)]
    migrations: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply all pending migrations
    Up {
        /// Succeed when the migrations directory has no scripts
        #[arg(long)]
        allow_empty: bool,
    },

    /// Show applied and pending migrations
    Status {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            config_file: self.config.clone(),
            migrations_dir: self.migrations.clone(),
            database_url: self.database.clone(),
            log_format: self.log_format,
        }
    }
}

#[derive(Tabled)]
struct StatusRow {
    version: String,
    state: String,
    source: String,
}

impl From<&MigrationStatus> for StatusRow {
    fn from(status: &MigrationStatus) -> Self {
        let state = match status.state {
            MigrationState::Applied => status.state.to_string().green().to_string(),
            MigrationState::Pending => status.state.to_string().yellow().to_string(),
            MigrationState::Orphaned => status.state.to_string().red().to_string(),
        };
        Self {
            version: status.version.to_string(),
            state,
            source: status.source_name.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

async fn build_migrator(config: &MigrateConfig) -> Result<Migrator> {
    let pool = create_pool(&config.connection())
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    Ok(Migrator::new(Arc::new(SqliteLedger::new(pool))))
}

async fn up(config: &MigrateConfig, allow_empty: bool) -> Result<()> {
    let migrator = build_migrator(config).await?;
    let source = DirectorySource::new(config.migrations_dir());

    let report = match migrator.run(&source).await {
        Ok(report) => report,
        Err(e) if allow_empty && e.is_no_migrations() => {
            info!(path = %config.migrations_dir().display(), "No migrations found, nothing to do");
            println!("{}", "○ No migrations found".yellow());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if report.is_noop() {
        println!("{}", "✓ Database is up to date".green().bold());
    } else {
        println!(
            "{}",
            format!("✓ Applied {} migration(s)", report.applied.len())
                .green()
                .bold()
        );
        for version in &report.applied {
            println!("  {} {}", "•".bold(), version);
        }
    }
    if !report.skipped.is_empty() {
        println!("  ○ {} already applied", report.skipped.len());
    }

    Ok(())
}

async fn status(config: &MigrateConfig, json: bool) -> Result<()> {
    let migrator = build_migrator(config).await?;
    let source = DirectorySource::new(config.migrations_dir());

    let statuses = migrator.status(&source).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    let pending = statuses
        .iter()
        .filter(|s| s.state == MigrationState::Pending)
        .count();

    println!("{}", "Migration Status".cyan().bold());
    println!();
    println!("  {} {}", "Database:".bold(), config.database_url);
    println!("  {} {}", "Migrations:".bold(), config.migrations_dir().display());
    println!();

    let rows: Vec<StatusRow> = statuses.iter().map(StatusRow::from).collect();
    println!("{}", Table::new(rows));
    println!();
    println!("  {} {}", "Pending:".bold(), pending);

    Ok(())
}

/// Error chain on one line
///
/// Core errors already embed their cause in the message, so a cause whose
/// text is already present is not repeated.
fn render(err: &anyhow::Error) -> String {
    let mut out = err.to_string();
    for cause in err.chain().skip(1) {
        let msg = cause.to_string();
        if !out.contains(&msg) {
            out.push_str(": ");
            out.push_str(&msg);
        }
    }
    out
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match MigrateConfig::load(&cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), render(&e));
            return ExitCode::from(FAILURE_EXIT_CODE);
        }
    };

    logging::init(config.log_format);
    info!(
        version = schemup_core::VERSION,
        migrations_dir = %config.migrations_dir().display(),
        database_url = %config.database_url,
        "Configuration loaded"
    );

    let result = match cli.command {
        Commands::Up { allow_empty } => up(&config, allow_empty).await,
        Commands::Status { json } => status(&config, json).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = render(&e);
            error!(error = %message, "Migrations failed");
            eprintln!("{} {}", "✗".red(), message);
            ExitCode::from(FAILURE_EXIT_CODE)
        }
    }
}
