// In-memory Ledger and MigrationSource for application tests

use crate::domain::{migration, Migration, Statement, Version};
use crate::error::{AppError, Result};
use crate::port::{Ledger, LedgerTransaction, MigrationSource, Transaction};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// Statements whose SQL contains this marker fail to execute
pub const FAIL_MARKER: &str = "FAIL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    EnsureSchema,
    Begin,
    IsApplied(Version),
    MarkApplied(Version),
    Execute(String),
    Commit,
    Rollback,
}

#[derive(Default)]
pub struct FakeState {
    pub applied: BTreeSet<Version>,
    /// Statements from committed transactions only
    pub committed_sql: Vec<String>,
    pub events: Vec<Event>,
    /// Committed by another runner after this one checked the ledger
    pub committed_elsewhere: BTreeSet<Version>,
    pub fail_begin: bool,
    pub fail_commit: bool,
    pub fail_schema: bool,
}

/// Ledger with transactional semantics: writes become visible on commit
#[derive(Clone, Default)]
pub struct FakeLedger {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_applied(versions: &[Version]) -> Self {
        let ledger = Self::new();
        ledger.state.lock().unwrap().applied.extend(versions.iter().copied());
        ledger
    }

    pub fn applied(&self) -> Vec<Version> {
        self.state.lock().unwrap().applied.iter().copied().collect()
    }

    pub fn committed_sql(&self) -> Vec<String> {
        self.state.lock().unwrap().committed_sql.clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    fn record(&self, event: Event) {
        self.state.lock().unwrap().events.push(event);
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn ensure_schema(&self) -> Result<()> {
        self.record(Event::EnsureSchema);
        if self.state.lock().unwrap().fail_schema {
            return Err(AppError::Database("cannot create schema_version".to_string()));
        }
        Ok(())
    }

    async fn begin_transaction(&self) -> Result<Box<dyn LedgerTransaction>> {
        self.record(Event::Begin);
        if self.state.lock().unwrap().fail_begin {
            return Err(AppError::TransactionFailure("connection lost".to_string()));
        }
        Ok(Box::new(FakeTransaction {
            ledger: self.clone(),
            marked: Vec::new(),
            sql: Vec::new(),
        }))
    }

    async fn applied_versions(&self) -> Result<Vec<Version>> {
        Ok(self.applied())
    }
}

pub struct FakeTransaction {
    ledger: FakeLedger,
    marked: Vec<Version>,
    sql: Vec<String>,
}

#[async_trait]
impl Transaction for FakeTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.ledger.record(Event::Commit);
        let mut state = self.ledger.state.lock().unwrap();
        if state.fail_commit {
            return Err(AppError::TransactionFailure("commit refused".to_string()));
        }
        state.applied.extend(self.marked.iter().copied());
        state.committed_sql.extend(self.sql.iter().cloned());
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.ledger.record(Event::Rollback);
        Ok(())
    }
}

#[async_trait]
impl LedgerTransaction for FakeTransaction {
    async fn is_applied(&mut self, version: Version) -> Result<bool> {
        self.ledger.record(Event::IsApplied(version));
        Ok(self.ledger.state.lock().unwrap().applied.contains(&version))
    }

    async fn mark_applied(&mut self, version: Version) -> Result<()> {
        self.ledger.record(Event::MarkApplied(version));
        let exists = {
            let state = self.ledger.state.lock().unwrap();
            state.applied.contains(&version) || state.committed_elsewhere.contains(&version)
        };
        if exists || self.marked.contains(&version) {
            return Err(AppError::DuplicateVersion(version));
        }
        self.marked.push(version);
        Ok(())
    }

    async fn execute(&mut self, statement: &Statement) -> Result<()> {
        self.ledger.record(Event::Execute(statement.name.clone()));
        if statement.sql.contains(FAIL_MARKER) {
            return Err(AppError::ExecutionFailure {
                statement: statement.name.clone(),
                cause: "syntax error".to_string(),
            });
        }
        self.sql.push(statement.sql.clone());
        Ok(())
    }
}

/// Source serving a fixed list, in whatever order it was given
pub struct FakeSource {
    pub migrations: Vec<Migration>,
}

impl FakeSource {
    /// `(major, minor, fix, body)` tuples
    pub fn new(scripts: &[(u32, u32, u32, &str)]) -> Self {
        let migrations = scripts
            .iter()
            .map(|&(major, minor, fix, body)| {
                Migration::new(
                    format!("{:02}-{:02}-{:04}-test.sql", major, minor, fix),
                    Version::new(major, minor, fix),
                    body,
                )
            })
            .collect();
        Self { migrations }
    }
}

#[async_trait]
impl MigrationSource for FakeSource {
    async fn discover(&self) -> Result<Vec<Migration>> {
        if self.migrations.is_empty() {
            return Err(AppError::NoMigrationsFound(self.location()));
        }
        Ok(migration::into_ordered(self.migrations.clone())?)
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
