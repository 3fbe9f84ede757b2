// Statement Map - named statements parsed from a migration body

use super::error::{DomainError, Result};
use std::collections::HashMap;

/// Name given to statements that appear before the first `--name:` marker
pub const DEFAULT_STATEMENT_NAME: &str = "main";

/// Accepted marker prefixes; both must start in column 0
const NAME_MARKERS: [&str; 2] = ["--name:", "-- name:"];

/// One executable unit of a migration script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub name: String,
    pub sql: String,
}

/// Ordered mapping from statement name to statement
///
/// A script is split into sections by marker lines:
///
/// ```text
/// -- name: create-peers
/// CREATE TABLE peers (name TEXT, email TEXT, nick TEXT);
/// -- name: seed-peers
/// INSERT INTO peers VALUES ('Mickey Mouse', 'mandm@disney.com', 'mandm');
/// ```
///
/// Text before the first marker becomes the `main` statement. A section may
/// hold several SQL commands; the database runs them as one batch.
#[derive(Debug, Default)]
pub struct StatementMap {
    statements: Vec<Statement>,
    index: HashMap<String, usize>,
}

impl StatementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `body` and append its statements in file order
    ///
    /// Sections holding only blank lines and `--` comments are dropped.
    /// On a duplicate name nothing from `body` is kept.
    pub fn parse(&mut self, body: &str) -> Result<()> {
        let mut sections: Vec<(String, String)> = Vec::new();
        let mut name = DEFAULT_STATEMENT_NAME.to_string();
        let mut sql = String::new();

        for line in body.lines() {
            if let Some(next) = marker_name(line) {
                sections.push((std::mem::replace(&mut name, next), std::mem::take(&mut sql)));
                continue;
            }
            sql.push_str(line);
            sql.push('\n');
        }
        sections.push((name, sql));

        let mut parsed: Vec<Statement> = Vec::new();
        for (name, sql) in sections {
            if !has_executable_content(&sql) {
                continue;
            }
            if self.index.contains_key(&name) || parsed.iter().any(|s| s.name == name) {
                return Err(DomainError::DuplicateStatementName(name));
            }
            parsed.push(Statement {
                name,
                sql: sql.trim().to_string(),
            });
        }

        for statement in parsed {
            self.index
                .insert(statement.name.clone(), self.statements.len());
            self.statements.push(statement);
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Statement> {
        self.index.get(name).map(|&i| &self.statements[i])
    }

    /// Statements in the order they appeared in the script
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Drop all statements; called between migrations
    pub fn clear(&mut self) {
        self.statements.clear();
        self.index.clear();
    }
}

/// `--name: foo` or `-- name: foo` -> `Some("foo")`
///
/// Indented comments are part of the surrounding SQL, never markers.
fn marker_name(line: &str) -> Option<String> {
    let rest = NAME_MARKERS
        .iter()
        .find_map(|marker| line.strip_prefix(marker))?;
    let name = rest.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn has_executable_content(sql: &str) -> bool {
    sql.lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with("--")
    })
}
