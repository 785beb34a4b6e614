//! Ledger collaborator
//!
//! A narrow tabular surface: append rows, select rows by equality filters.
//! `JsonlLedger` keeps one append-only `{table}.jsonl` file per table under
//! a data directory. No transactions, no indexes; selects scan the file.
//! Good enough for the pipeline's row counts and trivially inspectable.

use async_trait::async_trait;
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use tcgen_utils::error::LedgerError;
use tracing::warn;

/// Durable tabular store for requirement, test-case, compliance, and
/// result records.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Append rows to a table. Creating the table on first write.
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<(), LedgerError>;

    /// Return all rows where every `(field, value)` filter matches the
    /// row's string field exactly. A missing table yields an empty result.
    async fn select(&self, table: &str, filters: &[(&str, &str)]) -> Result<Vec<Value>, LedgerError>;
}

/// Filesystem ledger: one JSONL file per table.
pub struct JsonlLedger {
    root: PathBuf,
}

impl JsonlLedger {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.jsonl"))
    }

    fn io_err(table: &str, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            table: table.to_string(),
            source,
        }
    }
}

pub(crate) fn row_matches(row: &Value, filters: &[(&str, &str)]) -> bool {
    filters.iter().all(|(field, value)| {
        row.get(*field).and_then(Value::as_str) == Some(*value)
    })
}

#[async_trait]
impl Ledger for JsonlLedger {
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<(), LedgerError> {
        if rows.is_empty() {
            return Ok(());
        }

        std::fs::create_dir_all(&self.root).map_err(|e| Self::io_err(table, e))?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.table_path(table))
            .map_err(|e| Self::io_err(table, e))?;

        for row in rows {
            let line = serde_json::to_string(&row)?;
            writeln!(file, "{line}").map_err(|e| Self::io_err(table, e))?;
        }
        file.flush().map_err(|e| Self::io_err(table, e))?;

        Ok(())
    }

    async fn select(&self, table: &str, filters: &[(&str, &str)]) -> Result<Vec<Value>, LedgerError> {
        let path = self.table_path(table);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_err(table, e)),
        };

        let mut rows = Vec::new();
        for (lineno, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(line) {
                Ok(row) => {
                    if row_matches(&row, filters) {
                        rows.push(row);
                    }
                }
                Err(e) => {
                    // Corrupt lines are skipped so one bad write cannot
                    // poison the whole table.
                    warn!(table, line = lineno + 1, error = %e, "skipping corrupt ledger row");
                }
            }
        }

        Ok(rows)
    }
}
