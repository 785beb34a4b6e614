//! In-memory collaborator doubles for tests
//!
//! Available behind the `test-utils` feature. Each double implements the
//! corresponding trait faithfully enough for the pipeline's observable
//! behavior, and exposes inspection helpers for assertions.

use crate::ledger::row_matches;
use crate::{ContentGenerator, IssueFields, IssueRef, Ledger, ObjectStore, Ticketing};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use tcgen_utils::error::{GeneratorError, HttpError, LedgerError, ObjectStoreError, TicketingError};
use tokio::sync::Mutex;

/// Generator double that replays scripted replies in order. Once the
/// script is exhausted it returns empty strings, which drives the stages'
/// fallback paths deterministically.
#[derive(Default)]
pub struct StaticGenerator {
    replies: Mutex<VecDeque<String>>,
    fail: bool,
}

impl StaticGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            fail: false,
        }
    }

    /// A generator whose every call fails with a transport error.
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl ContentGenerator for StaticGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GeneratorError> {
        if self.fail {
            return Err(GeneratorError::Http(HttpError::Transport(
                "scripted failure".to_string(),
            )));
        }
        Ok(self.replies.lock().await.pop_front().unwrap_or_default())
    }
}

/// Ledger double backed by a table map.
#[derive(Default)]
pub struct MemoryLedger {
    tables: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows of a table, for assertions.
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Total row count across all tables.
    pub async fn total_rows(&self) -> usize {
        self.tables.lock().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<(), LedgerError> {
        if rows.is_empty() {
            return Ok(());
        }
        self.tables
            .lock()
            .await
            .entry(table.to_string())
            .or_default()
            .extend(rows);
        Ok(())
    }

    async fn select(&self, table: &str, filters: &[(&str, &str)]) -> Result<Vec<Value>, LedgerError> {
        Ok(self
            .tables
            .lock()
            .await
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row_matches(row, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Object-store double keyed by artifact path.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn object_count(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.lock().await.keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<String, ObjectStoreError> {
        self.objects
            .lock()
            .await
            .insert(path.to_string(), bytes.to_vec());
        Ok(format!("mem://{path}"))
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectStoreError> {
        self.objects
            .lock()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| ObjectStoreError::NotFound(path.to_string()))
    }
}

#[derive(Debug, Clone)]
struct MemoryIssue {
    key: String,
    summary: String,
    #[allow(dead_code)]
    description: String,
    comments: Vec<String>,
}

/// Ticketing double. Search matches issues whose summary contains any
/// quoted token of the query, which is how the pipeline's
/// `summary ~ "<req_id>"` queries are interpreted.
#[derive(Default)]
pub struct MemoryTicketing {
    issues: Mutex<Vec<MemoryIssue>>,
}

impl MemoryTicketing {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn issue_count(&self) -> usize {
        self.issues.lock().await.len()
    }

    pub async fn comment_count(&self, issue_key: &str) -> usize {
        self.issues
            .lock()
            .await
            .iter()
            .find(|issue| issue.key == issue_key)
            .map(|issue| issue.comments.len())
            .unwrap_or(0)
    }

    fn quoted_tokens(query: &str) -> Vec<String> {
        query
            .split('"')
            .skip(1)
            .step_by(2)
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl Ticketing for MemoryTicketing {
    async fn search(&self, query: &str) -> Result<Vec<IssueRef>, TicketingError> {
        let tokens = Self::quoted_tokens(query);
        Ok(self
            .issues
            .lock()
            .await
            .iter()
            .filter(|issue| tokens.iter().any(|t| issue.summary.contains(t)))
            .map(|issue| IssueRef {
                key: issue.key.clone(),
                url: format!("memory://browse/{}", issue.key),
            })
            .collect())
    }

    async fn create_issue(&self, fields: IssueFields) -> Result<IssueRef, TicketingError> {
        let mut issues = self.issues.lock().await;
        let key = format!("{}-{}", fields.project_key, issues.len() + 1);
        issues.push(MemoryIssue {
            key: key.clone(),
            summary: fields.summary,
            description: fields.description,
            comments: Vec::new(),
        });
        Ok(IssueRef {
            url: format!("memory://browse/{key}"),
            key,
        })
    }

    async fn add_comment(&self, issue_key: &str, body: &str) -> Result<(), TicketingError> {
        let mut issues = self.issues.lock().await;
        match issues.iter_mut().find(|issue| issue.key == issue_key) {
            Some(issue) => {
                issue.comments.push(body.to_string());
                Ok(())
            }
            None => Err(TicketingError::Protocol(format!(
                "no such issue: {issue_key}"
            ))),
        }
    }
}
