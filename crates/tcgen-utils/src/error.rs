//! Error taxonomy for the pipeline
//!
//! `StageError` is what the orchestrator surfaces to callers. Collaborator
//! failures carry their own subsystem enums and fold in via `#[from]`.
//! Two failure classes never appear here because they are recovered
//! locally: unparsable generator output (typed fallback artifact) and
//! malformed report files (skipped with a warning).

use std::time::Duration;
use thiserror::Error;

/// Top-level error returned by a stage invocation.
#[derive(Debug, Error)]
pub enum StageError {
    /// A required payload key is missing or empty. Raised before any side
    /// effect is performed.
    #[error("missing or empty required input '{field}' for stage '{stage}'")]
    Validation { stage: String, field: String },

    /// The requested stage name is not one of the five pipeline stages.
    #[error(
        "unknown stage '{0}' (expected one of: requirement, testcases, samples_junit, test_results, jira)"
    )]
    UnknownStage(String),

    /// The referenced requirement does not exist. Only the ticketing path
    /// treats this as fatal; the content-generation path returns an empty
    /// result instead.
    #[error("requirement '{req_id}' not found")]
    NotFound { req_id: String },

    #[error("content generator failed: {0}")]
    Generator(#[from] GeneratorError),

    #[error("ledger operation failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("object store operation failed: {0}")]
    ObjectStore(#[from] ObjectStoreError),

    #[error("ticketing operation failed: {0}")]
    Ticketing(#[from] TicketingError),
}

impl StageError {
    pub fn validation(stage: impl Into<String>, field: impl Into<String>) -> Self {
        StageError::Validation {
            stage: stage.into(),
            field: field.into(),
        }
    }
}

/// Failures shared by the HTTP-backed collaborators.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("misconfiguration: {0}")]
    Misconfiguration(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limit exceeded: {0}")]
    Quota(String),

    #[error("server error: {0}")]
    Outage(String),

    #[error("request timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("transport error: {0}")]
    Transport(String),
}

/// Content-generator failures.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("generator misconfigured: {0}")]
    Misconfiguration(String),

    #[error("provider response missing text content")]
    EmptyResponse,
}

/// Ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("io on table '{table}': {source}")]
    Io {
        table: String,
        #[source]
        source: std::io::Error,
    },

    #[error("row serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Object-store failures.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("write failed at '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("read failed at '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("object not found: {0}")]
    NotFound(String),
}

/// Ticketing failures.
#[derive(Debug, Error)]
pub enum TicketingError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("ticketing misconfigured: {0}")]
    Misconfiguration(String),

    #[error("unexpected tracker response: {0}")]
    Protocol(String),
}
