//! Collaborator interfaces and backends
//!
//! The pipeline talks to four external capabilities, each behind a narrow
//! async trait: content generation, the tabular ledger, blob storage, and
//! the issue tracker. Production backends live here (HTTP generator, JSONL
//! ledger, filesystem store, Jira REST); in-memory doubles are available
//! behind the `test-utils` feature.

pub mod generator;
pub(crate) mod http;
pub mod ledger;
pub mod object_store;
pub mod ticketing;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use generator::{ContentGenerator, HttpGenerator};
pub use ledger::{JsonlLedger, Ledger};
pub use object_store::{FsObjectStore, ObjectStore};
pub use ticketing::{IssueFields, IssueRef, JiraHttp, Ticketing};

use std::sync::Arc;

/// Bundle of collaborator handles injected into the pipeline at
/// construction. Clones share the underlying clients.
#[derive(Clone)]
pub struct Collaborators {
    pub generator: Arc<dyn ContentGenerator>,
    pub ledger: Arc<dyn Ledger>,
    pub store: Arc<dyn ObjectStore>,
    pub ticketing: Arc<dyn Ticketing>,
}

impl Collaborators {
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        ledger: Arc<dyn Ledger>,
        store: Arc<dyn ObjectStore>,
        ticketing: Arc<dyn Ticketing>,
    ) -> Self {
        Self {
            generator,
            ledger,
            store,
            ticketing,
        }
    }
}
