//! tcgen: requirement-to-ticket test generation pipeline
//!
//! A linear, resumable pipeline that turns a free-text prompt into a
//! formalized requirement, generated test cases with compliance findings,
//! sample payloads and JUnit sources, parsed test results, and finally a
//! tracker issue. Each invocation runs one stage and stops for user review;
//! the caller resumes at the next stage with the identifiers the previous
//! snapshot reported.
//!
//! The library surface re-exports the orchestrator and its collaborator
//! seams; the `cli` module wraps them for the `tcgen` binary.

pub mod cli;

pub use tcgen_clients::{Collaborators, ContentGenerator, Ledger, ObjectStore, Ticketing};
pub use tcgen_config::Config;
pub use tcgen_engine::{Pipeline, PipelineState, StageOutcome, StagePayload};
pub use tcgen_utils::{PipelineStatus, StageError, StageId};
