//! Stage orchestrator
//!
//! A linear, resumable, human-in-the-loop pipeline: each invocation runs
//! exactly one stage against the injected collaborators and returns a state
//! snapshot naming the next stage. The orchestrator persists nothing
//! itself; the caller carries forward whatever identifiers the next stage
//! needs.

pub mod payload;
pub mod pipeline;

pub use payload::StagePayload;
pub use pipeline::{Pipeline, PipelineState, StageOutcome};
