//! Stage operations
//!
//! One module per pipeline stage, each a pure operation with respect to the
//! orchestrator: explicit input in, typed output or `StageError` out, all
//! side effects going through the injected collaborators. The orchestrator
//! in `tcgen-engine` sequences these; nothing here knows about stage order.

pub mod compliance;
pub mod generated;
pub mod jira;
pub mod junit;
pub mod report;
pub mod requirement;
pub mod results;
pub mod samples;
pub mod testcases;

pub use compliance::{Assessment, CompliancePolicy, IdSuffixPolicy};
pub use generated::Generated;
