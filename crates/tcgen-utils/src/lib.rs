//! Shared foundation for the tcgen pipeline crates
//!
//! This crate holds the pieces every other crate needs: the stage and status
//! enums, the record types that flow through the ledger and the state
//! snapshot, identifier minting and normalization, the error taxonomy, and
//! the tracing bootstrap.

pub mod error;
pub mod ids;
pub mod logging;
pub mod types;

pub use error::StageError;
pub use types::{PipelineStatus, StageId};
