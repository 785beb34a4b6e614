//! Tracing bootstrap and stage-scoped logging helpers

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects between a debug
/// filter for tcgen crates and the default info level. Safe to call more
/// than once; later calls are no-ops.
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "tcgen=debug,info"
    } else {
        "tcgen=info,warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

/// Log the start of a stage.
pub fn log_stage_start(stage: &str, req_id: Option<&str>) {
    info!(stage = %stage, req_id = %req_id.unwrap_or("-"), "stage started");
}

/// Log successful completion of a stage.
pub fn log_stage_complete(stage: &str, req_id: &str) {
    info!(stage = %stage, req_id = %req_id, "stage complete");
}

/// Log a stage failure.
pub fn log_stage_error(stage: &str, err: &dyn std::error::Error) {
    error!(stage = %stage, error = %err, "stage failed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_tracing(false);
        init_tracing(true);
    }
}
