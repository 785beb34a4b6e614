//! tcgen CLI binary
//!
//! Minimal entrypoint; all logic lives in the library. main only maps the
//! CLI result to a process exit code.

fn main() {
    if let Err(code) = tcgen::cli::run() {
        std::process::exit(code);
    }
}
