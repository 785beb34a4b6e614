//! Argument parsing for the tcgen binary

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tcgen - pipeline from requirement prompt to tracked automated tests
#[derive(Parser)]
#[command(name = "tcgen")]
#[command(about = "Generate requirements, test cases, samples, and JUnit sources, then report results to Jira")]
#[command(long_about = r#"
tcgen runs a linear, human-in-the-loop pipeline. Each invocation executes
exactly one stage and prints a JSON snapshot with the stage outcome and the
name of the next stage; you review the output and resume when ready.

STAGES:
  requirement -> testcases -> samples_junit -> test_results -> jira

EXAMPLES:
  # Start a new pipeline from a prompt
  tcgen start --prompt "The pump shall alarm on occlusion within 60 seconds"

  # Generate test cases for the requirement the previous snapshot reported
  tcgen resume --stage testcases --req-id REQ-AB12CD34

  # Create samples and JUnit sources for selected test cases
  tcgen resume --stage samples_junit --req-id REQ-AB12CD34 \
      --test-case-id TC-0A1B2C --test-case-id TC-3D4E5F

  # Ingest surefire reports and file the run on the tracker issue
  tcgen resume --stage test_results --req-id REQ-AB12CD34
  tcgen resume --stage jira --req-id REQ-AB12CD34 --test-case-id TC-0A1B2C

CONFIGURATION:
  Settings load from a TOML file passed via --config, with built-in
  defaults otherwise. Generator and Jira credentials come from the
  environment variables the config names (GEMINI_API_KEY, JIRA_USER,
  JIRA_TOKEN by default).
"#)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start a new pipeline at the requirement stage
    Start {
        /// Free-text requirement prompt
        #[arg(long)]
        prompt: String,

        /// Repository the requirement was sourced from, recorded verbatim
        #[arg(long)]
        source_repo: Option<String>,
    },

    /// Resume a pipeline at a named stage
    Resume {
        /// Stage to execute (see STAGES in --help)
        #[arg(long)]
        stage: String,

        /// Requirement id from an earlier snapshot
        #[arg(long)]
        req_id: String,

        /// Test case id to include; repeat the flag for several
        #[arg(long = "test-case-id")]
        test_case_ids: Vec<String>,

        /// Label for this test run, defaults to run-{unix seconds}
        #[arg(long)]
        run_id: Option<String>,
    },

    /// List the pipeline stages in execution order
    Stages,
}
