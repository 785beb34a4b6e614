//! Command dispatch for the tcgen binary
//!
//! `run` handles all output, including errors, and returns the process exit
//! code on failure. Input and stage-name problems exit with 2, a missing
//! requirement in the ticketing path with 3, collaborator failures with 1.

use crate::cli::args::{Cli, Command};
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tcgen_clients::{Collaborators, FsObjectStore, HttpGenerator, JiraHttp, JsonlLedger};
use tcgen_config::Config;
use tcgen_engine::{Pipeline, PipelineState, StagePayload};
use tcgen_utils::logging::init_tracing;
use tcgen_utils::{StageError, StageId};

pub fn run() -> Result<(), i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(cli) {
        Ok(()) => Ok(()),
        Err(err) => {
            eprintln!("error: {err:#}");
            Err(exit_code_for(&err))
        }
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<StageError>() {
        Some(StageError::Validation { .. } | StageError::UnknownStage(_)) => 2,
        Some(StageError::NotFound { .. }) => 3,
        _ => 1,
    }
}

fn execute(cli: Cli) -> Result<()> {
    if let Command::Stages = cli.command {
        for stage in StageId::ALL {
            println!("{stage}");
        }
        return Ok(());
    }

    let config = Config::load_or_default(cli.config.as_deref())?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(dispatch(cli.command, config))
}

async fn dispatch(command: Command, config: Config) -> Result<()> {
    let collab = build_collaborators(&config)?;
    let pipeline = Pipeline::new(collab, config);

    let state = match command {
        Command::Start {
            prompt,
            source_repo,
        } => {
            let mut payload = StagePayload::start(prompt);
            if let Some(repo) = source_repo {
                payload = payload.with_source_repo(repo);
            }
            pipeline.start(payload).await?
        }
        Command::Resume {
            stage,
            req_id,
            test_case_ids,
            run_id,
        } => {
            let mut payload = StagePayload::resume_at(stage)
                .with_req_id(req_id)
                .with_test_case_ids(test_case_ids);
            if let Some(run_id) = run_id {
                payload = payload.with_run_id(run_id);
            }
            pipeline.resume(payload).await?
        }
        Command::Stages => unreachable!("handled before runtime startup"),
    };

    print_state(&state)
}

fn build_collaborators(config: &Config) -> Result<Collaborators> {
    let generator =
        HttpGenerator::from_config(&config.generator).context("generator configuration")?;
    let ledger = JsonlLedger::new(config.data_dir.clone());
    let store = FsObjectStore::new(config.store_root.clone());
    let ticketing = JiraHttp::from_config(&config.jira).context("jira configuration")?;
    Ok(Collaborators::new(
        Arc::new(generator),
        Arc::new(ledger),
        Arc::new(store),
        Arc::new(ticketing),
    ))
}

fn print_state(state: &PipelineState) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(state).context("failed to render pipeline state")?;
    println!("{rendered}");
    Ok(())
}
