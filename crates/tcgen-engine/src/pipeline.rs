//! The pipeline orchestrator
//!
//! `run` executes exactly one stage and returns a snapshot with the typed
//! outcome of that stage plus the name of the next one. Stage outcomes are
//! a discriminated union rather than a loose map, so a missing field is a
//! compile error, not a runtime surprise; the union serializes untagged to
//! keep the snapshot's wire shape flat.

use crate::payload::StagePayload;
use serde::Serialize;
use std::sync::Arc;
use tcgen_clients::Collaborators;
use tcgen_config::Config;
use tcgen_stages::{CompliancePolicy, IdSuffixPolicy, jira, requirement, results, samples, testcases};
use tcgen_utils::error::StageError;
use tcgen_utils::logging::{log_stage_complete, log_stage_error, log_stage_start};
use tcgen_utils::types::{
    ComplianceFinding, GeneratedTest, PipelineStatus, Requirement, Sample, StageId, TestCase,
    TestResultsSummary, TicketUpdate,
};

/// Snapshot returned by every stage invocation.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineState {
    pub status: PipelineStatus,
    pub stage: StageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_stage: Option<StageId>,
    #[serde(flatten)]
    pub outcome: StageOutcome,
}

impl PipelineState {
    fn for_stage(stage: StageId, outcome: StageOutcome) -> Self {
        let next_stage = stage.next();
        let status = if next_stage.is_some() {
            PipelineStatus::AwaitingUser
        } else {
            PipelineStatus::Complete
        };
        Self {
            status,
            stage,
            next_stage,
            outcome,
        }
    }

    /// Requirement id of the outcome, for callers threading state forward.
    #[must_use]
    pub fn req_id(&self) -> &str {
        match &self.outcome {
            StageOutcome::Requirement { req_id, .. }
            | StageOutcome::TestCases { req_id, .. }
            | StageOutcome::SamplesJunit { req_id, .. }
            | StageOutcome::TestResults { req_id, .. }
            | StageOutcome::Jira { req_id, .. } => req_id,
        }
    }

    /// Test-case ids of the outcome, where the stage produced or carried any.
    #[must_use]
    pub fn test_case_ids(&self) -> &[String] {
        match &self.outcome {
            StageOutcome::TestCases { test_case_ids, .. }
            | StageOutcome::SamplesJunit { test_case_ids, .. } => test_case_ids,
            _ => &[],
        }
    }
}

/// Per-stage result, one variant per stage.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StageOutcome {
    Requirement {
        req_id: String,
        requirement: Requirement,
    },
    TestCases {
        req_id: String,
        test_case_ids: Vec<String>,
        testcases: Vec<TestCase>,
        compliance: Vec<ComplianceFinding>,
        fallback_used: bool,
    },
    SamplesJunit {
        req_id: String,
        test_case_ids: Vec<String>,
        samples: Vec<Sample>,
        junit: Vec<GeneratedTest>,
    },
    TestResults {
        req_id: String,
        test_results: TestResultsSummary,
    },
    Jira {
        req_id: String,
        jira: TicketUpdate,
    },
}

/// The orchestrator. Collaborators and configuration are injected once at
/// construction; each invocation is sequential and stateless across calls.
pub struct Pipeline {
    collab: Collaborators,
    config: Config,
    policy: Arc<dyn CompliancePolicy>,
}

impl Pipeline {
    pub fn new(collab: Collaborators, config: Config) -> Self {
        Self {
            collab,
            config,
            policy: Arc::new(IdSuffixPolicy),
        }
    }

    /// Swap in a different compliance rubric.
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn CompliancePolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Begin a new pipeline at the `requirement` stage.
    ///
    /// # Errors
    ///
    /// `StageError::Validation` when `prompt` is missing or empty, plus any
    /// collaborator failure.
    pub async fn start(&self, payload: StagePayload) -> Result<PipelineState, StageError> {
        self.run(payload, StageId::Requirement).await
    }

    /// Resume at the stage named in `payload.stage`.
    ///
    /// # Errors
    ///
    /// `StageError::Validation` when `stage` is missing,
    /// `StageError::UnknownStage` when it is not one of the five names, and
    /// whatever `run` returns for the target stage.
    pub async fn resume(&self, payload: StagePayload) -> Result<PipelineState, StageError> {
        let name = match payload.stage.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => return Err(StageError::validation("resume", "stage")),
        };
        let stage =
            StageId::parse(&name).ok_or_else(|| StageError::UnknownStage(name.clone()))?;
        self.run(payload, stage).await
    }

    /// Execute exactly one stage. Required payload keys are validated
    /// before any side effect.
    pub async fn run(
        &self,
        payload: StagePayload,
        stage: StageId,
    ) -> Result<PipelineState, StageError> {
        log_stage_start(stage.as_str(), payload.req_id.as_deref());

        let result = self.dispatch(payload, stage).await;
        match &result {
            Ok(state) => log_stage_complete(stage.as_str(), state.req_id()),
            Err(err) => log_stage_error(stage.as_str(), err),
        }
        result
    }

    async fn dispatch(
        &self,
        payload: StagePayload,
        stage: StageId,
    ) -> Result<PipelineState, StageError> {
        let outcome = match stage {
            StageId::Requirement => {
                let prompt =
                    StagePayload::require_str(stage, "prompt", &payload.prompt)?.to_string();
                let requirement = requirement::run(
                    &self.collab,
                    requirement::RequirementInput {
                        prompt,
                        source_repo: payload.source_repo.clone(),
                    },
                )
                .await?;
                StageOutcome::Requirement {
                    req_id: requirement.req_id.clone(),
                    requirement,
                }
            }
            StageId::Testcases => {
                let req_id = StagePayload::require_str(stage, "req_id", &payload.req_id)?;
                let out = testcases::run(&self.collab, self.policy.as_ref(), req_id).await?;
                StageOutcome::TestCases {
                    req_id: req_id.to_string(),
                    test_case_ids: out.test_case_ids,
                    testcases: out.testcases,
                    compliance: out.compliance,
                    fallback_used: out.fallback_used,
                }
            }
            StageId::SamplesJunit => {
                let req_id = StagePayload::require_str(stage, "req_id", &payload.req_id)?;
                let ids =
                    StagePayload::require_ids(stage, "test_case_ids", &payload.test_case_ids)?;
                let stage_config = samples::SamplesJunitConfig {
                    junit_package: self.config.junit_package.clone(),
                    sample_resources_dir: self.config.sample_resources_dir.clone(),
                };
                let out = samples::run(&self.collab, &stage_config, req_id, ids).await?;
                StageOutcome::SamplesJunit {
                    req_id: req_id.to_string(),
                    test_case_ids: ids.to_vec(),
                    samples: out.samples,
                    junit: out.junit,
                }
            }
            StageId::TestResults => {
                let req_id = StagePayload::require_str(stage, "req_id", &payload.req_id)?;
                let summary =
                    results::run(&self.collab, &self.config.report_dirs, req_id).await?;
                StageOutcome::TestResults {
                    req_id: req_id.to_string(),
                    test_results: summary,
                }
            }
            StageId::Jira => {
                let req_id = StagePayload::require_str(stage, "req_id", &payload.req_id)?;
                let ids = payload
                    .test_case_ids
                    .as_deref()
                    .ok_or_else(|| StageError::validation(stage.as_str(), "test_case_ids"))?;
                let ticket = jira::run(
                    &self.collab,
                    jira::JiraInput {
                        req_id,
                        test_case_ids: ids,
                        run_id: payload.run_id.clone(),
                        project_key: &self.config.jira.project_key,
                    },
                )
                .await?;
                StageOutcome::Jira {
                    req_id: req_id.to_string(),
                    jira: ticket,
                }
            }
        };

        Ok(PipelineState::for_stage(stage, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tcgen_clients::memory::{MemoryLedger, MemoryStore, MemoryTicketing, StaticGenerator};

    struct Fixture {
        ledger: Arc<MemoryLedger>,
        store: Arc<MemoryStore>,
        pipeline: Pipeline,
    }

    fn fixture(generator: StaticGenerator) -> Fixture {
        let ledger = Arc::new(MemoryLedger::new());
        let store = Arc::new(MemoryStore::new());
        let collab = Collaborators::new(
            Arc::new(generator),
            ledger.clone(),
            store.clone(),
            Arc::new(MemoryTicketing::new()),
        );
        Fixture {
            ledger,
            store,
            pipeline: Pipeline::new(collab, Config::default()),
        }
    }

    #[tokio::test]
    async fn start_requires_prompt() {
        let f = fixture(StaticGenerator::default());
        let err = f.pipeline.start(StagePayload::default()).await.unwrap_err();
        assert!(matches!(
            err,
            StageError::Validation { ref field, .. } if field == "prompt"
        ));
        assert_eq!(f.ledger.total_rows().await, 0);
    }

    #[tokio::test]
    async fn start_returns_req_id_and_next_stage() {
        let f = fixture(StaticGenerator::new(["The pump shall alarm within 60s."]));
        let state = f
            .pipeline
            .start(StagePayload::start("Pump shall alarm"))
            .await
            .unwrap();

        assert_eq!(state.status, PipelineStatus::AwaitingUser);
        assert_eq!(state.stage, StageId::Requirement);
        assert_eq!(state.next_stage, Some(StageId::Testcases));
        assert!(tcgen_utils::ids::REQ_ID_RE.is_match(state.req_id()));
    }

    #[tokio::test]
    async fn resume_requires_stage_name() {
        let f = fixture(StaticGenerator::default());
        let err = f.pipeline.resume(StagePayload::default()).await.unwrap_err();
        assert!(matches!(
            err,
            StageError::Validation { ref field, .. } if field == "stage"
        ));
    }

    #[tokio::test]
    async fn resume_rejects_unknown_stage() {
        let f = fixture(StaticGenerator::default());
        let err = f
            .pipeline
            .resume(StagePayload::resume_at("deploy"))
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::UnknownStage(ref name) if name == "deploy"));
    }

    #[tokio::test]
    async fn testcases_with_unknown_req_id_is_empty_not_error() {
        let f = fixture(StaticGenerator::new(["unused"]));
        let state = f
            .pipeline
            .resume(StagePayload::resume_at("testcases").with_req_id("REQ-FFFFFFFF"))
            .await
            .unwrap();

        assert_eq!(state.status, PipelineStatus::AwaitingUser);
        assert_eq!(state.next_stage, Some(StageId::SamplesJunit));
        assert!(state.test_case_ids().is_empty());
    }

    #[tokio::test]
    async fn samples_junit_missing_ids_fails_without_writes() {
        let f = fixture(StaticGenerator::default());
        let err = f
            .pipeline
            .resume(StagePayload::resume_at("samples_junit").with_req_id("REQ-1"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StageError::Validation { ref field, .. } if field == "test_case_ids"
        ));
        assert_eq!(f.store.object_count().await, 0);
        assert_eq!(f.ledger.total_rows().await, 0);
    }

    #[tokio::test]
    async fn snapshot_serializes_flat() {
        let f = fixture(StaticGenerator::new(["Requirement text."]));
        let state = f
            .pipeline
            .start(StagePayload::start("prompt"))
            .await
            .unwrap();

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "AWAITING_USER");
        assert_eq!(json["stage"], "requirement");
        assert_eq!(json["next_stage"], "testcases");
        // Outcome fields sit at the top level, not under an enum tag.
        assert_eq!(json["req_id"], state.req_id());
        assert_eq!(json["requirement"]["requirement_text"], "Requirement text.");
    }
}
