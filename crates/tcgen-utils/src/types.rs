//! Core pipeline types
//!
//! Stage identifiers, pipeline status, and the record structs persisted to
//! the ledger or carried in stage outputs. Everything here is plain data;
//! behavior lives in the stage and engine crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The five pipeline stages, in execution order.
///
/// The pipeline is linear: each stage has exactly one successor and the
/// sequence never branches. `Jira` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Requirement,
    Testcases,
    SamplesJunit,
    TestResults,
    Jira,
}

impl StageId {
    /// All stages in execution order.
    pub const ALL: [StageId; 5] = [
        StageId::Requirement,
        StageId::Testcases,
        StageId::SamplesJunit,
        StageId::TestResults,
        StageId::Jira,
    ];

    /// Stable wire name of the stage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            StageId::Requirement => "requirement",
            StageId::Testcases => "testcases",
            StageId::SamplesJunit => "samples_junit",
            StageId::TestResults => "test_results",
            StageId::Jira => "jira",
        }
    }

    /// The stage that follows this one, or `None` for the terminal stage.
    #[must_use]
    pub const fn next(&self) -> Option<StageId> {
        match self {
            StageId::Requirement => Some(StageId::Testcases),
            StageId::Testcases => Some(StageId::SamplesJunit),
            StageId::SamplesJunit => Some(StageId::TestResults),
            StageId::TestResults => Some(StageId::Jira),
            StageId::Jira => None,
        }
    }

    /// Parse a wire name into a stage id. Returns `None` for anything
    /// outside the fixed five-name set.
    #[must_use]
    pub fn parse(name: &str) -> Option<StageId> {
        match name {
            "requirement" => Some(StageId::Requirement),
            "testcases" => Some(StageId::Testcases),
            "samples_junit" => Some(StageId::SamplesJunit),
            "test_results" => Some(StageId::TestResults),
            "jira" => Some(StageId::Jira),
            _ => None,
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the pipeline is waiting for the caller to trigger the next stage
/// or has run its terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStatus {
    AwaitingUser,
    Complete,
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStatus::AwaitingUser => f.write_str("AWAITING_USER"),
            PipelineStatus::Complete => f.write_str("COMPLETE"),
        }
    }
}

/// A requirement record, created once at the `requirement` stage and
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requirement {
    pub req_id: String,
    pub prompt: String,
    pub requirement_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_repo: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A test case scoped to exactly one requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub req_id: String,
    pub title: String,
    pub description: String,
    pub steps: Vec<String>,
    pub expected_results: Vec<String>,
}

/// Outcome of running the compliance policy against one test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceFinding {
    pub validation_id: String,
    pub test_case_id: String,
    pub compliant: bool,
    pub missing_elements: Vec<String>,
    pub references: Vec<String>,
    pub suggestion: String,
    pub validated_at: DateTime<Utc>,
}

/// Sample input/expected payload stored for one test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub test_case_id: String,
    pub input: serde_json::Value,
    pub expected: serde_json::Value,
    /// Locator returned by the object store.
    pub locator: String,
    /// Optional mirror written into a local test-resources directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
}

/// A generated JUnit source file. Always created after its sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedTest {
    pub test_case_id: String,
    pub class_name: String,
    pub locator: String,
    pub sample_locator: String,
}

/// Result status parsed out of an external test report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    Pass,
    Fail,
    Error,
    Skipped,
}

impl TestStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Pass => "PASS",
            TestStatus::Fail => "FAIL",
            TestStatus::Error => "ERROR",
            TestStatus::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingested test result. Multiple results may exist per test case;
/// only the latest `recorded_at` is authoritative for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub req_id: String,
    pub test_case_id: String,
    pub status: TestStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_locator: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Summary returned by the `test_results` stage. `inserted == 0` is a soft
/// outcome, not a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResultsSummary {
    pub inserted: usize,
    pub results: Vec<TestResult>,
}

/// Issue-tracker outcome of the terminal stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketUpdate {
    pub issue_key: String,
    pub issue_url: String,
    /// True when a new issue was created, false when a comment was appended
    /// to an existing one.
    pub created: bool,
}
