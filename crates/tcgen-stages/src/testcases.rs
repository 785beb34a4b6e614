//! `testcases` stage: requirement in, test cases + compliance findings out

use crate::compliance::CompliancePolicy;
use crate::generated::Generated;
use chrono::Utc;
use tcgen_clients::Collaborators;
use tcgen_utils::error::{LedgerError, StageError};
use tcgen_utils::ids;
use tcgen_utils::types::{ComplianceFinding, TestCase};
use tracing::info;

pub struct TestCasesOutput {
    pub testcases: Vec<TestCase>,
    pub test_case_ids: Vec<String>,
    pub compliance: Vec<ComplianceFinding>,
    /// True when the generator output was unparsable and the deterministic
    /// fallback test case was used.
    pub fallback_used: bool,
}

impl TestCasesOutput {
    fn empty() -> Self {
        Self {
            testcases: Vec::new(),
            test_case_ids: Vec::new(),
            compliance: Vec::new(),
            fallback_used: false,
        }
    }
}

fn build_prompt(req_id: &str, requirement_text: &str) -> String {
    format!(
        "Generate QA test cases for requirement {req_id}:\n\
         \n\
         {requirement_text}\n\
         \n\
         Respond with a JSON array only. Each element must have the fields\n\
         \"id\", \"title\", \"description\", \"steps\" (array of strings),\n\
         and \"expected_results\" (array of strings)."
    )
}

/// Generate test cases for a requirement and run the compliance policy over
/// each produced id. An unknown `req_id` yields an empty output, not an
/// error. Re-invocation appends a fresh set of test cases.
pub async fn run(
    collab: &Collaborators,
    policy: &dyn CompliancePolicy,
    req_id: &str,
) -> Result<TestCasesOutput, StageError> {
    let rows = collab
        .ledger
        .select("requirements", &[("req_id", req_id)])
        .await?;
    let Some(row) = rows.into_iter().next() else {
        info!(req_id, "no requirement on record, returning empty test case set");
        return Ok(TestCasesOutput::empty());
    };
    let requirement_text = row
        .get("requirement_text")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let raw = collab
        .generator
        .generate(&build_prompt(req_id, &requirement_text))
        .await?;
    let generated = Generated::parse(&raw, req_id);
    let fallback_used = generated.is_fallback();

    let testcases: Vec<TestCase> = generated
        .into_drafts()
        .into_iter()
        .map(|draft| {
            let id = match draft.id.as_deref() {
                Some(raw_id) => ids::sanitize_test_case_id(raw_id),
                None => ids::new_test_case_id(),
            };
            TestCase {
                id,
                req_id: req_id.to_string(),
                title: draft.title,
                description: draft.description,
                steps: draft.steps,
                expected_results: draft.expected_results,
            }
        })
        .collect();

    let case_rows = testcases
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(LedgerError::from)?;
    collab.ledger.insert("test_cases", case_rows).await?;

    let validated_at = Utc::now();
    let compliance: Vec<ComplianceFinding> = testcases
        .iter()
        .map(|tc| {
            let assessment = policy.assess(&tc.id);
            ComplianceFinding {
                validation_id: ids::new_validation_id(),
                test_case_id: tc.id.clone(),
                compliant: assessment.compliant,
                missing_elements: assessment.missing_elements,
                references: assessment.references,
                suggestion: assessment.suggestion,
                validated_at,
            }
        })
        .collect();

    let finding_rows = compliance
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(LedgerError::from)?;
    collab.ledger.insert("compliance_findings", finding_rows).await?;

    let test_case_ids: Vec<String> = testcases.iter().map(|tc| tc.id.clone()).collect();
    info!(
        req_id,
        count = testcases.len(),
        fallback_used,
        "test cases recorded"
    );

    Ok(TestCasesOutput {
        testcases,
        test_case_ids,
        compliance,
        fallback_used,
    })
}
