//! `samples_junit` stage: sample payloads and generated JUnit sources
//!
//! For each test case the sample is written first, then the test source
//! that references it. That ordering is an invariant: a generated test must
//! never exist without its sample.

use crate::junit;
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tcgen_clients::Collaborators;
use tcgen_utils::error::StageError;
use tcgen_utils::types::{GeneratedTest, Sample, TestCase};
use tracing::{info, warn};

pub struct SamplesJunitConfig {
    pub junit_package: String,
    /// Optional local mirror directory for sample JSON files.
    pub sample_resources_dir: Option<PathBuf>,
}

pub struct SamplesJunitOutput {
    pub samples: Vec<Sample>,
    pub junit: Vec<GeneratedTest>,
}

/// Artifact path of a test case's sample. Shared with the `test_results`
/// and `jira` stages so result rows and run comments can reference it.
#[must_use]
pub fn sample_path(req_id: &str, test_case_id: &str) -> String {
    format!("artifacts/samples/{req_id}/{test_case_id}.json")
}

/// Create samples and generated tests for the given test cases. Writes are
/// last-writer-wins at fixed paths, so re-invocation overwrites.
pub async fn run(
    collab: &Collaborators,
    config: &SamplesJunitConfig,
    req_id: &str,
    test_case_ids: &[String],
) -> Result<SamplesJunitOutput, StageError> {
    let case_rows = collab
        .ledger
        .select("test_cases", &[("req_id", req_id)])
        .await?;
    let cases_by_id: HashMap<String, TestCase> = case_rows
        .into_iter()
        .filter_map(|row| serde_json::from_value::<TestCase>(row).ok())
        .map(|tc| (tc.id.clone(), tc))
        .collect();

    let mut samples = Vec::with_capacity(test_case_ids.len());
    let mut tests = Vec::with_capacity(test_case_ids.len());

    for test_case_id in test_case_ids {
        let sample = make_sample(collab, config, req_id, test_case_id).await?;
        let test = junit::generate_test(
            collab,
            config,
            req_id,
            cases_by_id.get(test_case_id),
            test_case_id,
            &sample,
        )
        .await?;
        samples.push(sample);
        tests.push(test);
    }

    info!(req_id, count = samples.len(), "samples and test sources stored");
    Ok(SamplesJunitOutput {
        samples,
        junit: tests,
    })
}

async fn make_sample(
    collab: &Collaborators,
    config: &SamplesJunitConfig,
    req_id: &str,
    test_case_id: &str,
) -> Result<Sample, StageError> {
    // Deterministic placeholder payload; real input generation is out of
    // scope for this stage.
    let input = json!({"glucose": 180, "dose": 2});
    let expected = json!({"delivery_logged": true});
    let content = json!({
        "test_case_id": test_case_id,
        "input": input,
        "expected": expected,
    });
    let bytes = content.to_string().into_bytes();

    let path = sample_path(req_id, test_case_id);
    let locator = collab
        .store
        .put(&path, &bytes, "application/json")
        .await?;

    let local_path = match &config.sample_resources_dir {
        Some(dir) => match write_local_copy(dir, test_case_id, &bytes) {
            Ok(p) => Some(p),
            Err(e) => {
                // The mirror is a convenience; losing it never fails the stage.
                warn!(test_case_id, error = %e, "failed to mirror sample locally");
                None
            }
        },
        None => None,
    };

    Ok(Sample {
        test_case_id: test_case_id.to_string(),
        input,
        expected,
        locator,
        local_path,
    })
}

fn write_local_copy(dir: &Path, test_case_id: &str, bytes: &[u8]) -> std::io::Result<String> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{test_case_id}.json"));
    std::fs::write(&path, bytes)?;
    Ok(path.display().to_string())
}
