//! `test_results` stage: ingest external report records into the ledger

use crate::{report, samples};
use chrono::Utc;
use std::path::PathBuf;
use tcgen_clients::Collaborators;
use tcgen_utils::error::{LedgerError, StageError};
use tcgen_utils::types::{TestResult, TestResultsSummary};
use tracing::info;

/// Parse the configured report directories and persist one result row per
/// record. Zero records is a soft outcome (`inserted == 0`), not an error.
pub async fn run(
    collab: &Collaborators,
    report_dirs: &[PathBuf],
    req_id: &str,
) -> Result<TestResultsSummary, StageError> {
    let records = report::parse_report_dirs(report_dirs);
    let recorded_at = Utc::now();

    let results: Vec<TestResult> = records
        .into_iter()
        .map(|record| TestResult {
            req_id: req_id.to_string(),
            test_case_id: record.test_case_id.clone(),
            status: record.status,
            message: record.message,
            sample_locator: Some(samples::sample_path(req_id, &record.test_case_id)),
            recorded_at,
        })
        .collect();

    if results.is_empty() {
        info!(req_id, "no test results found in report directories");
        return Ok(TestResultsSummary {
            inserted: 0,
            results,
        });
    }

    let rows = results
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(LedgerError::from)?;
    collab.ledger.insert("test_results", rows).await?;

    info!(req_id, inserted = results.len(), "test results recorded");
    Ok(TestResultsSummary {
        inserted: results.len(),
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tcgen_clients::memory::{MemoryLedger, MemoryStore, MemoryTicketing, StaticGenerator};
    use tcgen_utils::types::TestStatus;

    fn collab() -> (Arc<MemoryLedger>, Collaborators) {
        let ledger = Arc::new(MemoryLedger::new());
        let c = Collaborators::new(
            Arc::new(StaticGenerator::default()),
            ledger.clone(),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryTicketing::new()),
        );
        (ledger, c)
    }

    #[tokio::test]
    async fn ingests_records_with_sample_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("report.xml"),
            r#"<testsuite>
              <testcase classname="com.generated.tests.TC_001Test"/>
              <testcase classname="com.generated.tests.TC_002Test">
                <failure message="nope"/>
              </testcase>
            </testsuite>"#,
        )
        .unwrap();

        let (ledger, collab) = collab();
        let summary = run(&collab, &[dir.path().to_path_buf()], "REQ-1")
            .await
            .unwrap();

        assert_eq!(summary.inserted, 2);
        let statuses: Vec<TestStatus> = summary.results.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![TestStatus::Pass, TestStatus::Fail]);
        assert_eq!(summary.results[1].message, "nope");
        assert_eq!(
            summary.results[0].sample_locator.as_deref(),
            Some("artifacts/samples/REQ-1/TC-001.json")
        );
        assert_eq!(ledger.rows("test_results").await.len(), 2);
    }

    #[tokio::test]
    async fn empty_directories_yield_soft_zero() {
        let dir = tempfile::tempdir().unwrap();
        let (ledger, collab) = collab();
        let summary = run(&collab, &[dir.path().to_path_buf()], "REQ-1")
            .await
            .unwrap();
        assert_eq!(summary.inserted, 0);
        assert!(summary.results.is_empty());
        assert_eq!(ledger.total_rows().await, 0);
    }
}
