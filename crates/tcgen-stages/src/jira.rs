//! `jira` stage: find-or-create the tracker issue for a requirement
//!
//! The only idempotent stage: an existing issue whose summary mentions the
//! requirement id gets a run comment; otherwise a new issue is created with
//! the requirement text, test-case descriptions, and the run section.
//! A missing requirement is fatal here, unlike in the content path.

use chrono::Utc;
use std::collections::HashMap;
use tcgen_clients::{Collaborators, IssueFields};
use tcgen_utils::error::StageError;
use tcgen_utils::types::{TestResult, TicketUpdate};
use tracing::info;

/// Inline sample payloads in run comments are cut at this many characters.
const SAMPLE_INLINE_LIMIT: usize = 800;

pub struct JiraInput<'a> {
    pub req_id: &'a str,
    pub test_case_ids: &'a [String],
    /// Caller-supplied run label; defaults to `run-{unix_seconds}`.
    pub run_id: Option<String>,
    pub project_key: &'a str,
}

pub async fn run(collab: &Collaborators, input: JiraInput<'_>) -> Result<TicketUpdate, StageError> {
    let req_rows = collab
        .ledger
        .select("requirements", &[("req_id", input.req_id)])
        .await?;
    let Some(req_row) = req_rows.into_iter().next() else {
        return Err(StageError::NotFound {
            req_id: input.req_id.to_string(),
        });
    };
    let requirement_text = req_row
        .get("requirement_text")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let latest = latest_results(collab, input.req_id).await?;
    let run_id = input
        .run_id
        .clone()
        .unwrap_or_else(|| format!("run-{}", Utc::now().timestamp()));
    let run_section = build_run_section(collab, &run_id, input.test_case_ids, &latest).await;

    let query = format!(
        "project = {} AND summary ~ \"{}\"",
        input.project_key, input.req_id
    );
    let issues = collab.ticketing.search(&query).await?;

    if let Some(existing) = issues.first() {
        collab.ticketing.add_comment(&existing.key, &run_section).await?;
        info!(req_id = input.req_id, issue_key = %existing.key, "appended run comment");
        return Ok(TicketUpdate {
            issue_key: existing.key.clone(),
            issue_url: existing.url.clone(),
            created: false,
        });
    }

    let case_rows = collab
        .ledger
        .select("test_cases", &[("req_id", input.req_id)])
        .await?;
    let mut case_lines = Vec::new();
    for id in input.test_case_ids {
        let described = case_rows.iter().find(|row| {
            row.get("id").and_then(|v| v.as_str()) == Some(id.as_str())
        });
        match described {
            Some(row) => {
                let title = row.get("title").and_then(|v| v.as_str()).unwrap_or("");
                let description = row
                    .get("description")
                    .and_then(|v| v.as_str())
                    .unwrap_or("");
                case_lines.push(format!("- {id}: {title}. {description}"));
            }
            None => case_lines.push(format!("- {id}")),
        }
    }

    let description = format!(
        "Requirement: {requirement_text}\n\nTest cases:\n{}\n\n{run_section}",
        case_lines.join("\n")
    );

    let created = collab
        .ticketing
        .create_issue(IssueFields {
            project_key: input.project_key.to_string(),
            summary: format!("Requirement {} - Automated Tests", input.req_id),
            description,
        })
        .await?;

    info!(req_id = input.req_id, issue_key = %created.key, "created tracker issue");
    Ok(TicketUpdate {
        issue_key: created.key,
        issue_url: created.url,
        created: true,
    })
}

/// Latest result per test case, by `recorded_at`.
async fn latest_results(
    collab: &Collaborators,
    req_id: &str,
) -> Result<HashMap<String, TestResult>, StageError> {
    let rows = collab
        .ledger
        .select("test_results", &[("req_id", req_id)])
        .await?;

    let mut latest: HashMap<String, TestResult> = HashMap::new();
    for row in rows {
        let Ok(result) = serde_json::from_value::<TestResult>(row) else {
            continue;
        };
        match latest.get(&result.test_case_id) {
            Some(existing) if existing.recorded_at >= result.recorded_at => {}
            _ => {
                latest.insert(result.test_case_id.clone(), result);
            }
        }
    }
    Ok(latest)
}

async fn build_run_section(
    collab: &Collaborators,
    run_id: &str,
    test_case_ids: &[String],
    latest: &HashMap<String, TestResult>,
) -> String {
    let mut lines = vec![format!("Automated test run {run_id}:")];

    for id in test_case_ids {
        match latest.get(id) {
            Some(result) => {
                lines.push(format!("- {id}: {} ({})", result.status, result.message));
                if let Some(path) = &result.sample_locator
                    && let Ok(bytes) = collab.store.get(path).await
                {
                    let text = String::from_utf8_lossy(&bytes);
                    lines.push(format!("  sample: {}", truncate(&text, SAMPLE_INLINE_LIMIT)));
                }
            }
            None => lines.push(format!("- {id}: NO-RESULT")),
        }
    }

    lines.join("\n")
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;
    use std::sync::Arc;
    use tcgen_clients::memory::{MemoryLedger, MemoryStore, MemoryTicketing, StaticGenerator};
    use tcgen_clients::{Ledger, ObjectStore};
    use tcgen_utils::types::TestStatus;

    struct Fixture {
        ledger: Arc<MemoryLedger>,
        store: Arc<MemoryStore>,
        ticketing: Arc<MemoryTicketing>,
        collab: Collaborators,
    }

    fn fixture() -> Fixture {
        let ledger = Arc::new(MemoryLedger::new());
        let store = Arc::new(MemoryStore::new());
        let ticketing = Arc::new(MemoryTicketing::new());
        let collab = Collaborators::new(
            Arc::new(StaticGenerator::default()),
            ledger.clone(),
            store.clone(),
            ticketing.clone(),
        );
        Fixture {
            ledger,
            store,
            ticketing,
            collab,
        }
    }

    async fn seed_requirement(f: &Fixture, req_id: &str) {
        f.ledger
            .insert(
                "requirements",
                vec![json!({"req_id": req_id, "requirement_text": "Pump shall alarm."})],
            )
            .await
            .unwrap();
    }

    fn input<'a>(req_id: &'a str, ids: &'a [String]) -> JiraInput<'a> {
        JiraInput {
            req_id,
            test_case_ids: ids,
            run_id: Some("run-1".to_string()),
            project_key: "KAN",
        }
    }

    #[tokio::test]
    async fn missing_requirement_is_fatal() {
        let f = fixture();
        let ids = vec!["TC-001".to_string()];
        let err = run(&f.collab, input("REQ-MISSING", &ids)).await.unwrap_err();
        assert!(matches!(err, StageError::NotFound { .. }));
        assert_eq!(f.ticketing.issue_count().await, 0);
    }

    #[tokio::test]
    async fn creates_issue_then_comments_on_reruns() {
        let f = fixture();
        seed_requirement(&f, "REQ-1").await;
        let ids = vec!["TC-001".to_string()];

        let first = run(&f.collab, input("REQ-1", &ids)).await.unwrap();
        assert!(first.created);
        assert_eq!(first.issue_key, "KAN-1");
        assert!(!first.issue_url.is_empty());

        let second = run(&f.collab, input("REQ-1", &ids)).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.issue_key, "KAN-1");

        let third = run(&f.collab, input("REQ-1", &ids)).await.unwrap();
        assert!(!third.created);

        // Exactly one issue, two comments: the first call embeds the run in
        // the issue body, every later call comments.
        assert_eq!(f.ticketing.issue_count().await, 1);
        assert_eq!(f.ticketing.comment_count("KAN-1").await, 2);
    }

    #[tokio::test]
    async fn run_section_reports_latest_result_and_inlines_sample() {
        let f = fixture();
        let now = Utc::now();
        f.store
            .put(
                "artifacts/samples/REQ-1/TC-001.json",
                br#"{"input":{"glucose":180}}"#,
                "application/json",
            )
            .await
            .unwrap();

        let result = TestResult {
            req_id: "REQ-1".to_string(),
            test_case_id: "TC-001".to_string(),
            status: TestStatus::Pass,
            message: "Test passed".to_string(),
            sample_locator: Some("artifacts/samples/REQ-1/TC-001.json".to_string()),
            recorded_at: now,
        };
        let latest = HashMap::from([("TC-001".to_string(), result)]);

        let ids = vec!["TC-001".to_string(), "TC-999".to_string()];
        let section = build_run_section(&f.collab, "run-42", &ids, &latest).await;

        assert!(section.contains("Automated test run run-42"));
        assert!(section.contains("- TC-001: PASS (Test passed)"));
        assert!(section.contains("glucose"));
        assert!(section.contains("- TC-999: NO-RESULT"));
    }

    #[tokio::test]
    async fn latest_results_picks_newest_per_case() {
        let f = fixture();
        let now = Utc::now();
        let rows = vec![
            serde_json::to_value(TestResult {
                req_id: "REQ-1".to_string(),
                test_case_id: "TC-001".to_string(),
                status: TestStatus::Fail,
                message: "first".to_string(),
                sample_locator: None,
                recorded_at: now - Duration::hours(1),
            })
            .unwrap(),
            serde_json::to_value(TestResult {
                req_id: "REQ-1".to_string(),
                test_case_id: "TC-001".to_string(),
                status: TestStatus::Pass,
                message: "second".to_string(),
                sample_locator: None,
                recorded_at: now,
            })
            .unwrap(),
        ];
        f.ledger.insert("test_results", rows).await.unwrap();

        let latest = latest_results(&f.collab, "REQ-1").await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest["TC-001"].message, "second");
    }

    #[test]
    fn truncate_cuts_long_payloads() {
        let long = "x".repeat(1000);
        let cut = truncate(&long, 800);
        assert_eq!(cut.chars().count(), 803);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate("short", 800), "short");
    }
}
