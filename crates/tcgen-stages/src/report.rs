//! Surefire-style report extraction
//!
//! Pulls per-testcase records out of XML report files with targeted
//! regexes rather than a full XML parser: the format is rigidly
//! machine-written and the stage must degrade softly on malformed input
//! anyway. A record's outcome is the first of failure/error/skipped found
//! in its body, in that priority order; none of the three means PASS.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use tcgen_utils::ids;
use tcgen_utils::types::TestStatus;
use tracing::{debug, warn};

/// One record extracted from a report file.
#[derive(Debug, Clone)]
pub struct ReportRecord {
    pub classname: String,
    /// Derived by normalizing `classname` (last dotted segment, trailing
    /// `Test` stripped, underscores to hyphens).
    pub test_case_id: String,
    pub status: TestStatus,
    pub message: String,
}

static TESTCASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<testcase\b([^>]*?)(?:/>|>(.*?)</testcase>)").expect("valid regex")
});
static CLASSNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"classname\s*=\s*"([^"]*)""#).expect("valid regex"));
static FAILURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<failure\b([^>]*)").expect("valid regex"));
static ERROR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<error\b([^>]*)").expect("valid regex"));
static SKIPPED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<skipped\b([^>]*)").expect("valid regex"));
static MESSAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"message\s*=\s*"([^"]*)""#).expect("valid regex"));

/// Scan directories for `*.xml` report files and extract all records.
///
/// Missing directories are skipped silently; unreadable or malformed files
/// are skipped with a warning. Files are visited in sorted order and
/// records returned in file order.
#[must_use]
pub fn parse_report_dirs(dirs: &[PathBuf]) -> Vec<ReportRecord> {
    let mut records = Vec::new();

    for dir in dirs {
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "report directory missing, skipping");
            continue;
        }

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot list report directory, skipping");
                continue;
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "xml"))
            .collect();
        files.sort();

        for file in files {
            let content = match std::fs::read_to_string(&file) {
                Ok(content) => content,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "cannot read report file, skipping");
                    continue;
                }
            };

            match parse_report(&content) {
                Some(parsed) => records.extend(parsed),
                None => {
                    warn!(file = %file.display(), "malformed report file, skipping");
                }
            }
        }
    }

    records
}

/// Extract records from one report file's content. Returns `None` when the
/// content does not look like a test report at all.
#[must_use]
pub fn parse_report(content: &str) -> Option<Vec<ReportRecord>> {
    if !content.contains("<testsuite") && !content.contains("<testcase") {
        return None;
    }

    let mut records = Vec::new();
    for caps in TESTCASE_RE.captures_iter(content) {
        let attrs = caps.get(1).map_or("", |m| m.as_str());
        let Some(classname) = CLASSNAME_RE
            .captures(attrs)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
        else {
            warn!("testcase record without classname attribute, skipping");
            continue;
        };

        let body = caps.get(2).map_or("", |m| m.as_str());
        let (status, message) = classify(body);

        records.push(ReportRecord {
            test_case_id: ids::test_case_id_from_class(&classname),
            classname,
            status,
            message,
        });
    }

    Some(records)
}

fn classify(body: &str) -> (TestStatus, String) {
    let outcomes: [(&Lazy<Regex>, TestStatus, &str); 3] = [
        (&FAILURE_RE, TestStatus::Fail, "Failure"),
        (&ERROR_RE, TestStatus::Error, "Error"),
        (&SKIPPED_RE, TestStatus::Skipped, "Skipped"),
    ];

    for (re, status, default_message) in outcomes {
        if let Some(caps) = re.captures(body) {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let message = MESSAGE_RE
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map(|m| unescape(m.as_str()))
                .unwrap_or_else(|| default_message.to_string());
            return (status, message);
        }
    }

    (TestStatus::Pass, "Test passed".to_string())
}

fn unescape(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuite name="com.generated.tests.TC_001Test" tests="2">
  <testcase name="execute" classname="com.generated.tests.TC_001Test" time="0.01"/>
  <testcase name="execute" classname="com.generated.tests.TC_002Test" time="0.02">
    <failure message="expected alarm within 60s" type="AssertionError">trace</failure>
  </testcase>
</testsuite>
"#;

    #[test]
    fn extracts_pass_and_fail_in_file_order() {
        let records = parse_report(REPORT).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].test_case_id, "TC-001");
        assert_eq!(records[0].status, TestStatus::Pass);
        assert_eq!(records[0].message, "Test passed");

        assert_eq!(records[1].test_case_id, "TC-002");
        assert_eq!(records[1].status, TestStatus::Fail);
        assert_eq!(records[1].message, "expected alarm within 60s");
    }

    #[test]
    fn default_messages_when_attribute_absent() {
        let content = r#"<testsuite>
          <testcase classname="a.TC_1Test"><failure type="X">t</failure></testcase>
          <testcase classname="a.TC_2Test"><error/></testcase>
          <testcase classname="a.TC_3Test"><skipped/></testcase>
        </testsuite>"#;
        let records = parse_report(content).unwrap();
        assert_eq!(records[0].message, "Failure");
        assert_eq!(records[1].message, "Error");
        assert_eq!(records[1].status, TestStatus::Error);
        assert_eq!(records[2].message, "Skipped");
        assert_eq!(records[2].status, TestStatus::Skipped);
    }

    #[test]
    fn failure_wins_over_skipped() {
        let content = r#"<testsuite>
          <testcase classname="a.TC_1Test">
            <skipped/>
            <failure message="boom"/>
          </testcase>
        </testsuite>"#;
        let records = parse_report(content).unwrap();
        assert_eq!(records[0].status, TestStatus::Fail);
        assert_eq!(records[0].message, "boom");
    }

    #[test]
    fn unescapes_message_entities() {
        let content = r#"<testsuite>
          <testcase classname="a.TC_1Test">
            <failure message="expected &quot;on&quot; &amp; got &lt;off&gt;"/>
          </testcase>
        </testsuite>"#;
        let records = parse_report(content).unwrap();
        assert_eq!(records[0].message, "expected \"on\" & got <off>");
    }

    #[test]
    fn content_without_report_markers_is_malformed() {
        assert!(parse_report("<html><body>oops</body></html>").is_none());
        assert!(parse_report("").is_none());
    }

    #[test]
    fn records_without_classname_are_skipped() {
        let content = r#"<testsuite>
          <testcase name="anonymous"/>
          <testcase classname="a.TC_1Test"/>
        </testsuite>"#;
        let records = parse_report(content).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn scans_directories_softly() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b-report.xml"), REPORT).unwrap();
        std::fs::write(dir.path().join("a-broken.xml"), "definitely not xml").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let missing = PathBuf::from("/nonexistent/tcgen-reports");
        let records = parse_report_dirs(&[missing, dir.path().to_path_buf()]);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn empty_scan_returns_no_records() {
        let dir = tempfile::tempdir().unwrap();
        let records = parse_report_dirs(&[dir.path().to_path_buf()]);
        assert!(records.is_empty());
    }
}
