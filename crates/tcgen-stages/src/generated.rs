//! Typed outcome of generator parsing
//!
//! Generator output is requested as a JSON array of test cases but arrives
//! as free text. Parsing never fails the stage: unparsable output yields a
//! deterministic fallback test case, surfaced as an explicit `Fallback`
//! variant and a logged warning rather than a swallowed exception.

use serde::Deserialize;
use tcgen_utils::ids;
use tracing::warn;

/// One test case as produced by the generator, before ids are sanitized
/// and the record is scoped to its requirement.
#[derive(Debug, Clone, Deserialize)]
pub struct TestCaseDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub expected_results: Vec<String>,
}

/// Parsed generator output or the deterministic fallback.
#[derive(Debug)]
pub enum Generated {
    Parsed(Vec<TestCaseDraft>),
    Fallback(TestCaseDraft),
}

impl Generated {
    /// Parse raw generator text. Markdown code fences are tolerated; an
    /// empty array counts as unparsable because the stage must always
    /// produce at least one test case.
    #[must_use]
    pub fn parse(raw: &str, req_id: &str) -> Generated {
        let cleaned = strip_code_fences(raw);
        match serde_json::from_str::<Vec<TestCaseDraft>>(cleaned) {
            Ok(drafts) if !drafts.is_empty() => Generated::Parsed(drafts),
            Ok(_) => {
                warn!(req_id, "generator returned an empty test case array, using fallback");
                Generated::Fallback(fallback_draft(req_id))
            }
            Err(e) => {
                warn!(req_id, error = %e, "generator output unparsable, using fallback test case");
                Generated::Fallback(fallback_draft(req_id))
            }
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Generated::Fallback(_))
    }

    #[must_use]
    pub fn into_drafts(self) -> Vec<TestCaseDraft> {
        match self {
            Generated::Parsed(drafts) => drafts,
            Generated::Fallback(draft) => vec![draft],
        }
    }
}

fn fallback_draft(req_id: &str) -> TestCaseDraft {
    TestCaseDraft {
        id: Some(ids::new_test_case_id()),
        title: "Auto-generated test case".to_string(),
        description: format!("Fallback test case for {req_id}"),
        steps: vec!["Execute the scenario described by the requirement".to_string()],
        expected_results: vec!["System behaves as specified".to_string()],
    }
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(inner) = rest.strip_suffix("```") {
            return inner.trim();
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_array() {
        let raw = r#"[{"id": "TC-001", "title": "Alarm fires", "steps": ["s1"], "expected_results": ["e1"]}]"#;
        let generated = Generated::parse(raw, "REQ-1");
        assert!(!generated.is_fallback());
        let drafts = generated.into_drafts();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id.as_deref(), Some("TC-001"));
    }

    #[test]
    fn tolerates_code_fences() {
        let raw = "```json\n[{\"title\": \"t\"}]\n```";
        let generated = Generated::parse(raw, "REQ-1");
        assert!(!generated.is_fallback());
    }

    #[test]
    fn prose_falls_back() {
        let generated = Generated::parse("Sure! Here are some test cases:", "REQ-1");
        assert!(generated.is_fallback());
        let drafts = generated.into_drafts();
        assert_eq!(drafts.len(), 1);
        assert!(drafts[0].description.contains("REQ-1"));
        // Fallback ids come from the minted alphabet.
        assert!(tcgen_utils::ids::TEST_CASE_ID_RE.is_match(drafts[0].id.as_deref().unwrap()));
    }

    #[test]
    fn empty_array_falls_back() {
        let generated = Generated::parse("[]", "REQ-1");
        assert!(generated.is_fallback());
    }

    #[test]
    fn empty_string_falls_back() {
        let generated = Generated::parse("", "REQ-1");
        assert!(generated.is_fallback());
    }
}
