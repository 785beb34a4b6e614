//! Stage payload and required-input validation
//!
//! One flat payload shape serves every stage; each stage names the keys it
//! requires and validation runs before any side effect. Missing keys fail
//! with `StageError::Validation` naming the key.

use serde::{Deserialize, Serialize};
use tcgen_utils::StageId;
use tcgen_utils::error::StageError;

/// Caller-supplied input for one stage invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub req_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_case_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    /// Target stage name, used by `resume`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

impl StagePayload {
    /// Payload for starting a new pipeline at the `requirement` stage.
    #[must_use]
    pub fn start(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Self::default()
        }
    }

    /// Payload for resuming at a named stage.
    #[must_use]
    pub fn resume_at(stage: impl Into<String>) -> Self {
        Self {
            stage: Some(stage.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_source_repo(mut self, source_repo: impl Into<String>) -> Self {
        self.source_repo = Some(source_repo.into());
        self
    }

    #[must_use]
    pub fn with_req_id(mut self, req_id: impl Into<String>) -> Self {
        self.req_id = Some(req_id.into());
        self
    }

    #[must_use]
    pub fn with_test_case_ids(mut self, ids: Vec<String>) -> Self {
        self.test_case_ids = Some(ids);
        self
    }

    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    /// Require a non-empty string field.
    pub(crate) fn require_str<'a>(
        stage: StageId,
        field: &str,
        value: &'a Option<String>,
    ) -> Result<&'a str, StageError> {
        match value.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(StageError::validation(stage.as_str(), field)),
        }
    }

    /// Require a non-empty id list.
    pub(crate) fn require_ids<'a>(
        stage: StageId,
        field: &str,
        value: &'a Option<Vec<String>>,
    ) -> Result<&'a [String], StageError> {
        match value.as_deref() {
            Some(ids) if !ids.is_empty() => Ok(ids),
            _ => Err(StageError::validation(stage.as_str(), field)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_str_rejects_missing_and_blank() {
        let missing: Option<String> = None;
        let err = StagePayload::require_str(StageId::Requirement, "prompt", &missing).unwrap_err();
        assert!(matches!(err, StageError::Validation { .. }));

        let blank = Some("   ".to_string());
        assert!(StagePayload::require_str(StageId::Requirement, "prompt", &blank).is_err());

        let ok = Some("  hello  ".to_string());
        assert_eq!(
            StagePayload::require_str(StageId::Requirement, "prompt", &ok).unwrap(),
            "hello"
        );
    }

    #[test]
    fn require_ids_rejects_missing_and_empty() {
        let missing: Option<Vec<String>> = None;
        assert!(StagePayload::require_ids(StageId::SamplesJunit, "test_case_ids", &missing).is_err());

        let empty = Some(Vec::new());
        assert!(StagePayload::require_ids(StageId::SamplesJunit, "test_case_ids", &empty).is_err());

        let ok = Some(vec!["TC-1".to_string()]);
        assert_eq!(
            StagePayload::require_ids(StageId::SamplesJunit, "test_case_ids", &ok)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn builder_round_trip() {
        let payload = StagePayload::resume_at("jira")
            .with_req_id("REQ-1")
            .with_test_case_ids(vec!["TC-1".to_string()])
            .with_run_id("run-7");
        assert_eq!(payload.stage.as_deref(), Some("jira"));
        assert_eq!(payload.req_id.as_deref(), Some("REQ-1"));
        assert_eq!(payload.run_id.as_deref(), Some("run-7"));
    }

    #[test]
    fn serializes_without_absent_fields() {
        let payload = StagePayload::start("p");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["prompt"], "p");
        assert!(json.get("req_id").is_none());
        assert!(json.get("stage").is_none());
    }
}
