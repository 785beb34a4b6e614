//! Ticketing collaborator
//!
//! Search, create, comment. `JiraHttp` speaks the Jira Cloud REST v2 API
//! with basic auth; credentials come from the environment variables named
//! in config, never from the config file itself.

use crate::http::HttpClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tcgen_utils::error::TicketingError;
use tracing::debug;

/// Reference to a tracker issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRef {
    pub key: String,
    pub url: String,
}

/// Fields for creating a new issue.
#[derive(Debug, Clone)]
pub struct IssueFields {
    pub project_key: String,
    pub summary: String,
    pub description: String,
}

/// Issue-tracker capability.
#[async_trait]
pub trait Ticketing: Send + Sync {
    /// Run a tracker query and return matching issues.
    async fn search(&self, query: &str) -> Result<Vec<IssueRef>, TicketingError>;

    /// Create a new issue and return its reference.
    async fn create_issue(&self, fields: IssueFields) -> Result<IssueRef, TicketingError>;

    /// Append a comment to an existing issue.
    async fn add_comment(&self, issue_key: &str, body: &str) -> Result<(), TicketingError>;
}

/// Jira REST v2 client.
#[derive(Debug)]
pub struct JiraHttp {
    client: HttpClient,
    base_url: String,
    user: String,
    token: String,
    timeout: Duration,
}

impl JiraHttp {
    /// # Errors
    ///
    /// Returns `TicketingError::Misconfiguration` if the HTTP client cannot
    /// be constructed.
    pub fn new(
        base_url: String,
        user: String,
        token: String,
        timeout: Duration,
    ) -> Result<Self, TicketingError> {
        let client = HttpClient::new()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user,
            token,
            timeout,
        })
    }

    /// Build a client from configuration, reading credentials from the
    /// environment variables the config names.
    ///
    /// # Errors
    ///
    /// Returns `TicketingError::Misconfiguration` when `base_url` is unset
    /// or either credential variable is missing.
    pub fn from_config(config: &tcgen_config::JiraConfig) -> Result<Self, TicketingError> {
        let base_url = config.base_url.clone().ok_or_else(|| {
            TicketingError::Misconfiguration(
                "jira base_url not configured (set [jira] base_url)".to_string(),
            )
        })?;

        let user = std::env::var(&config.user_env).map_err(|_| {
            TicketingError::Misconfiguration(format!(
                "jira user not found in environment variable '{}'",
                config.user_env
            ))
        })?;
        let token = std::env::var(&config.token_env).map_err(|_| {
            TicketingError::Misconfiguration(format!(
                "jira token not found in environment variable '{}'",
                config.token_env
            ))
        })?;

        Self::new(base_url, user, token, Duration::from_secs(config.timeout_secs))
    }

    fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.base_url, key)
    }
}

#[async_trait]
impl Ticketing for JiraHttp {
    async fn search(&self, query: &str) -> Result<Vec<IssueRef>, TicketingError> {
        debug!(query, "searching tracker");

        let request = reqwest::Client::new()
            .get(format!("{}/rest/api/2/search", self.base_url))
            .basic_auth(&self.user, Some(&self.token))
            .query(&[("jql", query), ("maxResults", "10"), ("fields", "summary")]);

        let response = self
            .client
            .execute_with_retry(request, self.timeout, "jira")
            .await
            .map_err(TicketingError::Http)?;

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| TicketingError::Protocol(format!("unparsable search response: {e}")))?;

        Ok(parsed
            .issues
            .into_iter()
            .map(|issue| IssueRef {
                url: self.browse_url(&issue.key),
                key: issue.key,
            })
            .collect())
    }

    async fn create_issue(&self, fields: IssueFields) -> Result<IssueRef, TicketingError> {
        debug!(project = %fields.project_key, summary = %fields.summary, "creating tracker issue");

        let body = json!({
            "fields": {
                "project": {"key": fields.project_key},
                "summary": fields.summary,
                "description": fields.description,
                "issuetype": {"name": "Task"},
            }
        });

        let request = reqwest::Client::new()
            .post(format!("{}/rest/api/2/issue", self.base_url))
            .basic_auth(&self.user, Some(&self.token))
            .json(&body);

        let response = self
            .client
            .execute_with_retry(request, self.timeout, "jira")
            .await
            .map_err(TicketingError::Http)?;

        let created: CreatedIssue = response
            .json()
            .await
            .map_err(|e| TicketingError::Protocol(format!("unparsable create response: {e}")))?;

        Ok(IssueRef {
            url: self.browse_url(&created.key),
            key: created.key,
        })
    }

    async fn add_comment(&self, issue_key: &str, body: &str) -> Result<(), TicketingError> {
        debug!(issue_key, "appending tracker comment");

        let request = reqwest::Client::new()
            .post(format!("{}/rest/api/2/issue/{}/comment", self.base_url, issue_key))
            .basic_auth(&self.user, Some(&self.token))
            .json(&json!({"body": body}));

        self.client
            .execute_with_retry(request, self.timeout, "jira")
            .await
            .map_err(TicketingError::Http)?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<SearchIssue>,
}

#[derive(Debug, Deserialize)]
struct SearchIssue {
    key: String,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browse_url_uses_base() {
        let jira = JiraHttp::new(
            "https://example.atlassian.net/".to_string(),
            "u".to_string(),
            "t".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(jira.browse_url("KAN-7"), "https://example.atlassian.net/browse/KAN-7");
    }

    #[test]
    fn from_config_requires_base_url() {
        let config = tcgen_config::JiraConfig::default();
        let err = JiraHttp::from_config(&config).unwrap_err();
        match err {
            TicketingError::Misconfiguration(msg) => assert!(msg.contains("base_url")),
            other => panic!("expected Misconfiguration, got {other:?}"),
        }
    }

    #[test]
    fn search_response_parses_issue_keys() {
        let raw = r#"{"issues": [{"key": "KAN-1"}, {"key": "KAN-2"}]}"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.issues.len(), 2);
        assert_eq!(parsed.issues[0].key, "KAN-1");
    }
}
