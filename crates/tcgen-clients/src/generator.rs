//! Content-generator collaborator
//!
//! The pipeline only ever asks for text given a prompt; parsing and
//! fallback handling belong to the stages. `HttpGenerator` targets a
//! generateContent-style REST endpoint (Gemini wire format).

use crate::http::HttpClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tcgen_utils::error::GeneratorError;
use tracing::debug;

/// Natural-language generation capability.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate text for a prompt. Output may be prose or (requested)
    /// structured data; callers own the parsing and any fallback.
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}

/// HTTP backend for a generateContent-style API.
#[derive(Clone, Debug)]
pub struct HttpGenerator {
    client: HttpClient,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl HttpGenerator {
    /// # Errors
    ///
    /// Returns `GeneratorError::Misconfiguration` if the HTTP client cannot
    /// be constructed.
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, GeneratorError> {
        let client = HttpClient::new()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            timeout,
        })
    }

    /// Build a generator from configuration, reading the API key from the
    /// environment variable the config names.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::Misconfiguration` if the key variable is
    /// unset or the client cannot be constructed.
    pub fn from_config(config: &tcgen_config::GeneratorConfig) -> Result<Self, GeneratorError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            GeneratorError::Misconfiguration(format!(
                "generator API key not found in environment variable '{}'",
                config.api_key_env
            ))
        })?;

        Self::new(
            api_key,
            config.base_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ContentGenerator for HttpGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        debug!(model = %self.model, timeout_secs = self.timeout.as_secs(), "invoking content generator");

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let request = reqwest::Client::new()
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body);

        let response = self
            .client
            .execute_with_retry(request, self.timeout, "generator")
            .await
            .map_err(GeneratorError::Http)?;

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::Misconfiguration(format!("unparsable provider response: {e}")))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }

        debug!(chars = text.len(), "content generator responded");
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_model() {
        let g = HttpGenerator::new(
            "key".to_string(),
            "https://example.test/v1beta/".to_string(),
            "gemini-2.0-flash".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            g.endpoint(),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn from_config_requires_key_env() {
        let config = tcgen_config::GeneratorConfig {
            api_key_env: "TCGEN_TEST_MISSING_KEY".to_string(),
            ..Default::default()
        };
        unsafe {
            std::env::remove_var("TCGEN_TEST_MISSING_KEY");
        }
        let err = HttpGenerator::from_config(&config).unwrap_err();
        match err {
            GeneratorError::Misconfiguration(msg) => {
                assert!(msg.contains("TCGEN_TEST_MISSING_KEY"));
            }
            other => panic!("expected Misconfiguration, got {other:?}"),
        }
    }

    #[test]
    fn response_parsing_concatenates_parts() {
        let raw = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "hello "}, {"text": "world"}]}
            }]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .as_ref()
            .unwrap()
            .parts
            .iter()
            .filter_map(|p| p.text.clone())
            .collect();
        assert_eq!(text, "hello world");
    }
}
