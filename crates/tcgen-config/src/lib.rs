//! Configuration for the tcgen pipeline
//!
//! TOML file with serde defaults for every field, so an empty file (or no
//! file at all) yields a working local setup: JSONL ledger under `data/`,
//! filesystem object store under `store/`, surefire reports from
//! `target/surefire-reports`.
//!
//! Credentials are never stored in the file; the config names the
//! environment variables the HTTP collaborators read them from.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration load failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory of the JSONL ledger tables.
    pub data_dir: PathBuf,
    /// Root directory of the filesystem object store.
    pub store_root: PathBuf,
    /// Directories scanned for test report files.
    pub report_dirs: Vec<PathBuf>,
    /// Optional local mirror for sample JSON files (e.g. a Maven
    /// `src/test/resources/samples` directory). Not mirrored when unset.
    pub sample_resources_dir: Option<PathBuf>,
    /// Java package for generated test sources.
    pub junit_package: String,
    pub generator: GeneratorConfig,
    pub jira: JiraConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            store_root: PathBuf::from("store"),
            report_dirs: vec![PathBuf::from("target/surefire-reports")],
            sample_resources_dir: None,
            junit_package: "com.generated.tests".to_string(),
            generator: GeneratorConfig::default(),
            jira: JiraConfig::default(),
        }
    }
}

/// Content-generator endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base URL of the generateContent-style API.
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Jira endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Base URL of the Jira site, e.g. `https://example.atlassian.net`.
    /// Required for the HTTP ticketing client; no usable default exists.
    pub base_url: Option<String>,
    pub project_key: String,
    /// Name of the environment variable holding the Jira account email.
    pub user_env: String,
    /// Name of the environment variable holding the Jira API token.
    pub token_env: String,
    pub timeout_secs: u64,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            project_key: "KAN".to_string(),
            user_env: "JIRA_USER".to_string(),
            token_env: "JIRA_TOKEN".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load from an explicit path when given, otherwise return defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` only for an explicit path that fails to load;
    /// the default path is never required to exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
