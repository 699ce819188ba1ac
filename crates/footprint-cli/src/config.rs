//! Runtime configuration.
//!
//! Settings come from an optional JSON file (`--config`) and are then overridden by
//! command-line options. Every field has a default, so an empty object `{}` is a valid
//! configuration file.
//!
//! ```json
//! {
//!   "artifacts": {
//!     "schema": "columns.json",
//!     "scaler": "scaler.json",
//!     "model": "model.json"
//!   },
//!   "insight": {
//!     "enabled": true,
//!     "endpoint": "https://api.openai.com/v1/chat/completions",
//!     "model": "gpt-4o-mini",
//!     "api_key_env": "OPENAI_API_KEY",
//!     "timeout_secs": 10
//!   }
//! }
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use footprint_report::http_insight::HttpInsightConfig;
use serde::{Deserialize, Serialize};

use crate::util;

pub const DEFAULT_ARTIFACT_DIR: &str = "models/carbon";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootprintConfig {
    pub artifacts: ArtifactPaths,
    pub insight: InsightSettings,
}

/// Artifact locations. Relative paths resolve against the artifact directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    #[serde(default = "default_schema_path")]
    pub schema: PathBuf,
    #[serde(default = "default_scaler_path")]
    pub scaler: PathBuf,
    #[serde(default = "default_model_path")]
    pub model: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            schema: default_schema_path(),
            scaler: default_scaler_path(),
            model: default_model_path(),
        }
    }
}

impl ArtifactPaths {
    /// Paths with relative entries joined onto `dir`.
    #[must_use]
    pub fn resolve(&self, dir: &Path) -> Self {
        let join = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                dir.join(path)
            }
        };
        Self {
            schema: join(&self.schema),
            scaler: join(&self.scaler),
            model: join(&self.model),
        }
    }
}

fn default_schema_path() -> PathBuf {
    PathBuf::from("columns.json")
}

fn default_scaler_path() -> PathBuf {
    PathBuf::from("scaler.json")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model.json")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSettings {
    /// Whether `predict` asks the insight service for commentary
    #[serde(default)]
    pub enabled: bool,

    /// Chat completions endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name sent with the request
    #[serde(default = "default_insight_model")]
    pub model: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            model: default_insight_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl InsightSettings {
    /// Client settings, reading the API key from the configured environment variable.
    #[must_use]
    pub fn http_config(&self) -> HttpInsightConfig {
        let api_key = std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty());
        if api_key.is_none() {
            tracing::debug!(
                variable = %self.api_key_env,
                "no insight API key set, sending unauthenticated requests"
            );
        }
        HttpInsightConfig {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            api_key,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_insight_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl FootprintConfig {
    /// Loads the configuration file, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let config = util::read_json_file("config", path)?;
                tracing::debug!(path = %path.display(), "loaded configuration");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }
}
