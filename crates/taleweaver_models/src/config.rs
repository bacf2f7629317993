//! Completion provider settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use taleweaver_error::{ConfigError, TaleweaverResult};

/// Connection settings for an OpenAI-compatible endpoint.
///
/// ```toml
/// [completion]
/// base_url = "https://api.openai.com/v1"
/// model = "gpt-4o-mini"
/// api_key_env = "OPENAI_API_KEY"
/// timeout_secs = 60
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Endpoint root; `/chat/completions` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Default generation cap
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Default sampling temperature
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Deadline for a single completion call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_tokens: None,
            temperature: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CompletionConfig {
    /// Per-call deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> TaleweaverResult<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::new(format!(
                "{} is not set; the completion provider cannot be reached",
                self.api_key_env
            ))
            .into()),
        }
    }
}
