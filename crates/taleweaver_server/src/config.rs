//! Layered server configuration.
//!
//! Sources in order of precedence (later sources override earlier):
//! 1. Bundled defaults (`taleweaver.toml` shipped with the crate)
//! 2. User config in home directory (`~/.config/taleweaver/taleweaver.toml`)
//! 3. User config in current directory (`./taleweaver.toml`), or the path
//!    given on the command line
//! 4. Environment variables (`TALEWEAVER__SERVER__BIND`, `TALEWEAVER__LIMITS__RPM`, ...)

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taleweaver_error::{ConfigError, TaleweaverResult};
use taleweaver_models::CompletionConfig;
use taleweaver_rate_limit::{LimitConfig, RetryConfig};

/// Bundled default configuration
const DEFAULT_CONFIG: &str = include_str!("../taleweaver.toml");

/// A caller and the bearer token that identifies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUser {
    /// User id that owns stories and personas
    pub id: String,
    /// Bearer token
    pub token: String,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Listen address
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON-formatted logs
    #[serde(default)]
    pub json_logs: bool,
    /// Known callers
    #[serde(default)]
    pub users: Vec<ApiUser>,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            log_level: default_log_level(),
            json_logs: false,
            users: Vec::new(),
        }
    }
}

/// Where story and persona documents live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory, lost on restart
    #[default]
    Memory,
    /// JSON files under `dir`
    File,
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Backend selection
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root directory for the file backend
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("taleweaver-data")
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            dir: default_storage_dir(),
        }
    }
}

/// Top-level Taleweaver server configuration.
///
/// # Example
///
/// ```no_run
/// use taleweaver_server::TaleweaverConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TaleweaverConfig::load(None)?;
/// println!("Listening on {}", config.server.bind);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaleweaverConfig {
    /// HTTP listener, logging and callers
    #[serde(default)]
    pub server: ServerSettings,
    /// Completion provider
    #[serde(default)]
    pub completion: CompletionConfig,
    /// Retry overrides
    #[serde(default)]
    pub retry: RetryConfig,
    /// Outbound request limits
    #[serde(default)]
    pub limits: LimitConfig,
    /// Story and persona persistence
    #[serde(default)]
    pub storage: StorageSettings,
}

impl TaleweaverConfig {
    /// Load configuration with precedence: env > user file > bundled default.
    ///
    /// An explicit `path` replaces `./taleweaver.toml` and must exist.
    /// Other user config files are optional and silently skipped if missing.
    pub fn load(path: Option<&Path>) -> TaleweaverResult<Self> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/taleweaver/taleweaver.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("taleweaver").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("TALEWEAVER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)).into())
    }

    /// Parse a single TOML document layered over the bundled defaults.
    pub fn from_toml_str(toml: &str) -> TaleweaverResult<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_defaults_parse() {
        let config = TaleweaverConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.completion.timeout_secs, 60);
        assert_eq!(*config.limits.rpm(), Some(60));
        assert!(config.server.users.is_empty());
    }

    #[test]
    fn test_overrides_layer_on_defaults() {
        let config = TaleweaverConfig::from_toml_str(
            r#"
            [server]
            bind = "0.0.0.0:9000"

            [[server.users]]
            id = "ada"
            token = "Secret-Token"

            [storage]
            backend = "file"
            dir = "/var/lib/taleweaver"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.server.users[0].token, "Secret-Token");
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.completion.model, "gpt-4o-mini");
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = TaleweaverConfig::from_toml_str("[storage]\nbackend = \"postgres\"");
        assert!(result.is_err());
    }
}
