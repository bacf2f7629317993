//! Serde-friendly limit and retry settings.

use serde::{Deserialize, Serialize};

/// Outbound request limits. `None` means unlimited.
///
/// ```toml
/// [limits]
/// rpm = 60
/// max_concurrent = 4
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, derive_getters::Getters)]
pub struct LimitConfig {
    /// Requests per minute
    #[serde(default)]
    rpm: Option<u32>,
    /// Maximum in-flight completion calls
    #[serde(default)]
    max_concurrent: Option<u32>,
}

impl LimitConfig {
    /// Limits with explicit values.
    pub fn new(rpm: Option<u32>, max_concurrent: Option<u32>) -> Self {
        Self {
            rpm,
            max_concurrent,
        }
    }
}

/// Retry overrides.
///
/// Without overrides the backoff is tuned per error kind
/// (see `CompletionErrorKind::retry_strategy_params`).
///
/// ```toml
/// [retry]
/// enabled = true
/// max_retries = 3
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct RetryConfig {
    /// Retry transient failures at all
    #[serde(default = "default_enabled")]
    enabled: bool,
    /// Override of the initial backoff in milliseconds
    #[serde(default)]
    initial_backoff_ms: Option<u64>,
    /// Override of the maximum number of retries
    #[serde(default)]
    max_retries: Option<usize>,
    /// Override of the backoff ceiling in seconds
    #[serde(default)]
    max_delay_secs: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_backoff_ms: None,
            max_retries: None,
            max_delay_secs: None,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set the initial backoff override.
    pub fn with_initial_backoff_ms(mut self, ms: u64) -> Self {
        self.initial_backoff_ms = Some(ms);
        self
    }

    /// Set the retry count override.
    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set the backoff ceiling override.
    pub fn with_max_delay_secs(mut self, secs: u64) -> Self {
        self.max_delay_secs = Some(secs);
        self
    }

    /// Merge per-error defaults with the configured overrides.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn resolve(&self, defaults: (u64, usize, u64)) -> (u64, usize, u64) {
        let (initial_ms, retries, delay_secs) = defaults;
        (
            self.initial_backoff_ms.unwrap_or(initial_ms),
            self.max_retries.unwrap_or(retries),
            self.max_delay_secs.unwrap_or(delay_secs),
        )
    }
}
