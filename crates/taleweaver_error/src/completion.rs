//! Completion provider error types and retry classification.

use std::time::Duration;

/// Failure conditions of the text-completion collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CompletionErrorKind {
    /// Upstream API credential is not configured
    #[display("Completion API key is not configured ({})", _0)]
    MissingApiKey(String),
    /// Transport-level failure (connection refused, reset, DNS)
    #[display("Completion request failed: {}", _0)]
    Request(String),
    /// Provider answered with a non-success status
    #[display("HTTP {} error: {}", status_code, message)]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Response body or reason
        message: String,
    },
    /// Provider response could not be decoded
    #[display("Failed to parse completion response: {}", _0)]
    Parse(String),
    /// Provider returned no usable text
    #[display("Completion response contained no text")]
    EmptyResponse,
    /// The call exceeded its deadline
    #[display("Completion timed out after {} ms", _0)]
    Timeout(u64),
}

impl CompletionErrorKind {
    /// Build a timeout kind from the elapsed deadline.
    pub fn timeout(after: Duration) -> Self {
        CompletionErrorKind::Timeout(after.as_millis() as u64)
    }

    /// Check if this error type should be retried.
    ///
    /// # Examples
    ///
    /// ```
    /// use taleweaver_error::CompletionErrorKind;
    ///
    /// let rate_limited = CompletionErrorKind::Http { status_code: 429, message: String::new() };
    /// let bad_request = CompletionErrorKind::Http { status_code: 400, message: String::new() };
    /// assert!(rate_limited.is_retryable());
    /// assert!(!bad_request.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            CompletionErrorKind::Http { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            CompletionErrorKind::Request(_) => true,
            CompletionErrorKind::Timeout(_) => true,
            CompletionErrorKind::EmptyResponse => true,
            _ => false,
        }
    }

    /// Get retry strategy parameters for this error type.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self {
            CompletionErrorKind::Http { status_code, .. } => match *status_code {
                429 => (5000, 3, 40),
                503 => (2000, 4, 30),
                500 | 502 | 504 => (1000, 3, 8),
                408 => (2000, 3, 20),
                _ => (1000, 3, 10),
            },
            CompletionErrorKind::Timeout(_) => (1000, 2, 10),
            CompletionErrorKind::Request(_) => (1000, 3, 10),
            _ => (1000, 2, 5),
        }
    }
}

/// Completion error with location tracking.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{CompletionError, CompletionErrorKind};
///
/// let err = CompletionError::new(CompletionErrorKind::EmptyResponse);
/// assert!(format!("{}", err).contains("no text"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Completion Error: {} at line {} in {}", kind, line, file)]
pub struct CompletionError {
    /// The specific error condition
    pub kind: CompletionErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl CompletionError {
    /// Create a new CompletionError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CompletionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether the wrapped kind is transient.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
