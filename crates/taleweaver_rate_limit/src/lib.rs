//! Request limiting and error recovery for completion calls.
//!
//! Three independent pieces wrap every outbound completion:
//! - [`RequestLimiter`] caps requests per minute (governor) and concurrent
//!   calls (Tokio semaphore)
//! - [`retry_with_backoff`] retries transient failures with exponential
//!   backoff and jitter (tokio-retry2)
//! - [`with_timeout`] bounds a single call and reports a typed timeout

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod limiter;
mod retry;

pub use config::{LimitConfig, RetryConfig};
pub use limiter::{RequestLimiter, RequestLimiterGuard};
pub use retry::{retry_with_backoff, with_timeout};
