//! Retry and timeout wrappers for completion calls.

use crate::RetryConfig;
use std::future::Future;
use std::time::Duration;
use taleweaver_error::{
    CompletionError, CompletionErrorKind, TaleweaverError, TaleweaverErrorKind, TaleweaverResult,
};
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{info, warn};

/// Backoff used for retryable errors that carry no completion kind.
const FALLBACK_PARAMS: (u64, usize, u64) = (1000, 2, 5);

fn strategy_params(err: &TaleweaverError) -> (u64, usize, u64) {
    match err.kind() {
        TaleweaverErrorKind::Completion(e) => e.kind.retry_strategy_params(),
        _ => FALLBACK_PARAMS,
    }
}

/// Run `operation`, retrying transient failures with exponential backoff.
///
/// The first attempt runs unconditionally. A permanent error returns at once;
/// a transient one picks its backoff from the error kind (overridable through
/// `config`) and retries with jitter.
pub async fn retry_with_backoff<T, F, Fut>(
    config: &RetryConfig,
    mut operation: F,
) -> TaleweaverResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = TaleweaverResult<T>>,
{
    let first_error = match operation().await {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if !config.enabled() || !first_error.is_retryable() {
        warn!(error = %first_error, "Permanent completion error, failing immediately");
        return Err(first_error);
    }

    let (initial_ms, max_retries, max_delay_secs) = config.resolve(strategy_params(&first_error));
    info!(
        error = %first_error,
        initial_backoff_ms = initial_ms,
        max_retries,
        max_delay_secs,
        "Completion failed, will retry with configured strategy"
    );

    if max_retries == 0 {
        return Err(first_error);
    }

    // Retry::spawn attempts immediately, so the first retry waits here
    tokio::time::sleep(Duration::from_millis(initial_ms)).await;

    let retry_strategy = ExponentialBackoff::from_millis(initial_ms)
        .factor(2)
        .max_delay(Duration::from_secs(max_delay_secs))
        .map(jitter)
        .take(max_retries - 1);

    Retry::spawn(retry_strategy, || {
        let attempt = operation();
        async move {
            match attempt.await {
                Ok(value) => Ok(value),
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "Completion attempt failed, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => {
                    warn!(error = %e, "Permanent completion error, failing immediately");
                    Err(RetryError::Permanent(e))
                }
            }
        }
    })
    .await
}

/// Bound a future by `after`, surfacing `CompletionErrorKind::Timeout` on expiry.
pub async fn with_timeout<T, Fut>(after: Duration, fut: Fut) -> TaleweaverResult<T>
where
    Fut: Future<Output = TaleweaverResult<T>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(timeout_ms = after.as_millis() as u64, "Completion call timed out");
            Err(CompletionError::new(CompletionErrorKind::timeout(after)).into())
        }
    }
}
