//! Limiter, retry and timeout around any completion driver.

use async_trait::async_trait;
use std::time::Duration;
use taleweaver_core::{CompletionRequest, CompletionResponse};
use taleweaver_error::TaleweaverResult;
use taleweaver_interface::CompletionDriver;
use taleweaver_rate_limit::{RequestLimiter, RetryConfig, retry_with_backoff, with_timeout};
use tracing::instrument;

/// Wraps a driver so every call is rate limited, bounded in time and retried
/// on transient failure.
///
/// Each attempt waits for the limiter, then races the inner call against the
/// timeout. A timed out attempt counts as transient and is retried.
#[derive(Debug, Clone)]
pub struct ResilientDriver<D> {
    inner: D,
    limiter: RequestLimiter,
    retry: RetryConfig,
    timeout: Duration,
}

impl<D: CompletionDriver> ResilientDriver<D> {
    /// Wrap `inner` with the given policies.
    pub fn new(inner: D, limiter: RequestLimiter, retry: RetryConfig, timeout: Duration) -> Self {
        Self {
            inner,
            limiter,
            retry,
            timeout,
        }
    }

    /// The wrapped driver.
    pub fn inner(&self) -> &D {
        &self.inner
    }
}

#[async_trait]
impl<D: CompletionDriver> CompletionDriver for ResilientDriver<D> {
    #[instrument(skip(self, req), fields(provider = self.inner.provider_name(), model = self.inner.model_name()))]
    async fn complete(&self, req: &CompletionRequest) -> TaleweaverResult<CompletionResponse> {
        retry_with_backoff(&self.retry, || async {
            let _guard = self.limiter.acquire().await?;
            with_timeout(self.timeout, self.inner.complete(req)).await
        })
        .await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
