//! Request limiter built on governor and a Tokio semaphore.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use taleweaver_error::{CompletionError, CompletionErrorKind, TaleweaverResult};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::LimitConfig;

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Caps outbound completion calls.
///
/// - **RPM**: GCRA limiter from governor, waited on before each call
/// - **Concurrency**: semaphore permit held for the duration of the call
///
/// Cloning shares the underlying quotas.
#[derive(Clone)]
pub struct RequestLimiter {
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
    concurrent_semaphore: Arc<Semaphore>,
}

impl std::fmt::Debug for RequestLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLimiter")
            .field("rpm_limited", &self.rpm_limiter.is_some())
            .field(
                "available_permits",
                &self.concurrent_semaphore.available_permits(),
            )
            .finish()
    }
}

impl RequestLimiter {
    /// Build a limiter from configuration. Zero or absent values mean unlimited.
    pub fn new(config: &LimitConfig) -> Self {
        let rpm_limiter = config.rpm().and_then(|rpm| {
            NonZeroU32::new(rpm).map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))))
        });

        let max_concurrent = config
            .max_concurrent()
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(Semaphore::MAX_PERMITS);

        Self {
            rpm_limiter,
            concurrent_semaphore: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self::new(&LimitConfig::default())
    }

    /// Wait for quota and take a concurrency slot.
    ///
    /// The slot is released when the returned guard drops.
    pub async fn acquire(&self) -> TaleweaverResult<RequestLimiterGuard> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }

        // Last, so no slot is held while waiting on the rpm quota
        let permit = self
            .concurrent_semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| CompletionError::new(CompletionErrorKind::Request(e.to_string())))?;

        debug!(
            available = self.concurrent_semaphore.available_permits(),
            "Acquired completion slot"
        );
        Ok(RequestLimiterGuard { _permit: permit })
    }

    /// Take a slot without waiting; `None` when any limit would block.
    pub fn try_acquire(&self) -> Option<RequestLimiterGuard> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.check().ok()?;
        }
        let permit = self.concurrent_semaphore.clone().try_acquire_owned().ok()?;
        Some(RequestLimiterGuard { _permit: permit })
    }

    /// Free concurrency slots right now.
    pub fn available_permits(&self) -> usize {
        self.concurrent_semaphore.available_permits()
    }
}

/// Holds a concurrency slot until dropped.
#[derive(Debug)]
pub struct RequestLimiterGuard {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_guard_releases_slot_on_drop() {
        let limiter = RequestLimiter::new(&LimitConfig::new(None, Some(1)));
        let guard = limiter.acquire().await.unwrap();
        assert_eq!(limiter.available_permits(), 0);
        assert!(limiter.try_acquire().is_none());
        drop(guard);
        assert!(limiter.try_acquire().is_some());
    }

    #[test]
    fn test_rpm_quota_blocks_after_burst() {
        let limiter = RequestLimiter::new(&LimitConfig::new(Some(1), None));
        let first = limiter.try_acquire();
        assert!(first.is_some());
        assert!(limiter.try_acquire().is_none());
    }

    #[test]
    fn test_zero_limits_mean_unlimited() {
        let limiter = RequestLimiter::new(&LimitConfig::new(Some(0), Some(0)));
        let guards: Vec<_> = (0..16).filter_map(|_| limiter.try_acquire()).collect();
        assert_eq!(guards.len(), 16);
    }
}
