//! Per-provider rate limiter using governor and Tokio Semaphore.
//!
//! Each provider client owns one [`RateLimiter`], which coordinates:
//! - **RPM** (requests per minute): GCRA quota via governor
//! - **Concurrent requests**: Tokio Semaphore
//! - **Per-call deadline**: `tokio::time::timeout`
//! - **Retry**: jittered exponential backoff via tokio-retry2

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use taleweaver_error::{ProviderError, ProviderErrorKind, RetryableError, TaleweaverResult};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, info, warn};

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Limits applied to one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderLimits {
    /// Requests per minute; `None` is unlimited
    pub rpm: Option<u32>,
    /// Calls in flight at once; `None` is unlimited
    pub max_concurrent: Option<u32>,
    /// Deadline for a single attempt
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Overrides the error-specific initial backoff
    pub initial_backoff_ms: Option<u64>,
}

impl Default for ProviderLimits {
    fn default() -> Self {
        Self {
            rpm: None,
            max_concurrent: None,
            timeout: Duration::from_secs(60),
            max_retries: 2,
            initial_backoff_ms: None,
        }
    }
}

/// Rate limiter for one upstream provider.
///
/// # Example
///
/// ```rust,ignore
/// let limiter = RateLimiter::new("elevenlabs", config.providers.elevenlabs.limits());
/// let clip = limiter.execute(|| async { client.post_speech(&request).await }).await?;
/// ```
#[derive(Clone)]
pub struct RateLimiter {
    provider: String,
    limits: ProviderLimits,
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
    concurrent_semaphore: Arc<Semaphore>,
}

impl RateLimiter {
    /// Create a limiter enforcing every configured limit.
    pub fn new(provider: impl Into<String>, limits: ProviderLimits) -> Self {
        let rpm_limiter = limits.rpm.and_then(|rpm| {
            NonZeroU32::new(rpm).map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))))
        });

        let max_concurrent = limits
            .max_concurrent
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(Semaphore::MAX_PERMITS);

        Self {
            provider: provider.into(),
            limits,
            rpm_limiter,
            concurrent_semaphore: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// A limiter with no quota, used by tests and local tools.
    pub fn unlimited(provider: impl Into<String>) -> Self {
        Self::new(provider, ProviderLimits::default())
    }

    /// Provider this limiter guards.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Configured limits.
    pub fn limits(&self) -> &ProviderLimits {
        &self.limits
    }

    /// Wait for quota and a concurrency slot.
    ///
    /// The slot is released when the guard drops.
    pub async fn acquire(&self) -> RateLimiterGuard {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }

        // Never closed; a closed semaphore would only drop the concurrency cap.
        let permit = self.concurrent_semaphore.clone().acquire_owned().await.ok();

        RateLimiterGuard { _permit: permit }
    }

    /// Run `operation` under the limiter with a deadline and retries.
    ///
    /// Each attempt acquires quota first and is bounded by the configured
    /// timeout; an elapsed deadline becomes [`ProviderErrorKind::Timeout`].
    /// Retryable failures are retried using the strategy suggested by the
    /// first error, capped by `max_retries`. Other failures return at once.
    pub async fn execute<F, Fut, R>(&self, operation: F) -> TaleweaverResult<R>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = TaleweaverResult<R>>,
    {
        let first = self.attempt(&operation).await;
        let error = match first {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !error.is_retryable() || self.limits.max_retries == 0 {
            warn!(provider = %self.provider, error = %error, "Permanent error, failing immediately");
            return Err(error);
        }

        let (error_backoff_ms, error_retries, max_delay_secs) = error.retry_strategy_params();
        let initial_ms = self.limits.initial_backoff_ms.unwrap_or(error_backoff_ms);
        let retries = error_retries.min(self.limits.max_retries).max(1);

        info!(
            provider = %self.provider,
            error = %error,
            initial_backoff_ms = initial_ms,
            max_retries = retries,
            max_delay_secs,
            "Request failed, will retry with configured strategy"
        );

        tokio::time::sleep(jitter(Duration::from_millis(initial_ms))).await;

        let strategy = ExponentialBackoff::from_millis(initial_ms)
            .factor(2)
            .max_delay(Duration::from_secs(max_delay_secs))
            .map(jitter)
            .take(retries - 1);

        Retry::spawn(strategy, || async {
            match self.attempt(&operation).await {
                Ok(value) => Ok(value),
                Err(e) if e.is_retryable() => {
                    warn!(provider = %self.provider, error = %e, "Transient error, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => {
                    warn!(provider = %self.provider, error = %e, "Permanent error, failing immediately");
                    Err(RetryError::Permanent(e))
                }
            }
        })
        .await
    }

    async fn attempt<F, Fut, R>(&self, operation: &F) -> TaleweaverResult<R>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = TaleweaverResult<R>>,
    {
        let _guard = self.acquire().await;
        debug!(provider = %self.provider, "Attempting request");
        match tokio::time::timeout(self.limits.timeout, operation()).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::new(ProviderErrorKind::Timeout {
                provider: self.provider.clone(),
                seconds: self.limits.timeout.as_secs().max(1),
            })
            .into()),
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("provider", &self.provider)
            .field("limits", &self.limits)
            .field("available_permits", &self.concurrent_semaphore.available_permits())
            .finish()
    }
}

/// RAII guard releasing the concurrency slot when dropped.
pub struct RateLimiterGuard {
    _permit: Option<OwnedSemaphorePermit>,
}
