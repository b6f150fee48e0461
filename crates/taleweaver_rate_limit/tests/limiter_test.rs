//! Tests for provider rate limiting, deadlines and retry.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use taleweaver_error::{
    ProviderError, ProviderErrorKind, TaleweaverError, TaleweaverErrorKind, TaleweaverResult,
};
use taleweaver_rate_limit::{ProviderLimits, RateLimiter};

fn fast_limits(max_retries: usize) -> ProviderLimits {
    ProviderLimits {
        rpm: None,
        max_concurrent: Some(2),
        timeout: Duration::from_millis(200),
        max_retries,
        initial_backoff_ms: Some(1),
    }
}

fn http(status: u16) -> TaleweaverError {
    ProviderError::new(ProviderErrorKind::Http {
        provider: "test".to_string(),
        status_code: status,
        body: "nope".to_string(),
    })
    .into()
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let limiter = RateLimiter::new("test", fast_limits(2));
    let calls = Arc::new(AtomicUsize::new(0));

    let result: TaleweaverResult<&str> = limiter
        .execute(|| {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(http(503))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let limiter = RateLimiter::new("test", fast_limits(2));
    let calls = Arc::new(AtomicUsize::new(0));

    let result: TaleweaverResult<()> = limiter
        .execute(|| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(http(500))
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_permanent_errors_fail_immediately() {
    let limiter = RateLimiter::new("test", fast_limits(3));
    let calls = Arc::new(AtomicUsize::new(0));

    let result: TaleweaverResult<()> = limiter
        .execute(|| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(http(401))
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_slow_calls_time_out() {
    let limiter = RateLimiter::new("slowpoke", fast_limits(0));

    let started = Instant::now();
    let result: TaleweaverResult<()> = limiter
        .execute(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

    assert!(started.elapsed() < Duration::from_secs(2));
    let err = result.unwrap_err();
    match err.kind() {
        TaleweaverErrorKind::Provider(e) => {
            assert!(matches!(e.kind, ProviderErrorKind::Timeout { ref provider, .. } if provider == "slowpoke"));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrency_is_capped() {
    let limiter = Arc::new(RateLimiter::new("test", fast_limits(0)));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..6 {
        let limiter = limiter.clone();
        let in_flight = in_flight.clone();
        let peak = peak.clone();
        handles.push(tokio::spawn(async move {
            limiter
                .execute(|| {
                    let in_flight = in_flight.clone();
                    let peak = peak.clone();
                    async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        TaleweaverResult::Ok(())
                    }
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert!(peak.load(Ordering::SeqCst) <= 2);
}
