use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use taleweaver_error::{
    CompletionError, CompletionErrorKind, TaleweaverErrorKind, TaleweaverResult, ValidationError,
};
use taleweaver_rate_limit::{RetryConfig, retry_with_backoff, with_timeout};

fn fast_retry() -> RetryConfig {
    RetryConfig::default()
        .with_initial_backoff_ms(1)
        .with_max_retries(3)
        .with_max_delay_secs(1)
}

fn transient() -> CompletionError {
    CompletionError::new(CompletionErrorKind::Http {
        status_code: 503,
        message: "overloaded".into(),
    })
}

#[tokio::test]
async fn test_transient_errors_are_retried_until_success() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let result: TaleweaverResult<&str> = retry_with_backoff(&fast_retry(), || {
        let counter = counter.clone();
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(transient().into())
            } else {
                Ok("story")
            }
        }
    })
    .await;

    assert_eq!(result.unwrap(), "story");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_permanent_errors_fail_after_one_attempt() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let result: TaleweaverResult<()> = retry_with_backoff(&fast_retry(), || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(CompletionError::new(CompletionErrorKind::Http {
                status_code: 400,
                message: "bad request".into(),
            })
            .into())
        }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_non_completion_errors_are_not_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let result: TaleweaverResult<()> = retry_with_backoff(&fast_retry(), || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ValidationError::new("empty action").into())
        }
    })
    .await;

    assert!(matches!(
        result.unwrap_err().kind(),
        TaleweaverErrorKind::Validation(_)
    ));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retries_stop_at_the_configured_limit() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let result: TaleweaverResult<()> = retry_with_backoff(&fast_retry(), || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(transient().into())
        }
    })
    .await;

    assert!(result.unwrap_err().is_retryable());
    // one initial attempt plus three retries
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_disabled_retry_attempts_once() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let result: TaleweaverResult<()> = retry_with_backoff(&RetryConfig::disabled(), || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(transient().into())
        }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_slow_calls_surface_a_typed_timeout() {
    let result: TaleweaverResult<()> = with_timeout(Duration::from_millis(20), async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    })
    .await;

    match result.unwrap_err().kind() {
        TaleweaverErrorKind::Completion(e) => {
            assert_eq!(e.kind, CompletionErrorKind::Timeout(20));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fast_calls_pass_through_the_timeout() {
    let result = with_timeout(Duration::from_secs(1), async { Ok::<_, _>(7) }).await;
    assert_eq!(result.unwrap(), 7);
}

#[test]
fn test_retry_config_deserializes_with_defaults() {
    let config: RetryConfig = toml::from_str("max_retries = 5").unwrap();
    assert!(*config.enabled());
    assert_eq!(config.resolve((1000, 2, 5)), (1000, 5, 5));
}
