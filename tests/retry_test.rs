use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use reqwest::StatusCode;
use shazport::{error::CatalogError, import::RetryPolicy};
use tokio_util::sync::CancellationToken;

fn policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        max_retry_after: Duration::from_secs(120),
    }
}

fn rejected() -> CatalogError {
    CatalogError::Api {
        status: StatusCode::NOT_FOUND,
        message: "not found".to_string(),
    }
}

#[test]
fn test_transient_classification() {
    assert!(CatalogError::RateLimited { retry_after: None }.is_transient());
    assert!(
        CatalogError::Server {
            status: StatusCode::BAD_GATEWAY
        }
        .is_transient()
    );
    assert!(!rejected().is_transient());
    assert!(!CatalogError::Decode("bad json".to_string()).is_transient());
    assert!(!CatalogError::InvalidRequest("too many".to_string()).is_transient());
}

#[test]
fn test_backoff_doubles_and_caps() {
    let policy = RetryPolicy {
        max_attempts: 10,
        base_delay: Duration::from_millis(500),
        max_delay: Duration::from_secs(3),
        max_retry_after: Duration::from_secs(120),
    };

    assert_eq!(policy.backoff(1), Duration::from_millis(500));
    assert_eq!(policy.backoff(2), Duration::from_secs(1));
    assert_eq!(policy.backoff(3), Duration::from_secs(2));
    assert_eq!(policy.backoff(4), Duration::from_secs(3));
    assert_eq!(policy.backoff(40), Duration::from_secs(3));
}

#[test]
fn test_delay_for_honors_retry_after() {
    let policy = RetryPolicy::default();

    let hinted = CatalogError::RateLimited {
        retry_after: Some(Duration::from_secs(7)),
    };
    assert_eq!(policy.delay_for(&hinted, 1), Some(Duration::from_secs(7)));

    // Absurd hints are not waited out
    let absurd = CatalogError::RateLimited {
        retry_after: Some(Duration::from_secs(86_400)),
    };
    assert_eq!(policy.delay_for(&absurd, 1), None);

    // Permanent failures are never retried
    assert_eq!(policy.delay_for(&rejected(), 1), None);

    // Out of attempts
    let server = CatalogError::Server {
        status: StatusCode::SERVICE_UNAVAILABLE,
    };
    assert_eq!(policy.delay_for(&server, policy.max_attempts), None);
}

#[test]
fn test_with_retries_counts_first_attempt() {
    assert_eq!(RetryPolicy::with_retries(3).max_attempts, 4);
    assert_eq!(RetryPolicy::with_retries(0).max_attempts, 1);
}

#[tokio::test]
async fn test_run_retries_transient_until_success() {
    let attempts = &AtomicU32::new(0);
    let cancel = CancellationToken::new();

    let result = policy(3)
        .run(&cancel, move || async move {
            if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(CatalogError::Server {
                    status: StatusCode::BAD_GATEWAY,
                })
            } else {
                Ok("ok")
            }
        })
        .await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_run_gives_up_after_max_attempts() {
    let attempts = &AtomicU32::new(0);
    let cancel = CancellationToken::new();

    let result: Result<(), _> = policy(2)
        .run(&cancel, move || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(CatalogError::RateLimited { retry_after: None })
        })
        .await;

    assert!(matches!(result, Err(CatalogError::RateLimited { .. })));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_run_does_not_retry_permanent_errors() {
    let attempts = &AtomicU32::new(0);
    let cancel = CancellationToken::new();

    let result: Result<(), _> = policy(5)
        .run(&cancel, move || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(rejected())
        })
        .await;

    assert!(matches!(result, Err(CatalogError::Api { .. })));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_run_stops_waiting_when_cancelled() {
    let attempts = &AtomicU32::new(0);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let slow = RetryPolicy {
        max_attempts: 5,
        base_delay: Duration::from_secs(60),
        max_delay: Duration::from_secs(60),
        max_retry_after: Duration::from_secs(120),
    };

    let result: Result<(), _> = tokio::time::timeout(
        Duration::from_secs(5),
        slow.run(&cancel, move || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(CatalogError::RateLimited { retry_after: None })
        }),
    )
    .await
    .expect("retry loop ignored cancellation");

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
