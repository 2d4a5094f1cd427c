mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use puzzle_rush_engine::error::FetchError;
use puzzle_rush_engine::source::retry::{RetryPolicy, RetryingSource};
use puzzle_rush_engine::source::traits::ChunkSource;

use common::MemorySource;

const URL: &str = "https://cdn.test/puzzles/metadata.json";

fn policy(retries: u32, backoff_ms: u64, timeout_ms: u64) -> RetryPolicy {
    RetryPolicy {
        retries,
        timeout: Duration::from_millis(timeout_ms),
        backoff_base: Duration::from_millis(backoff_ms),
    }
}

#[tokio::test]
async fn test_recovers_from_transient_failures() {
    let inner = Arc::new(MemorySource::new());
    inner.insert(URL, b"{}".to_vec());
    inner.fail_next(URL, 2);

    let source = RetryingSource::new(inner.clone(), policy(3, 5, 2_000));
    let body = source.fetch(URL).await.unwrap();
    assert_eq!(&body[..], b"{}");
    assert_eq!(inner.requests_for(URL), 3);
}

#[tokio::test]
async fn test_gives_up_after_configured_attempts() {
    let inner = Arc::new(MemorySource::new());
    inner.insert(URL, b"{}".to_vec());
    inner.fail_next(URL, 10);

    let source = RetryingSource::new(inner.clone(), policy(3, 5, 2_000));
    let err = source.fetch(URL).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 503, .. }));
    assert_eq!(inner.requests_for(URL), 3);
}

#[tokio::test]
async fn test_zero_retries_still_tries_once() {
    let inner = Arc::new(MemorySource::new());
    let source = RetryingSource::new(inner.clone(), policy(0, 5, 2_000));

    let err = source.fetch(URL).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
    assert_eq!(inner.total_requests(), 1);
}

#[tokio::test]
async fn test_backoff_doubles_between_attempts() {
    let inner = Arc::new(MemorySource::new());
    inner.insert(URL, b"{}".to_vec());
    inner.fail_next(URL, 2);

    let source = RetryingSource::new(inner.clone(), policy(3, 30, 5_000));
    let started = Instant::now();
    source.fetch(URL).await.unwrap();

    // 30 ms after the first failure, 60 ms after the second.
    assert!(started.elapsed() >= Duration::from_millis(90));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let inner = Arc::new(MemorySource::with_delay(Duration::from_millis(500)));
    inner.insert(URL, b"{}".to_vec());

    let source = RetryingSource::new(inner.clone(), policy(3, 5, 50));
    let started = Instant::now();
    let err = source.fetch(URL).await.unwrap_err();

    assert!(matches!(err, FetchError::Timeout(t) if t == Duration::from_millis(50)));
    assert!(started.elapsed() < Duration::from_millis(400));
    assert_eq!(inner.requests_for(URL), 1);
}

#[tokio::test]
async fn test_deadline_covers_all_attempts() {
    let inner = Arc::new(MemorySource::new());
    inner.insert(URL, b"{}".to_vec());
    inner.fail_next(URL, 10);

    // Backoffs of 40, 80, 160 ms cannot fit in a 100 ms deadline.
    let source = RetryingSource::new(inner.clone(), policy(5, 40, 100));
    let err = source.fetch(URL).await.unwrap_err();

    assert!(matches!(err, FetchError::Timeout(_)));
    assert!(inner.requests_for(URL) < 5);
}
