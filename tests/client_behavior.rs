//! Behavior-driven tests for the unified client
//!
//! These tests verify HOW fetches flow through the cache, the single-flight
//! gate and the retry policy, using an offline stub transport and a paused
//! clock.

mod support;

use std::sync::Arc;
use std::time::Duration;

use fpl_data::{
    CacheKey, ErrorKind, FplError, StubHttpClient, StubReply, DEFAULT_CACHE_TTL,
};
use support::{bootstrap_json, client, client_with, config, BASE_URL, TEAM_ID};

const BOOTSTRAP: &str = "bootstrap-static/";

fn bootstrap_stub() -> StubHttpClient {
    StubHttpClient::new(BASE_URL).route(BOOTSTRAP, StubReply::json(bootstrap_json()))
}

// =============================================================================
// Cache: Hits and Expiry
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_snapshot_requested_twice_within_ttl_upstream_is_called_once() {
    // Given: A client with a 15 minute cache window
    let stub = Arc::new(bootstrap_stub());
    let client = client(stub.clone());

    // When: The snapshot is requested twice, 14 minutes apart
    let first = client.bootstrap().get_snapshot().await.expect("first read");
    tokio::time::advance(Duration::from_secs(14 * 60)).await;
    let second = client.bootstrap().get_snapshot().await.expect("second read");

    // Then: Both reads share one record and one upstream call
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(stub.calls_to(BOOTSTRAP), 1);
}

#[tokio::test(start_paused = true)]
async fn when_ttl_elapses_next_read_refetches() {
    // Given: A cached snapshot
    let stub = Arc::new(bootstrap_stub());
    let client = client(stub.clone());
    client.bootstrap().get_snapshot().await.expect("first read");
    let first = client.cache().peek(&CacheKey::Bootstrap).expect("stored");

    // When: The full cache window passes
    tokio::time::advance(DEFAULT_CACHE_TTL).await;
    client.bootstrap().get_snapshot().await.expect("second read");

    // Then: The stale entry is not served and the new one is stamped afresh
    assert_eq!(stub.calls_to(BOOTSTRAP), 2);
    let second = client.cache().peek(&CacheKey::Bootstrap).expect("stored");
    assert!(second.fetched_at > first.fetched_at);
    assert_eq!(second.age(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn when_refresh_requested_fresh_entry_is_replaced() {
    // Given: A fresh cached snapshot
    let stub = Arc::new(bootstrap_stub());
    let client = client(stub.clone());
    let cached = client.bootstrap().get_snapshot().await.expect("first read");

    // When: A refresh is forced
    let refreshed = client.bootstrap().refresh_snapshot().await.expect("refresh");

    // Then: Upstream is called again and later reads see the new record
    assert_eq!(stub.calls_to(BOOTSTRAP), 2);
    assert!(!Arc::ptr_eq(&cached, &refreshed));
    let after = client.bootstrap().get_snapshot().await.expect("third read");
    assert!(Arc::ptr_eq(&refreshed, &after));
}

#[tokio::test(start_paused = true)]
async fn when_cache_disabled_every_read_goes_upstream() {
    // Given: A client configured without caching
    let stub = Arc::new(bootstrap_stub());
    let client = client_with(stub.clone(), config().with_cache_enabled(false));

    // When: The snapshot is read three times
    for _ in 0..3 {
        client.bootstrap().get_snapshot().await.expect("read");
    }

    // Then: Each read is an upstream call and nothing is stored
    assert_eq!(stub.calls_to(BOOTSTRAP), 3);
    assert!(client.cache().is_empty());
}

#[tokio::test(start_paused = true)]
async fn when_entry_invalidated_next_read_refetches() {
    // Given: A cached snapshot
    let stub = Arc::new(bootstrap_stub());
    let client = client(stub.clone());
    client.bootstrap().get_snapshot().await.expect("first read");

    // When: The entry is invalidated
    client.invalidate(&CacheKey::Bootstrap);
    client.bootstrap().get_snapshot().await.expect("second read");

    // Then: Upstream is consulted again
    assert_eq!(stub.calls_to(BOOTSTRAP), 2);
}

// =============================================================================
// Single-flight
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_many_callers_miss_together_one_fetch_serves_all() {
    // Given: A slow upstream and an empty cache
    let stub = Arc::new(bootstrap_stub().with_latency(Duration::from_secs(1)));
    let client = client(stub.clone());

    // When: Ten callers ask for the snapshot at once
    let handles: Vec<_> = (0..10)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.bootstrap().get_snapshot().await })
        })
        .collect();

    let mut snapshots = Vec::new();
    for handle in handles {
        snapshots.push(handle.await.expect("task").expect("snapshot"));
    }

    // Then: Exactly one upstream call happened and everyone got its result
    assert_eq!(stub.calls_to(BOOTSTRAP), 1);
    assert!(snapshots.iter().all(|s| Arc::ptr_eq(s, &snapshots[0])));
}

#[tokio::test(start_paused = true)]
async fn when_shared_fetch_fails_every_waiter_sees_the_failure() {
    // Given: A slow upstream that rejects the request
    let stub = Arc::new(
        StubHttpClient::new(BASE_URL)
            .route(BOOTSTRAP, StubReply::status(403))
            .with_latency(Duration::from_millis(500)),
    );
    let client = client(stub.clone());

    // When: Several callers wait on the same fetch
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.bootstrap().get_snapshot().await })
        })
        .collect();

    // Then: All receive the same error from a single call
    for handle in handles {
        let error = handle.await.expect("task").expect_err("forbidden");
        assert_eq!(error.status(), Some(403));
    }
    assert_eq!(stub.calls_to(BOOTSTRAP), 1);
}

#[tokio::test(start_paused = true)]
async fn when_caller_gives_up_fetch_still_fills_the_cache() {
    // Given: An upstream slower than the caller's patience
    let stub = Arc::new(bootstrap_stub().with_latency(Duration::from_secs(3)));
    let client = client(stub.clone());

    // When: The caller abandons the read after one second
    let abandoned =
        tokio::time::timeout(Duration::from_secs(1), client.bootstrap().get_snapshot()).await;
    assert!(abandoned.is_err(), "caller should time out");
    tokio::time::sleep(Duration::from_secs(5)).await;

    // Then: The fetch completed in the background and the next read is a hit
    assert!(client.cache().peek(&CacheKey::Bootstrap).is_some());
    client.bootstrap().get_snapshot().await.expect("cached read");
    assert_eq!(stub.calls_to(BOOTSTRAP), 1);
}

#[test]
fn when_runtime_drops_a_running_fetch_next_read_refetches() {
    // Given: A slow upstream and a fetch started on a runtime that goes away
    let stub = Arc::new(bootstrap_stub().with_latency(Duration::from_millis(200)));
    let client = client(stub.clone());
    let runtime = paused_runtime();
    let abandoned = runtime.block_on(async {
        tokio::time::timeout(Duration::from_millis(10), client.bootstrap().get_snapshot()).await
    });
    assert!(abandoned.is_err(), "caller should time out");
    drop(runtime);

    // When: The snapshot is read on another runtime
    let snapshot = paused_runtime()
        .block_on(client.bootstrap().get_snapshot())
        .expect("fresh fetch succeeds");

    // Then: The lost fetch did not block the key and a second call was made
    assert_eq!(snapshot.players.len(), 5);
    assert_eq!(stub.calls_to(BOOTSTRAP), 2);
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .expect("runtime")
}

// =============================================================================
// Retry
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_upstream_keeps_failing_client_gives_up_after_three_attempts() {
    // Given: An upstream that always answers 503
    let stub =
        Arc::new(StubHttpClient::new(BASE_URL).route(BOOTSTRAP, StubReply::status(503)));
    let client = client(stub.clone());
    let started = tokio::time::Instant::now();

    // When: The snapshot is requested
    let error = client
        .bootstrap()
        .get_snapshot()
        .await
        .expect_err("should exhaust retries");

    // Then: Three attempts were made, two delays apart, and the last failure is kept
    assert_eq!(stub.calls_to(BOOTSTRAP), 3);
    assert_eq!(error.kind(), ErrorKind::RetryExhausted);
    assert_eq!(error.last_failure().and_then(FplError::status), Some(503));
    assert_eq!(started.elapsed(), Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn when_transient_failure_clears_retry_returns_the_data() {
    // Given: A connection reset followed by a rate limit, then success
    let stub = Arc::new(StubHttpClient::new(BASE_URL).route_sequence(
        BOOTSTRAP,
        vec![
            StubReply::network("connection reset"),
            StubReply::status(429),
            StubReply::json(bootstrap_json()),
        ],
    ));
    let client = client(stub.clone());

    // When: The snapshot is requested
    let snapshot = client.bootstrap().get_snapshot().await.expect("third attempt succeeds");

    // Then: The caller never sees the intermediate failures
    assert_eq!(snapshot.players.len(), 5);
    assert_eq!(stub.calls_to(BOOTSTRAP), 3);
}

#[tokio::test(start_paused = true)]
async fn when_failure_is_permanent_no_retry_or_delay_happens() {
    // Given: An unknown manager
    let stub = Arc::new(StubHttpClient::new(BASE_URL));
    let client = client(stub.clone());
    let started = tokio::time::Instant::now();

    // When: The profile is requested
    let error = client
        .managers()
        .get_profile(i64::from(TEAM_ID))
        .await
        .expect_err("unknown team");

    // Then: One call, no waiting, and a not-found error
    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert_eq!(stub.total_calls(), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn when_payload_is_malformed_failure_is_not_retried() {
    // Given: An upstream that returns HTML instead of JSON
    let stub = Arc::new(
        StubHttpClient::new(BASE_URL).route(BOOTSTRAP, StubReply::json("<html>down</html>")),
    );
    let client = client(stub.clone());

    // When: The snapshot is requested
    let error = client.bootstrap().get_snapshot().await.expect_err("decode");

    // Then: Decoding failures are permanent
    assert_eq!(error.kind(), ErrorKind::Decode);
    assert_eq!(stub.calls_to(BOOTSTRAP), 1);
}

#[tokio::test(start_paused = true)]
async fn when_fetch_fails_nothing_is_cached_and_next_read_retries() {
    // Given: Three server errors followed by a good payload
    let stub = Arc::new(StubHttpClient::new(BASE_URL).route_sequence(
        BOOTSTRAP,
        vec![
            StubReply::status(500),
            StubReply::status(502),
            StubReply::status(500),
            StubReply::json(bootstrap_json()),
        ],
    ));
    let client = client(stub.clone());

    // When: The first read exhausts its retries
    let error = client.bootstrap().get_snapshot().await.expect_err("exhausted");
    assert_eq!(error.kind(), ErrorKind::RetryExhausted);
    assert!(client.cache().is_empty());

    // Then: The next read fetches again and succeeds
    client.bootstrap().get_snapshot().await.expect("recovered");
    assert_eq!(stub.calls_to(BOOTSTRAP), 4);
    assert_eq!(client.cache().len(), 1);
}
