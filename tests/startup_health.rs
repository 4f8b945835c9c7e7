//! Startup establishment and liveness probing.

use std::sync::Arc;
use std::time::Duration;

use shard_selector::health::LivenessProber;
use shard_selector::resilience::{BreakerState, CircuitBreaker};
use shard_selector::{Connection, SelectorError, ServerSelector};

mod common;

use common::{sharded_config, MockConnector};

#[tokio::test]
async fn test_unreachable_server_excluded() {
    let connector = MockConnector::new();
    let shard = connector.backend("UserShard2");
    shard.set_down(true);

    let selector = ServerSelector::new(&sharded_config(), &connector)
        .await
        .unwrap();

    assert_eq!(shard.pings(), 3);
    assert!(matches!(
        selector.server_by_bucket("UserShard2"),
        Err(SelectorError::ServerNotFound(_))
    ));
    assert_eq!(selector.servers().len(), 3);

    // Resolution reaching the excluded bucket fails and is not cached.
    connector.backend("ShardLookup").insert_row(1001, "2", 0);
    let err = selector.pick_server("UserShard", "user", 1001).await.unwrap_err();
    assert!(matches!(err, SelectorError::ServerNotFound(ref b) if b == "UserShard2"));
    assert!(selector.lookup_cache().is_empty());
}

#[tokio::test]
async fn test_flaky_server_registered_within_allowance() {
    let connector = MockConnector::new();
    let shard = connector.backend("UserShard1");
    shard.fail_next_pings(2);

    let selector = ServerSelector::new(&sharded_config(), &connector)
        .await
        .unwrap();

    assert_eq!(shard.pings(), 3);
    let conn = selector.server_by_bucket("UserShard1").unwrap();
    assert_eq!(conn.breaker().state(), BreakerState::Closed);
    assert_eq!(conn.breaker().failures(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_startup_attempts_wait_between_pings() {
    let mut config = sharded_config();
    config.breaker.retry_backoff_ms = 100;
    config.breaker.retry_backoff_max_ms = 1000;
    let connector = MockConnector::new();
    let shard = connector.backend("UserShard1");
    shard.fail_next_pings(2);

    let started = tokio::time::Instant::now();
    let selector = ServerSelector::new(&config, &connector).await.unwrap();
    let elapsed = started.elapsed();

    // Two retries: ~100ms then ~200ms, each with at most 10% jitter.
    assert_eq!(shard.pings(), 3);
    assert!(elapsed >= Duration::from_millis(300), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(330), "elapsed {:?}", elapsed);
    assert!(selector.server_by_bucket("UserShard1").is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_healthy_servers_never_wait() {
    let mut config = sharded_config();
    config.breaker.retry_backoff_ms = 100;
    let connector = MockConnector::new();

    let started = tokio::time::Instant::now();
    ServerSelector::new(&config, &connector).await.unwrap();
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn test_healthy_server_pinged_once() {
    let connector = MockConnector::new();
    ServerSelector::new(&sharded_config(), &connector)
        .await
        .unwrap();

    for pool in ["Config", "ShardLookup", "UserShard1", "UserShard2"] {
        assert_eq!(connector.backend(pool).pings(), 1, "pool {}", pool);
    }
}

#[tokio::test]
async fn test_unopenable_server_is_fatal() {
    let connector = MockConnector::new();
    connector.reject_open("UserShard1");

    let err = ServerSelector::new(&sharded_config(), &connector)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, SelectorError::Open { ref pool, .. } if pool == "UserShard1"));
}

#[tokio::test]
async fn test_connection_caps_applied() {
    let mut config = sharded_config();
    config.max_idle_conns_per_server = 4;
    config.max_conns_per_server = 16;
    let connector = MockConnector::new();
    let selector = ServerSelector::new(&config, &connector).await.unwrap();

    let conn = selector.server_by_bucket("Config").unwrap();
    assert_eq!(conn.max_idle_conns(), 4);
    assert_eq!(conn.max_open_conns(), 16);
}

#[tokio::test]
async fn test_no_probes_when_idle_time_zero() {
    let connector = MockConnector::new();
    let _selector = ServerSelector::new(&sharded_config(), &connector)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(connector.backend("Config").pings(), 1);
}

#[tokio::test]
async fn test_probe_keeps_healthy_breaker_closed() {
    let mut config = sharded_config();
    config.max_idle_time_ms = 10;
    let connector = MockConnector::new();
    let selector = ServerSelector::new(&config, &connector).await.unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    let backend = connector.backend("Config");
    assert!(backend.pings() > 1);
    let conn = selector.server_by_bucket("Config").unwrap();
    assert!(!conn.breaker().is_open());
    assert_eq!(conn.breaker().failures(), 0);
}

#[tokio::test]
async fn test_probe_failures_open_breaker_but_keep_connection() {
    let mut config = sharded_config();
    config.max_idle_time_ms = 10;
    let connector = MockConnector::new();
    let selector = ServerSelector::new(&config, &connector).await.unwrap();

    connector.backend("Config").set_down(true);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let conn = selector.server_by_bucket("Config").unwrap();
    assert!(conn.breaker().is_open());
    assert!(conn.breaker().failures() >= 3);

    // Degraded connections remain servable after startup.
    let picked = selector.pick_server("Config", "t", 1).await.unwrap();
    assert_eq!(picked.pool(), "Config");

    let status = selector
        .snapshot()
        .connections
        .into_iter()
        .find(|c| c.pool == "Config")
        .unwrap();
    assert!(status.breaker_open);
}

#[tokio::test]
async fn test_dropping_selector_stops_probes() {
    let mut config = sharded_config();
    config.max_idle_time_ms = 10;
    let connector = MockConnector::new();
    let selector = ServerSelector::new(&config, &connector).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(selector);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let backend = connector.backend("Config");
    let after_drop = backend.pings();
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(backend.pings(), after_drop);
}

#[tokio::test]
async fn test_unrepresentable_interval_disables_liveness_checks() {
    let connector = MockConnector::new();
    let backend = connector.backend("Config");
    let conn = Arc::new(Connection::new(
        "Config",
        "127.0.0.1:3306",
        backend.clone(),
        CircuitBreaker::new(3),
        sharded_config().pool_settings(),
    ));

    let finished = tokio::time::timeout(
        Duration::from_secs(1),
        LivenessProber::new(conn, Duration::MAX).run(),
    )
    .await;
    assert!(finished.is_ok());
    assert_eq!(backend.pings(), 0);
}
