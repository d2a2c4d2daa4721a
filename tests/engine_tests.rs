//! Integration Tests for Engine Lifecycle
//!
//! Covers startup, background sweeping and shutdown.

use std::sync::Arc;
use std::time::Duration;

use ttl_cache::{
    CacheAdapter, CacheEngine, CacheError, CacheKey, CacheOptions, Config, MemoryStore,
    MokaAdapter, Ttl,
};

fn sweeping_config(interval_ms: u64) -> Config {
    Config::default().with_sweep_interval(Duration::from_millis(interval_ms))
}

#[tokio::test]
async fn test_sweeper_removes_only_expired_entries() {
    let engine: CacheEngine<String> = CacheEngine::start(&sweeping_config(50)).unwrap();
    let cache = engine.client();

    cache.put("short", "s".to_string(), &CacheOptions::new().ttl(20i64)).await;
    cache.put("long", "l".to_string(), &CacheOptions::new().ttl(60_000i64)).await;
    cache.put("never", "n".to_string(), &CacheOptions::new().ttl(Ttl::Never)).await;
    assert_eq!(engine.stats().unwrap().total_entries, 3);

    // Longer than the short TTL plus a couple of sweep intervals, with no reads in between.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let stats = engine.stats().unwrap();
    assert_eq!(stats.total_entries, 2);
    assert!(stats.swept >= 1);
    assert_eq!(stats.expirations, 0);

    assert_eq!(cache.get("long", &CacheOptions::new()).await.as_deref(), Some("l"));
    assert_eq!(cache.get("never", &CacheOptions::new()).await.as_deref(), Some("n"));
}

#[tokio::test]
async fn test_sweep_now() {
    let engine: CacheEngine<u32> = CacheEngine::start(&sweeping_config(60_000)).unwrap();
    let cache = engine.client();

    for i in 0..10u32 {
        cache.put(&i, i, &CacheOptions::new().ttl(10i64)).await;
    }
    cache.put("keep", 99, &CacheOptions::new()).await;

    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(engine.sweep_now(), 10);
    assert_eq!(engine.stats().unwrap().total_entries, 1);
}

#[tokio::test]
async fn test_moka_backend_expires_without_reads() {
    let moka = Arc::new(MokaAdapter::<String>::new(Ttl::Never));
    let adapter: Arc<dyn CacheAdapter<String>> = moka.clone();
    let engine = CacheEngine::with_adapter(adapter, &sweeping_config(20)).unwrap();
    let cache = engine.client();

    cache.put("short", "s".to_string(), &CacheOptions::new().ttl(20i64)).await;
    cache.put("never", "n".to_string(), &CacheOptions::new().ttl(Ttl::Never)).await;

    // moka reclaims variable expiry on a coarse timer wheel, so poll the
    // stored count (no reads) until the sweeper has driven it down.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while moka.entry_count() != 1 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(moka.entry_count(), 1);

    assert_eq!(cache.get("short", &CacheOptions::new()).await, None);
    assert_eq!(cache.get("never", &CacheOptions::new()).await.as_deref(), Some("n"));
}

#[tokio::test]
async fn test_restart_does_not_leak_sweepers() {
    let first: CacheEngine<String> = CacheEngine::start(&sweeping_config(10)).unwrap();
    assert!(first.is_running());
    drop(first);

    let second: CacheEngine<String> = CacheEngine::start(&sweeping_config(10)).unwrap();
    assert!(second.is_running());
    second.shutdown();
}

#[tokio::test]
async fn test_custom_adapter() {
    let store: Arc<MemoryStore<String>> = Arc::new(MemoryStore::new(Ttl::Never));
    let adapter: Arc<dyn CacheAdapter<String>> = store.clone();
    let engine = CacheEngine::with_adapter(adapter, &sweeping_config(1_000)).unwrap();

    engine.client().put("k", "v".to_string(), &CacheOptions::new()).await;

    assert!(store.contains(&CacheKey::of("k")));
    assert!(engine.stats().is_none());
}

#[tokio::test]
async fn test_invalid_config_is_fatal() {
    let result = CacheEngine::<String>::start(&sweeping_config(0));
    assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
}

#[test]
fn test_start_outside_runtime_is_fatal() {
    let result = CacheEngine::<String>::start(&Config::default());
    assert!(matches!(result, Err(CacheError::Startup(_))));
}
