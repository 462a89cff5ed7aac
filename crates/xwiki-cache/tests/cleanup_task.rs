//! Background expiry sweep.

use std::time::Duration;

use xwiki_cache::{CacheConfiguration, CacheFactoryExt, MemoryCacheFactory};

fn expiring_config() -> CacheConfiguration {
    CacheConfiguration::new()
        .with_id("sweep")
        .with_lifespan(Duration::from_millis(20))
        .with_cleanup_task(true)
        .with_cleanup_interval(Duration::from_millis(30))
}

#[tokio::test]
async fn test_cleanup_task_sweeps_expired_entries() {
    let cache = MemoryCacheFactory::new()
        .new_cache::<u32>(&expiring_config())
        .unwrap();
    let handle = cache.spawn_cleanup_task().unwrap();

    cache.set("a", 1).unwrap();
    cache.set("b", 2).unwrap();
    assert_eq!(cache.len().unwrap(), 2);

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(cache.len().unwrap(), 0);
    assert_eq!(cache.stats().unwrap().evictions, 2);

    cache.dispose();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("cleanup task should stop after dispose")
        .unwrap();
}

#[tokio::test]
async fn test_cleanup_task_stops_when_cache_dropped() {
    let cache = MemoryCacheFactory::new()
        .new_cache::<u32>(&expiring_config())
        .unwrap();
    let handle = cache.spawn_cleanup_task().unwrap();

    drop(cache);

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("cleanup task should stop once the cache is gone")
        .unwrap();
}

#[tokio::test]
async fn test_cleanup_task_disabled() {
    let config = CacheConfiguration::new().with_lifespan(Duration::from_secs(1));
    let cache = MemoryCacheFactory::new().new_cache::<u32>(&config).unwrap();

    assert!(cache.spawn_cleanup_task().is_none());
}

#[test]
fn test_cleanup_task_needs_runtime() {
    let cache = MemoryCacheFactory::new()
        .new_cache::<u32>(&expiring_config())
        .unwrap();

    assert!(cache.spawn_cleanup_task().is_none());
}
