//! In-memory store with LRU eviction and TTL support.

use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use tracing::trace;

use crate::config::CacheConfiguration;
use crate::error::Result;
use crate::event::RemovalCause;
use crate::expiry::ExpiryTracker;
use crate::factory::CacheFactory;
use crate::store::{CacheStore, ErasedValue, Evicted};

/// Store backed by an LRU list with optional idle timeout and lifespan.
pub struct LruStore {
    entries: LruCache<String, ErasedValue>,
    expiry: ExpiryTracker,
    capacity: Option<usize>,
}

impl LruStore {
    /// Create a store. A `capacity` of `None` or zero is unbounded.
    pub fn new(
        capacity: Option<usize>,
        max_idle: Option<Duration>,
        lifespan: Option<Duration>,
    ) -> Self {
        let capacity = capacity.and_then(NonZeroUsize::new);
        let entries = match capacity {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };

        Self {
            entries,
            expiry: ExpiryTracker::new(max_idle, lifespan),
            capacity: capacity.map(NonZeroUsize::get),
        }
    }

    /// Create a store honouring the eviction section of `config`.
    pub fn from_config(config: &CacheConfiguration) -> Self {
        Self::new(
            config.eviction.capacity(),
            config.eviction.max_idle,
            config.eviction.lifespan,
        )
    }

    /// Drop `key` if it has expired. Returns `true` if it was dropped.
    fn pop_expired(&mut self, key: &str, evicted: &mut Vec<Evicted>) -> bool {
        if !self.expiry.is_expired(key) {
            return false;
        }

        self.expiry.remove(key);
        if let Some(value) = self.entries.pop(key) {
            evicted.push(Evicted::new(key, value, RemovalCause::Expired));
        }
        true
    }

    fn is_full(&self) -> bool {
        self.capacity
            .is_some_and(|cap| self.entries.len() >= cap)
    }
}

impl CacheStore for LruStore {
    fn get(&mut self, key: &str, evicted: &mut Vec<Evicted>) -> Option<ErasedValue> {
        if self.pop_expired(key, evicted) {
            return None;
        }

        let value = self.entries.get(key).cloned()?;
        self.expiry.record_access(key);
        Some(value)
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains(key) && !self.expiry.is_expired(key)
    }

    fn put(
        &mut self,
        key: &str,
        value: ErasedValue,
        evicted: &mut Vec<Evicted>,
    ) -> Option<ErasedValue> {
        self.pop_expired(key, evicted);

        if self.entries.contains(key) {
            let previous = self.entries.put(key.to_string(), value);
            self.expiry.record_write(key);
            return previous;
        }

        // Free room from expired entries before giving up a live one
        if self.is_full() && self.expiry.is_enabled() {
            self.evict_expired(evicted);
        }

        // The key is absent, so anything returned is the LRU victim
        if let Some((victim, victim_value)) = self.entries.push(key.to_string(), value) {
            trace!(key = %victim, "Evicting LRU entry to make room");
            self.expiry.remove(&victim);
            evicted.push(Evicted::new(victim, victim_value, RemovalCause::Capacity));
        }
        self.expiry.record_write(key);
        None
    }

    fn remove(&mut self, key: &str, evicted: &mut Vec<Evicted>) -> Option<ErasedValue> {
        if self.pop_expired(key, evicted) {
            return None;
        }

        self.expiry.remove(key);
        self.entries.pop(key)
    }

    fn drain(&mut self, evicted: &mut Vec<Evicted>) -> Vec<(String, ErasedValue)> {
        self.evict_expired(evicted);

        let mut drained = Vec::with_capacity(self.entries.len());
        while let Some(entry) = self.entries.pop_lru() {
            drained.push(entry);
        }
        self.expiry.clear();
        drained
    }

    fn evict_expired(&mut self, evicted: &mut Vec<Evicted>) {
        for key in self.expiry.drain_expired() {
            if let Some(value) = self.entries.pop(key.as_str()) {
                evicted.push(Evicted::new(key, value, RemovalCause::Expired));
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

/// Factory for [`LruStore`]-backed caches.
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheFactory;

impl MemoryCacheFactory {
    /// Role hint of this factory.
    pub const HINT: &'static str = "memory";

    /// Create a new factory.
    pub fn new() -> Self {
        Self
    }
}

impl CacheFactory for MemoryCacheFactory {
    fn hint(&self) -> &str {
        Self::HINT
    }

    fn new_store(&self, config: &CacheConfiguration) -> Result<Box<dyn CacheStore>> {
        Ok(Box::new(LruStore::from_config(config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn erase(value: u32) -> ErasedValue {
        Arc::new(value)
    }

    fn put(store: &mut LruStore, key: &str, value: u32) -> Vec<Evicted> {
        let mut evicted = Vec::new();
        store.put(key, erase(value), &mut evicted);
        evicted
    }

    fn get(store: &mut LruStore, key: &str) -> Option<u32> {
        let mut evicted = Vec::new();
        store
            .get(key, &mut evicted)
            .and_then(|v| v.downcast_ref::<u32>().copied())
    }

    #[test]
    fn test_lru_eviction() {
        let mut store = LruStore::new(Some(3), None, None);
        for (i, key) in ["k1", "k2", "k3"].iter().enumerate() {
            assert!(put(&mut store, key, i as u32).is_empty());
        }

        let evicted = put(&mut store, "k4", 4);

        assert_eq!(store.len(), 3);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].key, "k1");
        assert_eq!(evicted[0].cause, RemovalCause::Capacity);
        assert!(!store.contains("k1"));
        assert!(store.contains("k4"));
    }

    #[test]
    fn test_access_updates_order() {
        let mut store = LruStore::new(Some(3), None, None);
        put(&mut store, "k1", 1);
        put(&mut store, "k2", 2);
        put(&mut store, "k3", 3);

        // Access k1 to make it recently used
        assert_eq!(get(&mut store, "k1"), Some(1));

        let evicted = put(&mut store, "k4", 4);
        assert_eq!(evicted[0].key, "k2");
        assert!(store.contains("k1"));
    }

    #[test]
    fn test_replace_does_not_evict() {
        let mut store = LruStore::new(Some(2), None, None);
        put(&mut store, "k1", 1);
        put(&mut store, "k2", 2);

        let mut evicted = Vec::new();
        let previous = store.put("k1", erase(10u32), &mut evicted);

        assert!(evicted.is_empty());
        assert_eq!(previous.and_then(|v| v.downcast_ref::<u32>().copied()), Some(1));
        assert_eq!(get(&mut store, "k1"), Some(10));
    }

    #[test]
    fn test_idle_expiration_on_get() {
        let mut store = LruStore::new(None, Some(Duration::from_millis(20)), None);
        put(&mut store, "k1", 1);

        thread::sleep(Duration::from_millis(40));

        let mut evicted = Vec::new();
        assert!(store.get("k1", &mut evicted).is_none());
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].cause, RemovalCause::Expired);
        assert!(store.is_empty());
    }

    #[test]
    fn test_expired_entries_make_room_first() {
        let mut store = LruStore::new(Some(2), None, Some(Duration::from_millis(20)));
        put(&mut store, "k1", 1);
        put(&mut store, "k2", 2);

        thread::sleep(Duration::from_millis(40));

        let evicted = put(&mut store, "k3", 3);
        assert_eq!(evicted.len(), 2);
        assert!(evicted.iter().all(|e| e.cause == RemovalCause::Expired));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_expired_reports_eviction() {
        let mut store = LruStore::new(None, None, Some(Duration::from_millis(10)));
        put(&mut store, "k1", 1);

        thread::sleep(Duration::from_millis(30));

        let mut evicted = Vec::new();
        assert!(store.remove("k1", &mut evicted).is_none());
        assert_eq!(evicted.len(), 1);
    }

    #[test]
    fn test_drain_returns_live_entries() {
        let mut store = LruStore::new(None, None, None);
        put(&mut store, "k1", 1);
        put(&mut store, "k2", 2);

        let mut evicted = Vec::new();
        let mut keys: Vec<String> = store
            .drain(&mut evicted)
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        keys.sort();

        assert_eq!(keys, vec!["k1", "k2"]);
        assert!(evicted.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_zero_capacity_is_unbounded() {
        let mut store = LruStore::new(Some(0), None, None);
        for i in 0..100 {
            put(&mut store, &format!("k{i}"), i);
        }
        assert_eq!(store.len(), 100);
        assert_eq!(store.capacity(), None);
    }
}
