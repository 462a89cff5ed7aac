//! Unbounded hash map store.

use std::collections::HashMap;

use tracing::warn;

use crate::config::CacheConfiguration;
use crate::error::Result;
use crate::factory::CacheFactory;
use crate::store::{CacheStore, ErasedValue, Evicted};

/// Store that keeps every entry until it is removed.
#[derive(Default)]
pub struct MapStore {
    entries: HashMap<String, ErasedValue>,
}

impl MapStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MapStore {
    fn get(&mut self, key: &str, _evicted: &mut Vec<Evicted>) -> Option<ErasedValue> {
        self.entries.get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn put(
        &mut self,
        key: &str,
        value: ErasedValue,
        _evicted: &mut Vec<Evicted>,
    ) -> Option<ErasedValue> {
        self.entries.insert(key.to_string(), value)
    }

    fn remove(&mut self, key: &str, _evicted: &mut Vec<Evicted>) -> Option<ErasedValue> {
        self.entries.remove(key)
    }

    fn drain(&mut self, _evicted: &mut Vec<Evicted>) -> Vec<(String, ErasedValue)> {
        self.entries.drain().collect()
    }

    fn evict_expired(&mut self, _evicted: &mut Vec<Evicted>) {}

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn capacity(&self) -> Option<usize> {
        None
    }
}

/// Factory for [`MapStore`]-backed caches. Eviction settings are ignored.
#[derive(Debug, Clone, Default)]
pub struct MapCacheFactory;

impl MapCacheFactory {
    /// Role hint of this factory.
    pub const HINT: &'static str = "map";

    /// Create a new factory.
    pub fn new() -> Self {
        Self
    }
}

impl CacheFactory for MapCacheFactory {
    fn hint(&self) -> &str {
        Self::HINT
    }

    fn new_store(&self, config: &CacheConfiguration) -> Result<Box<dyn CacheStore>> {
        if config.eviction.is_bounded() {
            warn!(
                cache = ?config.id,
                "The map cache factory does not evict, ignoring eviction settings"
            );
        }
        Ok(Box::new(MapStore::new()))
    }
}
