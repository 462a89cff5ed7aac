//! Storage backends behind a [`Cache`](crate::Cache).
//!
//! A [`CacheStore`] holds type-erased values and reports every entry it
//! drops on its own (capacity, expiry) through an `evicted` buffer. The typed
//! `Cache` front turns those reports into listener events, so stores never
//! deal with listeners themselves.

use std::any::Any;
use std::sync::Arc;

use crate::event::RemovalCause;

/// A value as held by a store.
pub type ErasedValue = Arc<dyn Any + Send + Sync>;

/// An entry a store dropped on its own.
#[derive(Clone)]
pub struct Evicted {
    /// Key of the dropped entry.
    pub key: String,

    /// Value of the dropped entry.
    pub value: ErasedValue,

    /// Why it was dropped.
    pub cause: RemovalCause,
}

impl Evicted {
    /// Create a new eviction record.
    pub fn new(key: impl Into<String>, value: ErasedValue, cause: RemovalCause) -> Self {
        Self {
            key: key.into(),
            value,
            cause,
        }
    }
}

impl std::fmt::Debug for Evicted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evicted")
            .field("key", &self.key)
            .field("cause", &self.cause)
            .finish_non_exhaustive()
    }
}

/// Storage backend for a cache.
///
/// Implementations are accessed behind a mutex, so methods take `&mut self`.
/// Expired entries found along the way are reported through `evicted` and
/// treated as absent.
pub trait CacheStore: Send {
    /// Get a value, marking it as recently used.
    fn get(&mut self, key: &str, evicted: &mut Vec<Evicted>) -> Option<ErasedValue>;

    /// Whether a live entry exists, without touching recency.
    fn contains(&self, key: &str) -> bool;

    /// Insert or replace a value. Returns the previous live value.
    fn put(&mut self, key: &str, value: ErasedValue, evicted: &mut Vec<Evicted>)
    -> Option<ErasedValue>;

    /// Remove a value. Returns it if it was live.
    fn remove(&mut self, key: &str, evicted: &mut Vec<Evicted>) -> Option<ErasedValue>;

    /// Remove every entry. Returns the live ones.
    fn drain(&mut self, evicted: &mut Vec<Evicted>) -> Vec<(String, ErasedValue)>;

    /// Drop every expired entry.
    fn evict_expired(&mut self, evicted: &mut Vec<Evicted>);

    /// Number of stored entries, including expired ones not yet dropped.
    fn len(&self) -> usize;

    /// Whether the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity limit, if any.
    fn capacity(&self) -> Option<usize>;
}
