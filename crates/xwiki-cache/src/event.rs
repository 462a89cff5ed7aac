//! Cache entry events and listeners.

use std::fmt;

use crate::cache::Cache;

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// Removed with [`Cache::remove`].
    Explicit,
    /// Removed with [`Cache::remove_all`].
    Cleared,
    /// Evicted to keep the cache within its capacity.
    Capacity,
    /// Dropped because its idle timeout or lifespan passed.
    Expired,
}

impl RemovalCause {
    /// Whether the cache removed the entry on its own.
    pub fn is_eviction(&self) -> bool {
        matches!(self, RemovalCause::Capacity | RemovalCause::Expired)
    }
}

impl fmt::Display for RemovalCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalCause::Explicit => write!(f, "explicit"),
            RemovalCause::Cleared => write!(f, "cleared"),
            RemovalCause::Capacity => write!(f, "capacity"),
            RemovalCause::Expired => write!(f, "expired"),
        }
    }
}

/// A key and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<V> {
    key: String,
    value: V,
}

impl<V> CacheEntry<V> {
    /// Create a new entry.
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// The entry key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The entry value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Split the entry into key and value.
    pub fn into_parts(self) -> (String, V) {
        (self.key, self.value)
    }
}

/// Snapshot of a mutation, delivered to listeners while the triggering call
/// is still in progress.
///
/// For "modified" events the entry holds the new value; for "removed" events
/// it holds the value that was removed.
pub struct CacheEntryEvent<'a, V> {
    cache: &'a Cache<V>,
    entry: CacheEntry<V>,
    cause: Option<RemovalCause>,
}

impl<'a, V> CacheEntryEvent<'a, V> {
    pub(crate) fn new(cache: &'a Cache<V>, entry: CacheEntry<V>) -> Self {
        Self {
            cache,
            entry,
            cause: None,
        }
    }

    pub(crate) fn removed(cache: &'a Cache<V>, entry: CacheEntry<V>, cause: RemovalCause) -> Self {
        Self {
            cache,
            entry,
            cause: Some(cause),
        }
    }

    /// The cache that fired the event.
    pub fn cache(&self) -> &'a Cache<V> {
        self.cache
    }

    /// The affected entry.
    pub fn entry(&self) -> &CacheEntry<V> {
        &self.entry
    }

    /// Why the entry was removed. `None` for added/modified events.
    pub fn removal_cause(&self) -> Option<RemovalCause> {
        self.cause
    }
}

impl<V: fmt::Debug> fmt::Debug for CacheEntryEvent<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntryEvent")
            .field("cache", self.cache)
            .field("entry", &self.entry)
            .field("cause", &self.cause)
            .finish()
    }
}

/// Observer of cache mutations.
///
/// Callbacks run synchronously on the thread performing the mutation, after
/// the cache has released its internal lock, so a listener may call back into
/// the cache. All methods default to doing nothing.
pub trait CacheEntryListener<V>: Send + Sync {
    /// A key that was absent received a value.
    fn cache_entry_added(&self, _event: &CacheEntryEvent<'_, V>) {}

    /// A key that was present received a new value.
    fn cache_entry_modified(&self, _event: &CacheEntryEvent<'_, V>) {}

    /// An entry left the cache.
    fn cache_entry_removed(&self, _event: &CacheEntryEvent<'_, V>) {}
}
