//! Typed cache handle with synchronous entry listeners.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::CacheConfiguration;
use crate::error::{CacheError, Result};
use crate::event::{CacheEntry, CacheEntryEvent, CacheEntryListener, RemovalCause};
use crate::store::{CacheStore, ErasedValue, Evicted};

/// Values a [`Cache`] can hold.
pub trait CacheValue: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> CacheValue for T {}

static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheId(u64);

impl CacheId {
    fn next() -> Self {
        Self(NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric value of the identifier.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CacheId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cache-{}", self.0)
    }
}

/// Shared state behind every handle to the same cache.
struct CacheInner<V> {
    id: CacheId,
    name: String,
    config: CacheConfiguration,

    /// `None` once disposed.
    store: Mutex<Option<Box<dyn CacheStore>>>,

    listeners: RwLock<Vec<Arc<dyn CacheEntryListener<V>>>>,

    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

/// Keyed store mapping string keys to values of type `V`.
///
/// Created by a [`CacheFactory`](crate::CacheFactory). Cloning the handle
/// shares the same entries and listeners. Mutations notify every registered
/// [`CacheEntryListener`] on the calling thread before returning. After
/// [`dispose`](Cache::dispose) every operation fails with
/// [`CacheError::Disposed`].
pub struct Cache<V> {
    inner: Arc<CacheInner<V>>,
}

impl<V: CacheValue> Cache<V> {
    pub(crate) fn new(config: CacheConfiguration, store: Box<dyn CacheStore>) -> Self {
        let id = CacheId::next();
        let name = config.id.clone().unwrap_or_else(|| id.to_string());

        debug!(
            cache = %name,
            capacity = ?store.capacity(),
            max_idle = ?config.eviction.max_idle,
            lifespan = ?config.eviction.lifespan,
            "Cache created"
        );

        Self {
            inner: Arc::new(CacheInner {
                id,
                name,
                config,
                store: Mutex::new(Some(store)),
                listeners: RwLock::new(Vec::new()),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                evictions: AtomicU64::new(0),
            }),
        }
    }

    /// Identity of this cache.
    pub fn id(&self) -> CacheId {
        self.inner.id
    }

    /// Cache name: the configuration id, or the cache id if none was given.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The configuration the cache was built from.
    pub fn config(&self) -> &CacheConfiguration {
        &self.inner.config
    }

    /// Whether two handles refer to the same cache.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<V>> {
        let (value, evicted) = self.with_store(|store, evicted| store.get(key, evicted))?;
        self.dispatch_evicted(evicted);

        match value {
            Some(value) => {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                trace!(cache = %self.inner.name, key = %key, "Cache hit");
                self.downcast(key, &value).map(Some)
            }
            None => {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                trace!(cache = %self.inner.name, key = %key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Store `value` under `key`.
    ///
    /// Fires "added" if the key was absent and "modified" otherwise. Entries
    /// evicted to make room fire "removed" afterwards.
    pub fn set(&self, key: &str, value: V) -> Result<()> {
        let erased: ErasedValue = Arc::new(value.clone());
        let (previous, evicted) =
            self.with_store(|store, evicted| store.put(key, erased, evicted))?;

        // An expired previous value for the same key leaves before the new one arrives
        let (same_key, others): (Vec<Evicted>, Vec<Evicted>) =
            evicted.into_iter().partition(|e| e.key == key);
        self.dispatch_evicted(same_key);

        let entry = CacheEntry::new(key, value);
        if previous.is_some() {
            trace!(cache = %self.inner.name, key = %key, "Cache entry modified");
            self.fire_modified(entry);
        } else {
            trace!(cache = %self.inner.name, key = %key, "Cache entry added");
            self.fire_added(entry);
        }

        self.dispatch_evicted(others);
        Ok(())
    }

    /// Remove the entry under `key`, returning its value.
    ///
    /// Fires "removed" if the key was present; otherwise a no-op.
    pub fn remove(&self, key: &str) -> Result<Option<V>> {
        let (removed, evicted) = self.with_store(|store, evicted| store.remove(key, evicted))?;
        self.dispatch_evicted(evicted);

        let Some(value) = removed else {
            return Ok(None);
        };

        let value = self.downcast(key, &value)?;
        trace!(cache = %self.inner.name, key = %key, "Cache entry removed");
        self.fire_removed(CacheEntry::new(key, value.clone()), RemovalCause::Explicit);
        Ok(Some(value))
    }

    /// Remove every entry, firing "removed" for each.
    pub fn remove_all(&self) -> Result<()> {
        let (drained, evicted) = self.with_store(|store, evicted| store.drain(evicted))?;
        self.dispatch_evicted(evicted);

        debug!(cache = %self.inner.name, count = drained.len(), "Cache cleared");

        for (key, value) in drained {
            match self.downcast(&key, &value) {
                Ok(value) => self.fire_removed(CacheEntry::new(key, value), RemovalCause::Cleared),
                Err(e) => warn!(cache = %self.inner.name, error = %e, "Skipping removal event"),
            }
        }
        Ok(())
    }

    /// Check if a live entry exists, without touching recency.
    pub fn contains(&self, key: &str) -> Result<bool> {
        self.with_store(|store, _| store.contains(key))
            .map(|(found, _)| found)
    }

    /// Number of stored entries.
    pub fn len(&self) -> Result<usize> {
        self.with_store(|store, _| store.len()).map(|(len, _)| len)
    }

    /// Check if the cache holds no entries.
    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }

    /// Get cache statistics.
    pub fn stats(&self) -> Result<CacheStats> {
        let ((size, capacity), _) =
            self.with_store(|store, _| (store.len(), store.capacity()))?;
        Ok(CacheStats {
            name: self.inner.name.clone(),
            size,
            capacity,
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            evictions: self.inner.evictions.load(Ordering::Relaxed),
        })
    }

    /// Drop expired entries, firing "removed" for each. Returns how many.
    ///
    /// Called periodically by the cleanup task if enabled, but can also be
    /// called manually.
    pub fn cleanup_expired(&self) -> Result<usize> {
        let ((), evicted) = self.with_store(|store, evicted| store.evict_expired(evicted))?;
        let count = evicted.len();
        self.dispatch_evicted(evicted);

        if count > 0 {
            debug!(cache = %self.inner.name, count = count, "Cleaned up expired entries");
        }
        Ok(count)
    }

    /// Start the periodic expiry sweep configured by
    /// [`CacheConfiguration::cleanup_task`].
    ///
    /// Returns `None` if the sweep is disabled or no tokio runtime is
    /// running. The task holds no strong reference to the cache and stops
    /// once the cache is disposed or dropped.
    pub fn spawn_cleanup_task(&self) -> Option<tokio::task::JoinHandle<()>> {
        if !self.inner.config.cleanup_task {
            return None;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(cache = %self.inner.name, "No tokio runtime, cleanup task not started");
            return None;
        };

        let weak = Arc::downgrade(&self.inner);
        let period = self.inner.config.cleanup_interval;
        let name = self.inner.name.clone();

        Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let cache = Cache { inner };
                match cache.cleanup_expired() {
                    Ok(_) => {}
                    Err(CacheError::Disposed(_)) => break,
                    Err(e) => warn!(cache = %name, error = %e, "Expiry cleanup failed"),
                }
            }

            debug!(cache = %name, "Cleanup task stopped");
        }))
    }

    /// Register a listener for entry events.
    ///
    /// Holds the store lock while registering, so a concurrent
    /// [`Cache::dispose`] either drops the listener or makes this fail.
    pub fn add_cache_entry_listener(&self, listener: Arc<dyn CacheEntryListener<V>>) -> Result<()> {
        let store = self.inner.store.lock();
        if store.is_none() {
            return Err(self.disposed());
        }
        self.inner.listeners.write().push(listener);
        Ok(())
    }

    /// Unregister a listener. Returns `true` if it was registered.
    ///
    /// Listeners are matched by identity, so any `Arc` pointing at the
    /// registered allocation works.
    pub fn remove_cache_entry_listener<L: ?Sized>(&self, listener: &Arc<L>) -> bool {
        let target = Arc::as_ptr(listener).cast::<()>();
        let mut listeners = self.inner.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| Arc::as_ptr(l).cast::<()>() != target);
        before != listeners.len()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }

    /// Release all entries and listeners. Idempotent.
    ///
    /// No events fire. Every later operation fails with
    /// [`CacheError::Disposed`].
    pub fn dispose(&self) {
        let store = self.inner.store.lock().take();
        if let Some(store) = store {
            let listeners = std::mem::take(&mut *self.inner.listeners.write());
            debug!(
                cache = %self.inner.name,
                entries = store.len(),
                listeners = listeners.len(),
                "Cache disposed"
            );
        }
    }

    /// Check if the cache was disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.store.lock().is_none()
    }

    /// Run `f` against the store with the lock held. The lock is released
    /// before the caller dispatches any event.
    fn with_store<R>(
        &self,
        f: impl FnOnce(&mut Box<dyn CacheStore>, &mut Vec<Evicted>) -> R,
    ) -> Result<(R, Vec<Evicted>)> {
        let mut evicted = Vec::new();
        let mut guard = self.inner.store.lock();
        let store = guard.as_mut().ok_or_else(|| self.disposed())?;
        let result = f(store, &mut evicted);
        Ok((result, evicted))
    }

    fn disposed(&self) -> CacheError {
        CacheError::Disposed(self.inner.name.clone())
    }

    fn downcast(&self, key: &str, value: &ErasedValue) -> Result<V> {
        (**value)
            .downcast_ref::<V>()
            .cloned()
            .ok_or_else(|| CacheError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<V>(),
            })
    }

    fn dispatch_evicted(&self, evicted: Vec<Evicted>) {
        for Evicted { key, value, cause } in evicted {
            if cause.is_eviction() {
                self.inner.evictions.fetch_add(1, Ordering::Relaxed);
            }
            debug!(cache = %self.inner.name, key = %key, cause = %cause, "Cache entry evicted");

            match self.downcast(&key, &value) {
                Ok(value) => self.fire_removed(CacheEntry::new(key, value), cause),
                Err(e) => warn!(cache = %self.inner.name, error = %e, "Skipping removal event"),
            }
        }
    }

    fn snapshot_listeners(&self) -> Vec<Arc<dyn CacheEntryListener<V>>> {
        self.inner.listeners.read().clone()
    }

    fn fire_added(&self, entry: CacheEntry<V>) {
        let event = CacheEntryEvent::new(self, entry);
        for listener in self.snapshot_listeners() {
            listener.cache_entry_added(&event);
        }
    }

    fn fire_modified(&self, entry: CacheEntry<V>) {
        let event = CacheEntryEvent::new(self, entry);
        for listener in self.snapshot_listeners() {
            listener.cache_entry_modified(&event);
        }
    }

    fn fire_removed(&self, entry: CacheEntry<V>, cause: RemovalCause) {
        let event = CacheEntryEvent::removed(self, entry, cause);
        for listener in self.snapshot_listeners() {
            listener.cache_entry_removed(&event);
        }
    }
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Cache name.
    pub name: String,

    /// Current number of stored entries.
    pub size: usize,

    /// Maximum capacity, if bounded.
    pub capacity: Option<usize>,

    /// Lookups that found a value.
    pub hits: u64,

    /// Lookups that found nothing.
    pub misses: u64,

    /// Entries dropped for capacity or expiry.
    pub evictions: u64,
}
