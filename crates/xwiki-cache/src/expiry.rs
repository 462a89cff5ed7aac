//! Idle-timeout and lifespan tracking for cache entries.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Stamps {
    written: Instant,
    accessed: Instant,
}

/// Tracks write and access times for time-based expiration.
#[derive(Debug)]
pub struct ExpiryTracker {
    stamps: HashMap<String, Stamps>,

    /// Expire entries not accessed within this duration.
    max_idle: Option<Duration>,

    /// Expire entries this long after their last write.
    lifespan: Option<Duration>,
}

impl ExpiryTracker {
    /// Create a tracker with the given limits (`None` disables a limit).
    pub fn new(max_idle: Option<Duration>, lifespan: Option<Duration>) -> Self {
        Self {
            stamps: HashMap::new(),
            max_idle,
            lifespan,
        }
    }

    /// Whether any limit is configured.
    pub fn is_enabled(&self) -> bool {
        self.max_idle.is_some() || self.lifespan.is_some()
    }

    /// Record a write (resets both timers).
    pub fn record_write(&mut self, key: &str) {
        if !self.is_enabled() {
            return;
        }
        let now = Instant::now();
        self.stamps.insert(
            key.to_string(),
            Stamps {
                written: now,
                accessed: now,
            },
        );
    }

    /// Record a read (resets the idle timer only).
    pub fn record_access(&mut self, key: &str) {
        if let Some(stamps) = self.stamps.get_mut(key) {
            stamps.accessed = Instant::now();
        }
    }

    /// Check if an entry has expired. Untracked keys never expire.
    pub fn is_expired(&self, key: &str) -> bool {
        self.stamps
            .get(key)
            .is_some_and(|stamps| self.expired_at(stamps, Instant::now()))
    }

    fn expired_at(&self, stamps: &Stamps, now: Instant) -> bool {
        let idle = self
            .max_idle
            .is_some_and(|max| now.duration_since(stamps.accessed) > max);
        let lived = self
            .lifespan
            .is_some_and(|max| now.duration_since(stamps.written) > max);
        idle || lived
    }

    /// Remove tracking for an entry.
    pub fn remove(&mut self, key: &str) {
        self.stamps.remove(key);
    }

    /// Get all expired keys.
    pub fn get_expired(&self) -> Vec<String> {
        if !self.is_enabled() {
            return Vec::new();
        }
        let now = Instant::now();
        self.stamps
            .iter()
            .filter(|(_, stamps)| self.expired_at(stamps, now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Remove all expired entries and return their keys.
    pub fn drain_expired(&mut self) -> Vec<String> {
        let expired = self.get_expired();
        for key in &expired {
            self.stamps.remove(key);
        }
        expired
    }

    /// Number of tracked entries.
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// Check if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Clear all tracking data.
    pub fn clear(&mut self) {
        self.stamps.clear();
    }
}
