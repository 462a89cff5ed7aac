//! Pluggable cache abstraction.
//!
//! This crate provides:
//! - [`Cache`], a typed keyed store with explicit remove/clear and disposal
//! - [`CacheFactory`] implementations selected by role hint (`memory`, `map`)
//! - [`CacheEntryListener`] observers notified synchronously on add/modify/remove
//! - [`CacheConfiguration`] with LRU capacity, idle timeout and lifespan
//!
//! # Example
//!
//! ```rust,ignore
//! use xwiki_cache::{register_cache_factories, lookup_cache_factory, CacheConfiguration, CacheFactoryExt};
//! use xwiki_component::ComponentManager;
//!
//! let components = ComponentManager::new();
//! register_cache_factories(&components);
//!
//! let factory = lookup_cache_factory(&components, "memory")?;
//! let cache = factory.new_cache::<String>(
//!     &CacheConfiguration::new().with_id("documents").with_max_entries(500),
//! )?;
//!
//! cache.set("Main.WebHome", "content".to_string())?;
//! cache.dispose();
//! ```

mod cache;
mod config;
mod error;
mod event;
mod expiry;
mod factory;
mod map;
mod memory;
mod store;

pub use cache::{Cache, CacheId, CacheStats, CacheValue};
pub use config::{
    CacheConfiguration, DEFAULT_CLEANUP_INTERVAL, EvictionConfiguration, EvictionPolicy,
};
pub use error::{CacheError, Result};
pub use event::{CacheEntry, CacheEntryEvent, CacheEntryListener, RemovalCause};
pub use expiry::ExpiryTracker;
pub use factory::{CacheFactory, CacheFactoryExt, lookup_cache_factory, register_cache_factories};
pub use map::{MapCacheFactory, MapStore};
pub use memory::{LruStore, MemoryCacheFactory};
pub use store::{CacheStore, ErasedValue, Evicted};
