//! Cache factories and their registration as components.

use std::sync::Arc;

use tracing::debug;
use xwiki_component::{ComponentManager, DEFAULT_HINT};

use crate::cache::{Cache, CacheValue};
use crate::config::CacheConfiguration;
use crate::error::Result;
use crate::map::MapCacheFactory;
use crate::memory::MemoryCacheFactory;
use crate::store::CacheStore;

/// Builds cache storage from a configuration.
///
/// Implementations are registered in a [`ComponentManager`] under the role
/// `dyn CacheFactory` and a hint naming the implementation. Use
/// [`CacheFactoryExt::new_cache`] to get a typed [`Cache`].
pub trait CacheFactory: Send + Sync {
    /// Role hint this factory is registered under.
    fn hint(&self) -> &str;

    /// Create fresh storage for a new cache. No two calls share state.
    fn new_store(&self, config: &CacheConfiguration) -> Result<Box<dyn CacheStore>>;
}

/// Typed cache construction for every [`CacheFactory`].
pub trait CacheFactoryExt: CacheFactory {
    /// Create a new, independent cache.
    fn new_cache<V: CacheValue>(&self, config: &CacheConfiguration) -> Result<Cache<V>> {
        config.validate()?;
        let store = self.new_store(config)?;
        debug!(factory = %self.hint(), cache = ?config.id, "Building cache");
        Ok(Cache::new(config.clone(), store))
    }
}

impl<F: CacheFactory + ?Sized> CacheFactoryExt for F {}

/// Register the built-in factories.
///
/// `memory` is also registered as the default implementation; both hints
/// resolve to the same instance.
pub fn register_cache_factories(components: &ComponentManager) {
    let memory: Arc<dyn CacheFactory> = Arc::new(MemoryCacheFactory::new());
    components.register::<dyn CacheFactory>(MemoryCacheFactory::HINT, Arc::clone(&memory));
    components.register::<dyn CacheFactory>(DEFAULT_HINT, memory);
    components.register::<dyn CacheFactory>(MapCacheFactory::HINT, Arc::new(MapCacheFactory::new()));
}

/// Resolve the cache factory registered under `hint`.
pub fn lookup_cache_factory(
    components: &ComponentManager,
    hint: &str,
) -> Result<Arc<dyn CacheFactory>> {
    Ok(components.lookup::<dyn CacheFactory>(hint)?)
}
