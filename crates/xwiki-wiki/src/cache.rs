//! Descriptor caches keyed by wiki id and by alias.

use tracing::debug;
use xwiki_cache::{Cache, CacheConfiguration, CacheFactory, CacheFactoryExt, lookup_cache_factory};
use xwiki_component::ComponentManager;

use crate::descriptor::WikiDescriptor;
use crate::error::Result;

/// Name of the cache holding descriptors by wiki id.
pub const ID_CACHE_ID: &str = "wiki.descriptor.id";

/// Name of the cache holding descriptors by alias.
pub const ALIAS_CACHE_ID: &str = "wiki.descriptor.alias";

/// Two caches over the same descriptors.
#[derive(Debug, Clone)]
pub struct WikiDescriptorCache {
    by_id: Cache<WikiDescriptor>,
    by_alias: Cache<WikiDescriptor>,
}

impl WikiDescriptorCache {
    /// Build both caches with `factory`. `base` supplies the eviction
    /// settings; each cache gets its own id.
    pub fn new(factory: &dyn CacheFactory, base: &CacheConfiguration) -> Result<Self> {
        let by_id = factory.new_cache(&base.clone().with_id(ID_CACHE_ID))?;
        let by_alias = factory.new_cache(&base.clone().with_id(ALIAS_CACHE_ID))?;
        debug!(factory = %factory.hint(), "Wiki descriptor caches created");
        Ok(Self { by_id, by_alias })
    }

    /// Build both caches with the factory registered under `hint`.
    pub fn from_components(
        components: &ComponentManager,
        hint: &str,
        base: &CacheConfiguration,
    ) -> Result<Self> {
        let factory = lookup_cache_factory(components, hint)?;
        Self::new(factory.as_ref(), base)
    }

    /// Store `descriptor` under its id and every alias.
    pub fn add(&self, descriptor: &WikiDescriptor) -> Result<()> {
        self.by_id.set(&descriptor.id, descriptor.clone())?;
        for alias in &descriptor.aliases {
            self.by_alias.set(alias, descriptor.clone())?;
        }
        Ok(())
    }

    /// Drop `descriptor` from its id and every alias.
    pub fn remove(&self, descriptor: &WikiDescriptor) -> Result<()> {
        self.by_id.remove(&descriptor.id)?;
        for alias in &descriptor.aliases {
            self.by_alias.remove(alias)?;
        }
        Ok(())
    }

    /// Descriptor of the wiki with this id.
    pub fn get_by_id(&self, id: &str) -> Result<Option<WikiDescriptor>> {
        Ok(self.by_id.get(id)?)
    }

    /// Descriptor of the wiki answering to this alias.
    pub fn get_by_alias(&self, alias: &str) -> Result<Option<WikiDescriptor>> {
        Ok(self.by_alias.get(alias)?)
    }

    /// The cache keyed by wiki id.
    pub fn id_cache(&self) -> &Cache<WikiDescriptor> {
        &self.by_id
    }

    /// The cache keyed by alias.
    pub fn alias_cache(&self) -> &Cache<WikiDescriptor> {
        &self.by_alias
    }

    /// Dispose both caches.
    pub fn dispose(&self) {
        self.by_id.dispose();
        self.by_alias.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xwiki_cache::{MapCacheFactory, register_cache_factories};

    fn descriptor() -> WikiDescriptor {
        WikiDescriptor::new("dev", "dev.example.org").with_alias("dev.local")
    }

    #[test]
    fn test_add_indexes_every_alias() {
        let cache = WikiDescriptorCache::new(&MapCacheFactory::new(), &CacheConfiguration::new())
            .unwrap();
        cache.add(&descriptor()).unwrap();

        assert_eq!(cache.get_by_id("dev").unwrap(), Some(descriptor()));
        assert_eq!(cache.get_by_alias("dev.example.org").unwrap(), Some(descriptor()));
        assert_eq!(cache.get_by_alias("dev.local").unwrap(), Some(descriptor()));
    }

    #[test]
    fn test_remove_drops_every_alias() {
        let cache = WikiDescriptorCache::new(&MapCacheFactory::new(), &CacheConfiguration::new())
            .unwrap();
        cache.add(&descriptor()).unwrap();
        cache.remove(&descriptor()).unwrap();

        assert_eq!(cache.get_by_id("dev").unwrap(), None);
        assert_eq!(cache.get_by_alias("dev.local").unwrap(), None);
    }

    #[test]
    fn test_caches_are_named() {
        let components = ComponentManager::new();
        register_cache_factories(&components);

        let cache =
            WikiDescriptorCache::from_components(&components, "memory", &CacheConfiguration::new())
                .unwrap();

        assert_eq!(cache.id_cache().name(), ID_CACHE_ID);
        assert_eq!(cache.alias_cache().name(), ALIAS_CACHE_ID);
    }

    #[test]
    fn test_unknown_hint_fails() {
        let components = ComponentManager::new();
        register_cache_factories(&components);

        assert!(
            WikiDescriptorCache::from_components(&components, "nope", &CacheConfiguration::new())
                .is_err()
        );
    }
}
