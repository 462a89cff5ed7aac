//! Access to wiki descriptors.

use tracing::debug;

use crate::cache::WikiDescriptorCache;
use crate::descriptor::WikiDescriptor;
use crate::error::Result;

/// Looks up and registers wiki descriptors through the descriptor caches.
#[derive(Debug, Clone)]
pub struct WikiDescriptorManager {
    cache: WikiDescriptorCache,
    main_wiki_id: String,
}

impl WikiDescriptorManager {
    /// Create a manager over `cache` for a farm whose main wiki is
    /// `main_wiki_id`.
    pub fn new(cache: WikiDescriptorCache, main_wiki_id: impl Into<String>) -> Self {
        Self {
            cache,
            main_wiki_id: main_wiki_id.into(),
        }
    }

    /// Identifier of the main wiki.
    pub fn main_wiki_id(&self) -> &str {
        &self.main_wiki_id
    }

    /// Descriptor of the wiki with this id.
    pub fn get_by_id(&self, id: &str) -> Result<Option<WikiDescriptor>> {
        self.cache.get_by_id(id)
    }

    /// Descriptor of the wiki answering to this alias.
    pub fn get_by_alias(&self, alias: &str) -> Result<Option<WikiDescriptor>> {
        self.cache.get_by_alias(alias)
    }

    /// Check if a wiki with this id is registered.
    pub fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.cache.id_cache().contains(id)?)
    }

    /// Register or replace a descriptor.
    ///
    /// Aliases held by a previous descriptor with the same id are dropped.
    pub fn set(&self, descriptor: WikiDescriptor) -> Result<()> {
        if let Some(previous) = self.cache.get_by_id(&descriptor.id)? {
            self.cache.remove(&previous)?;
        }
        debug!(wiki = %descriptor.id, aliases = ?descriptor.aliases, "Registering wiki descriptor");
        self.cache.add(&descriptor)
    }

    /// Unregister a descriptor.
    pub fn remove(&self, descriptor: &WikiDescriptor) -> Result<()> {
        debug!(wiki = %descriptor.id, "Removing wiki descriptor");
        self.cache.remove(descriptor)
    }

    /// The underlying caches.
    pub fn cache(&self) -> &WikiDescriptorCache {
        &self.cache
    }
}
