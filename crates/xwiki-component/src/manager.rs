//! Component manager keyed by role type and role hint.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::{ComponentError, Result};

/// Hint used when the caller does not select a specific implementation.
pub const DEFAULT_HINT: &str = "default";

/// Registered implementations of a single role.
struct RoleEntry {
    /// Human readable role name, used in errors and logs.
    role: &'static str,

    /// Singletons by hint. Each value is an `Arc<R>` boxed as `Any`.
    components: HashMap<String, Box<dyn Any + Send + Sync>>,
}

/// Registry of singleton components.
///
/// The manager is cheap to share (`Clone` hands out another handle to the
/// same registry) and safe to use from several threads.
#[derive(Clone, Default)]
pub struct ComponentManager {
    roles: Arc<RwLock<HashMap<TypeId, RoleEntry>>>,
}

impl ComponentManager {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `component` as the singleton for role `R` under `hint`.
    ///
    /// An existing registration for the same role and hint is replaced.
    pub fn register<R>(&self, hint: impl Into<String>, component: Arc<R>)
    where
        R: ?Sized + Send + Sync + 'static,
    {
        let hint = hint.into();
        let role = std::any::type_name::<R>();
        let mut roles = self.roles.write();
        let entry = roles.entry(TypeId::of::<R>()).or_insert_with(|| RoleEntry {
            role,
            components: HashMap::new(),
        });

        if entry
            .components
            .insert(hint.clone(), Box::new(component))
            .is_some()
        {
            debug!(role = %role, hint = %hint, "Replaced registered component");
        } else {
            trace!(role = %role, hint = %hint, "Registered component");
        }
    }

    /// Look up the singleton registered for role `R` under `hint`.
    pub fn lookup<R>(&self, hint: &str) -> Result<Arc<R>>
    where
        R: ?Sized + Send + Sync + 'static,
    {
        let roles = self.roles.read();
        roles
            .get(&TypeId::of::<R>())
            .and_then(|entry| entry.components.get(hint))
            .and_then(|component| component.downcast_ref::<Arc<R>>())
            .cloned()
            .ok_or_else(|| ComponentError::NotFound {
                role: std::any::type_name::<R>(),
                hint: hint.to_string(),
            })
    }

    /// Look up the singleton registered for role `R` under [`DEFAULT_HINT`].
    pub fn lookup_default<R>(&self) -> Result<Arc<R>>
    where
        R: ?Sized + Send + Sync + 'static,
    {
        self.lookup::<R>(DEFAULT_HINT)
    }

    /// All implementations of role `R`, sorted by hint.
    pub fn lookup_all<R>(&self) -> Vec<(String, Arc<R>)>
    where
        R: ?Sized + Send + Sync + 'static,
    {
        let roles = self.roles.read();
        let Some(entry) = roles.get(&TypeId::of::<R>()) else {
            return Vec::new();
        };

        let mut all: Vec<(String, Arc<R>)> = entry
            .components
            .iter()
            .filter_map(|(hint, component)| {
                component
                    .downcast_ref::<Arc<R>>()
                    .map(|c| (hint.clone(), Arc::clone(c)))
            })
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Check whether role `R` has an implementation under `hint`.
    pub fn has_component<R>(&self, hint: &str) -> bool
    where
        R: ?Sized + Send + Sync + 'static,
    {
        self.roles
            .read()
            .get(&TypeId::of::<R>())
            .is_some_and(|entry| entry.components.contains_key(hint))
    }

    /// Registered hints for role `R`, sorted.
    pub fn hints<R>(&self) -> Vec<String>
    where
        R: ?Sized + Send + Sync + 'static,
    {
        let roles = self.roles.read();
        let mut hints: Vec<String> = roles
            .get(&TypeId::of::<R>())
            .map(|entry| entry.components.keys().cloned().collect())
            .unwrap_or_default();
        hints.sort();
        hints
    }

    /// Remove the implementation of role `R` registered under `hint`.
    ///
    /// Returns `true` if something was removed. Handles already looked up
    /// stay valid.
    pub fn unregister<R>(&self, hint: &str) -> bool
    where
        R: ?Sized + Send + Sync + 'static,
    {
        let mut roles = self.roles.write();
        let Some(entry) = roles.get_mut(&TypeId::of::<R>()) else {
            return false;
        };

        let removed = entry.components.remove(hint).is_some();
        if removed {
            debug!(role = %entry.role, hint = %hint, "Unregistered component");
        }
        if entry.components.is_empty() {
            roles.remove(&TypeId::of::<R>());
        }
        removed
    }
}

impl std::fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let roles = self.roles.read();
        let mut map = f.debug_map();
        for entry in roles.values() {
            let mut hints: Vec<&String> = entry.components.keys().collect();
            hints.sort();
            map.entry(&entry.role, &hints);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    struct French;

    impl Greeter for French {
        fn greet(&self) -> String {
            "bonjour".to_string()
        }
    }

    #[test]
    fn test_lookup_returns_same_instance() {
        let components = ComponentManager::new();
        components.register::<dyn Greeter>("default", Arc::new(English));

        let first = components.lookup_default::<dyn Greeter>().unwrap();
        let second = components.lookup_default::<dyn Greeter>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.greet(), "hello");
    }

    #[test]
    fn test_hint_selects_implementation() {
        let components = ComponentManager::new();
        components.register::<dyn Greeter>("en", Arc::new(English));
        components.register::<dyn Greeter>("fr", Arc::new(French));

        assert_eq!(components.lookup::<dyn Greeter>("fr").unwrap().greet(), "bonjour");
        assert_eq!(components.lookup::<dyn Greeter>("en").unwrap().greet(), "hello");
        assert_eq!(components.hints::<dyn Greeter>(), vec!["en", "fr"]);
    }

    #[test]
    fn test_unknown_hint_is_not_found() {
        let components = ComponentManager::new();
        components.register::<dyn Greeter>("en", Arc::new(English));

        let err = components.lookup::<dyn Greeter>("de").err().unwrap();
        assert!(matches!(err, ComponentError::NotFound { ref hint, .. } if hint == "de"));
        assert!(err.to_string().starts_with("component not found"));
    }

    #[test]
    fn test_unknown_role_is_not_found() {
        let components = ComponentManager::new();
        assert!(components.lookup_default::<dyn Greeter>().is_err());
        assert!(components.hints::<dyn Greeter>().is_empty());
    }

    #[test]
    fn test_roles_are_isolated() {
        let components = ComponentManager::new();
        components.register::<dyn Greeter>("default", Arc::new(English));
        components.register::<String>("default", Arc::new("config".to_string()));

        assert_eq!(*components.lookup_default::<String>().unwrap(), "config");
        assert!(components.has_component::<dyn Greeter>("default"));
        assert!(!components.has_component::<u32>("default"));
    }

    #[test]
    fn test_register_replaces() {
        let components = ComponentManager::new();
        components.register::<dyn Greeter>("default", Arc::new(English));
        components.register::<dyn Greeter>("default", Arc::new(French));

        assert_eq!(components.lookup_default::<dyn Greeter>().unwrap().greet(), "bonjour");
        assert_eq!(components.lookup_all::<dyn Greeter>().len(), 1);
    }

    #[test]
    fn test_unregister() {
        let components = ComponentManager::new();
        components.register::<dyn Greeter>("en", Arc::new(English));
        let held = components.lookup::<dyn Greeter>("en").unwrap();

        assert!(components.unregister::<dyn Greeter>("en"));
        assert!(!components.unregister::<dyn Greeter>("en"));
        assert!(components.lookup::<dyn Greeter>("en").is_err());

        // Handles looked up before stay usable
        assert_eq!(held.greet(), "hello");
    }

    #[test]
    fn test_clone_shares_registry() {
        let components = ComponentManager::new();
        let other = components.clone();
        other.register::<dyn Greeter>("en", Arc::new(English));

        assert!(components.has_component::<dyn Greeter>("en"));
    }
}
