//! Declarative cache configuration.
//!
//! ```toml
//! id = "documents"
//! cleanup_task = true
//! cleanup_interval_secs = 30
//!
//! [eviction]
//! policy = "lru"
//! max_entries = 500
//! max_idle_secs = 3600
//! lifespan_secs = 86400
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Default interval for the background expiry sweep.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// How entries are chosen for eviction once the cache is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Evict the least recently used entry.
    #[default]
    Lru,
    /// Never evict on capacity; `max_entries` is ignored.
    None,
}

/// Capacity and expiration limits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvictionConfiguration {
    /// Capacity-based eviction policy.
    pub policy: EvictionPolicy,

    /// Maximum number of entries before eviction. `0` means unbounded.
    pub max_entries: usize,

    /// Entries not read or written within this duration expire.
    #[serde(
        rename = "max_idle_secs",
        with = "optional_duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_idle: Option<Duration>,

    /// Entries expire this long after their last write, regardless of reads.
    #[serde(
        rename = "lifespan_secs",
        with = "optional_duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub lifespan: Option<Duration>,
}

impl EvictionConfiguration {
    /// Capacity limit, if capacity-based eviction applies.
    pub fn capacity(&self) -> Option<usize> {
        match self.policy {
            EvictionPolicy::Lru if self.max_entries > 0 => Some(self.max_entries),
            _ => None,
        }
    }

    /// Whether any time-based expiration is configured.
    pub fn expires(&self) -> bool {
        self.max_idle.is_some() || self.lifespan.is_some()
    }

    /// Whether any limit at all is configured.
    pub fn is_bounded(&self) -> bool {
        self.capacity().is_some() || self.expires()
    }
}

/// Configuration consumed by a [`CacheFactory`](crate::CacheFactory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfiguration {
    /// Configuration identifier. Also used as the cache name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Whether [`Cache::spawn_cleanup_task`](crate::Cache::spawn_cleanup_task)
    /// starts a periodic expiry sweep. If false, expired entries are only
    /// dropped when accessed or on an explicit `cleanup_expired` call.
    pub cleanup_task: bool,

    /// Interval between background sweeps.
    #[serde(rename = "cleanup_interval_secs", with = "duration_secs")]
    pub cleanup_interval: Duration,

    /// Eviction limits.
    pub eviction: EvictionConfiguration,
}

impl Default for CacheConfiguration {
    fn default() -> Self {
        Self {
            id: None,
            cleanup_task: false,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            eviction: EvictionConfiguration::default(),
        }
    }
}

impl CacheConfiguration {
    /// Create a configuration with no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the eviction policy.
    pub fn with_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction.policy = policy;
        self
    }

    /// Set the maximum number of entries.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.eviction.max_entries = max;
        self
    }

    /// Set the idle timeout.
    pub fn with_max_idle(mut self, idle: Duration) -> Self {
        self.eviction.max_idle = Some(idle);
        self
    }

    /// Set the lifespan of entries.
    pub fn with_lifespan(mut self, lifespan: Duration) -> Self {
        self.eviction.lifespan = Some(lifespan);
        self
    }

    /// Enable or disable the background cleanup task.
    pub fn with_cleanup_task(mut self, enabled: bool) -> Self {
        self.cleanup_task = enabled;
        self
    }

    /// Set the cleanup interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Check the configuration for values no factory can honour.
    pub fn validate(&self) -> Result<()> {
        if self.eviction.max_idle.is_some_and(|d| d.is_zero()) {
            return Err(CacheError::InvalidConfiguration(
                "max_idle must be greater than zero".to_string(),
            ));
        }
        if self.eviction.lifespan.is_some_and(|d| d.is_zero()) {
            return Err(CacheError::InvalidConfiguration(
                "lifespan must be greater than zero".to_string(),
            ));
        }
        if self.cleanup_task && self.cleanup_interval.is_zero() {
            return Err(CacheError::InvalidConfiguration(
                "cleanup_interval must be greater than zero when cleanup_task is enabled"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

mod optional_duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unbounded() {
        let config = CacheConfiguration::default();
        assert!(config.id.is_none());
        assert_eq!(config.eviction.policy, EvictionPolicy::Lru);
        assert_eq!(config.eviction.capacity(), None);
        assert!(!config.eviction.is_bounded());
        assert!(!config.cleanup_task);
        assert_eq!(config.cleanup_interval, DEFAULT_CLEANUP_INTERVAL);
    }

    #[test]
    fn test_builder() {
        let config = CacheConfiguration::new()
            .with_id("documents")
            .with_max_entries(100)
            .with_max_idle(Duration::from_secs(30))
            .with_lifespan(Duration::from_secs(300))
            .with_cleanup_task(true)
            .with_cleanup_interval(Duration::from_secs(5));

        assert_eq!(config.id.as_deref(), Some("documents"));
        assert_eq!(config.eviction.capacity(), Some(100));
        assert!(config.eviction.expires());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_none_policy_ignores_capacity() {
        let config = CacheConfiguration::new()
            .with_max_entries(10)
            .with_policy(EvictionPolicy::None);
        assert_eq!(config.eviction.capacity(), None);
    }

    #[test]
    fn test_validate_rejects_zero_durations() {
        let config = CacheConfiguration::new().with_max_idle(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfiguration(_))
        ));

        let config = CacheConfiguration::new()
            .with_cleanup_task(true)
            .with_cleanup_interval(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
id = "documents"
cleanup_task = true
cleanup_interval_secs = 30

[eviction]
max_entries = 500
max_idle_secs = 3600
"#;
        let config: CacheConfiguration = toml::from_str(toml).unwrap();
        assert_eq!(config.id.as_deref(), Some("documents"));
        assert_eq!(config.eviction.max_entries, 500);
        assert_eq!(config.eviction.max_idle, Some(Duration::from_secs(3600)));
        assert_eq!(config.eviction.lifespan, None);
        assert_eq!(config.cleanup_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_parse_policy() {
        let config: CacheConfiguration = toml::from_str("[eviction]\npolicy = \"none\"").unwrap();
        assert_eq!(config.eviction.policy, EvictionPolicy::None);
        assert_eq!(config.cleanup_interval, DEFAULT_CLEANUP_INTERVAL);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = CacheConfiguration::new()
            .with_id("wiki")
            .with_max_entries(20)
            .with_lifespan(Duration::from_secs(60));
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("max_idle_secs"));

        let parsed: CacheConfiguration = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
