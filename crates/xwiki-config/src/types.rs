//! Configuration types.
//!
//! ```toml
//! [cache]
//! default_hint = "memory"
//!
//! [cache.configurations.documents]
//! cleanup_task = true
//!
//! [cache.configurations.documents.eviction]
//! max_entries = 500
//! max_idle_secs = 3600
//!
//! [wiki]
//! main_wiki = "xwiki"
//! cache_hint = "memory"
//!
//! [logging]
//! level = "info"
//! json_file = false
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use xwiki_cache::CacheConfiguration;

use crate::error::ConfigError;

/// Hint used when no cache factory is configured.
pub const DEFAULT_CACHE_HINT: &str = "default";

/// Identifier of the main wiki when none is configured.
pub const DEFAULT_MAIN_WIKI: &str = "xwiki";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XWikiConfig {
    /// Cache factory selection and named cache configurations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheSection>,

    /// Wiki descriptor settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiki: Option<WikiSection>,

    /// Log output of the binary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingSection>,
}

impl XWikiConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Configuration written by `xwiki config init`.
    pub fn starter() -> Self {
        let mut configurations = BTreeMap::new();
        configurations.insert(
            "wiki.descriptor".to_string(),
            CacheConfiguration::new().with_max_entries(1000),
        );

        Self {
            cache: Some(CacheSection {
                default_hint: Some("memory".to_string()),
                configurations,
            }),
            wiki: Some(WikiSection::default()),
            logging: Some(LoggingSection::default()),
        }
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: XWikiConfig) {
        if let Some(other_cache) = other.cache {
            let cache = self.cache.get_or_insert_with(CacheSection::default);
            if other_cache.default_hint.is_some() {
                cache.default_hint = other_cache.default_hint;
            }
            for (name, config) in other_cache.configurations {
                cache.configurations.insert(name, config);
            }
        }

        if other.wiki.is_some() {
            self.wiki = other.wiki;
        }

        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Hint of the cache factory to use when none is requested.
    pub fn default_cache_hint(&self) -> &str {
        self.cache
            .as_ref()
            .and_then(|c| c.default_hint.as_deref())
            .unwrap_or(DEFAULT_CACHE_HINT)
    }

    /// Cache configuration registered under `name`, with its `id` set to
    /// `name` unless the file sets one. Unknown names get a default
    /// configuration carrying that id.
    pub fn cache_configuration(&self, name: &str) -> CacheConfiguration {
        let mut config = self
            .cache
            .as_ref()
            .and_then(|c| c.configurations.get(name))
            .cloned()
            .unwrap_or_default();
        if config.id.is_none() {
            config.id = Some(name.to_string());
        }
        config
    }

    /// Names of the configured caches, sorted.
    pub fn cache_configuration_names(&self) -> Vec<&str> {
        self.cache
            .as_ref()
            .map(|c| c.configurations.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Wiki settings, or defaults if the section is absent.
    pub fn wiki(&self) -> WikiSection {
        self.wiki.clone().unwrap_or_default()
    }

    /// Logging settings, or defaults if the section is absent.
    pub fn logging(&self) -> LoggingSection {
        self.logging.clone().unwrap_or_default()
    }

    /// Check every named cache configuration, failing on the first invalid one.
    pub fn validate(&self) -> crate::Result<()> {
        match self.invalid_cache_configurations().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// One error per invalid named cache configuration, in name order.
    pub fn invalid_cache_configurations(&self) -> Vec<ConfigError> {
        let Some(cache) = &self.cache else {
            return Vec::new();
        };
        cache
            .configurations
            .iter()
            .filter_map(|(name, config)| {
                config.validate().err().map(|e| ConfigError::InvalidCache {
                    name: name.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

/// The `[cache]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Factory hint used when none is requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_hint: Option<String>,

    /// Named cache configurations (`[cache.configurations.<name>]`).
    pub configurations: BTreeMap<String, CacheConfiguration>,
}

/// The `[wiki]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiSection {
    /// Identifier of the main wiki.
    pub main_wiki: String,

    /// Factory hint for the descriptor caches. Falls back to
    /// `[cache] default_hint`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_hint: Option<String>,
}

impl Default for WikiSection {
    fn default() -> Self {
        Self {
            main_wiki: DEFAULT_MAIN_WIKI.to_string(),
            cache_hint: None,
        }
    }
}

/// The `[logging]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Console filter directive used when `RUST_LOG` is unset.
    pub level: String,

    /// Also write JSON logs to a daily-rotated file.
    pub json_file: bool,

    /// Directory for JSON log files. Defaults to `logs/` under the user
    /// config directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_file: false,
            dir: None,
        }
    }
}
