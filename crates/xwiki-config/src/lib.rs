//! Configuration system for the XWiki cache platform.
//!
//! Provides TOML-based configuration with:
//! - A default cache factory hint and named cache configurations
//!   (`[cache.configurations.documents]`, ...)
//! - Wiki descriptor settings (`[wiki]`)
//! - Logging settings for the binary (`[logging]`)
//! - Config file layering (XDG user config + project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config, load_config_file, load_config_with_options, save_config,
    xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
