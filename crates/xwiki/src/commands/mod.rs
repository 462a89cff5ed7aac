//! CLI command handlers.

pub mod cache;
pub mod config;
pub mod wiki;

use serde::Serialize;
use xwiki_config::LoadedConfig;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output as JSON lines for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Configuration discovered at startup.
    pub loaded: LoadedConfig,
}

/// Print one JSON document on its own line.
pub fn print_json_line<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
