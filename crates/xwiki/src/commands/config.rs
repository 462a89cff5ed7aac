//! Config command - configuration management.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use serde_json::json;
use xwiki_config::discovery::PROJECT_CONFIG_FILE;
use xwiki_config::{XWikiConfig, save_config};

use super::{Context, print_json_line};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the merged configuration and where it came from
    Show,

    /// Show the user configuration file path
    Path,

    /// Initialize a config file with defaults
    Init {
        /// Create project-local config (./xwiki.toml) instead of user config
        #[arg(long)]
        local: bool,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(ctx),
        ConfigCommand::Init { local } => cmd_init(local, ctx),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = &ctx.loaded;
    let config = &loaded.config;

    if ctx.json_output {
        let sources: Vec<String> = loaded
            .loaded_from()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        return print_json_line(&json!({
            "sources": sources,
            "warnings": loaded.warnings,
            "config": config,
        }));
    }

    println!("# XWiki Configuration\n");

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("No config files loaded (using defaults)\n");
    } else {
        println!("Config files:");
        for source in &sources {
            println!("  {}", source.display());
        }
        println!();
    }

    println!("Cache:");
    println!("  default hint: {}", config.default_cache_hint());
    for name in config.cache_configuration_names() {
        let cache = config.cache_configuration(name);
        let capacity = cache
            .eviction
            .capacity()
            .map_or_else(|| "unbounded".to_string(), |c| c.to_string());
        println!("  {:<20} capacity {}", name, capacity);
    }
    println!();

    let wiki = config.wiki();
    println!("Wiki:");
    println!("  main wiki: {}", wiki.main_wiki);
    println!(
        "  cache hint: {}",
        wiki.cache_hint
            .as_deref()
            .unwrap_or_else(|| config.default_cache_hint())
    );
    println!();

    if !loaded.warnings.is_empty() {
        println!("Warnings:");
        for w in &loaded.warnings {
            println!("  ⚠ {}", w);
        }
        println!();
    }

    if ctx.verbose {
        println!("---\nRaw config:\n");
        println!("{}", config.to_toml()?);
    }

    Ok(())
}

fn cmd_path(ctx: &Context) -> Result<()> {
    let path = xwiki_config::xdg_config_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if ctx.json_output {
        print_json_line(&json!({ "path": path.display().to_string() }))
    } else {
        println!("{}", path.display());
        Ok(())
    }
}

fn cmd_init(local: bool, ctx: &Context) -> Result<()> {
    let path = if local {
        PathBuf::from(PROJECT_CONFIG_FILE)
    } else {
        xwiki_config::xdg_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
    };

    let created = if path.exists() {
        false
    } else {
        save_config(&XWikiConfig::starter(), &path)
            .with_context(|| format!("writing {}", path.display()))?;
        true
    };

    if ctx.json_output {
        return print_json_line(&json!({
            "path": path.display().to_string(),
            "created": created,
        }));
    }

    if created {
        println!("Created config file: {}", path.display());
    } else {
        println!("Config file already exists: {}", path.display());
    }
    Ok(())
}
