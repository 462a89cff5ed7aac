//! XWiki cache platform
//!
//! Main entry point for the `xwiki` CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use xwiki_config::LoggingSection;

mod commands;

use commands::{cache, config, wiki};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// XWiki cache platform - inspect caches, configuration and wiki descriptors
#[derive(Parser)]
#[command(name = "xwiki")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON lines (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configuration management
    Config(config::ConfigArgs),

    /// Build caches and run operations against them
    Cache(cache::CacheArgs),

    /// Wiki descriptor operations
    Wiki(wiki::WikiArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = xwiki_config::load_config(None)?;
    let _guard = init_tracing(&loaded.config.logging(), cli.verbose);

    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
        loaded,
    };

    match cli.command {
        Commands::Config(args) => config::run(args, &ctx).await,
        Commands::Cache(args) => cache::run(args, &ctx).await,
        Commands::Wiki(args) => wiki::run(args, &ctx).await,
    }
}

/// Console layer on stderr, plus a daily-rotated JSON file if configured.
///
/// The returned guard flushes the file writer when dropped.
fn init_tracing(
    logging: &LoggingSection,
    verbose: bool,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::prelude::*;

    let console_filter = if verbose {
        "xwiki=debug,xwiki_cache=debug,xwiki_component=debug,xwiki_config=debug,xwiki_wiki=debug,info"
            .to_string()
    } else {
        logging.level.clone()
    };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(console_filter));

    let (file_layer, guard) = if logging.json_file {
        let log_dir = logging.dir.clone().unwrap_or_else(default_log_dir);
        let file_appender = tracing_appender::rolling::daily(&log_dir, "xwiki.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_filter(EnvFilter::new(
                "xwiki=trace,xwiki_cache=trace,xwiki_component=trace,xwiki_config=trace,xwiki_wiki=trace,info",
            ));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .with(file_layer)
        .init();

    guard
}

fn default_log_dir() -> PathBuf {
    xwiki_config::xdg_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

