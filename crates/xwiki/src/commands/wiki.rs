//! Wiki command - replay descriptor documents through the descriptor listener.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use serde::Deserialize;
use serde_json::json;
use xwiki_cache::register_cache_factories;
use xwiki_component::ComponentManager;
use xwiki_wiki::{
    Document, DocumentEvent, ObservationManager, WikiDescriptor, WikiDescriptorBuilder,
    WikiDescriptorCache, WikiDescriptorListener, WikiDescriptorManager,
};

use super::{Context, print_json_line};

/// Name of the cache configuration used for the descriptor caches.
const DESCRIPTOR_CACHE_CONFIG: &str = "wiki.descriptor";

/// Arguments for the wiki command.
#[derive(Args, Debug)]
pub struct WikiArgs {
    #[command(subcommand)]
    pub command: WikiCommand,
}

#[derive(Subcommand, Debug)]
pub enum WikiCommand {
    /// Load descriptor documents from a TOML file and show the resulting descriptors
    Load {
        /// TOML file with [[documents]] entries
        file: PathBuf,

        /// Resolve these aliases after loading
        #[arg(long = "alias", value_name = "ALIAS")]
        aliases: Vec<String>,
    },
}

/// Documents file read by `wiki load`.
#[derive(Debug, Deserialize)]
struct DocumentsFile {
    #[serde(default)]
    documents: Vec<Document>,
}

/// Run the wiki command.
pub async fn run(args: WikiArgs, ctx: &Context) -> Result<()> {
    match args.command {
        WikiCommand::Load { file, aliases } => cmd_load(&file, &aliases, ctx),
    }
}

fn cmd_load(file: &Path, aliases: &[String], ctx: &Context) -> Result<()> {
    let contents =
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let parsed: DocumentsFile =
        toml::from_str(&contents).with_context(|| format!("parsing {}", file.display()))?;

    let config = &ctx.loaded.config;
    let wiki = config.wiki();
    let hint = wiki
        .cache_hint
        .clone()
        .unwrap_or_else(|| config.default_cache_hint().to_string());

    let components = ComponentManager::new();
    register_cache_factories(&components);
    let cache = WikiDescriptorCache::from_components(
        &components,
        &hint,
        &config.cache_configuration(DESCRIPTOR_CACHE_CONFIG),
    )?;
    let manager = WikiDescriptorManager::new(cache, wiki.main_wiki);

    let observation = ObservationManager::new();
    observation.add_listener(Arc::new(WikiDescriptorListener::new(manager.clone())));

    let mut ids = Vec::new();
    for document in &parsed.documents {
        observation.notify(DocumentEvent::Created, document);
        if let Some(id) = WikiDescriptorBuilder::wiki_id(document)
            && !ids.contains(&id)
        {
            ids.push(id);
        }
    }

    let mut descriptors = Vec::new();
    for id in &ids {
        if let Some(descriptor) = manager.get_by_id(id)? {
            descriptors.push(descriptor);
        }
    }

    let mut resolved = Vec::new();
    for alias in aliases {
        let id = manager.get_by_alias(alias)?.map(|d| d.id);
        resolved.push((alias.as_str(), id));
    }

    if ctx.json_output {
        print_json_line(&json!({ "main_wiki": manager.main_wiki_id() }))?;
        for descriptor in &descriptors {
            print_json_line(&json!({ "descriptor": descriptor }))?;
        }
        for (alias, id) in &resolved {
            print_json_line(&json!({ "alias": alias, "wiki": id }))?;
        }
    } else {
        println!("main wiki: {}", manager.main_wiki_id());
        for descriptor in &descriptors {
            print_descriptor(descriptor, ctx.verbose);
        }
        for (alias, id) in &resolved {
            match id {
                Some(id) => println!("alias {alias} -> {id}"),
                None => println!("alias {alias} (unknown)"),
            }
        }
    }

    manager.cache().dispose();
    Ok(())
}

fn print_descriptor(descriptor: &WikiDescriptor, verbose: bool) {
    println!(
        "wiki {} aliases={}",
        descriptor.id,
        descriptor.aliases.join(",")
    );
    if verbose {
        if let Some(name) = &descriptor.pretty_name {
            println!("  pretty name: {name}");
        }
        if let Some(owner) = &descriptor.owner_id {
            println!("  owner: {owner}");
        }
        if let Some(description) = &descriptor.description {
            println!("  description: {description}");
        }
    }
}
