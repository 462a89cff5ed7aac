//! Cache command - build a cache and run operations against it.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use serde_json::json;
use xwiki_cache::{
    Cache, CacheConfiguration, CacheEntryEvent, CacheEntryListener, CacheFactory, CacheFactoryExt,
    lookup_cache_factory, register_cache_factories,
};
use xwiki_component::ComponentManager;

use super::{Context, print_json_line};

/// Arguments for the cache command.
#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// List registered cache factory hints
    Hints,

    /// Run operations on a fresh cache and print results and events
    Exec(ExecArgs),
}

/// Arguments for `cache exec`.
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Cache factory hint (defaults to [cache] default_hint)
    #[arg(long)]
    pub hint: Option<String>,

    /// Named cache configuration from [cache.configurations]
    #[arg(long)]
    pub config: Option<String>,

    /// Operations: set:KEY=VALUE, get:KEY, remove:KEY, clear, stats
    #[arg(required = true, value_name = "OP")]
    pub ops: Vec<String>,
}

/// One operation of `cache exec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Set { key: String, value: String },
    Get(String),
    Remove(String),
    Clear,
    Stats,
}

impl FromStr for Op {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };

        let key = |arg: Option<&str>| -> Result<String> {
            match arg {
                Some(key) if !key.is_empty() => Ok(key.to_string()),
                _ => bail!("invalid operation '{s}': missing key"),
            }
        };

        match name {
            "set" => {
                let Some((k, value)) = arg.and_then(|a| a.split_once('=')) else {
                    bail!("invalid operation '{s}': expected set:KEY=VALUE");
                };
                Ok(Op::Set {
                    key: key(Some(k))?,
                    value: value.to_string(),
                })
            }
            "get" => Ok(Op::Get(key(arg)?)),
            "remove" => Ok(Op::Remove(key(arg)?)),
            "clear" if arg.is_none() => Ok(Op::Clear),
            "stats" if arg.is_none() => Ok(Op::Stats),
            _ => bail!(
                "invalid operation '{s}': expected set:KEY=VALUE, get:KEY, remove:KEY, clear or stats"
            ),
        }
    }
}

/// Run the cache command.
pub async fn run(args: CacheArgs, ctx: &Context) -> Result<()> {
    let components = ComponentManager::new();
    register_cache_factories(&components);

    match args.command {
        CacheCommand::Hints => cmd_hints(&components, ctx),
        CacheCommand::Exec(exec) => cmd_exec(exec, &components, ctx),
    }
}

fn cmd_hints(components: &ComponentManager, ctx: &Context) -> Result<()> {
    let hints = components.hints::<dyn CacheFactory>();
    let default = ctx.loaded.config.default_cache_hint();

    if ctx.json_output {
        return print_json_line(&json!({ "hints": hints, "default": default }));
    }

    for hint in &hints {
        if hint == default {
            println!("{hint} (default)");
        } else {
            println!("{hint}");
        }
    }
    Ok(())
}

fn cmd_exec(args: ExecArgs, components: &ComponentManager, ctx: &Context) -> Result<()> {
    // Reject bad input before touching any cache
    let ops = args
        .ops
        .iter()
        .map(|op| op.parse::<Op>())
        .collect::<Result<Vec<_>>>()?;

    let config = ctx.loaded.config.clone();
    let hint = args
        .hint
        .unwrap_or_else(|| config.default_cache_hint().to_string());
    let cache_config = match &args.config {
        Some(name) => config.cache_configuration(name),
        None => CacheConfiguration::new().with_id("cli"),
    };

    let factory = lookup_cache_factory(components, &hint)?;
    let cache: Cache<String> = factory.new_cache(&cache_config)?;
    cache.add_cache_entry_listener(Arc::new(EventPrinter {
        json: ctx.json_output,
    }))?;
    let cleanup = cache.spawn_cleanup_task();

    tracing::debug!(hint = %hint, cache = %cache.name(), ops = ops.len(), "Running cache operations");

    let result = ops.iter().try_for_each(|op| apply(&cache, op, ctx.json_output));

    cache.dispose();
    if let Some(handle) = cleanup {
        handle.abort();
    }
    result
}

fn apply(cache: &Cache<String>, op: &Op, json: bool) -> Result<()> {
    match op {
        Op::Set { key, value } => {
            cache.set(key, value.clone())?;
            if json {
                print_json_line(&json!({ "op": "set", "key": key, "value": value }))?;
            } else {
                println!("set {key}={value}");
            }
        }
        Op::Get(key) => {
            let value = cache.get(key)?;
            print_lookup("get", key, value.as_deref(), json)?;
        }
        Op::Remove(key) => {
            let value = cache.remove(key)?;
            print_lookup("remove", key, value.as_deref(), json)?;
        }
        Op::Clear => {
            cache.remove_all()?;
            if json {
                print_json_line(&json!({ "op": "clear" }))?;
            } else {
                println!("clear");
            }
        }
        Op::Stats => {
            let stats = cache.stats()?;
            if json {
                print_json_line(&json!({ "op": "stats", "stats": stats }))?;
            } else {
                let capacity = stats
                    .capacity
                    .map_or_else(|| "unbounded".to_string(), |c| c.to_string());
                println!(
                    "stats name={} size={} capacity={} hits={} misses={} evictions={}",
                    stats.name, stats.size, capacity, stats.hits, stats.misses, stats.evictions
                );
            }
        }
    }
    Ok(())
}

fn print_lookup(op: &str, key: &str, value: Option<&str>, json: bool) -> Result<()> {
    if json {
        return print_json_line(&json!({ "op": op, "key": key, "value": value }));
    }
    match value {
        Some(value) => println!("{op} {key}={value}"),
        None => println!("{op} {key} (absent)"),
    }
    Ok(())
}

/// Prints every entry event as it fires.
struct EventPrinter {
    json: bool,
}

impl EventPrinter {
    fn print(&self, kind: &str, event: &CacheEntryEvent<'_, String>) {
        let entry = event.entry();
        let cause = event.removal_cause();

        if self.json {
            let line = json!({
                "event": kind,
                "cache": event.cache().name(),
                "key": entry.key(),
                "value": entry.value(),
                "cause": cause.map(|c| c.to_string()),
            });
            if let Err(e) = print_json_line(&line) {
                tracing::warn!(error = %e, "Failed to print event");
            }
            return;
        }

        match cause {
            Some(cause) => println!("event {kind} {}={} ({cause})", entry.key(), entry.value()),
            None => println!("event {kind} {}={}", entry.key(), entry.value()),
        }
    }
}

impl CacheEntryListener<String> for EventPrinter {
    fn cache_entry_added(&self, event: &CacheEntryEvent<'_, String>) {
        self.print("added", event);
    }

    fn cache_entry_modified(&self, event: &CacheEntryEvent<'_, String>) {
        self.print("modified", event);
    }

    fn cache_entry_removed(&self, event: &CacheEntryEvent<'_, String>) {
        self.print("removed", event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ops() {
        assert_eq!(
            "set:a=1".parse::<Op>().unwrap(),
            Op::Set {
                key: "a".to_string(),
                value: "1".to_string()
            }
        );
        assert_eq!(
            "set:a=x=y".parse::<Op>().unwrap(),
            Op::Set {
                key: "a".to_string(),
                value: "x=y".to_string()
            }
        );
        assert_eq!("get:a".parse::<Op>().unwrap(), Op::Get("a".to_string()));
        assert_eq!("remove:a".parse::<Op>().unwrap(), Op::Remove("a".to_string()));
        assert_eq!("clear".parse::<Op>().unwrap(), Op::Clear);
        assert_eq!("stats".parse::<Op>().unwrap(), Op::Stats);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["set:a", "set:=1", "get:", "get", "clear:x", "flush", ""] {
            let err = bad.parse::<Op>().unwrap_err();
            assert!(err.to_string().contains("invalid operation"), "{bad}");
        }
    }
}
