//! CLI integration tests for the `xwiki` command-line interface.
//!
//! Every command runs with `XWIKI_CONFIG_DIR` and the working directory
//! pointed at a fresh temporary directory, so no real user config is read.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the xwiki binary, isolated in `dir`.
fn xwiki(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("xwiki").unwrap();
    cmd.env("XWIKI_CONFIG_DIR", dir.path().join("user"))
        .env_remove("RUST_LOG")
        .current_dir(dir.path());
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    xwiki(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("cache"))
        .stdout(predicate::str::contains("wiki"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    xwiki(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("xwiki"));
}

#[test]
fn test_missing_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    xwiki(&dir).assert().failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_cache_hints() {
    let dir = TempDir::new().unwrap();
    xwiki(&dir)
        .args(["cache", "hints"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default (default)"))
        .stdout(predicate::str::contains("memory"))
        .stdout(predicate::str::contains("map"));
}

#[test]
fn test_cache_exec_prints_results_and_events() {
    let dir = TempDir::new().unwrap();
    xwiki(&dir)
        .args([
            "cache", "exec", "set:a=1", "set:a=2", "get:a", "remove:a", "get:a",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("event added a=1"))
        .stdout(predicate::str::contains("event modified a=2"))
        .stdout(predicate::str::contains("get a=2"))
        .stdout(predicate::str::contains("event removed a=2 (explicit)"))
        .stdout(predicate::str::contains("get a (absent)"));
}

#[test]
fn test_cache_exec_clear_with_map_hint() {
    let dir = TempDir::new().unwrap();
    xwiki(&dir)
        .args([
            "cache", "exec", "--hint", "map", "set:a=1", "set:b=2", "clear", "stats",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("event removed a=1 (cleared)"))
        .stdout(predicate::str::contains("event removed b=2 (cleared)"))
        .stdout(predicate::str::contains("size=0 capacity=unbounded"));
}

#[test]
fn test_cache_exec_named_configuration_evicts() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("xwiki.toml"),
        r#"
[cache.configurations.tiny.eviction]
max_entries = 1
"#,
    )
    .unwrap();

    xwiki(&dir)
        .args(["cache", "exec", "--config", "tiny", "set:a=1", "set:b=2", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("event removed a=1 (capacity)"))
        .stdout(predicate::str::contains("stats name=tiny size=1 capacity=1"));
}

#[test]
fn test_cache_exec_json_lines() {
    let dir = TempDir::new().unwrap();
    let output = xwiki(&dir)
        .args(["--json", "cache", "exec", "set:a=1", "get:a"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let lines: Vec<serde_json::Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["event"], "added");
    assert_eq!(lines[0]["cache"], "cli");
    assert_eq!(lines[1]["op"], "set");
    assert_eq!(lines[2]["op"], "get");
    assert_eq!(lines[2]["value"], "1");
}

#[test]
fn test_cache_exec_rejects_bad_operation() {
    let dir = TempDir::new().unwrap();
    xwiki(&dir)
        .args(["cache", "exec", "set:a=1", "flush"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("invalid operation 'flush'"));
}

#[test]
fn test_cache_exec_unknown_hint_fails() {
    let dir = TempDir::new().unwrap();
    xwiki(&dir)
        .args(["cache", "exec", "--hint", "infinispan", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("component not found"));
}

#[test]
fn test_cache_exec_requires_operations() {
    let dir = TempDir::new().unwrap();
    xwiki(&dir).args(["cache", "exec"]).assert().failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_env() {
    let dir = TempDir::new().unwrap();
    xwiki(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_local_then_show() {
    let dir = TempDir::new().unwrap();
    xwiki(&dir)
        .args(["config", "init", "--local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config file"));
    assert!(dir.path().join("xwiki.toml").is_file());

    xwiki(&dir)
        .args(["config", "init", "--local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    xwiki(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default hint: memory"))
        .stdout(predicate::str::contains("wiki.descriptor"));
}

#[test]
fn test_config_init_user() {
    let dir = TempDir::new().unwrap();
    xwiki(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join("user").join("config.toml").is_file());
}

#[test]
fn test_config_show_reports_broken_layer() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("xwiki.toml"), "not valid toml {{{{").unwrap();

    xwiki(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed to load"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Wiki Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_wiki_load_documents() {
    let dir = TempDir::new().unwrap();
    let documents = dir.path().join("documents.toml");
    fs::write(
        &documents,
        r#"
[[documents]]
reference = { wiki = "xwiki", space = "XWiki", name = "XWikiServerDev" }

[[documents.objects]]
class = "XWiki.XWikiServerClass"
server = "dev.example.org"
prettyname = "Development"

[[documents.objects]]
class = "XWiki.XWikiServerClass"
server = "dev.local"

[[documents]]
reference = { wiki = "xwiki", space = "Main", name = "WebHome" }
"#,
    )
    .unwrap();

    xwiki(&dir)
        .args(["--verbose", "wiki", "load"])
        .arg(&documents)
        .args(["--alias", "dev.local", "--alias", "nowhere.org"])
        .assert()
        .success()
        .stdout(predicate::str::contains("main wiki: xwiki"))
        .stdout(predicate::str::contains(
            "wiki dev aliases=dev.example.org,dev.local",
        ))
        .stdout(predicate::str::contains("pretty name: Development"))
        .stdout(predicate::str::contains("alias dev.local -> dev"))
        .stdout(predicate::str::contains("alias nowhere.org (unknown)"));
}

#[test]
fn test_wiki_load_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    xwiki(&dir)
        .args(["wiki", "load", "missing.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.toml"));
}
