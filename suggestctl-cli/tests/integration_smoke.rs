//! Smoke tests to verify command wiring

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SYMBOLS: &str = r#"[
    {"symbol": "AAPL", "name": "Apple Inc."},
    {"symbol": "AMZN", "name": "Amazon.com, Inc."},
    {"symbol": "APLE", "name": "Apple Hospitality REIT"},
    {"symbol": "MSFT", "name": "Microsoft Corporation"}
]"#;

/// A suggestctl command isolated from the user's home, config and env
fn suggestctl(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("suggestctl").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("SUGGESTCTL_CONFIG")
        .env_remove("SUGGESTCTL_DEBOUNCE_MS")
        .env_remove("SUGGESTCTL_MIN_QUERY_LENGTH")
        .env_remove("SUGGESTCTL_ENDPOINT")
        .env_remove("SUGGESTCTL_API_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("symbols.json"), SYMBOLS).unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "[coordinator]\ndebounce_ms = 10\n\n[search]\nsymbols_file = \"symbols.json\"\n",
    )
    .unwrap();
    dir
}

// === Help ===

#[test]
fn test_lookup_help() {
    let dir = TempDir::new().unwrap();
    suggestctl(dir.path())
        .arg("lookup")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("local JSON symbol list"));
}

#[test]
fn test_watch_help() {
    let dir = TempDir::new().unwrap();
    suggestctl(dir.path())
        .arg("watch")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Debounce window"));
}

// === Config Command Tests ===

#[test]
fn test_config_path_honors_flag() {
    let dir = workspace();
    let path = dir.path().join("config.toml");
    suggestctl(dir.path())
        .arg("--config")
        .arg(&path)
        .arg("config")
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_merges_file_and_env() {
    let dir = workspace();
    suggestctl(dir.path())
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .env("SUGGESTCTL_API_TOKEN", "secret-token")
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("debounce_ms = 10"))
        .stdout(predicate::str::contains("max_results = 10"))
        .stdout(predicate::str::contains("secret-token").not());
}

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    suggestctl(dir.path())
        .arg("--config")
        .arg(&path)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(fs::read_to_string(&path).unwrap().contains("[coordinator]"));

    suggestctl(dir.path())
        .arg("--config")
        .arg(&path)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[coordinator]\nmin_query_length = 0\n").unwrap();

    suggestctl(dir.path())
        .arg("--config")
        .arg(&path)
        .args(["lookup", "AAPL"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("min_query_length"));
}

// === Lookup Command Tests ===

#[test]
fn test_lookup_symbols_text() {
    let dir = workspace();
    suggestctl(dir.path())
        .args(["lookup", "ap", "--symbols", "symbols.json"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)APLE.*AAPL").unwrap());
}

#[test]
fn test_lookup_symbols_json() {
    let dir = workspace();
    let output = suggestctl(dir.path())
        .args(["lookup", "micro", "--symbols", "symbols.json", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let items: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(items[0]["id"], "MSFT");
    assert_eq!(items.as_array().unwrap().len(), 1);
}

#[test]
fn test_lookup_without_provider_fails() {
    let dir = TempDir::new().unwrap();
    suggestctl(dir.path())
        .args(["lookup", "AAPL"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("search.endpoint"));
}

// === Watch Command Tests ===

#[test]
fn test_watch_prints_settled_state() {
    let dir = workspace();
    let output = suggestctl(dir.path())
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .args(["watch", "--format", "json"])
        .write_stdin("AM\nAMZ\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let events: Vec<serde_json::Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let open = events
        .iter()
        .rev()
        .find(|e| e["event"] == "state_changed" && e["phase"] == "open")
        .expect("list opened");
    assert_eq!(open["state"]["query"], "AMZ");
    assert_eq!(open["state"]["items"][0]["id"], "AMZN");
}

#[test]
fn test_watch_quit_skips_pending_lookup() {
    let dir = workspace();
    suggestctl(dir.path())
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .args(["watch", "--debounce-ms", "5000"])
        .write_stdin("AAPL\n:quit\nMSFT\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[open]").not());
}
