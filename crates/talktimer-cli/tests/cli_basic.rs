//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway HOME so the
//! real user configuration is never touched.

use std::path::Path;
use std::process::Command;

/// Run a CLI command with an isolated HOME and return (stdout, stderr, code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "--quiet", "-p", "talktimer-cli", "--"])
        .args(args)
        .env("HOME", home)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_config_list() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "list"]);
    assert_eq!(code, 0, "config list failed");
    assert!(stdout.contains("total_minutes"));
    assert!(stdout.contains("sound"));
}

#[test]
fn test_config_get_default() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "timer.total_minutes"]);
    assert_eq!(code, 0, "config get failed");
    assert_eq!(stdout.trim(), "20");
}

#[test]
fn test_config_set_round_trip() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "timer.total_minutes", "45"]);
    assert_eq!(code, 0, "config set failed");

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "timer.total_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "45");
}

#[test]
fn test_config_get_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "timer.bogus"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_run_rejects_malformed_duration() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["run", "--total", "soon"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid duration"));
}
