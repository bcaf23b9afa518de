//! End-to-end tests for the `passclip` binary.
//!
//! Every test points the binary at its own settings file through
//! `PASSCLIP_SETTINGS`, so nothing under the real home directory is touched.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let sandbox = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        let settings = serde_json::json!({
            "database": sandbox.path().join("stores.sqlite"),
            "socket_path": sandbox.path().join("passclip.sock"),
        });
        std::fs::write(sandbox.settings_path(), settings.to_string()).unwrap();
        sandbox
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn settings_path(&self) -> PathBuf {
        self.path().join("settings.json")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("passclip").unwrap();
        cmd.env("PASSCLIP_SETTINGS", self.settings_path())
            .env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn test_help_lists_commands() {
    Sandbox::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("daemon"))
        .stdout(predicate::str::contains("store"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_completions_bash() {
    Sandbox::new()
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("passclip"));
}

#[test]
fn test_config_defaults() {
    Sandbox::new()
        .cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"general_show_time   = "45" (45s)"#))
        .stdout(predicate::str::contains("clear_clipboard_20x = false"));
}

#[test]
fn test_config_set_values_persist() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["config", "set-show-time", "10"])
        .assert()
        .success();
    sandbox
        .cmd()
        .args(["config", "set-deep-clear", "true"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(10s)"))
        .stdout(predicate::str::contains("clear_clipboard_20x = true"));
}

#[test]
fn test_config_malformed_show_time_falls_back() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["config", "set-show-time", "-3"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""-3" (45s)"#));
}

#[test]
fn test_store_lifecycle() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["store", "add", "--id", "1", "--name", "personal"])
        .assert()
        .success();
    sandbox
        .cmd()
        .args(["store", "add", "--id", "2", "--name", "usb", "--external"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["store", "list", "--external"])
        .assert()
        .success()
        .stdout(predicate::str::contains("usb"))
        .stdout(predicate::str::contains("personal").not());

    sandbox
        .cmd()
        .args(["store", "rename", "1", "private"])
        .assert()
        .success();
    sandbox
        .cmd()
        .args(["store", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("private"));

    sandbox
        .cmd()
        .args(["store", "remove", "1"])
        .assert()
        .success();
    sandbox
        .cmd()
        .args(["store", "show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No store with id 1"));
}

#[test]
fn test_store_duplicate_id_fails() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["store", "add", "--id", "5", "--name", "a"])
        .assert()
        .success();
    sandbox
        .cmd()
        .args(["store", "add", "--id", "5", "--name", "b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_status_without_daemon_fails() {
    Sandbox::new()
        .cmd()
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("passclip daemon"));
}
