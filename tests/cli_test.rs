//! Binary smoke tests for the `ensemble-rs` CLI.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd(db: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("ensemble-rs").expect("binary exists");
    cmd.arg("--db-path").arg(db);
    cmd
}

#[test]
fn test_init_then_status() {
    let dir = TempDir::new().expect("temp dir");
    let db = dir.path().join("memory.db");

    cmd(&db)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    cmd(&db)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Records:"));
}

#[test]
fn test_status_without_init_fails() {
    let dir = TempDir::new().expect("temp dir");
    let db = dir.path().join("missing.db");

    cmd(&db)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn test_error_is_json_on_stdout_in_json_mode() {
    let dir = TempDir::new().expect("temp dir");
    let db = dir.path().join("missing.db");

    cmd(&db)
        .args(["--format", "json", "status"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"error\""));
}

#[test]
fn test_analyze_offline() {
    let dir = TempDir::new().expect("temp dir");
    let db = dir.path().join("memory.db");

    cmd(&db).arg("init").assert().success();

    cmd(&db)
        .args(["analyze", "--offline", "what do the figures suggest?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status: Ok"));
}

#[test]
fn test_recall_empty_and_forget_missing() {
    let dir = TempDir::new().expect("temp dir");
    let db = dir.path().join("memory.db");

    cmd(&db).arg("init").assert().success();

    cmd(&db)
        .args(["recall", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No records"));

    cmd(&db)
        .args(["forget", "nobody", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No record found"));
}

#[test]
fn test_reset_requires_confirmation() {
    let dir = TempDir::new().expect("temp dir");
    let db = dir.path().join("memory.db");

    cmd(&db).arg("init").assert().success();

    cmd(&db)
        .arg("reset")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    cmd(&db)
        .args(["reset", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reset"));
}
