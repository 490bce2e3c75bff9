//! CLI binary smoke tests using assert_cmd.
//!
//! These tests run the compiled `dataramp` binary against temporary
//! directories.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("dataramp").unwrap()
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("new"))
        .stdout(predicate::str::contains("path"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dataramp"));
}

// ---------------------------------------------------------------------------
// new
// ---------------------------------------------------------------------------

#[test]
fn new_creates_project_layout() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .args(["new", "churn", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("churn"));

    let base = dir.path().join("churn");
    assert!(base.join(".dataramprc").is_file());
    assert!(base.join("outputs/models").is_dir());
    assert!(base.join("datasets/raw").is_dir());
}

#[test]
fn new_in_current_directory_records_absolute_paths() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["new", "proj"])
        .assert()
        .success();

    let sidecar = std::fs::read_to_string(dir.path().join("proj/.dataramprc")).unwrap();
    let config: serde_json::Value = serde_json::from_str(&sidecar).unwrap();
    let models = config["models_path"].as_str().unwrap();
    assert!(std::path::Path::new(models).is_absolute(), "{}", models);

    cmd()
        .current_dir(dir.path().join("proj/src/scripts"))
        .args(["path", "modelpath"])
        .assert()
        .success()
        .stdout(predicate::str::contains(models));
}

#[test]
fn new_rejects_nested_name() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .args(["new", "a/b", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("single directory name"));
}

// ---------------------------------------------------------------------------
// path / config
// ---------------------------------------------------------------------------

#[test]
fn path_resolves_from_inside_the_project() {
    let dir = tempfile::tempdir().unwrap();
    cmd().args(["new", "proj", "--dir"]).arg(dir.path()).assert().success();

    let scripts = dir.path().join("proj/src/scripts");
    cmd()
        .args(["path", "modelpath", "--dir"])
        .arg(&scripts)
        .assert()
        .success()
        .stdout(predicate::str::contains("outputs"))
        .stdout(predicate::str::contains("models"));
}

#[test]
fn path_without_config_fails() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .args(["path", "datapath", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("project configuration not found"));
}

#[test]
fn path_rejects_unknown_key() {
    cmd()
        .args(["path", "nopath"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn config_prints_json() {
    let dir = tempfile::tempdir().unwrap();
    cmd().args(["new", "proj", "--dir"]).arg(dir.path()).assert().success();

    cmd()
        .args(["config", "--dir"])
        .arg(dir.path().join("proj"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"models_path\""))
        .stdout(predicate::str::contains("\"description\""));
}

#[test]
fn log_file_receives_records() {
    let dir = tempfile::tempdir().unwrap();
    let log_file = dir.path().join("logs/dataramp.log");

    cmd()
        .env_remove("DATARAMP_LOG")
        .args(["new", "proj", "--dir"])
        .arg(dir.path())
        .arg("--log-file")
        .arg(&log_file)
        .assert()
        .success();

    let contents = std::fs::read_to_string(&log_file).unwrap();
    assert!(contents.contains("Project created successfully"));
}
