//! Integration tests for the hyperschema-gen CLI.
//!
//! These tests verify end-to-end CLI behavior using assert_cmd.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn gen_cmd() -> Command {
    Command::cargo_bin("hyperschema-gen").unwrap()
}

#[test]
fn cli_shows_help() {
    gen_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--out"))
        .stdout(predicate::str::contains("--package"))
        .stdout(predicate::str::contains("--design"));
}

#[test]
fn cli_shows_version() {
    gen_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hyperschema-gen 0.1.0"));
}

#[test]
fn cli_rejects_unknown_flag_before_touching_disk() {
    let temp_dir = TempDir::new().unwrap();

    gen_cmd()
        .current_dir(temp_dir.path())
        .args(["--api", "cellar", "--bogus"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--bogus"))
        .stderr(predicate::str::contains("argument validation failed"));

    assert!(!temp_dir.path().join("schema").exists());
}

#[test]
fn cli_rejects_invalid_package() {
    let temp_dir = TempDir::new().unwrap();

    gen_cmd()
        .args(["--api", "cellar", "--package", "not-valid", "--out"])
        .arg(temp_dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--package"));

    assert!(!temp_dir.path().join("schema").exists());
}

#[test]
fn cli_requires_a_definition() {
    gen_cmd()
        .args(["--out", "gen"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("required"));
}

#[test]
fn cli_generates_bundled_api() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("schema");

    gen_cmd()
        .args(["--api", "cellar", "--out"])
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("schema.json"))
        .stdout(predicate::str::contains("schema.rs"));

    assert!(dir.join("schema.json").is_file());
    let stub = fs::read_to_string(dir.join("schema.rs")).unwrap();
    assert!(stub.starts_with("// The virtual wine cellar JSON Hyper-schema"));
}

#[test]
fn cli_generates_from_design_file() {
    let temp_dir = TempDir::new().unwrap();
    let design = temp_dir.path().join("design.json");
    fs::write(
        &design,
        r#"{
            "name": "Bottles",
            "resources": [{
                "name": "bottle",
                "base_path": "/bottles",
                "actions": [{"name": "list", "method": "GET", "path": ""}]
            }]
        }"#,
    )
    .unwrap();
    let out = temp_dir.path().join("out");

    gen_cmd()
        .args(["--compact", "--package", "bottles", "--design"])
        .arg(&design)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let stub = fs::read_to_string(out.join("schema/bottles.rs")).unwrap();
    assert!(stub.starts_with("// Bottles JSON Hyper-schema"));
    let json = fs::read_to_string(out.join("schema/schema.json")).unwrap();
    assert!(!json.contains('\n'));
}

#[test]
fn cli_reports_unreadable_design_file() {
    let temp_dir = TempDir::new().unwrap();

    gen_cmd()
        .args(["--design", "does-not-exist.json", "--out"])
        .arg(temp_dir.path())
        .current_dir(temp_dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does-not-exist.json"));

    assert!(!temp_dir.path().join("schema").exists());
}
