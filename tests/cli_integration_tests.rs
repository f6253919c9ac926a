#![allow(deprecated)] // cargo_bin deprecation - still works fine

use assert_cmd::Command;
use predicates::prelude::*;

mod common;
use common::TestFixture;

fn cmd() -> Command {
    Command::cargo_bin("pix-report").expect("binary should exist")
}

// ============================================================================
// Init Command Integration Tests
// ============================================================================

#[test]
fn init_creates_config_file() {
    let fixture = TestFixture::new();

    cmd()
        .current_dir(fixture.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    assert!(fixture.path().join("pix-report.toml").exists());
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let fixture = TestFixture::new();
    fixture.create_config("# existing\n");

    cmd()
        .current_dir(fixture.path())
        .arg("init")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_overwrites_with_force() {
    let fixture = TestFixture::new();
    fixture.create_config("# existing\n");

    cmd()
        .current_dir(fixture.path())
        .arg("init")
        .arg("--force")
        .assert()
        .success();
}

#[test]
fn init_output_is_accepted_by_validate() {
    let fixture = TestFixture::new();

    cmd()
        .current_dir(fixture.path())
        .arg("init")
        .assert()
        .success();

    cmd()
        .current_dir(fixture.path())
        .arg("config")
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

// ============================================================================
// Config Command Integration Tests
// ============================================================================

#[test]
fn config_validate_missing_file_fails() {
    let fixture = TestFixture::new();

    cmd()
        .current_dir(fixture.path())
        .arg("config")
        .arg("validate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn config_validate_rejects_bad_period() {
    let fixture = TestFixture::new();
    fixture.create_config(
        r#"
[report]
current_period = "2025-01"
"#,
    );

    cmd()
        .current_dir(fixture.path())
        .arg("config")
        .arg("validate")
        .assert()
        .code(2);
}

#[test]
fn config_validate_rejects_empty_recipients() {
    let fixture = TestFixture::new();
    fixture.create_config(
        r#"
[mail]
recipients = []
"#,
    );

    cmd()
        .current_dir(fixture.path())
        .arg("config")
        .arg("validate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("recipients"));
}

#[test]
fn config_show_renders_defaults_without_a_file() {
    let fixture = TestFixture::new();

    cmd()
        .current_dir(fixture.path())
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("[report]"))
        .stdout(predicate::str::contains("202501"));
}

#[test]
fn config_show_json_is_parseable() {
    let fixture = TestFixture::new();

    let output = cmd()
        .current_dir(fixture.path())
        .arg("config")
        .arg("show")
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value =
        serde_json::from_slice(&output).expect("config show --format json must emit JSON");
    assert_eq!(parsed["api"]["top"], 100);
}

#[test]
fn config_show_reflects_file_overrides() {
    let fixture = TestFixture::new();
    fixture.create_config(
        r#"
[report]
basename = "custom_prefix"
"#,
    );

    cmd()
        .current_dir(fixture.path())
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("custom_prefix"));
}

// ============================================================================
// Pipeline Entry Integration Tests (offline failure paths only)
// ============================================================================

#[test]
fn run_without_credentials_exits_with_auth_code() {
    let fixture = TestFixture::new();

    // No token.json and no credentials.json: authentication fails before
    // any network activity, with the dedicated exit code.
    cmd()
        .current_dir(fixture.path())
        .arg("run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not authenticate"));
}

#[test]
fn bare_invocation_also_runs_the_pipeline() {
    let fixture = TestFixture::new();

    cmd()
        .current_dir(fixture.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not authenticate"));
}

#[test]
fn run_with_missing_explicit_config_is_a_runtime_error() {
    let fixture = TestFixture::new();

    cmd()
        .current_dir(fixture.path())
        .arg("run")
        .arg("--config")
        .arg("missing.toml")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("config"));
}
