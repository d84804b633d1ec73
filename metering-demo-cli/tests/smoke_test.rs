//! Smoke tests for metering-demo-cli
//!
//! These drive the built binary against a temporary storage directory and
//! need no network access or browser.

mod common;

use common::{extract_ppid, TestContext};
use predicates::prelude::*;

#[test]
fn test_cli_help() {
    let ctx = TestContext::new();
    ctx.cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ppid"))
        .stdout(predicate::str::contains("reset"))
        .stdout(predicate::str::contains("lint"));
}

#[test]
fn test_cli_version() {
    let ctx = TestContext::new();
    ctx.cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("metering-demo"));
}

#[test]
fn test_ppid_is_stable_across_invocations() {
    let ctx = TestContext::new();

    let first = ctx.cli().arg("ppid").assert().success();
    let first = String::from_utf8_lossy(&first.get_output().stdout).to_string();
    let first_ppid = extract_ppid(&first).expect("ppid in output");

    let second = ctx.cli().arg("ppid").assert().success();
    let second = String::from_utf8_lossy(&second.get_output().stdout).to_string();

    assert_eq!(extract_ppid(&second), Some(first_ppid.clone()));
    assert_eq!(ctx.stored()["meteringPpid"], first_ppid.as_str());
}

#[test]
fn test_new_ppid_does_not_store() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["new-ppid", "-n", "3"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^(ppid\d{1,6}\n){3}$").unwrap());

    assert!(ctx.stored().get("meteringPpid").is_none());
}

#[test]
fn test_state_json_shape() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["register", "--username", "alice", "--timestamp", "1700000000"])
        .assert()
        .success();

    let output = ctx.cli().args(["state", "--json"]).assert().success();
    let state: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();

    assert!(state["id"].as_str().unwrap().starts_with("ppid"));
    assert_eq!(state["registrationTimestamp"], "1700000000");
    assert_eq!(state.as_object().unwrap().len(), 2);
}

#[test]
fn test_state_greets_registered_user() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["register", "-u", "alice"])
        .assert()
        .success();

    ctx.cli()
        .arg("state")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello, alice!"));
}

#[test]
fn test_register_stores_date_like_timestamp_as_given() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["register", "--timestamp", "2024-03-01T12:00:00Z"])
        .assert()
        .success();

    assert_eq!(
        ctx.stored()["meteringRegistrationTimestamp"],
        "2024-03-01T12:00:00Z"
    );
}

#[test]
fn test_register_rejects_empty_timestamp() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["register", "--timestamp", " "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be empty"));

    assert!(ctx.stored().get("meteringRegistrationTimestamp").is_none());
}

#[test]
fn test_reset_clears_state() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["register", "-u", "alice", "-t", "1700000000"])
        .assert()
        .success();
    ctx.cli().arg("paywall").assert().success();
    assert!(ctx.temp_dir.path().join("session.json").exists());

    ctx.cli()
        .args(["reset", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Metering demo reset"));

    let stored = ctx.stored();
    for key in [
        "meteringPpid",
        "meteringRegistrationTimestamp",
        "meteringUsername",
    ] {
        assert!(stored.get(key).is_none(), "{key} should be cleared");
    }
    assert!(!ctx.temp_dir.path().join("session.json").exists());

    ctx.cli()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("unregistered"))
        .stdout(predicate::str::contains("Paywall: closed"));
}

#[test]
fn test_reset_without_yes_refuses_when_not_interactive() {
    let ctx = TestContext::new();
    ctx.cli().arg("ppid").assert().success();

    ctx.cli().arg("reset").assert().failure();

    assert!(ctx.stored().get("meteringPpid").is_some());
}

#[test]
fn test_paywall_twice_reports_already_open() {
    let ctx = TestContext::new();

    ctx.cli()
        .arg("paywall")
        .assert()
        .success()
        .stdout(predicate::str::contains("Paywall opened"));

    ctx.cli()
        .arg("paywall")
        .assert()
        .success()
        .stdout(predicate::str::contains("already open"))
        .stdout(predicate::str::contains("Paywall opened").not());
}

#[test]
fn test_status_on_fresh_directory() {
    let ctx = TestContext::new();

    ctx.cli()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("PPID: (none)"));

    // Status never creates a PPID
    assert!(ctx.stored().get("meteringPpid").is_none());
}

#[test]
fn test_invalid_config_is_rejected() {
    let ctx = TestContext::new();
    std::fs::write(
        ctx.temp_dir.path().join("config.json"),
        r#"{"lint": {"command": []}}"#,
    )
    .unwrap();

    ctx.cli()
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("lint.command"));
}
