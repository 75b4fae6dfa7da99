//! Smoke tests for the mirador CLI
//!
//! These only exercise argument handling; nothing here launches a
//! browser.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a command for the mirador binary
fn mirador() -> Command {
    Command::cargo_bin("mirador").expect("mirador binary should exist")
}

#[test]
fn test_version_flag() {
    mirador()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_flag() {
    mirador()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("simulation"))
        .stdout(predicate::str::contains("--observe-ms"))
        .stdout(predicate::str::contains("--headed"));
}

#[test]
fn test_unknown_flag_fails() {
    mirador()
        .arg("--definitely-not-a-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}

#[test]
fn test_invalid_port_fails() {
    mirador()
        .args(["--port", "not-a-port"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
