//! Integration tests for the `dlipower` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! configuration handling, and error exit codes. Switch-bound commands run
//! against a wiremock server standing in for the device.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STATUS_PAGE: &str = r"
<html><body><table>
<tr><td>#</td><td>Name</td><td>State</td><td colspan=2>Action</td></tr>
<tr><td>1</td><td>Router</td><td><font>ON</font></td><td>x</td><td>x</td></tr>
<tr><td>2</td><td>Modem</td><td><font>OFF</font></td><td>x</td><td>x</td></tr>
</table></body></html>
";

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `dlipower` binary with env isolation.
///
/// Clears all `DLIPOWER_*` env vars and points the config file at `config`
/// so tests never touch the user's real configuration.
fn dlipower_cmd(config: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("dlipower");
    cmd.env("HOME", "/tmp/dlipower-cli-test-nonexistent")
        .env("DLIPOWER_CONFIG", config)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("ZTDLIPOWER_CONFIG")
        .env_remove("DLIPOWER_HOSTNAME")
        .env_remove("DLIPOWER_USERID")
        .env_remove("DLIPOWER_PASSWORD")
        .env_remove("DLIPOWER_TIMEOUT")
        .env_remove("DLIPOWER_CYCLETIME")
        .env_remove("DLIPOWER_RETRIES")
        .env_remove("DLIPOWER_OUTPUT");
    cmd
}

/// A command with no config file and an unreachable switch.
fn offline_cmd(dir: &tempfile::TempDir) -> assert_cmd::Command {
    let mut cmd = dlipower_cmd(&dir.path().join("dlipower.conf"));
    cmd.args(["--hostname", "127.0.0.1:1", "--retries", "1", "--timeout", "0.2"]);
    cmd
}

async fn fake_switch() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.htm"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STATUS_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/outlet"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

fn online_cmd(dir: &tempfile::TempDir, server: &MockServer) -> assert_cmd::Command {
    let mut cmd = dlipower_cmd(&dir.path().join("dlipower.conf"));
    cmd.args([
        "--hostname",
        &server.address().to_string(),
        "--retries",
        "1",
        "--timeout",
        "2",
    ]);
    cmd
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    let dir = tempfile::tempdir().unwrap();
    dlipower_cmd(&dir.path().join("none.conf"))
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Digital Loggers")
                .and(predicate::str::contains("status"))
                .and(predicate::str::contains("cycle"))
                .and(predicate::str::contains("set-name")),
        );
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    dlipower_cmd(&dir.path().join("none.conf"))
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dlipower"));
}

#[test]
fn test_outlet_commands_require_outlets() {
    let dir = tempfile::tempdir().unwrap();
    dlipower_cmd(&dir.path().join("none.conf"))
        .arg("on")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let dir = tempfile::tempdir().unwrap();
    dlipower_cmd(&dir.path().join("none.conf"))
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_config_path_honors_env() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("custom.conf");
    dlipower_cmd(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.conf"));
}

#[test]
fn test_config_path_falls_back_to_legacy_env() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = dir.path().join("legacy.conf");
    dlipower_cmd(&dir.path().join("unused.conf"))
        .env_remove("DLIPOWER_CONFIG")
        .env("ZTDLIPOWER_CONFIG", &legacy)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("legacy.conf"));
}

#[test]
fn test_config_show_masks_password() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("dlipower.conf");
    std::fs::write(
        &config,
        r#"{"hostname": "10.1.2.3", "password": "hunter2", "retries": 4}"#,
    )
    .unwrap();

    dlipower_cmd(&config)
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("10.1.2.3")
                .and(predicate::str::contains("\"retries\": 4"))
                .and(predicate::str::contains("hunter2").not()),
        );
}

#[test]
fn test_config_show_applies_flags_and_env() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("dlipower.conf");
    std::fs::write(&config, r#"{"hostname": "10.1.2.3", "userid": "ops"}"#).unwrap();

    dlipower_cmd(&config)
        .env("DLIPOWER_USERID", "envuser")
        .args(["--hostname", "10.9.9.9", "config", "show", "-o", "plain"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("hostname=10.9.9.9")
                .and(predicate::str::contains("userid=envuser")),
        );
}

#[test]
fn test_invalid_timeout_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    dlipower_cmd(&dir.path().join("none.conf"))
        .args(["--timeout", "0", "status", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("timeout"));
}

#[test]
fn test_save_settings_writes_private_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("dlipower.conf");

    let mut cmd = dlipower_cmd(&config);
    cmd.args([
        "--hostname",
        "127.0.0.1:1",
        "--retries",
        "1",
        "--timeout",
        "0.2",
        "--user",
        "ops",
        "--save-settings",
        "list",
    ]);
    cmd.assert().code(7);

    let saved = std::fs::read_to_string(&config).unwrap();
    assert!(saved.contains("\"hostname\": \"127.0.0.1:1\""));
    assert!(saved.contains("\"userid\": \"ops\""));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&config).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[test]
fn test_save_settings_does_not_persist_env_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("dlipower.conf");
    std::fs::write(&config, r#"{"userid": "ops", "password": "stored"}"#).unwrap();

    let mut cmd = dlipower_cmd(&config);
    cmd.env("DLIPOWER_USERID", "envuser")
        .env("DLIPOWER_PASSWORD", "envsecret")
        .args([
            "--hostname",
            "127.0.0.1:1",
            "--retries",
            "1",
            "--timeout",
            "0.2",
            "--save-settings",
            "list",
        ]);
    cmd.assert().code(7);

    let saved = std::fs::read_to_string(&config).unwrap();
    assert!(saved.contains("\"hostname\": \"127.0.0.1:1\""));
    assert!(saved.contains("\"userid\": \"ops\""));
    assert!(saved.contains("\"password\": \"stored\""));
    assert!(!saved.contains("envuser"));
    assert!(!saved.contains("envsecret"));
}

// ── Unreachable switch ──────────────────────────────────────────────

#[test]
fn test_unreachable_switch_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    offline_cmd(&dir).assert().code(7).stderr(predicate::str::contains(
        "Unable to communicate to the Web power switch at 127.0.0.1:1",
    ));
}

#[test]
fn test_unreachable_status_reads_unknown() {
    let dir = tempfile::tempdir().unwrap();
    offline_cmd(&dir)
        .args(["status", "1,2"])
        .assert()
        .success()
        .stdout("Unknown,Unknown\n");
}

#[test]
fn test_unreachable_power_on_fails() {
    let dir = tempfile::tempdir().unwrap();
    offline_cmd(&dir).args(["poweron", "1"]).assert().code(7);
}

// ── Against a switch ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_list_formats() {
    let server = fake_switch().await;
    let dir = tempfile::tempdir().unwrap();

    online_cmd(&dir, &server)
        .args(["-o", "plain"])
        .assert()
        .success()
        .stdout("1\tRouter\tON\n2\tModem\tOFF\n");

    online_cmd(&dir, &server)
        .args(["list", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Modem\""));

    online_cmd(&dir, &server)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Router").and(predicate::str::contains("State")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_and_names_join_with_commas() {
    let server = fake_switch().await;
    let dir = tempfile::tempdir().unwrap();

    online_cmd(&dir, &server)
        .args(["status", "1-2"])
        .assert()
        .success()
        .stdout("ON,OFF\n");

    online_cmd(&dir, &server)
        .args(["get_name", "2", "Router"])
        .assert()
        .success()
        .stdout("Modem,Router\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_power_commands_report_outcome() {
    let server = fake_switch().await;
    let dir = tempfile::tempdir().unwrap();

    // Already on: succeeds without output.
    online_cmd(&dir, &server)
        .args(["on", "Router"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    // The page never changes, so switching off is not confirmed.
    online_cmd(&dir, &server)
        .args(["off", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Power off operation failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_outlet_exit_code() {
    let server = fake_switch().await;
    let dir = tempfile::tempdir().unwrap();

    online_cmd(&dir, &server)
        .args(["set-name", "Toaster", "Kettle"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Toaster"));

    online_cmd(&dir, &server)
        .args(["status", "7"])
        .assert()
        .code(4);
}
