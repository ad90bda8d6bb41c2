//! End-to-end tests for the `fieldsync` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn fieldsync(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fieldsync").unwrap();
    cmd.env_remove("RUST_LOG").arg("--data-dir").arg(data_dir);
    cmd
}

fn submit_offline(data_dir: &Path, kind: &str, payload: &str) -> String {
    let output = fieldsync(data_dir)
        .args(["--offline", "submit", kind, "--payload", payload])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("ID:"))
        .map(|id| id.trim().to_string())
        .expect("submit prints the queued id")
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("fieldsync")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("submit"))
        .stdout(predicate::str::contains("queue"))
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn offline_submit_is_queued_and_counted() {
    let dir = tempdir().unwrap();

    fieldsync(dir.path())
        .args(["--offline", "submit", "listing", "--payload", r#"{"crop":"Onion"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Queued for sync"))
        .stdout(predicate::str::contains("/marketplace/listing"));

    fieldsync(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending: 1"))
        .stdout(predicate::str::contains("Parked:  0"))
        .stdout(predicate::str::contains("4 attempts total"));
}

#[test]
fn offline_flag_accepted_after_subcommand() {
    let dir = tempdir().unwrap();

    fieldsync(dir.path())
        .args(["submit", "loan", "--payload", "{}", "--offline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/bank/loan-apply"));
}

#[test]
fn queue_survives_between_invocations_in_order() {
    let dir = tempdir().unwrap();
    let first = submit_offline(dir.path(), "claim", r#"{"policyId":"P-1"}"#);
    let second = submit_offline(dir.path(), "diagnosis", r#"{"crop":"Tomato"}"#);

    let output = fieldsync(dir.path()).args(["queue", "list"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();

    let first_at = stdout.find(&first).expect("first item listed");
    let second_at = stdout.find(&second).expect("second item listed");
    assert!(first_at < second_at);
    assert!(stdout.contains("/insurance/claim"));
    assert!(stdout.contains("/advisor/diagnosis"));
}

#[test]
fn queue_remove_by_id() {
    let dir = tempdir().unwrap();
    let id = submit_offline(dir.path(), "listing", "{}");

    fieldsync(dir.path())
        .args(["queue", "remove", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Removed {}", id)));

    fieldsync(dir.path())
        .args(["queue", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Queue is empty."));
}

#[test]
fn queue_remove_rejects_bad_id() {
    let dir = tempdir().unwrap();

    fieldsync(dir.path())
        .args(["queue", "remove", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid item id"));
}

#[test]
fn queue_requeue_with_nothing_parked() {
    let dir = tempdir().unwrap();

    fieldsync(dir.path())
        .args(["queue", "requeue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Requeued 0"));
}

#[test]
fn offline_sync_keeps_queue() {
    let dir = tempdir().unwrap();
    submit_offline(dir.path(), "listing", "{}");

    fieldsync(dir.path())
        .args(["--offline", "sync"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Offline: 1 item(s) waiting"));
}

#[test]
fn invalid_payload_fails() {
    let dir = tempdir().unwrap();

    fieldsync(dir.path())
        .args(["--offline", "submit", "listing", "--payload", "{crop"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid JSON"));
}

#[test]
fn unknown_kind_is_usage_error() {
    let dir = tempdir().unwrap();

    fieldsync(dir.path())
        .args(["--offline", "submit", "payment", "--payload", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn config_file_is_used() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("fieldsync.toml"),
        "[remote]\nbase_url = \"https://agri.example.org\"\n\n[queue]\npath = \"outbox\"\n",
    )
    .unwrap();

    fieldsync(dir.path())
        .args(["--offline", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://agri.example.org"))
        .stdout(predicate::str::contains("offline"));

    assert!(dir.path().join("outbox").is_dir());
}

#[test]
fn malformed_config_fails() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("broken.toml");
    std::fs::write(&config, "[retry\n").unwrap();

    fieldsync(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}
