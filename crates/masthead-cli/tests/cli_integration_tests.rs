//! CLI integration tests for masthead
//!
//! Tests the masthead CLI commands end-to-end using assert_cmd. Each test
//! runs against its own temp config directory and database file.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to create an isolated masthead command
fn masthead_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("masthead").unwrap();
    cmd.env("MASTHEAD_CONFIG_DIR", dir.path());
    cmd
}

fn database_arg(dir: &TempDir) -> String {
    dir.path().join("masthead.db").display().to_string()
}

#[test]
fn test_users_seeds_default_admin() {
    let dir = TempDir::new().unwrap();

    masthead_cmd(&dir)
        .args(["users", "--database", &database_arg(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("admin@newspaper.com"))
        .stdout(predicate::str::contains("Administrator"));
}

#[test]
fn test_issues_starts_empty() {
    let dir = TempDir::new().unwrap();

    masthead_cmd(&dir)
        .args(["issues", "--database", &database_arg(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues published yet"));
}

#[test]
fn test_issue_not_found() {
    let dir = TempDir::new().unwrap();

    masthead_cmd(&dir)
        .args(["issue", "deadbeef", "--database", &database_arg(&dir)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_org_shows_defaults() {
    let dir = TempDir::new().unwrap();

    masthead_cmd(&dir)
        .args(["org", "--database", &database_arg(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Our Newspaper"))
        .stdout(predicate::str::contains("General News"));
}

#[test]
fn test_doctor_reports_healthy() {
    let dir = TempDir::new().unwrap();

    masthead_cmd(&dir)
        .args(["doctor", "--database", &database_arg(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Database is healthy"))
        .stdout(predicate::str::contains("accounts: defaults (never written)"));
}

#[test]
fn test_config_round_trip() {
    let dir = TempDir::new().unwrap();

    masthead_cmd(&dir)
        .args(["config", "set", "session.quick_login", "false"])
        .assert()
        .success();

    masthead_cmd(&dir)
        .args(["config", "get", "session.quick_login"])
        .assert()
        .success()
        .stdout(predicate::str::contains("false"));

    masthead_cmd(&dir)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("storage.database_path"));
}

#[test]
fn test_shell_login_and_whoami() {
    let dir = TempDir::new().unwrap();

    masthead_cmd(&dir)
        .args(["shell", "--quiet", "--database", &database_arg(&dir)])
        .write_stdin("login admin@newspaper.com\nwhoami\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Administrator"));
}

#[test]
fn test_shell_signup_and_submit_article() {
    let dir = TempDir::new().unwrap();

    masthead_cmd(&dir)
        .args(["shell", "--quiet", "--database", &database_arg(&dir)])
        .write_stdin(
            "signup \"Jo Writer\" jo@example.com\n\
             login jo@example.com\n\
             write \"Bake Sale\" \"<p>Cookies on Saturday</p>\" --submit\n\
             articles pending\n\
             exit\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered Jo Writer"))
        .stdout(predicate::str::contains("Bake Sale"))
        .stdout(predicate::str::contains("pending"));
}

#[test]
fn test_shell_refuses_unknown_login() {
    let dir = TempDir::new().unwrap();

    masthead_cmd(&dir)
        .args(["shell", "--quiet", "--database", &database_arg(&dir)])
        .write_stdin("login nobody@example.com\nexit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("not found"));
}
