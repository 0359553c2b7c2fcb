//! Integration tests for the `roster` CLI binary.
//!
//! Argument parsing, help output, shell completions and error handling run
//! without a server; the student commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `roster` binary with env isolation.
///
/// Clears all `ROSTER_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn roster_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("roster");
    cmd.env("HOME", "/tmp/roster-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/roster-cli-test-nonexistent")
        .env_remove("ROSTER_PROFILE")
        .env_remove("ROSTER_SERVER")
        .env_remove("ROSTER_RESOURCE")
        .env_remove("ROSTER_OUTPUT")
        .env_remove("ROSTER_COLOR")
        .env_remove("ROSTER_QUIET")
        .env_remove("ROSTER_YES")
        .env_remove("ROSTER_INSECURE")
        .env_remove("ROSTER_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || roster_cmd().args(args).output().unwrap())
        .await
        .unwrap()
}

async fn server_with_students() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Alice", "email": "alice@example.com", "major": "Math", "enrollmentDate": "2023-09-01"},
            {"id": 2, "name": "Bob", "email": "bob@example.com", "major": null}
        ])))
        .mount(&server)
        .await;
    server
}

fn args(server: &MockServer, rest: &[&str]) -> Vec<String> {
    let mut v = vec!["--server".to_owned(), server.uri(), "--color".into(), "never".into()];
    v.extend(rest.iter().map(|s| (*s).to_owned()));
    v
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = roster_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    roster_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("student roster")
            .and(predicate::str::contains("students"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_short_help_flag() {
    roster_cmd()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("student roster"));
}

#[test]
fn test_version_flag() {
    roster_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("roster"));
}

#[test]
fn test_students_help_lists_subcommands() {
    roster_cmd().args(["st", "--help"]).assert().success().stdout(
        predicate::str::contains("list")
            .and(predicate::str::contains("add"))
            .and(predicate::str::contains("edit"))
            .and(predicate::str::contains("delete")),
    );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    roster_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_invalid_shell() {
    roster_cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_prints_toml_path() {
    roster_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_invalid_output_format() {
    roster_cmd()
        .args(["--output", "xml", "students", "list"])
        .assert()
        .failure()
        .code(2);
}

// ── Errors without a server ─────────────────────────────────────────

#[test]
fn test_no_server_configured() {
    let output = roster_cmd().args(["students", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("No server configured"));
}

#[test]
fn test_unknown_profile() {
    let output = roster_cmd()
        .args(["--profile", "nope", "students", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_unreachable_server_exit_code() {
    let output = roster_cmd()
        .args(["--server", "http://127.0.0.1:1", "--timeout", "5", "students", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}

#[test]
fn test_add_requires_name() {
    let output = roster_cmd()
        .args(["--server", "http://127.0.0.1:1", "students", "add", "--email", "a@x.com"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_edit_requires_a_field() {
    let output = roster_cmd()
        .args(["--server", "http://127.0.0.1:1", "students", "edit", "1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("nothing to change"));
}

// ── Against a mock server ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_list_table() {
    let server = server_with_students().await;

    let output = run(args(&server, &["students", "list"])).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Alice"));
    assert!(stdout.contains("Enrolled"));
    assert!(stdout.contains("2023-09-01"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_plain_ids_in_server_order() {
    let server = server_with_students().await;

    let output = run(args(&server, &["-o", "plain", "students", "list"])).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1\n2\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_json() {
    let server = server_with_students().await;

    let output = run(args(&server, &["-o", "json-compact", "students", "get", "2"])).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["name"], "Bob");
    assert_eq!(value["major"], "");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_unknown_id_is_not_found() {
    let server = server_with_students().await;

    let output = run(args(&server, &["students", "get", "99"])).await;

    assert_eq!(output.status.code(), Some(4));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_without_yes_is_refused_non_interactively() {
    let server = server_with_students().await;

    let output = run(args(&server, &["students", "delete", "1"])).await;

    assert_eq!(output.status.code(), Some(2));
    assert!(server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .all(|r| r.method.as_str() != "DELETE"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_with_yes() {
    let server = server_with_students().await;
    Mock::given(method("DELETE"))
        .and(path("/api/students/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(args(&server, &["--yes", "students", "delete", "1"])).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Student 1 deleted"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_on_add() {
    let server = server_with_students().await;
    Mock::given(method("POST"))
        .and(path("/api/students"))
        .respond_with(ResponseTemplate::new(400).set_body_string("email already used"))
        .mount(&server)
        .await;

    let output = run(args(
        &server,
        &["students", "add", "--name", "Cy", "--email", "alice@example.com"],
    ))
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("email already used"));
}
