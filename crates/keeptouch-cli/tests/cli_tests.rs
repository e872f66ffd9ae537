//! Integration tests for the `keeptouch` CLI binary.
//!
//! These tests exercise the CLI as a subprocess, verifying exit codes,
//! stdout output, and the widget state file. They do NOT require a running
//! server: the server address points at a closed port, so plan fetches and
//! submissions fail and the widget falls back to its defined states.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write as _;
use std::path::Path;
use std::process::{Command, Stdio};

/// Helper: locate the `keeptouch` binary built by `cargo test`.
fn keeptouch_bin() -> String {
    let path = env!("CARGO_BIN_EXE_keeptouch");
    assert!(
        Path::new(path).exists(),
        "keeptouch binary not found at {path}"
    );
    path.to_owned()
}

fn command(state_file: &Path) -> Command {
    let mut cmd = Command::new(keeptouch_bin());
    cmd.env("KEEPTOUCH_SERVER", "http://127.0.0.1:19999") // Non-existent server
        .env("KEEPTOUCH_STATE_FILE", state_file)
        .env_remove("KEEPTOUCH_LOG");
    cmd
}

/// Helper: run keeptouch with args and return (`exit_code`, stdout, stderr).
fn run(state_file: &Path, args: &[&str]) -> (i32, String, String) {
    run_with_input(state_file, args, "")
}

fn run_with_input(state_file: &Path, args: &[&str], input: &str) -> (i32, String, String) {
    let mut child = command(state_file)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to execute keeptouch");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

// ── Version & help ───────────────────────────────────────────────────

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(&dir.path().join("w.redb"), &["--version"]);
    assert_eq!(code, 0, "keeptouch --version should exit 0");
    assert!(stdout.contains("keeptouch"), "version output: {stdout}");
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(&dir.path().join("w.redb"), &["--help"]);
    assert_eq!(code, 0);
    for cmd in ["reconnect", "plan", "signup", "feedback", "state"] {
        assert!(stdout.contains(cmd), "help should list '{cmd}': {stdout}");
    }
}

// ── State ────────────────────────────────────────────────────────────

#[test]
fn test_state_show_on_fresh_file() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("nested").join("w.redb");
    let (code, stdout, _) = run(&state_file, &["state", "show"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Resume step"));
    assert!(stdout.contains("name"));
    assert!(state_file.exists(), "state file should be created");
}

#[test]
fn test_reconnect_saves_progress_and_resumes() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("w.redb");

    // Blank name is ignored, then name, blocker #1, and close.
    let (code, stdout, _) = run_with_input(
        &state_file,
        &["reconnect"],
        "\nJohn Doe\n1\nq\n",
    );
    assert_eq!(code, 0, "reconnect should exit 0: {stdout}");
    assert!(stdout.contains("What's your name?"));
    assert!(stdout.contains("Hi John Doe"));
    assert!(stdout.contains("Enter your email to view your plan"));

    let (_, stdout, _) = run(&state_file, &["state", "show"]);
    assert!(stdout.contains("John Doe"), "state: {stdout}");
    assert!(stdout.contains("No time"));
    assert!(stdout.contains("Unable to generate plan at this time."));
    assert!(stdout.contains("name, blocker"));

    // A new session picks up on the plan step.
    let (_, stdout, _) = run_with_input(&state_file, &["reconnect"], "q\n");
    assert!(stdout.contains("Your personalized plan"));
    assert!(!stdout.contains("What's your name?"));
}

#[test]
fn test_failed_submission_keeps_answers() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("w.redb");

    let (code, stdout, _) = run_with_input(
        &state_file,
        &["reconnect"],
        "Ada\nToo busy\na@b.com\n",
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("Sorry, we couldn't process your submission. Please try again."));

    let (_, stdout, _) = run(&state_file, &["state", "show"]);
    assert!(stdout.contains("Ada"));
    assert!(stdout.contains("Too busy"));
}

#[test]
fn test_state_clear_forgets_answers() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("w.redb");
    run_with_input(&state_file, &["reconnect"], "Ada\nq\n");

    let (code, stdout, _) = run(&state_file, &["state", "clear"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("cleared"));

    let (_, stdout, _) = run(&state_file, &["state", "show"]);
    assert!(!stdout.contains("Ada"));
}

#[test]
fn test_no_persist_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("w.redb");
    let (code, stdout, _) = run_with_input(
        &state_file,
        &["--no-persist", "reconnect"],
        "Ada\nq\n",
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("Hi Ada"));
    assert!(!state_file.exists());
}

// ── Server commands ──────────────────────────────────────────────────

#[test]
fn test_signup_without_server_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run(&dir.path().join("w.redb"), &["signup", "me@example.com"]);
    assert_eq!(code, 1, "signup against a dead server should exit 1");
    assert!(stderr.contains("Error"), "stderr: {stderr}");
}

#[test]
fn test_plan_without_server_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run(
        &dir.path().join("w.redb"),
        &["plan", "--name", "Sam", "--block", "No time"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("could not generate a plan"), "stderr: {stderr}");
}
