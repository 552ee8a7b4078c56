//! E2E tests for the mcpdemo CLI.
//!
//! These tests spawn the built `mcpdemo` binary, which in turn spawns the
//! built `mcpdemo-server`, and verify:
//! - Exit codes
//! - stdout/stderr output
//! - Command behavior against the real host

use std::process::{Command, Output};

fn cli_path() -> &'static str {
    env!("CARGO_BIN_EXE_mcpdemo")
}

fn server_path() -> &'static str {
    env!("CARGO_BIN_EXE_mcpdemo-server")
}

/// Runs the CLI against the built host with a clean environment.
fn run_cli(args: &[&str]) -> Output {
    // Keep a stray user config out of the picture.
    let config = empty_config();
    Command::new(cli_path())
        .arg("--server-path")
        .arg(server_path())
        .arg("--config")
        .arg(config.path())
        .args(args)
        .env_remove("MCPDEMO_OLLAMA_URL")
        .env_remove("MCPDEMO_MODEL")
        .env_remove("MCPDEMO_LOG")
        .output()
        .expect("Failed to execute CLI binary")
}

/// An empty config file, removed when dropped.
fn empty_config() -> tempfile::NamedTempFile {
    tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create empty config")
}

fn stdout_str(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr_str(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// =============================================================================
// Help
// =============================================================================

#[test]
fn e2e_help_lists_commands() {
    let output = Command::new(cli_path()).arg("--help").output().unwrap();
    assert!(output.status.success(), "help should exit 0");

    let stdout = stdout_str(&output);
    for command in [
        "latin",
        "latin-resource",
        "gods",
        "greeting",
        "add",
        "chat",
        "review",
        "commit",
        "inspect",
    ] {
        assert!(stdout.contains(command), "help should list {command}");
    }
    assert!(stdout.contains("--ollama-url"));
    assert!(stdout.contains("--server-path"));
}

#[test]
fn e2e_no_command_prints_help_and_fails() {
    let output = Command::new(cli_path()).output().unwrap();
    assert!(!output.status.success());
    assert!(stdout_str(&output).contains("Usage"));
}

// =============================================================================
// Tools and resources
// =============================================================================

#[test]
fn e2e_greeting() {
    let output = run_cli(&["greeting", "World"]);
    assert!(output.status.success(), "stderr: {}", stderr_str(&output));
    assert_eq!(stdout_str(&output), "Hello, World!\n");
}

#[test]
fn e2e_greeting_keeps_escapes_and_query_characters() {
    let output = run_cli(&["greeting", "100%41 or?"]);
    assert!(output.status.success(), "stderr: {}", stderr_str(&output));
    assert_eq!(stdout_str(&output), "Hello, 100%41 or?!\n");
}

#[test]
fn e2e_add() {
    let output = run_cli(&["add", "5", "-3"]);
    assert!(output.status.success(), "stderr: {}", stderr_str(&output));
    assert_eq!(stdout_str(&output).trim(), "2");
}

#[test]
fn e2e_latin_substitutes_words() {
    let output = run_cli(&["latin", "the dog"]);
    assert!(output.status.success(), "stderr: {}", stderr_str(&output));
    assert_eq!(stdout_str(&output).trim(), "thy dog");
}

#[test]
fn e2e_latin_resource() {
    let output = run_cli(&["latin-resource", "you and I"]);
    assert!(output.status.success(), "stderr: {}", stderr_str(&output));
    assert_eq!(stdout_str(&output).trim(), "tu et I");
}

#[test]
fn e2e_gods_default_and_limit() {
    let output = run_cli(&["gods"]);
    assert!(output.status.success(), "stderr: {}", stderr_str(&output));
    let gods: Vec<serde_json::Value> = serde_json::from_str(&stdout_str(&output)).unwrap();
    assert_eq!(gods.len(), 10);
    assert_eq!(gods[0]["name"], "Zeus");
    assert_eq!(gods[0]["roman_name"], "Jupiter");

    let output = run_cli(&["gods", "--limit", "20"]);
    let gods: Vec<serde_json::Value> = serde_json::from_str(&stdout_str(&output)).unwrap();
    assert_eq!(gods.len(), 14);
}

#[test]
fn e2e_inspect_formats() {
    let output = run_cli(&["inspect"]);
    assert!(output.status.success(), "stderr: {}", stderr_str(&output));
    let text = stdout_str(&output);
    assert!(text.contains("MCP Demo Server"));
    assert!(text.contains("ancient_latin_text"));
    assert!(text.contains("greeting://{name}"));
    assert!(text.contains("git_commit"));

    let output = run_cli(&["inspect", "--format", "json"]);
    let report: serde_json::Value = serde_json::from_str(&stdout_str(&output)).unwrap();
    assert_eq!(report["server"]["name"], "MCP Demo Server");
    assert_eq!(report["protocol_version"], "2024-11-05");
    assert_eq!(report["tools"].as_array().unwrap().len(), 2);

    let output = run_cli(&["inspect", "-f", "yaml"]);
    assert!(output.status.success());
    assert!(stdout_str(&output).contains("resource_templates:"));
}

// =============================================================================
// Prompts through the bridge
// =============================================================================

#[test]
fn e2e_chat_with_unreachable_backend_reports_error_text() {
    let output = run_cli(&["--ollama-url", "http://127.0.0.1:9", "chat", "What are tools?"]);
    // Backend failures are answers, not process failures.
    assert!(output.status.success(), "stderr: {}", stderr_str(&output));
    assert!(stdout_str(&output).starts_with("Error: "));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn e2e_missing_server_fails() {
    let config = empty_config();
    let output = Command::new(cli_path())
        .args(["--server-path", "/no/such/host", "--config"])
        .arg(config.path())
        .args(["greeting", "x"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr_str(&output).contains("Server executable not found at /no/such/host"));
}

#[test]
fn e2e_review_without_code_is_a_usage_error() {
    let output = run_cli(&["review"]);
    assert!(!output.status.success());
}
