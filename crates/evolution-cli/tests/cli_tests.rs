//! CLI integration tests for evolution.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for configuration errors. None of them reach a database.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the evolution binary.
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("evolution").unwrap();
    cmd.env_remove("CONFIG_PATH");
    cmd
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("transfer"))
        .stdout(predicate::str::contains("quant-type"))
        .stdout(predicate::str::contains("health-check"));
}

#[test]
fn test_transfer_subcommand_help() {
    cmd()
        .args(["transfer", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--user-id"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("evolution"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_output_json_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"));
}

#[test]
fn test_log_format_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"));
}

#[test]
fn test_verbosity_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

#[test]
fn test_config_default_path_and_env() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: config.yaml]"))
        .stdout(predicate::str::contains("CONFIG_PATH"));
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_7() {
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "health-check"])
        .assert()
        .code(7);
}

#[test]
fn test_config_path_from_env() {
    let mut command = Command::cargo_bin("evolution").unwrap();
    command
        .env("CONFIG_PATH", "nonexistent_env_config.yaml")
        .arg("health-check")
        .assert()
        .code(7)
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let file = config_file("invalid: yaml: content: [\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1);
}

#[test]
fn test_wrong_database_type_exits_with_code_1() {
    let file = config_file(
        "system:\n  database:\n    type: postgres\n    host: db\n    user: root\n    target: sys\n",
    );

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("mysql"));
}

#[test]
fn test_transfer_without_legacy_section_exits_with_code_1() {
    let file = config_file("server:\n  addr: 127.0.0.1:8080\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "transfer"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("legacy.database section is required"));
}

#[test]
fn test_host_name_server_addr_does_not_block_other_commands() {
    let file = config_file("server:\n  addr: localhost:8080\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "quant-type"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("quant section is required"))
        .stderr(predicate::str::contains("server.addr").not());
}

#[test]
fn test_transfer_rejects_non_positive_user_id() {
    let file = config_file("server:\n  addr: 127.0.0.1:8080\n");

    cmd()
        .args([
            "--config",
            file.path().to_str().unwrap(),
            "transfer",
            "--user-id",
            "0",
        ])
        .assert()
        .code(1);
}

#[test]
fn test_quant_type_without_quant_section_exits_with_code_1() {
    let file = config_file("server:\n  addr: 127.0.0.1:8080\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "quant-type"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("quant section is required"));
}

#[test]
fn test_health_check_with_no_databases_is_healthy() {
    let file = config_file("server:\n  addr: 127.0.0.1:8080\n");

    cmd()
        .args([
            "--config",
            file.path().to_str().unwrap(),
            "--output-json",
            "health-check",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"system\": null"));
}

// =============================================================================
// No Subcommand Tests
// =============================================================================

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}
