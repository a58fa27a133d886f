use assert_cmd::prelude::*;
use assert_cmd::cargo::cargo_bin_cmd;

/// Tests that `--help` is handled successfully by the CLI.
///
/// This test verifies:
/// 1. Running `tablerank-cli --help` exits successfully
/// 2. The help text lists the subcommands
/// 3. No unexpected stderr output is produced
#[test]
fn test_cli_help_success() {
  let mut cmd = cargo_bin_cmd!("tablerank-cli");

  let assert = cmd.arg("--help").assert().success();

  let out = assert.get_output();
  let stdout = String::from_utf8_lossy(&out.stdout);
  println!("=== tablerank-cli --help stdout ===\n\n{}\n===================================", stdout);

  for command in ["restaurant", "rating", "seed"] {
  	assert!(stdout.contains(command), "expected `{}` in --help output", command);
  }
  assert!(
  	out.stderr.is_empty(),
  	"expected empty stderr for --help, got:\n{}",
  	String::from_utf8_lossy(&out.stderr)
  );
}

/// Tests that an unknown meal is rejected by argument parsing
#[test]
fn test_cli_rejects_invalid_meal() {
  let mut cmd = cargo_bin_cmd!("tablerank-cli");

  cmd.args(["rating", "add", "1", "--user", "u", "--service", "5", "--food", "5", "--ambiance", "5", "--meal", "Supper"])
  	.assert()
  	.failure();
}

/// Tests that an unreachable server is reported on stderr with exit code 1
#[test]
fn test_cli_unreachable_server() {
  let mut cmd = cargo_bin_cmd!("tablerank-cli");

  let assert = cmd
  	.args(["--server", "http://127.0.0.1:9", "restaurant", "list"])
  	.assert()
  	.code(1);

  let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
  assert!(stderr.starts_with("Error:"), "unexpected stderr:\n{}", stderr);
}
