//! Integration tests for command mode (-c/--command flag) and stdin mode

use std::io::Write;
use std::process::{Command, Stdio};

fn cellflow() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cellflow"));
    // Tests must be deterministic and not depend on a user's config.toml.
    cmd.args(["--rows", "6", "--cols", "6"]);
    cmd
}

fn run_command(args: &[&str]) -> (String, String, i32) {
    let output = cellflow()
        .args(args)
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn run_stdin(input: &str) -> (String, String, i32) {
    let mut child = cellflow()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn cellflow");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    let output = child.wait_with_output().expect("Failed to wait for cellflow");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

#[test]
fn test_single_dependency() {
    let (stdout, _, code) = run_command(&["-c", "A1 5", "-c", "B1 =A1+1", "-c", "get B1"]);
    assert_eq!(stdout.trim(), "6");
    assert_eq!(code, 0);
}

#[test]
fn test_transitive_propagation() {
    let args: Vec<&str> = ["A1 5", "B1 =A1+1", "C1 =B1*2", "A1 10", "get B1", "get C1"]
        .into_iter()
        .flat_map(|command| ["-c", command])
        .collect();
    let (stdout, _, code) = run_command(&args);
    assert_eq!(stdout.trim(), "11\n22");
    assert_eq!(code, 0);
}

#[test]
fn test_eval_constant() {
    let (stdout, _, code) = run_command(&["-c", "eval (1 + 2) * 3"]);
    assert_eq!(stdout.trim(), "9");
    assert_eq!(code, 0);
}

#[test]
fn test_cycle_exit_code() {
    let (_, stderr, code) = run_command(&["-c", "A1 =B1", "-c", "B1 =A1"]);
    assert!(stderr.contains("Circular dependency detected: B1 -> A1 -> B1"));
    assert_eq!(code, 1);
}

#[test]
fn test_unknown_reference_exit_code() {
    let (_, stderr, code) = run_command(&["-c", "A1 =Z99"]);
    assert!(stderr.contains("Unknown reference: Z99"));
    assert_eq!(code, 1);
}

#[test]
fn test_grid_size_flags() {
    let (stdout, _, code) =
        run_command(&["--rows", "2", "--cols", "2", "-c", "B2 7", "-c", "show"]);
    assert_eq!(stdout, "  | B\n2 | 7\n");
    assert_eq!(code, 0);

    let (_, stderr, code) = run_command(&["--rows", "2", "--cols", "2", "-c", "C1 7"]);
    assert!(stderr.contains("Unknown reference: C1"));
    assert_eq!(code, 1);
}

#[test]
fn test_invalid_grid_size() {
    let (_, stderr, code) = run_command(&["--rows", "0", "-c", "show"]);
    assert!(stderr.contains("Invalid grid configuration"));
    assert_eq!(code, 1);
}

#[test]
fn test_stdin_continues_after_errors() {
    let (stdout, stderr, code) = run_stdin("A1 2\nB1 =A1*\nB1 =A1*21\n# done\nget B1\nformulas\n");
    assert_eq!(stdout, "42\nB1: =A1*21\n");
    assert!(stderr.contains("Malformed formula in B1"));
    assert_eq!(code, 1);
}

#[test]
fn test_stdin_rejects_deeply_nested_formula() {
    let input = format!(
        "A1 ={}1{}\nA1 5\nget A1\n",
        "(".repeat(10_000),
        ")".repeat(10_000)
    );
    let (stdout, stderr, code) = run_stdin(&input);
    assert_eq!(stdout, "5\n");
    assert!(stderr.contains("nests deeper than"));
    assert_eq!(code, 1);
}
