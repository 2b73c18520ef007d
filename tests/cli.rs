//! CLI binary integration tests (spec.md §6 "CLI").
//!
//! Grounded on the teacher's `tests/phase37_cli.rs`, which drives
//! filesystem-facing behavior (project build) through a `tempdir()` rather
//! than mocking the filesystem.

use std::fs;
use std::process::Command;

use tempfile::tempdir;

fn efuc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_efuc"))
}

#[test]
fn compiles_source_file_to_go_alongside_input() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("prog.efu");
    fs::write(&src, "fn main() { printnf(`hello'); }").unwrap();

    let status = efuc().arg(&src).current_dir(dir.path()).status().unwrap();
    assert!(status.success());

    let out = fs::read_to_string(dir.path().join("prog.go")).unwrap();
    assert!(out.contains("package main"));
    assert!(out.contains("fmt.Printf(\"hello\\n\")"));
}

#[test]
fn dash_out_with_trailing_slash_writes_into_that_directory() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("prog.efu");
    fs::write(&src, "fn main() { printnf(`hi'); }").unwrap();
    let build_dir = dir.path().join("build");
    fs::create_dir_all(&build_dir).unwrap();

    let status = efuc()
        .arg(&src)
        .arg("--target")
        .arg("js")
        .arg("--out")
        .arg(format!("{}/", build_dir.display()))
        .status()
        .unwrap();
    assert!(status.success());

    let out = fs::read_to_string(build_dir.join("prog.js")).unwrap();
    assert!(out.contains("function* main()"));
}

#[test]
fn debug_ir_prints_to_stdout_and_writes_no_file() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("prog.efu");
    fs::write(&src, "let x: = 1;").unwrap();

    let output = efuc().arg(&src).arg("--debug-ir").current_dir(dir.path()).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Keyword{let x,"));
    assert!(!dir.path().join("prog.go").exists());
}

#[test]
fn unknown_target_fails_with_nonzero_exit() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("prog.efu");
    fs::write(&src, "fn main() { return; }").unwrap();

    let status = efuc().arg(&src).arg("--target").arg("python").status().unwrap();
    assert!(!status.success());
}

#[test]
fn type_error_is_reported_on_stderr_with_nonzero_exit() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("prog.efu");
    fs::write(&src, "let x: bool = 5;").unwrap();

    let output = efuc().arg(&src).current_dir(dir.path()).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("bool"));
}
