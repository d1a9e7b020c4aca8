//! CLI tests: spawn the camlrun binary and check stdout, files, and exit codes.
#![cfg(unix)]

use std::fs;
use std::process::Command;

use camlrun::exit_codes;
use camlrun::test_support::write_file;

const TRANSCRIPT: &str = ">       Caml Light version 0.75\n\n#l : int list = [1; 2]\n#";

fn camlrun() -> Command {
    Command::new(env!("CARGO_BIN_EXE_camlrun"))
}

#[test]
fn runs_file_with_configured_interpreter() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_file(temp.path(), "camlrun.toml", "[interpreter]\ncommand = [\"cat\"]\n");
    write_file(temp.path(), "prog.ml", TRANSCRIPT);

    let output = camlrun()
        .current_dir(temp.path())
        .args(["prog.ml", "-o", "prog.out"])
        .output()
        .expect("run camlrun");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, "l : int list = [1; 2]\n\n");
    let written = fs::read_to_string(temp.path().join("prog.out")).expect("read out");
    assert_eq!(format!("{written}\n"), stdout);
}

#[test]
fn hide_prints_nothing() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_file(temp.path(), "prog.ml", TRANSCRIPT);

    let output = camlrun()
        .current_dir(temp.path())
        .env("CAMLRUN_INTERPRETER", "cat")
        .args(["prog.ml", "--hide"])
        .output()
        .expect("run camlrun");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(output.stdout.is_empty());
}

#[test]
fn missing_input_is_a_usage_error() {
    let temp = tempfile::tempdir().expect("tempdir");

    let output = camlrun()
        .current_dir(temp.path())
        .arg("missing.ml")
        .output()
        .expect("run camlrun");

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}

#[test]
fn interpreter_failure_exits_zero_with_message() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_file(temp.path(), "prog.ml", TRANSCRIPT);

    let plain = camlrun()
        .current_dir(temp.path())
        .env("CAMLRUN_INTERPRETER", "camlrun-test-missing-interpreter")
        .arg("prog.ml")
        .output()
        .expect("run camlrun");
    let verbose = camlrun()
        .current_dir(temp.path())
        .env("CAMLRUN_INTERPRETER", "camlrun-test-missing-interpreter")
        .args(["prog.ml", "--debug"])
        .output()
        .expect("run camlrun");

    assert_eq!(plain.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8(plain.stdout).unwrap(),
        "\nUnexpected error happened.\n"
    );
    assert_eq!(verbose.status.code(), Some(exit_codes::OK));
    assert!(
        String::from_utf8(verbose.stdout)
            .unwrap()
            .contains("Original error: [")
    );
}

#[test]
fn invalid_config_exits_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_file(temp.path(), "prog.ml", TRANSCRIPT);
    write_file(temp.path(), "broken.toml", "[interpreter]\ncommand = []\n");

    let output = camlrun()
        .current_dir(temp.path())
        .args(["prog.ml", "--config", "broken.toml"])
        .output()
        .expect("run camlrun");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("interpreter.command"));
}

#[test]
fn failure_without_debug_keeps_error_text_off_stderr() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_file(temp.path(), "prog.ml", TRANSCRIPT);

    let output = camlrun()
        .current_dir(temp.path())
        .env_remove("RUST_LOG")
        .env("CAMLRUN_INTERPRETER", "camlrun-test-hidden-interpreter")
        .arg("prog.ml")
        .output()
        .expect("run camlrun");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(stdout, "\nUnexpected error happened.\n");
    assert!(!stderr.contains("camlrun-test-hidden-interpreter"), "stderr: {stderr}");
    assert!(!stderr.contains("No such file"), "stderr: {stderr}");
}

#[test]
fn debug_flag_does_not_change_successful_run() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_file(temp.path(), "prog.ml", TRANSCRIPT);

    let run = |extra: &[&str]| {
        camlrun()
            .current_dir(temp.path())
            .env_remove("RUST_LOG")
            .env("CAMLRUN_INTERPRETER", "cat")
            .arg("prog.ml")
            .args(extra)
            .output()
            .expect("run camlrun")
    };
    let plain = run(&[]);
    let verbose = run(&["--debug"]);

    assert_eq!(plain.status.code(), Some(exit_codes::OK));
    assert_eq!(verbose.status.code(), Some(exit_codes::OK));
    assert_eq!(plain.stdout, verbose.stdout);
    assert_eq!(plain.stderr, verbose.stderr);
    assert!(plain.stderr.is_empty());
}
