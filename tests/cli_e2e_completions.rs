//! End-to-end tests for the `spec-jsonschema completions` command.
//!
//! These tests verify the CLI behavior of the `completions` command by invoking
//! the binary directly and checking its output.

#[allow(dead_code)]
mod common;
#[allow(unused_imports)]
use common::prelude::*;

#[test]
fn test_completions_help() {
    let mut cmd = cargo_bin_cmd!("spec-jsonschema");
    cmd.arg("completions")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Generate shell completion scripts",
        ))
        .stdout(predicate::str::contains("bash"))
        .stdout(predicate::str::contains("zsh"))
        .stdout(predicate::str::contains("fish"))
        .stdout(predicate::str::contains("powershell"))
        .stdout(predicate::str::contains("elvish"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = cargo_bin_cmd!("spec-jsonschema");
    cmd.arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_spec-jsonschema()"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("versions"))
        .stdout(predicate::str::contains("bundle"));
}

#[test]
fn test_completions_zsh() {
    let mut cmd = cargo_bin_cmd!("spec-jsonschema");
    cmd.arg("completions")
        .arg("zsh")
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef spec-jsonschema"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn test_completions_fish() {
    let mut cmd = cargo_bin_cmd!("spec-jsonschema");
    cmd.arg("completions")
        .arg("fish")
        .assert()
        .success()
        .stdout(predicate::str::contains("__fish_spec_jsonschema"))
        .stdout(predicate::str::contains("keep-going"));
}

#[test]
fn test_completions_powershell() {
    let mut cmd = cargo_bin_cmd!("spec-jsonschema");
    cmd.arg("completions")
        .arg("powershell")
        .assert()
        .success()
        .stdout(predicate::str::contains("Register-ArgumentCompleter"))
        .stdout(predicate::str::contains("spec-jsonschema"));
}

#[test]
fn test_completions_elvish() {
    let mut cmd = cargo_bin_cmd!("spec-jsonschema");
    cmd.arg("completions")
        .arg("elvish")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "edit:completion:arg-completer[spec-jsonschema]",
        ));
}

#[test]
fn test_completions_invalid_shell() {
    let mut cmd = cargo_bin_cmd!("spec-jsonschema");
    cmd.arg("completions")
        .arg("invalid-shell")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
