use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("splitter")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("split").and(predicate::str::contains("analyze")));
}

#[test]
fn test_split_help_documents_inputs() {
    Command::cargo_bin("splitter")
        .unwrap()
        .args(["split", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--chunk-length").and(predicate::str::contains("--zip")));
}

#[test]
fn test_missing_local_input_fails_with_message() {
    Command::cargo_bin("splitter")
        .unwrap()
        .args(["split", "--input", "/definitely/not/here.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to acquire source"));
}

#[test]
fn test_analyze_missing_input_fails() {
    Command::cargo_bin("splitter")
        .unwrap()
        .args(["analyze", "--input", "/definitely/not/here.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to acquire source"));
}
