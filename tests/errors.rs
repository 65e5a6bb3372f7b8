use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command { Command::cargo_bin("bf").unwrap() }

#[test]
fn test_invalid_character_error() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("--no-filter").arg("+a+")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Parse error: invalid character 'a' at instruction 1"))
    .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_comment_characters_ignored_by_default() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("+a+")
    .assert()
    .success()
    .stderr(predicate::str::is_empty());
}

#[test]
fn test_unmatched_open_bracket_error() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("[")
    .assert()
    .failure()
    .stderr(predicate::str::contains("unmatched bracket '['").and(predicate::str::contains("scanning forward")));
}

#[test]
fn test_unmatched_close_bracket_error() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("+]")
    .assert()
    .failure()
    .stderr(predicate::str::contains("unmatched bracket ']'").and(predicate::str::contains("at instruction 1")));
}

#[test]
fn test_unmatched_bracket_is_reported_before_any_output() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("+++.[")
    .assert()
    .failure()
    .stdout(predicate::str::contains("\u{3}").not());
}

#[test]
fn test_lazy_brackets_run_until_the_bracket() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("--lazy-brackets").arg("+++.+[")
    .assert()
    .failure()
    .stdout(predicate::str::contains("\u{3}"))
    .stderr(predicate::str::contains("unmatched bracket '['"));
}

#[test]
fn test_pointer_left_of_origin_error() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("+<")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Runtime error: pointer out of bounds (ptr=0, op=<) at instruction 1"));
}

#[test]
fn test_fixed_tape_right_edge_error() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("--tape").arg("fixed:4").arg(">>>>")
    .assert()
    .failure()
    .stderr(predicate::str::contains("pointer out of bounds (ptr=3, op=>)"));
}

#[test]
fn test_growable_tape_extends() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("--tape").arg("growable").arg(&">".repeat(100))
    .assert()
    .success();
}

#[test]
fn test_eof_error_policy() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("--eof").arg("error").arg(",")
    .write_stdin("")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Runtime error: end of input at instruction 0"));
}

#[test]
fn test_invalid_flag_value_is_usage_error() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("--tape").arg("fixed:0").arg("+")
    .assert()
    .failure()
    .stderr(predicate::str::contains("tape"));
}
