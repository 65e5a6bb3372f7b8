// Verifies that --trace and --debug print per-instruction snapshots to stderr
// while program output stays on stdout.
use assert_cmd::Command;
use predicates::prelude::*;

fn cargo_bin() -> Command { Command::cargo_bin("bf").unwrap() }

#[test]
fn debug_flag_prints_table() {
    cargo_bin()
        .args(["run", "--debug", ">"]) // single instruction: move pointer right
        .assert()
        .success()
        .stdout("\n")
        .stderr(predicate::str::contains("STEP | IP")
            .and(predicate::str::contains("Moved pointer head to index 1"))
        );
}

#[test]
fn trace_table_format_matches_debug() {
    cargo_bin()
        .args(["run", "--trace=table", "+."])
        .assert()
        .success()
        .stdout("\u{1}\n")
        .stderr(predicate::str::contains("Increment cell[0] from 0 to 1")
            .and(predicate::str::contains("Output byte 1")));
}

#[test]
fn trace_diagram_shows_code_and_tape() {
    cargo_bin()
        .args(["run", "--trace", "++>+++<[->+<]"])
        .assert()
        .success()
        .stderr(predicate::str::contains("++>+++<[->+<] │ 02")
            .and(predicate::str::contains("│ 00 05"))
            .and(predicate::str::contains("↑")));
}

#[test]
fn trace_does_not_consume_code_argument() {
    cargo_bin()
        .args(["run", "--trace", "+++."])
        .assert()
        .success()
        .stdout("\u{3}\n");
}

#[test]
fn unknown_trace_format_is_rejected() {
    cargo_bin()
        .args(["run", "--trace=sparkles", "+"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid trace format"));
}
