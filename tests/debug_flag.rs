// Verifies that -d traces every instruction to stderr and holds output until the end.
mod common;

use common::{cargo_bin, source_file};
use predicates::prelude::*;

#[test]
fn debug_flag_prints_table_to_stderr() {
    let tf = source_file(b">");
    cargo_bin()
        .arg("-d")
        .arg(tf.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("STEP | IP")
                .and(predicate::str::contains("Moved pointer head to index 1"))
                .and(predicate::str::contains("Completed in 1 steps")),
        );
}

#[test]
fn debug_output_is_flushed_once_at_the_end() {
    let tf = source_file(format!("{}..", "+".repeat(66)).as_bytes());
    cargo_bin()
        .arg("--debug")
        .arg(tf.path())
        .assert()
        .success()
        .stdout("BB")
        .stderr(predicate::str::contains("Output byte 66 (B)"));
}

#[test]
fn debug_output_buffer_is_bounded() {
    let tf = source_file(format!("{}...", "+".repeat(67)).as_bytes());
    cargo_bin()
        .args(["-d", "--output-size", "2"])
        .arg(tf.path())
        .assert()
        .success()
        .stdout("CC")
        .stderr(predicate::str::contains("1 output bytes dropped"));
}

#[test]
fn debug_trace_shows_loop_jumps() {
    let tf = source_file(b"[+]++[-]");
    cargo_bin()
        .arg("-d")
        .arg(tf.path())
        .assert()
        .success()
        .stderr(
            predicate::str::contains("jump forward to matching ']' at IP 2")
                .and(predicate::str::contains("jump back to matching '[' at IP 5")),
        );
}

#[test]
fn trace_delay_is_accepted() {
    let tf = source_file(b"++.");
    cargo_bin()
        .args(["-d", "--trace-delay", "1"])
        .arg(tf.path())
        .assert()
        .success()
        .stdout("\u{2}")
        .stderr(predicate::str::contains("Completed in 3 steps"));
}

#[cfg(target_os = "linux")]
#[test]
fn unwritable_stdout_fails_in_both_modes() {
    use assert_cmd::prelude::OutputAssertExt;
    use std::fs::OpenOptions;

    let tf = source_file(b"+++.");
    for (debug, message) in [
        (false, "I/O error at instruction 3"),
        (true, "failed to write program output"),
    ] {
        let full = OpenOptions::new().write(true).open("/dev/full").expect("/dev/full");
        let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_bf"));
        cmd.env("BF_CONFIG", "/nonexistent/bf.toml")
            .env_remove("BF_PROGRAM_SIZE")
            .env_remove("BF_TAPE_SIZE")
            .env_remove("BF_OUTPUT_SIZE")
            .env_remove("BF_MAX_STEPS")
            .env_remove("BF_EOF")
            .env_remove("RUST_LOG");
        if debug {
            cmd.arg("-d");
        }
        cmd.arg(tf.path())
            .stdout(full)
            .assert()
            .code(1)
            .stderr(predicate::str::contains(message));
    }
}
