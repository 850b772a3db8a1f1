use assert_cmd::Command;
use std::io::Write;

/// The `bf` binary with a clean configuration environment.
pub fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.env("BF_CONFIG", "/nonexistent/bf.toml")
        .env_remove("BF_PROGRAM_SIZE")
        .env_remove("BF_TAPE_SIZE")
        .env_remove("BF_OUTPUT_SIZE")
        .env_remove("BF_MAX_STEPS")
        .env_remove("BF_EOF")
        .env_remove("RUST_LOG");
    cmd
}

pub fn source_file(content: &[u8]) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    tf.write_all(content).unwrap();
    tf
}
