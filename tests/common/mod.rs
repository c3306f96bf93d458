//! Shared integration-test helpers for running the `delirium-sim` binary
//! and locating fixtures.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

/// Absolute path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Same as [`fixture_path`], as a `String` for argument lists.
#[allow(clippy::missing_panics_doc)]
pub fn fixture(name: &str) -> String {
    fixture_path(name)
        .to_str()
        .expect("non-UTF-8 fixture path")
        .to_owned()
}

/// Runs the binary to completion with a clean logging environment.
#[allow(clippy::missing_panics_doc)]
pub fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_delirium-sim"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("DELIRIUM_SIM_LOG_LEVEL")
        .env_remove("DELIRIUM_SIM_CONFIG")
        .output()
        .expect("failed to run delirium-sim")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Parses stdout as a single JSON document.
#[allow(clippy::missing_panics_doc)]
pub fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}):\n{}\nstderr:\n{}",
            stdout(output),
            stderr(output)
        )
    })
}
