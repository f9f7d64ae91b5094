#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use assert_cmd::Command;
use once_cell::sync::Lazy;
use tempfile::TempDir;

pub const BIN_NAME: &str = "trio_cli";

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh application home that outlives the test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// The CLI binary in script mode, rooted at `home`.
pub fn script_command(home: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("TRIO_CLI_SCRIPT", "1")
        .env("TRIO_HOME", home)
        .env_remove("RUST_LOG");
    cmd
}

pub fn data_file(home: &PathBuf, name: &str) -> PathBuf {
    home.join("data").join(format!("{name}.json"))
}
