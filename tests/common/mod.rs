use std::{path::PathBuf, sync::Mutex};

use assert_cmd::Command;
use once_cell::sync::Lazy;
use tempfile::TempDir;

pub const BIN_NAME: &str = "cuotas_cli";

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh application directory for one test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// The CLI pinned to `home`, without colors and with a fixed date.
pub fn cli(home: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary built");
    cmd.env("CUOTAS_HOME", home)
        .env("CUOTAS_TODAY", "2024-06-20")
        .env("NO_COLOR", "1")
        .env_remove("CUOTAS_CLI_SCRIPT")
        .env_remove("RUST_LOG");
    cmd
}

/// The CLI reading commands from stdin.
pub fn script(home: &PathBuf) -> Command {
    let mut cmd = cli(home);
    cmd.env("CUOTAS_CLI_SCRIPT", "1");
    cmd
}
