//! Common test utilities for aui integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! user's `~/.config/aui/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// Environment variables that would leak user settings into a test run.
const AUI_ENV_VARS: &[&str] = &[
    "AUI_DATABASE_PATH",
    "AUI_LOGGING_LEVEL",
    "AUI_LOGGING_FILE",
    "AUI_UI_THEME",
    "AUI_UI_REFRESH_RATE",
    "AUI_LOG",
];

/// A test environment with isolated data storage.
///
/// Each `TestEnv` creates two temporary directories:
/// - `work_dir`: Holds files that tests add to contexts
/// - `data_dir`: Holds config.kdl, the store and the log
///
/// The `aui()` method returns a `Command` pointed at this environment's
/// config and store, making tests parallel-safe.
pub struct TestEnv {
    pub work_dir: TempDir,
    pub data_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with a config.kdl that logs to a file.
    pub fn new() -> Self {
        let env = Self {
            work_dir: TempDir::new().unwrap(),
            data_dir: TempDir::new().unwrap(),
        };
        let log_file = env.data_dir.path().join("aui.log");
        std::fs::write(
            env.config_path(),
            format!("log-file \"{}\"\nlog-level \"debug\"\n", log_file.display()),
        )
        .unwrap();
        env
    }

    /// Get a Command for the aui binary with isolated config and store.
    pub fn aui(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_aui"));
        cmd.current_dir(self.work_dir.path());
        for var in AUI_ENV_VARS {
            cmd.env_remove(var);
        }
        cmd.arg("--config").arg(self.config_path());
        cmd.env("AUI_DATABASE_PATH", self.db_path());
        cmd
    }

    /// Run `aui` with `args`, assert success and parse stdout as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.aui().args(args).assert().success().get_output().clone();
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// Write a file into the work directory and return its canonical path.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.work_dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        std::fs::canonicalize(path).unwrap()
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.path().join("config.kdl")
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.path().join("aui.db")
    }

    pub fn work_path(&self) -> &Path {
        self.work_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
