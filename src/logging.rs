//! Tracing subscriber setup for the `aui` binary.
//!
//! Log output goes to the configured log file through a non-blocking
//! writer, or to stderr when file logging is disabled. Stdout is left for
//! command results. `AUI_LOG` takes an `EnvFilter` directive and wins over
//! the configured level.

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::{Error, Result};

/// Environment variable holding a full filter directive.
pub const LOG_FILTER_ENV: &str = "AUI_LOG";

/// Keeps the background log writer alive; flush happens on drop.
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

/// Filter directive for a configured level.
pub fn filter_directive(level: &str) -> String {
    format!("aui={}", level)
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(filter_directive(level)))
}

/// Install the global subscriber.
///
/// If a subscriber is already installed it is left in place.
pub fn init(level: &str, log_file: Option<&Path>) -> Result<LogGuard> {
    let filter = build_filter(level);

    let Some(path) = log_file else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
        return Ok(LogGuard { _guard: None });
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Config(format!("log file has no name: {}", path.display())))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy().to_string())
        .build(dir)
        .map_err(|e| Error::Config(format!("cannot open log file {}: {}", path.display(), e)))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    Ok(LogGuard {
        _guard: Some(guard),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("debug"), "aui=debug");
    }

    #[test]
    fn test_init_creates_log_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs").join("aui.log");

        let _guard = init("info", Some(&path)).unwrap();
        assert!(path.parent().unwrap().is_dir());
    }
}
