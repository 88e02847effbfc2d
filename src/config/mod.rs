//! Configuration for aui.
//!
//! ## config.kdl - User preferences
//!
//! Located at `<config_dir>/aui/config.kdl` (e.g. `~/.config/aui/config.kdl`),
//! or wherever `--config` points.
//!
//! Contains:
//! - `database-path` - Location of the SQLite store
//! - `log-level` - debug, info, warn or error
//! - `log-file` - Log destination ("" logs to stderr)
//! - `theme`, `refresh-rate` - UI preferences
//!
//! Every value can be overridden by an `AUI_*` environment variable; the
//! database path can also come from `--db`. Use [`load_settings`] for the
//! fully resolved result.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, DATABASE_PATH_ENV, LOG_FILE_ENV, LOG_LEVEL_ENV, REFRESH_RATE_ENV, Resolved,
    Settings, THEME_ENV, ValueSource, resolve_settings, resolve_settings_with_env,
};
pub use schema::{AuiConfig, LOG_LEVELS};

use kdl::KdlDocument;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.kdl";

/// Directory holding config.kdl and, by default, the store and log.
pub fn default_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("aui"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// Default location of config.kdl.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(default_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Expand a leading `~/` to the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Read and parse a config file.
pub fn load_file(path: &Path) -> Result<AuiConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("failed to read config file {}: {}", path.display(), e))
    })?;
    let doc: KdlDocument = content.parse().map_err(|e| {
        Error::Config(format!("failed to parse config file {}: {}", path.display(), e))
    })?;
    Ok(AuiConfig::from_kdl(&doc))
}

/// Write a config file, creating the parent directory.
pub fn save_file(config: &AuiConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut doc = config.to_kdl();
    doc.autoformat();
    fs::write(path, doc.to_string())?;
    Ok(())
}

/// Load and resolve settings.
///
/// An explicit `config_path` must exist. Without one, the default
/// config.kdl is used if present and defaults apply otherwise.
pub fn load_settings(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Settings> {
    let config_dir = default_config_dir()?;
    let file = match config_path {
        Some(path) => load_file(path)?,
        None => {
            let path = config_dir.join(CONFIG_FILE_NAME);
            if path.exists() {
                load_file(&path)?
            } else {
                AuiConfig::default()
            }
        }
    };
    resolve_settings(&file, overrides, &config_dir)
}
