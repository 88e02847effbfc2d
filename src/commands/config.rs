//! Config commands.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{Output, to_json};
use crate::Result;
use crate::config::{self, Settings};

/// One resolved setting and where it came from.
#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: String,
    pub source: String,
}

/// Output of `config show`.
#[derive(Debug, Serialize)]
pub struct ConfigShow {
    pub settings: Vec<ConfigEntry>,
}

impl Output for ConfigShow {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        let width = self.settings.iter().map(|e| e.key.len()).max().unwrap_or(0);
        self.settings
            .iter()
            .map(|e| format!("{:width$}  {}  ({})", e.key, e.value, e.source, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Output of `config save`.
#[derive(Debug, Serialize)]
pub struct ConfigSaved {
    pub path: PathBuf,
}

impl Output for ConfigSaved {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        format!("Saved config to {}", self.path.display())
    }
}

pub fn config_show(settings: &Settings) -> ConfigShow {
    let log_file = settings
        .log_file
        .value
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    ConfigShow {
        settings: vec![
            ConfigEntry {
                key: "database-path",
                value: settings.database_path.value.display().to_string(),
                source: settings.database_path.source.to_string(),
            },
            ConfigEntry {
                key: "log-level",
                value: settings.log_level.value.clone(),
                source: settings.log_level.source.to_string(),
            },
            ConfigEntry {
                key: "log-file",
                value: log_file,
                source: settings.log_file.source.to_string(),
            },
            ConfigEntry {
                key: "theme",
                value: settings.theme.value.clone(),
                source: settings.theme.source.to_string(),
            },
            ConfigEntry {
                key: "refresh-rate",
                value: settings.refresh_rate.value.to_string(),
                source: settings.refresh_rate.source.to_string(),
            },
        ],
    }
}

/// Write the effective settings to `path`, or the default config.kdl.
pub fn config_save(settings: &Settings, path: Option<&Path>) -> Result<ConfigSaved> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config::default_config_path()?,
    };
    config::save_file(&settings.to_config(), &path)?;
    tracing::info!(path = %path.display(), "saved config");
    Ok(ConfigSaved { path })
}
