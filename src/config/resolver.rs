//! Precedence resolution for aui settings.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`AUI_*`)
//! 3. config.kdl
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use super::expand_path;
use super::schema::{AuiConfig, validate_log_level};
use crate::{Error, Result};

pub const DATABASE_PATH_ENV: &str = "AUI_DATABASE_PATH";
pub const LOG_LEVEL_ENV: &str = "AUI_LOGGING_LEVEL";
pub const LOG_FILE_ENV: &str = "AUI_LOGGING_FILE";
pub const THEME_ENV: &str = "AUI_UI_THEME";
pub const REFRESH_RATE_ENV: &str = "AUI_UI_REFRESH_RATE";

const DEFAULT_DATABASE_FILE: &str = "aui.db";
const DEFAULT_LOG_FILE: &str = "aui.log";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_THEME: &str = "default";
const DEFAULT_REFRESH_RATE: u32 = 100;

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl
    ConfigFile,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::ConfigFile => write!(f, "config"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// CLI overrides for settings resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Database path from `--db`
    pub database_path: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set database path override.
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }
}

/// Fully resolved settings with source tracking.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: Resolved<PathBuf>,
    pub log_level: Resolved<String>,
    /// `None` when file logging is disabled
    pub log_file: Resolved<Option<PathBuf>>,
    pub theme: Resolved<String>,
    pub refresh_rate: Resolved<u32>,
}

impl Settings {
    /// Built-in defaults rooted at `config_dir`.
    pub fn defaults(config_dir: &Path) -> Self {
        Self {
            database_path: Resolved::new(
                config_dir.join(DEFAULT_DATABASE_FILE),
                ValueSource::Default,
            ),
            log_level: Resolved::new(DEFAULT_LOG_LEVEL.to_string(), ValueSource::Default),
            log_file: Resolved::new(
                Some(config_dir.join(DEFAULT_LOG_FILE)),
                ValueSource::Default,
            ),
            theme: Resolved::new(DEFAULT_THEME.to_string(), ValueSource::Default),
            refresh_rate: Resolved::new(DEFAULT_REFRESH_RATE, ValueSource::Default),
        }
    }

    /// Check the resolved values.
    pub fn validate(&self) -> Result<()> {
        if self.database_path.value.as_os_str().is_empty() {
            return Err(Error::Config("database path is required".to_string()));
        }
        validate_log_level(&self.log_level.value).map_err(Error::Config)?;
        if self.refresh_rate.value == 0 {
            return Err(Error::Config("refresh rate must be positive".to_string()));
        }
        Ok(())
    }

    /// The effective settings as a config file document.
    pub fn to_config(&self) -> AuiConfig {
        AuiConfig {
            database_path: Some(self.database_path.value.to_string_lossy().to_string()),
            log_level: Some(self.log_level.value.clone()),
            log_file: Some(
                self.log_file
                    .value
                    .as_ref()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_default(),
            ),
            theme: Some(self.theme.value.clone()),
            refresh_rate: Some(i64::from(self.refresh_rate.value)),
        }
    }
}

/// Resolve settings from the process environment.
pub fn resolve_settings(
    file: &AuiConfig,
    overrides: &ConfigOverrides,
    config_dir: &Path,
) -> Result<Settings> {
    resolve_settings_with_env(file, overrides, config_dir, |name| {
        std::env::var(name).ok()
    })
}

/// Resolve settings with an injectable environment lookup.
///
/// Empty environment values count as unset. An unparsable or non-positive
/// `AUI_UI_REFRESH_RATE` is ignored.
pub fn resolve_settings_with_env<F>(
    file: &AuiConfig,
    overrides: &ConfigOverrides,
    config_dir: &Path,
    env: F,
) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    file.validate().map_err(Error::Config)?;

    let env = |name: &str| env(name).filter(|v| !v.is_empty());
    let mut settings = Settings::defaults(config_dir);

    // config.kdl
    if let Some(ref path) = file.database_path {
        settings.database_path = Resolved::new(expand_path(path), ValueSource::ConfigFile);
    }
    if let Some(ref level) = file.log_level {
        settings.log_level = Resolved::new(level.clone(), ValueSource::ConfigFile);
    }
    if let Some(ref log_file) = file.log_file {
        let value = (!log_file.is_empty()).then(|| expand_path(log_file));
        settings.log_file = Resolved::new(value, ValueSource::ConfigFile);
    }
    if let Some(ref theme) = file.theme {
        settings.theme = Resolved::new(theme.clone(), ValueSource::ConfigFile);
    }
    if let Some(rate) = file.refresh_rate.and_then(|r| u32::try_from(r).ok()) {
        settings.refresh_rate = Resolved::new(rate, ValueSource::ConfigFile);
    }

    // Environment
    let from_env = |name: &str| ValueSource::EnvVar(name.to_string());
    if let Some(path) = env(DATABASE_PATH_ENV) {
        settings.database_path = Resolved::new(expand_path(&path), from_env(DATABASE_PATH_ENV));
    }
    if let Some(level) = env(LOG_LEVEL_ENV) {
        settings.log_level = Resolved::new(level, from_env(LOG_LEVEL_ENV));
    }
    if let Some(log_file) = env(LOG_FILE_ENV) {
        settings.log_file = Resolved::new(Some(expand_path(&log_file)), from_env(LOG_FILE_ENV));
    }
    if let Some(theme) = env(THEME_ENV) {
        settings.theme = Resolved::new(theme, from_env(THEME_ENV));
    }
    if let Some(rate) = env(REFRESH_RATE_ENV)
        .and_then(|r| r.trim().parse::<u32>().ok())
        .filter(|r| *r > 0)
    {
        settings.refresh_rate = Resolved::new(rate, from_env(REFRESH_RATE_ENV));
    }

    // CLI flags
    if let Some(ref path) = overrides.database_path {
        settings.database_path = Resolved::new(path.clone(), ValueSource::CliFlag);
    }

    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let dir = Path::new("/home/user/.config/aui");
        let settings = resolve_settings_with_env(
            &AuiConfig::new(),
            &ConfigOverrides::new(),
            dir,
            env_of(&[]),
        )
        .unwrap();

        assert_eq!(settings.database_path.value, dir.join("aui.db"));
        assert_eq!(settings.database_path.source, ValueSource::Default);
        assert_eq!(settings.log_level.value, "info");
        assert_eq!(settings.log_file.value, Some(dir.join("aui.log")));
        assert_eq!(settings.theme.value, "default");
        assert_eq!(settings.refresh_rate.value, 100);
    }

    #[test]
    fn test_config_file_values() {
        let file = AuiConfig {
            database_path: Some("/data/aui.db".to_string()),
            log_level: Some("debug".to_string()),
            log_file: Some(String::new()),
            theme: Some("dark".to_string()),
            refresh_rate: Some(50),
        };
        let settings = resolve_settings_with_env(
            &file,
            &ConfigOverrides::new(),
            Path::new("/cfg"),
            env_of(&[]),
        )
        .unwrap();

        assert_eq!(settings.database_path.value, PathBuf::from("/data/aui.db"));
        assert_eq!(settings.database_path.source, ValueSource::ConfigFile);
        assert_eq!(settings.log_level.value, "debug");
        assert_eq!(settings.log_file.value, None);
        assert_eq!(settings.theme.value, "dark");
        assert_eq!(settings.refresh_rate.value, 50);
    }

    #[test]
    fn test_env_overrides_config_file() {
        let file = AuiConfig {
            database_path: Some("/data/aui.db".to_string()),
            theme: Some("dark".to_string()),
            ..AuiConfig::default()
        };
        let env = env_of(&[
            (DATABASE_PATH_ENV, "/env/aui.db"),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_FILE_ENV, "/env/aui.log"),
            (THEME_ENV, "light"),
            (REFRESH_RATE_ENV, "200"),
        ]);
        let settings =
            resolve_settings_with_env(&file, &ConfigOverrides::new(), Path::new("/cfg"), env)
                .unwrap();

        assert_eq!(settings.database_path.value, PathBuf::from("/env/aui.db"));
        assert_eq!(
            settings.database_path.source,
            ValueSource::EnvVar(DATABASE_PATH_ENV.to_string())
        );
        assert_eq!(settings.log_level.value, "warn");
        assert_eq!(settings.log_file.value, Some(PathBuf::from("/env/aui.log")));
        assert_eq!(settings.theme.value, "light");
        assert_eq!(settings.refresh_rate.value, 200);
    }

    #[test]
    fn test_invalid_env_refresh_rate_ignored() {
        for bad in ["-5", "0", "fast"] {
            let settings = resolve_settings_with_env(
                &AuiConfig::new(),
                &ConfigOverrides::new(),
                Path::new("/cfg"),
                env_of(&[(REFRESH_RATE_ENV, bad)]),
            )
            .unwrap();
            assert_eq!(settings.refresh_rate.value, 100, "value {}", bad);
        }
    }

    #[test]
    fn test_cli_flag_wins() {
        let overrides = ConfigOverrides::new().with_database_path("/flag/aui.db");
        let settings = resolve_settings_with_env(
            &AuiConfig::new(),
            &overrides,
            Path::new("/cfg"),
            env_of(&[(DATABASE_PATH_ENV, "/env/aui.db")]),
        )
        .unwrap();

        assert_eq!(settings.database_path.value, PathBuf::from("/flag/aui.db"));
        assert_eq!(settings.database_path.source, ValueSource::CliFlag);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let result = resolve_settings_with_env(
            &AuiConfig::new(),
            &ConfigOverrides::new(),
            Path::new("/cfg"),
            env_of(&[(LOG_LEVEL_ENV, "loud")]),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_to_config_round_trips_through_resolution() {
        let settings = Settings::defaults(Path::new("/cfg"));
        let file = settings.to_config();
        let again = resolve_settings_with_env(
            &file,
            &ConfigOverrides::new(),
            Path::new("/elsewhere"),
            env_of(&[]),
        )
        .unwrap();

        assert_eq!(again.database_path.value, PathBuf::from("/cfg/aui.db"));
        assert_eq!(again.log_file.value, Some(PathBuf::from("/cfg/aui.log")));
    }

    #[test]
    fn test_value_source_display() {
        assert_eq!(ValueSource::CliFlag.to_string(), "cli");
        assert_eq!(
            ValueSource::EnvVar("AUI_UI_THEME".to_string()).to_string(),
            "env:AUI_UI_THEME"
        );
        assert_eq!(ValueSource::ConfigFile.to_string(), "config");
        assert_eq!(ValueSource::Default.to_string(), "default");
    }
}
