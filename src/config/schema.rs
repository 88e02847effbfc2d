//! KDL schema for config.kdl.
//!
//! This module provides:
//! - The `AuiConfig` struct mirroring the file
//! - Conversion to and from KDL documents
//! - Validation of individual values
//!
//! # KDL Schema
//!
//! ```kdl
//! database-path "~/.config/aui/aui.db"
//! log-level "info"      // debug, info, warn or error
//! log-file "~/.config/aui/aui.log"   // "" disables file logging
//! theme "default"
//! refresh-rate 100      // milliseconds, must be positive
//! ```

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Accepted values for `log-level`.
pub const LOG_LEVELS: &[&str] = &["debug", "info", "warn", "error"];

/// Settings read from config.kdl. Unset values fall through to the
/// environment and built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuiConfig {
    /// Location of the SQLite store
    pub database_path: Option<String>,

    /// Minimum log level
    pub log_level: Option<String>,

    /// Log file; an empty string disables file logging
    pub log_file: Option<String>,

    /// UI theme name
    pub theme: Option<String>,

    /// UI refresh interval in milliseconds
    pub refresh_rate: Option<i64>,
}

impl AuiConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the values that are set.
    ///
    /// Returns an error message for the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref path) = self.database_path {
            if path.trim().is_empty() {
                return Err("database-path must not be empty".to_string());
            }
        }
        if let Some(ref level) = self.log_level {
            validate_log_level(level)?;
        }
        if let Some(rate) = self.refresh_rate {
            if rate <= 0 {
                return Err(format!("refresh-rate must be positive, got {}", rate));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document. Unknown nodes are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        Self {
            database_path: string_node(doc, "database-path"),
            log_level: string_node(doc, "log-level"),
            log_file: string_node(doc, "log-file"),
            theme: string_node(doc, "theme"),
            refresh_rate: doc
                .get("refresh-rate")
                .and_then(|node| node.entries().first())
                .and_then(|entry| entry.value().as_integer())
                .and_then(|i| i64::try_from(i).ok()),
        }
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        let strings = [
            ("database-path", &self.database_path),
            ("log-level", &self.log_level),
            ("log-file", &self.log_file),
            ("theme", &self.theme),
        ];
        for (name, value) in strings {
            if let Some(value) = value {
                let mut node = KdlNode::new(name);
                node.push(KdlEntry::new(KdlValue::String(value.clone())));
                doc.nodes_mut().push(node);
            }
        }

        if let Some(rate) = self.refresh_rate {
            let mut node = KdlNode::new("refresh-rate");
            node.push(KdlEntry::new(KdlValue::Integer(rate as i128)));
            doc.nodes_mut().push(node);
        }

        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &AuiConfig) {
        if other.database_path.is_some() {
            self.database_path = other.database_path.clone();
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level.clone();
        }
        if other.log_file.is_some() {
            self.log_file = other.log_file.clone();
        }
        if other.theme.is_some() {
            self.theme = other.theme.clone();
        }
        if other.refresh_rate.is_some() {
            self.refresh_rate = other.refresh_rate;
        }
    }
}

/// Check a log level against [`LOG_LEVELS`].
pub fn validate_log_level(level: &str) -> Result<(), String> {
    if LOG_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(format!(
            "invalid log level: {} (must be debug, info, warn, or error)",
            level
        ))
    }
}

fn string_node(doc: &KdlDocument, name: &str) -> Option<String> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .and_then(|entry| entry.value().as_string())
        .map(|s| s.to_string())
}
