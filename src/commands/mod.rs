//! Command implementations for the aui CLI.
//!
//! This module contains the logic behind each CLI command.
//! Commands are organized by entity type:
//! - `agent` - Agent CRUD and task lifecycle
//! - `context` - Context CRUD, file membership and disk refresh
//! - `store` - Store maintenance
//! - `config` - Settings inspection and persistence

pub mod agent;
pub mod config;
pub mod context;
pub mod store;

pub use agent::*;
pub use config::*;
pub use context::*;
pub use store::*;

use serde::Serialize;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Compact JSON for a serializable result.
pub(crate) fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// Result of a delete command.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub kind: &'static str,
    pub id: String,
}

impl Output for Deleted {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        format!("Deleted {} {}", self.kind, self.id)
    }
}
