//! aui - agent and context tracking for AI coding assistants.
//!
//! This library provides the core of the `aui` terminal tool: the entity
//! model (agents, contexts, files), disk reconciliation for context files,
//! and the SQLite store that persists all of it.

pub mod cli;
pub mod commands;
pub mod config;
pub mod id;
pub mod language;
pub mod logging;
pub mod models;
pub mod scan;
pub mod storage;

use std::path::PathBuf;


/// Library-level error type for aui operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot open store at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database error during {op}: {source}")]
    Database {
        op: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Constraint violation during {op}: {source}")]
    ConstraintViolation {
        op: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Malformed data: {0}")]
    MalformedData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Wrap an engine error with the operation that produced it.
    ///
    /// Constraint failures get their own variant so callers can tell
    /// integrity problems apart from plain I/O trouble.
    pub fn database(op: impl Into<String>, source: rusqlite::Error) -> Self {
        let op = op.into();
        match source.sqlite_error_code() {
            Some(rusqlite::ErrorCode::ConstraintViolation) => {
                Error::ConstraintViolation { op, source }
            }
            _ => Error::Database { op, source },
        }
    }

    /// True for `NotFound`, the one error callers routinely branch on.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Result type alias for aui operations.
pub type Result<T> = std::result::Result<T, Error>;
