//! Files attached to contexts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::generate_id;
use crate::language::detect_language;

/// A file captured into a context, with its content and metadata.
///
/// Two files are equal when their `path` and `hash` match; every other
/// field is ignored by `==`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    /// Unique identifier (16 hex chars)
    pub id: String,

    /// Path on disk; unique across the store
    pub path: String,

    /// Display name, usually the base name
    pub name: String,

    /// Captured content
    #[serde(default)]
    pub content: String,

    /// Size in bytes
    #[serde(default)]
    pub size: i64,

    /// Hex SHA-256 of the content
    #[serde(default)]
    pub hash: String,

    /// Detected language tag; empty when unknown
    #[serde(default)]
    pub language: String,

    /// Estimated token count
    #[serde(default)]
    pub tokens: usize,

    /// Modification time when the content was captured
    pub modified_at: DateTime<Utc>,
}

impl File {
    /// Create a file with a fresh ID and `modified_at` set to now.
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            path: path.into(),
            name: name.into(),
            content: String::new(),
            size: 0,
            hash: String::new(),
            language: String::new(),
            tokens: 0,
            modified_at: Utc::now(),
        }
    }

    /// Replace all metadata in one go.
    pub fn update_metadata(
        &mut self,
        size: i64,
        hash: impl Into<String>,
        language: impl Into<String>,
        tokens: usize,
        modified_at: DateTime<Utc>,
    ) {
        self.size = size;
        self.hash = hash.into();
        self.language = language.into();
        self.tokens = tokens;
        self.modified_at = modified_at;
    }

    /// Set `language` from the path.
    pub fn detect_language(&mut self) {
        self.language = detect_language(&self.path).to_string();
    }

    /// Staleness predicate: true when the candidate hash differs or the
    /// candidate modification time is strictly later than the stored one.
    pub fn needs_update(&self, new_hash: &str, new_mod_time: DateTime<Utc>) -> bool {
        self.hash != new_hash || new_mod_time > self.modified_at
    }
}

impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.hash == other.hash
    }
}

impl Eq for File {}
