//! Contexts: named, ordered sets of files for an assistant to consume.

use serde::{Deserialize, Serialize};

use super::File;
use crate::id::generate_id;

/// A named collection of files plus a running token total.
///
/// `files` never holds two entries with the same path, and `total_tokens`
/// equals the sum of `tokens` over `files` as long as the membership
/// methods below are used. Contexts returned by
/// [`Store::list_contexts`](crate::storage::Store::list_contexts) are the
/// exception: they carry the stored total with no files loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Unique identifier (16 hex chars)
    pub id: String,

    /// Context name
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Member files in insertion order
    #[serde(default)]
    pub files: Vec<File>,

    /// Sum of member token counts
    #[serde(default)]
    pub total_tokens: usize,
}

impl Context {
    /// Create an empty context with a fresh ID.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            description: description.into(),
            files: Vec::new(),
            total_tokens: 0,
        }
    }

    /// Add or replace a file, keyed by path.
    ///
    /// - same path and hash already present: no-op
    /// - same path, different hash: replaced in place, tokens adjusted
    /// - new path: appended
    pub fn add_file(&mut self, file: File) {
        if let Some(existing) = self.files.iter_mut().find(|f| f.path == file.path) {
            if *existing == file {
                return;
            }
            self.total_tokens = self.total_tokens.saturating_sub(existing.tokens) + file.tokens;
            *existing = file;
            return;
        }

        self.total_tokens += file.tokens;
        self.files.push(file);
    }

    /// Remove the file with `path`, if present.
    pub fn remove_file(&mut self, path: &str) {
        if let Some(index) = self.files.iter().position(|f| f.path == path) {
            let removed = self.files.remove(index);
            self.total_tokens = self.total_tokens.saturating_sub(removed.tokens);
        }
    }

    pub fn get_file(&self, path: &str) -> Option<&File> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.get_file(path).is_some()
    }

    /// Drop every file and reset the token total. Name and description stay.
    pub fn clear(&mut self) {
        self.files.clear();
        self.total_tokens = 0;
    }

    /// Recompute `total_tokens` from the member files.
    pub fn recalculate_tokens(&mut self) {
        self.total_tokens = self.files.iter().map(|f| f.tokens).sum();
    }
}
