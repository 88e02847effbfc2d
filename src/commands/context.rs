//! Context commands.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Deleted, Output, to_json};
use crate::{Error, Result};
use crate::models::{Context, File};
use crate::scan::{self, RefreshReport};
use crate::storage::Store;

/// File metadata without content, as shown by `context show`.
#[derive(Debug, Serialize)]
pub struct FileSummary {
    pub id: String,
    pub path: String,
    pub name: String,
    pub language: String,
    pub size: i64,
    pub tokens: usize,
    pub hash: String,
    pub modified_at: DateTime<Utc>,
}

impl From<&File> for FileSummary {
    fn from(file: &File) -> Self {
        Self {
            id: file.id.clone(),
            path: file.path.clone(),
            name: file.name.clone(),
            language: file.language.clone(),
            size: file.size,
            tokens: file.tokens,
            hash: file.hash.clone(),
            modified_at: file.modified_at,
        }
    }
}

/// A context and its member files.
#[derive(Debug, Serialize)]
pub struct ContextDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    pub total_tokens: usize,
    pub files: Vec<FileSummary>,
}

impl From<&Context> for ContextDetail {
    fn from(context: &Context) -> Self {
        Self {
            id: context.id.clone(),
            name: context.name.clone(),
            description: context.description.clone(),
            total_tokens: context.total_tokens,
            files: context.files.iter().map(FileSummary::from).collect(),
        }
    }
}

impl Output for ContextDetail {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("[{}] {}", self.id, self.name)];
        if !self.description.is_empty() {
            lines.push(format!("  {}", self.description));
        }
        lines.push(format!(
            "  {} file(s), {} tokens",
            self.files.len(),
            self.total_tokens
        ));
        for file in &self.files {
            let language = if file.language.is_empty() {
                "-"
            } else {
                file.language.as_str()
            };
            lines.push(format!(
                "    {} ({}, {} tokens)",
                file.path, language, file.tokens
            ));
        }
        lines.join("\n")
    }
}

/// One row of `context list`.
#[derive(Debug, Serialize)]
pub struct ContextSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub total_tokens: usize,
}

/// All contexts, newest first.
#[derive(Debug, Serialize)]
pub struct ContextList {
    pub contexts: Vec<ContextSummary>,
    pub count: usize,
}

impl Output for ContextList {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        if self.contexts.is_empty() {
            return "No contexts.".to_string();
        }
        let mut lines = vec![format!("{} context(s):", self.count)];
        for c in &self.contexts {
            lines.push(format!("  [{}] {} ({} tokens)", c.id, c.name, c.total_tokens));
        }
        lines.join("\n")
    }
}

/// Outcome of `context add`.
#[derive(Debug, Serialize)]
pub struct AddFilesResult {
    pub context_id: String,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub total_tokens: usize,
}

impl Output for AddFilesResult {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for path in &self.added {
            lines.push(format!("Added {}", path));
        }
        for path in &self.updated {
            lines.push(format!("Updated {}", path));
        }
        for path in &self.unchanged {
            lines.push(format!("Unchanged {}", path));
        }
        lines.push(format!("Context {}: {} tokens", self.context_id, self.total_tokens));
        lines.join("\n")
    }
}

/// Outcome of `context remove`.
#[derive(Debug, Serialize)]
pub struct RemoveFileResult {
    pub context_id: String,
    pub path: String,
    pub removed: bool,
    pub total_tokens: usize,
}

impl Output for RemoveFileResult {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        if self.removed {
            format!(
                "Removed {} from {} ({} tokens left)",
                self.path, self.context_id, self.total_tokens
            )
        } else {
            format!("{} is not in context {}", self.path, self.context_id)
        }
    }
}

/// Outcome of `context refresh`.
#[derive(Debug, Serialize)]
pub struct RefreshResult {
    pub context_id: String,
    #[serde(flatten)]
    pub report: RefreshReport,
    pub total_tokens: usize,
}

impl Output for RefreshResult {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Refreshed {}: {} updated, {} unchanged, {} missing",
            self.context_id,
            self.report.updated.len(),
            self.report.unchanged.len(),
            self.report.missing.len()
        )];
        for path in &self.report.updated {
            lines.push(format!("  updated {}", path));
        }
        for path in &self.report.missing {
            lines.push(format!("  missing {}", path));
        }
        lines.join("\n")
    }
}

pub fn context_create(store: &mut Store, name: &str, description: &str) -> Result<ContextDetail> {
    let context = Context::new(name, description);
    store.save_context(&context)?;
    Ok(ContextDetail::from(&context))
}

pub fn context_list(store: &Store) -> Result<ContextList> {
    let contexts: Vec<ContextSummary> = store
        .list_contexts()?
        .into_iter()
        .map(|c| ContextSummary {
            id: c.id,
            name: c.name,
            description: c.description,
            total_tokens: c.total_tokens,
        })
        .collect();
    let count = contexts.len();
    Ok(ContextList { contexts, count })
}

pub fn context_show(store: &Store, id: &str) -> Result<ContextDetail> {
    let context = store.get_context(id)?;
    Ok(ContextDetail::from(&context))
}

/// Read each path from disk and add it to the context.
///
/// Paths are stored in canonical form. Nothing is saved unless every
/// path could be read.
pub fn context_add_files(store: &mut Store, id: &str, paths: &[PathBuf]) -> Result<AddFilesResult> {
    let mut context = store.get_context(id)?;
    let mut result = AddFilesResult {
        context_id: context.id.clone(),
        added: Vec::new(),
        updated: Vec::new(),
        unchanged: Vec::new(),
        total_tokens: 0,
    };

    for path in paths {
        let canonical = fs::canonicalize(path)
            .map_err(|e| Error::InvalidInput(format!("cannot read {}: {}", path.display(), e)))?;
        let file = scan::load_file(&canonical)?;
        let path = file.path.clone();
        match context.get_file(&path).map(|existing| *existing == file) {
            Some(true) => result.unchanged.push(path),
            Some(false) => {
                context.add_file(file);
                result.updated.push(path);
            }
            None => {
                context.add_file(file);
                result.added.push(path);
            }
        }
    }

    if !result.added.is_empty() || !result.updated.is_empty() {
        store.save_context(&context)?;
    }
    tracing::info!(
        context = %context.id,
        added = result.added.len(),
        updated = result.updated.len(),
        "added files to context"
    );
    result.total_tokens = context.total_tokens;
    Ok(result)
}

pub fn context_remove_file(store: &mut Store, id: &str, path: &str) -> Result<RemoveFileResult> {
    let mut context = store.get_context(id)?;
    let removed = context.has_file(path);
    if removed {
        context.remove_file(path);
        store.save_context(&context)?;
    }
    Ok(RemoveFileResult {
        context_id: context.id,
        path: path.to_string(),
        removed,
        total_tokens: context.total_tokens,
    })
}

pub fn context_clear(store: &mut Store, id: &str) -> Result<ContextDetail> {
    let mut context = store.get_context(id)?;
    context.clear();
    store.save_context(&context)?;
    Ok(ContextDetail::from(&context))
}

pub fn context_refresh(store: &mut Store, id: &str) -> Result<RefreshResult> {
    let mut context = store.get_context(id)?;
    let report = scan::refresh_context(&mut context);
    if report.changed() {
        store.save_context(&context)?;
    }
    Ok(RefreshResult {
        context_id: context.id,
        report,
        total_tokens: context.total_tokens,
    })
}

pub fn context_remove(store: &mut Store, id: &str) -> Result<Deleted> {
    store.delete_context(id)?;
    Ok(Deleted {
        kind: "context",
        id: id.to_string(),
    })
}
