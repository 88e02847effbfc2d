//! Reading context files from disk and reconciling them with stored state.
//!
//! A [`Snapshot`] is the cheap-to-compare view of a file on disk (hash and
//! modification time). [`refresh_context`] uses it with
//! [`File::needs_update`] to decide which members must be re-read.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::language::detect_language;
use crate::models::{Context, File};
use crate::{Error, Result};

/// Characters per token used for estimation.
const CHARS_PER_TOKEN: usize = 4;

/// Point-in-time view of a file on disk.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub content: String,
    pub size: i64,
    pub hash: String,
    pub modified_at: DateTime<Utc>,
}

/// Outcome of reconciling a context against disk.
#[derive(Debug, Default, Serialize)]
pub struct RefreshReport {
    /// Paths whose content was re-read
    pub updated: Vec<String>,
    /// Paths that matched the captured hash and mtime
    pub unchanged: Vec<String>,
    /// Paths that could not be read; left as captured
    pub missing: Vec<String>,
}

impl RefreshReport {
    pub fn changed(&self) -> bool {
        !self.updated.is_empty()
    }
}

/// Hex SHA-256 of `bytes`.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Rough token estimate: one token per four characters, rounded up.
pub fn estimate_tokens(content: &str) -> usize {
    content.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Read `path` and capture its content, hash and modification time.
pub fn snapshot(path: &Path) -> Result<Snapshot> {
    let bytes = fs::read(path)?;
    let metadata = fs::metadata(path)?;
    let modified_at: DateTime<Utc> = metadata.modified()?.into();
    let hash = hash_bytes(&bytes);
    let size = bytes.len() as i64;
    let content = String::from_utf8(bytes).map_err(|_| {
        Error::InvalidInput(format!("{} is not valid UTF-8 text", path.display()))
    })?;

    Ok(Snapshot {
        content,
        size,
        hash,
        modified_at,
    })
}

/// Build a [`File`] from the current state of `path` on disk.
pub fn load_file(path: &Path) -> Result<File> {
    let snap = snapshot(path)?;
    let path_str = path.to_string_lossy().to_string();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path_str.clone());

    let mut file = File::new(path_str, name);
    apply_snapshot(&mut file, snap);
    Ok(file)
}

fn apply_snapshot(file: &mut File, snap: Snapshot) {
    let tokens = estimate_tokens(&snap.content);
    let language = detect_language(&file.path);
    file.update_metadata(snap.size, snap.hash, language, tokens, snap.modified_at);
    file.content = snap.content;
}

/// Re-read every member of `context` that is stale on disk.
///
/// Updated files replace their entry in place through
/// [`Context::add_file`], so order and token accounting are preserved.
pub fn refresh_context(context: &mut Context) -> RefreshReport {
    let mut report = RefreshReport::default();
    let mut replacements = Vec::new();

    for file in &context.files {
        let snap = match snapshot(Path::new(&file.path)) {
            Ok(snap) => snap,
            Err(e) => {
                tracing::warn!(path = %file.path, error = %e, "context file unreadable");
                report.missing.push(file.path.clone());
                continue;
            }
        };

        if !file.needs_update(&snap.hash, snap.modified_at) {
            report.unchanged.push(file.path.clone());
            continue;
        }

        let mut updated = file.clone();
        apply_snapshot(&mut updated, snap);
        report.updated.push(file.path.clone());
        replacements.push(updated);
    }

    for file in replacements {
        // A touched file with identical content has the same hash and would
        // be ignored by add_file; swap it in directly to record the new mtime.
        if let Some(existing) = context.files.iter_mut().find(|f| f.path == file.path) {
            if *existing == file {
                *existing = file;
                continue;
            }
        }
        context.add_file(file);
    }

    tracing::debug!(
        context = %context.id,
        updated = report.updated.len(),
        unchanged = report.unchanged.len(),
        missing = report.missing.len(),
        "refreshed context"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_hash_bytes_known_value() {
        assert_eq!(
            hash_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.go");
        fs::write(&path, "package main\n").unwrap();

        let file = load_file(&path).unwrap();
        assert_eq!(file.name, "main.go");
        assert_eq!(file.content, "package main\n");
        assert_eq!(file.size, 13);
        assert_eq!(file.hash, hash_bytes(b"package main\n"));
        assert_eq!(file.language, "go");
        assert_eq!(file.tokens, 4);
    }

    #[test]
    fn test_load_file_rejects_binary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        assert!(matches!(load_file(&path), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_file(&dir.path().join("missing.rs")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_refresh_context_updates_changed_files() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.rs");
        let b = dir.path().join("b.rs");
        fs::write(&a, "fn a() {}").unwrap();
        fs::write(&b, "fn b() {}").unwrap();

        let mut ctx = Context::new("ctx", "");
        ctx.add_file(load_file(&a).unwrap());
        ctx.add_file(load_file(&b).unwrap());

        fs::write(&a, "fn a() { println!(\"changed\"); }").unwrap();

        let report = refresh_context(&mut ctx);
        assert_eq!(report.updated, vec![a.to_string_lossy().to_string()]);
        assert_eq!(report.unchanged, vec![b.to_string_lossy().to_string()]);
        assert!(report.missing.is_empty());
        assert!(report.changed());

        assert_eq!(ctx.files[0].path, a.to_string_lossy());
        assert!(ctx.files[0].content.contains("changed"));
        let sum: usize = ctx.files.iter().map(|f| f.tokens).sum();
        assert_eq!(ctx.total_tokens, sum);
    }

    #[test]
    fn test_refresh_context_reports_missing() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.rs");
        fs::write(&a, "fn a() {}").unwrap();

        let mut ctx = Context::new("ctx", "");
        ctx.add_file(load_file(&a).unwrap());
        fs::remove_file(&a).unwrap();

        let report = refresh_context(&mut ctx);
        assert_eq!(report.missing.len(), 1);
        assert!(!report.changed());
        assert_eq!(ctx.files.len(), 1);
    }
}
