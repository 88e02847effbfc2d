//! Storage layer for aui data.
//!
//! This module persists agents and contexts (with their files) in a single
//! SQLite database file.
//!
//! ## Tables
//!
//! - `agents`, `contexts`, `files` hold one row per entity
//! - `context_files` is the ordered membership relation between contexts and
//!   files, with an explicit `position` column
//!
//! ## Write discipline
//!
//! Every multi-row write runs inside one transaction. Saving a context
//! upserts the context row, drops all of its membership rows, upserts each
//! file by path and re-inserts membership in the current order. Any failure
//! rolls the whole save back.
//!
//! Files are not deleted with their context. [`Store::prune_orphan_files`]
//! is the explicit sweep for file rows no context references any more.

pub mod schema;

use crate::models::{Agent, AgentStatus, Context, File};
use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};
use std::fs;
use std::path::{Path, PathBuf};

/// Storage manager backed by one SQLite file.
#[derive(Debug)]
pub struct Store {
    /// Location of the database file
    path: PathBuf,
    /// SQLite connection
    conn: Connection,
}

impl Store {
    /// Open or create the store at `path`.
    ///
    /// Parent directories are created as needed and the schema is applied.
    /// Fails with [`Error::Open`] when the file is not a usable database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        schema::apply(&conn).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), "opened store");
        Ok(Self { path, conn })
    }

    /// Close the store, releasing the database file.
    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn
            .close()
            .map_err(|(_, source)| Error::database(format!("close {}", path.display()), source))?;
        tracing::debug!(path = %path.display(), "closed store");
        Ok(())
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Begin a transaction for composing several writes atomically.
    ///
    /// Pass it to [`Store::save_agent_tx`] / [`Store::save_context_tx`] and
    /// call `commit()`; dropping it uncommitted rolls everything back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        self.conn
            .transaction()
            .map_err(|e| Error::database("begin transaction", e))
    }

    // === Agent Operations ===

    /// Insert or update an agent in its own transaction.
    pub fn save_agent(&mut self, agent: &Agent) -> Result<()> {
        let tx = self.transaction()?;
        Self::save_agent_tx(&tx, agent)?;
        tx.commit()
            .map_err(|e| Error::database(format!("commit agent {}", agent.id), e))
    }

    /// Insert or update an agent inside an existing transaction.
    pub fn save_agent_tx(tx: &Transaction<'_>, agent: &Agent) -> Result<()> {
        let now = timestamp(Utc::now());
        tx.execute(
            r#"
            INSERT INTO agents
            (id, name, model, provider, status, current_task, last_error, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                model = excluded.model,
                provider = excluded.provider,
                status = excluded.status,
                current_task = excluded.current_task,
                last_error = excluded.last_error,
                updated_at = excluded.updated_at
            "#,
            params![
                agent.id,
                agent.name,
                agent.model,
                agent.provider,
                agent.status.as_str(),
                agent.current_task,
                agent.last_error,
                now,
                now,
            ],
        )
        .map_err(|e| Error::database(format!("save agent {}", agent.id), e))?;

        tracing::debug!(agent = %agent.id, status = %agent.status, "saved agent");
        Ok(())
    }

    /// Get an agent by ID.
    pub fn get_agent(&self, id: &str) -> Result<Agent> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {} FROM agents WHERE id = ?1", AGENT_COLUMNS),
                [id],
                RawAgent::from_row,
            )
            .optional()
            .map_err(|e| Error::database(format!("get agent {}", id), e))?;

        match raw {
            Some(raw) => raw.into_agent(),
            None => Err(Error::NotFound(format!("Agent not found: {}", id))),
        }
    }

    /// List all agents, most recently created first.
    pub fn list_agents(&self) -> Result<Vec<Agent>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM agents ORDER BY created_at DESC, rowid DESC",
                AGENT_COLUMNS
            ))
            .map_err(|e| Error::database("list agents", e))?;

        let raws = stmt
            .query_map([], RawAgent::from_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| Error::database("list agents", e))?;

        raws.into_iter().map(RawAgent::into_agent).collect()
    }

    /// Delete an agent. Deleting a missing agent is not an error.
    pub fn delete_agent(&mut self, id: &str) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM agents WHERE id = ?1", [id])
            .map_err(|e| Error::database(format!("delete agent {}", id), e))?;
        tracing::debug!(agent = %id, deleted, "deleted agent");
        Ok(())
    }

    // === Context Operations ===

    /// Save a context and its files in one transaction.
    pub fn save_context(&mut self, context: &Context) -> Result<()> {
        let tx = self.transaction()?;
        Self::save_context_tx(&tx, context)?;
        tx.commit()
            .map_err(|e| Error::database(format!("commit context {}", context.id), e))
    }

    /// Save a context and its files inside an existing transaction.
    ///
    /// Membership is fully replaced: existing rows for the context are
    /// deleted and one row per file is inserted with its current position.
    pub fn save_context_tx(tx: &Transaction<'_>, context: &Context) -> Result<()> {
        let now = timestamp(Utc::now());
        let op = || format!("save context {}", context.id);
        let total_tokens = to_db_count(context.total_tokens, &format!("context {}", context.id))?;

        tx.execute(
            r#"
            INSERT INTO contexts (id, name, description, total_tokens, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                total_tokens = excluded.total_tokens,
                updated_at = excluded.updated_at
            "#,
            params![
                context.id,
                context.name,
                context.description,
                total_tokens,
                now,
                now,
            ],
        )
        .map_err(|e| Error::database(op(), e))?;

        tx.execute(
            "DELETE FROM context_files WHERE context_id = ?1",
            [&context.id],
        )
        .map_err(|e| Error::database(op(), e))?;

        for (position, file) in context.files.iter().enumerate() {
            let file_id = Self::upsert_file_tx(tx, file, &now)?;
            tx.execute(
                "INSERT INTO context_files (context_id, file_id, position) VALUES (?1, ?2, ?3)",
                params![context.id, file_id, position as i64],
            )
            .map_err(|e| {
                Error::database(format!("link file {} to context {}", file.path, context.id), e)
            })?;
        }

        // Shared file rows may have changed under other contexts
        let resynced = tx
            .execute(
                r#"
                UPDATE contexts SET total_tokens = (
                    SELECT COALESCE(SUM(f.tokens), 0)
                    FROM context_files cf
                    JOIN files f ON f.id = cf.file_id
                    WHERE cf.context_id = contexts.id
                )
                WHERE id != ?1 AND id IN (
                    SELECT other.context_id
                    FROM context_files other
                    JOIN context_files mine ON mine.file_id = other.file_id
                    WHERE mine.context_id = ?1
                )
                "#,
                [&context.id],
            )
            .map_err(|e| Error::database(format!("resync totals after {}", op()), e))?;

        tracing::debug!(
            context = %context.id,
            resynced,
            files = context.files.len(),
            total_tokens = context.total_tokens,
            "saved context"
        );
        Ok(())
    }

    /// Upsert a file keyed by path and return the ID of the row that owns
    /// the path. That is the stored ID when the path was already known,
    /// which may differ from `file.id`.
    fn upsert_file_tx(tx: &Transaction<'_>, file: &File, now: &str) -> Result<String> {
        let tokens = to_db_count(file.tokens, &format!("file {}", file.path))?;
        tx.query_row(
            r#"
            INSERT INTO files
            (id, path, name, content, language, tokens, hash, size, modified_at, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(path) DO UPDATE SET
                name = excluded.name,
                content = excluded.content,
                language = excluded.language,
                tokens = excluded.tokens,
                hash = excluded.hash,
                size = excluded.size,
                modified_at = excluded.modified_at,
                updated_at = excluded.updated_at
            RETURNING id
            "#,
            params![
                file.id,
                file.path,
                file.name,
                file.content,
                file.language,
                tokens,
                file.hash,
                file.size,
                timestamp(file.modified_at),
                now,
                now,
            ],
            |row| row.get(0),
        )
        .map_err(|e| Error::database(format!("save file {}", file.path), e))
    }

    /// Get a context by ID with its files in saved order.
    pub fn get_context(&self, id: &str) -> Result<Context> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {} FROM contexts WHERE id = ?1", CONTEXT_COLUMNS),
                [id],
                RawContext::from_row,
            )
            .optional()
            .map_err(|e| Error::database(format!("get context {}", id), e))?;

        let mut context = match raw {
            Some(raw) => raw.into_context()?,
            None => return Err(Error::NotFound(format!("Context not found: {}", id))),
        };
        context.files = self.context_files(id)?;
        // The stored total can trail a shared file row rewritten elsewhere
        context.recalculate_tokens();
        Ok(context)
    }

    fn context_files(&self, context_id: &str) -> Result<Vec<File>> {
        let op = || format!("load files for context {}", context_id);
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT f.id, f.path, f.name, f.content, f.language, f.tokens, f.hash, f.size, f.modified_at
                FROM context_files cf
                JOIN files f ON f.id = cf.file_id
                WHERE cf.context_id = ?1
                ORDER BY cf.position ASC
                "#,
            )
            .map_err(|e| Error::database(op(), e))?;

        let raws = stmt
            .query_map([context_id], RawFile::from_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| Error::database(op(), e))?;

        raws.into_iter().map(RawFile::into_file).collect()
    }

    /// List all contexts, most recently created first.
    ///
    /// Files are not loaded; each context comes back with an empty `files`
    /// list and its stored `total_tokens`. Use [`Store::get_context`] for
    /// the members.
    pub fn list_contexts(&self) -> Result<Vec<Context>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM contexts ORDER BY created_at DESC, rowid DESC",
                CONTEXT_COLUMNS
            ))
            .map_err(|e| Error::database("list contexts", e))?;

        let raws = stmt
            .query_map([], RawContext::from_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| Error::database("list contexts", e))?;

        raws.into_iter().map(RawContext::into_context).collect()
    }

    /// Delete a context and (by cascade) its membership rows.
    ///
    /// File rows are kept. Deleting a missing context is not an error.
    pub fn delete_context(&mut self, id: &str) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM contexts WHERE id = ?1", [id])
            .map_err(|e| Error::database(format!("delete context {}", id), e))?;
        tracing::debug!(context = %id, deleted, "deleted context");
        Ok(())
    }

    /// Delete file rows that no context references. Returns how many went.
    pub fn prune_orphan_files(&mut self) -> Result<usize> {
        let tx = self.transaction()?;
        let pruned = tx
            .execute(
                "DELETE FROM files WHERE id NOT IN (SELECT file_id FROM context_files)",
                [],
            )
            .map_err(|e| Error::database("prune orphan files", e))?;
        tx.commit()
            .map_err(|e| Error::database("commit prune orphan files", e))?;

        tracing::info!(pruned, "pruned orphan files");
        Ok(pruned)
    }
}

/// Create a directory tree for the database file.
fn create_dir_all(dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir)?;
    Ok(())
}

/// RFC 3339 with nanoseconds; sorts lexically in time order.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str, what: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::MalformedData(format!("{}: bad timestamp {:?}: {}", what, value, e)))
}

fn to_db_count(n: usize, what: &str) -> Result<i64> {
    i64::try_from(n)
        .map_err(|_| Error::InvalidInput(format!("{}: count {} out of range", what, n)))
}

fn from_db_count(n: i64, what: &str) -> Result<usize> {
    usize::try_from(n).map_err(|_| Error::MalformedData(format!("{}: negative count {}", what, n)))
}

const AGENT_COLUMNS: &str = "id, name, model, provider, status, current_task, last_error";
const CONTEXT_COLUMNS: &str = "id, name, description, total_tokens";

/// Agent row as stored, before validation.
struct RawAgent {
    id: String,
    name: String,
    model: String,
    provider: String,
    status: String,
    current_task: Option<String>,
    last_error: Option<String>,
}

impl RawAgent {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            model: row.get(2)?,
            provider: row.get(3)?,
            status: row.get(4)?,
            current_task: row.get(5)?,
            last_error: row.get(6)?,
        })
    }

    fn into_agent(self) -> Result<Agent> {
        let status: AgentStatus = self
            .status
            .parse()
            .map_err(|e| Error::MalformedData(format!("agent {}: {}", self.id, e)))?;
        Ok(Agent {
            id: self.id,
            name: self.name,
            model: self.model,
            provider: self.provider,
            status,
            current_task: self.current_task.unwrap_or_default(),
            last_error: self.last_error.unwrap_or_default(),
        })
    }
}

struct RawContext {
    id: String,
    name: String,
    description: Option<String>,
    total_tokens: i64,
}

impl RawContext {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            total_tokens: row.get(3)?,
        })
    }

    fn into_context(self) -> Result<Context> {
        let total_tokens = from_db_count(self.total_tokens, &format!("context {}", self.id))?;
        Ok(Context {
            id: self.id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            files: Vec::new(),
            total_tokens,
        })
    }
}

struct RawFile {
    id: String,
    path: String,
    name: String,
    content: Option<String>,
    language: Option<String>,
    tokens: i64,
    hash: Option<String>,
    size: i64,
    modified_at: Option<String>,
}

impl RawFile {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            path: row.get(1)?,
            name: row.get(2)?,
            content: row.get(3)?,
            language: row.get(4)?,
            tokens: row.get(5)?,
            hash: row.get(6)?,
            size: row.get(7)?,
            modified_at: row.get(8)?,
        })
    }

    fn into_file(self) -> Result<File> {
        let what = format!("file {}", self.path);
        let tokens = from_db_count(self.tokens, &what)?;
        let modified_at = match self.modified_at.as_deref() {
            Some(value) => parse_timestamp(value, &what)?,
            None => DateTime::<Utc>::UNIX_EPOCH,
        };
        Ok(File {
            id: self.id,
            path: self.path,
            name: self.name,
            content: self.content.unwrap_or_default(),
            size: self.size,
            hash: self.hash.unwrap_or_default(),
            language: self.language.unwrap_or_default(),
            tokens,
            modified_at,
        })
    }
}
