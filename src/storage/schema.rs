//! SQLite schema for the aui store.
//!
//! [`apply`] runs on every open. Every statement is create-if-absent, so
//! applying it to an existing store changes nothing.
//!
//! `schema_migrations` is created for forward compatibility but nothing
//! reads or writes it yet: there is no upgrade path beyond the initial
//! create.

use rusqlite::Connection;

/// Tables created on open, in dependency order.
pub const TABLES: &[&str] = &[
    "agents",
    "contexts",
    "files",
    "context_files",
    "schema_migrations",
];

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS agents (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    model TEXT NOT NULL,
    provider TEXT NOT NULL,
    status TEXT NOT NULL,
    current_task TEXT,
    last_error TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contexts (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    total_tokens INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS files (
    id TEXT PRIMARY KEY,
    path TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    content TEXT,
    language TEXT,
    tokens INTEGER NOT NULL DEFAULT 0,
    hash TEXT,
    size INTEGER NOT NULL DEFAULT 0,
    modified_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS context_files (
    context_id TEXT NOT NULL,
    file_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (context_id, file_id),
    FOREIGN KEY (context_id) REFERENCES contexts(id) ON DELETE CASCADE,
    FOREIGN KEY (file_id) REFERENCES files(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_agents_created ON agents(created_at);
CREATE INDEX IF NOT EXISTS idx_contexts_created ON contexts(created_at);
CREATE INDEX IF NOT EXISTS idx_context_files_file ON context_files(file_id);
CREATE INDEX IF NOT EXISTS idx_context_files_position ON context_files(context_id, position);
"#;

/// Enable foreign keys and create any missing tables and indices.
pub fn apply(conn: &Connection) -> rusqlite::Result<()> {
    // Per-connection setting; the membership cascade depends on it
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(SCHEMA)
}
