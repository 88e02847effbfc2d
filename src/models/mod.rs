//! Data models for aui entities.
//!
//! This module defines the core data structures:
//! - `Agent` - An AI agent with a ready/working/error task lifecycle
//! - `Context` - An ordered, path-deduplicated set of files with a token total
//! - `File` - A captured file with content hash and modification time

pub mod agent;
pub mod context;
pub mod file;

pub use agent::{Agent, AgentStatus};
pub use context::Context;
pub use file::File;
