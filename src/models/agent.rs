//! AI agents and their task lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;
use crate::id::generate_id;

/// Agent status in the task lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Idle, no task and no error
    #[default]
    Ready,
    /// Working on `current_task`
    Working,
    /// Last task failed; see `last_error`
    Error,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Ready => "ready",
            AgentStatus::Working => "working",
            AgentStatus::Error => "error",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready" => Ok(AgentStatus::Ready),
            "working" => Ok(AgentStatus::Working),
            "error" => Ok(AgentStatus::Error),
            other => Err(Error::MalformedData(format!(
                "unknown agent status: {}",
                other
            ))),
        }
    }
}

/// An AI agent that can be handed tasks.
///
/// Invariants maintained by the lifecycle methods:
/// - `Working` implies a non-empty `current_task` (when a non-empty task was assigned)
/// - `Ready` implies empty `current_task` and `last_error`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique identifier (16 hex chars)
    pub id: String,

    /// Display name
    pub name: String,

    /// Model identifier (e.g., "claude-3.5-sonnet")
    pub model: String,

    /// Provider name (e.g., "anthropic")
    pub provider: String,

    /// Current status
    #[serde(default)]
    pub status: AgentStatus,

    /// Task being worked on; empty when idle
    #[serde(default)]
    pub current_task: String,

    /// Message from the last failure; empty when none
    #[serde(default)]
    pub last_error: String,
}

impl Agent {
    /// Create a ready agent with a fresh ID.
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            model: model.into(),
            provider: provider.into(),
            status: AgentStatus::Ready,
            current_task: String::new(),
            last_error: String::new(),
        }
    }

    /// Hand the agent a task and mark it working.
    pub fn assign_task(&mut self, task: impl Into<String>) {
        self.current_task = task.into();
        self.status = AgentStatus::Working;
    }

    /// Finish the current task: back to ready, task and error cleared.
    pub fn complete_task(&mut self) {
        self.current_task.clear();
        self.status = AgentStatus::Ready;
        self.last_error.clear();
    }

    /// Record a failure. The current task is kept so it can be retried.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = AgentStatus::Error;
        self.last_error = message.into();
    }
}
