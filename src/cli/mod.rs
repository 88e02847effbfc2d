//! CLI argument definitions for aui.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aui - curate agents and file contexts for AI coding assistants.
#[derive(Parser, Debug)]
#[command(name = "aui")]
#[command(author, version, about = "Curate agents and file contexts for AI coding assistants", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Path to config.kdl (defaults to <config dir>/aui/config.kdl)
    #[arg(long = "config", global = true)]
    pub config_path: Option<PathBuf>,

    /// Path to the database file. Overrides AUI_DATABASE_PATH and config.kdl.
    #[arg(long = "db", global = true)]
    pub database_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Agent management commands
    Agent {
        #[command(subcommand)]
        command: AgentCommands,
    },

    /// Context management commands
    Context {
        #[command(subcommand)]
        command: ContextCommands,
    },

    /// Store maintenance commands
    Store {
        #[command(subcommand)]
        command: StoreCommands,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Agent subcommands
#[derive(Subcommand, Debug)]
pub enum AgentCommands {
    /// Register a new agent
    Add {
        /// Agent display name
        name: String,

        /// Model identifier (e.g., claude-3.5-sonnet)
        #[arg(short, long)]
        model: String,

        /// Provider name (e.g., anthropic)
        #[arg(short, long)]
        provider: String,
    },

    /// List agents, newest first
    List,

    /// Show an agent
    Show {
        /// Agent ID
        id: String,
    },

    /// Delete an agent
    Rm {
        /// Agent ID
        id: String,
    },

    /// Assign a task to an agent (status becomes working)
    Assign {
        /// Agent ID
        id: String,

        /// Task description
        task: String,
    },

    /// Mark the agent's task complete (status becomes ready)
    Complete {
        /// Agent ID
        id: String,
    },

    /// Record a failure for the agent (status becomes error)
    Fail {
        /// Agent ID
        id: String,

        /// Error message
        message: String,
    },
}

/// Context subcommands
#[derive(Subcommand, Debug)]
pub enum ContextCommands {
    /// Create an empty context
    Create {
        /// Context name
        name: String,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// List contexts, newest first (files are not loaded)
    List,

    /// Show a context with its files
    Show {
        /// Context ID
        id: String,
    },

    /// Add files from disk to a context
    Add {
        /// Context ID
        id: String,

        /// Files to add
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Remove a file from a context
    Remove {
        /// Context ID
        id: String,

        /// Path of the file as stored in the context
        path: String,
    },

    /// Remove every file from a context
    Clear {
        /// Context ID
        id: String,
    },

    /// Re-read files that changed on disk
    Refresh {
        /// Context ID
        id: String,
    },

    /// Delete a context
    Rm {
        /// Context ID
        id: String,
    },
}

/// Store subcommands
#[derive(Subcommand, Debug)]
pub enum StoreCommands {
    /// Delete file rows no context references
    Prune,

    /// Print the database path
    Path,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved settings and where each value came from
    Show,

    /// Write the resolved settings to config.kdl
    Save,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_context_add() {
        let cli = Cli::parse_from(["aui", "-H", "context", "add", "abc", "a.rs", "b.rs"]);
        assert!(cli.human_readable);
        match cli.command {
            Commands::Context {
                command: ContextCommands::Add { id, paths },
            } => {
                assert_eq!(id, "abc");
                assert_eq!(paths, [PathBuf::from("a.rs"), PathBuf::from("b.rs")]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_db_flag() {
        let cli = Cli::parse_from(["aui", "agent", "list", "--db", "/tmp/x.db"]);
        assert_eq!(cli.database_path, Some(PathBuf::from("/tmp/x.db")));
    }
}
