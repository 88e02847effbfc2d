//! aui CLI - curate agents and file contexts for AI coding assistants.

use aui::cli::{AgentCommands, Cli, Commands, ConfigCommands, ContextCommands, StoreCommands};
use aui::commands::{self, Output};
use aui::config::{self, ConfigOverrides, Settings};
use aui::logging;
use aui::storage::Store;
use clap::Parser;
use std::path::Path;
use std::process;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    let result = run(cli);

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> aui::Result<()> {
    let mut overrides = ConfigOverrides::new();
    if let Some(path) = cli.database_path {
        overrides = overrides.with_database_path(path);
    }
    let settings = config::load_settings(cli.config_path.as_deref(), &overrides)?;
    settings.validate()?;

    let _log_guard = logging::init(&settings.log_level.value, settings.log_file.value.as_deref())?;
    tracing::debug!(database = %settings.database_path.value.display(), "resolved settings");

    let human = cli.human_readable;
    match cli.command {
        Commands::Config { command } => {
            run_config_command(command, &settings, cli.config_path.as_deref(), human)
        }
        Commands::Agent { command } => with_store(&settings, |store| {
            run_agent_command(command, store, human)
        }),
        Commands::Context { command } => with_store(&settings, |store| {
            run_context_command(command, store, human)
        }),
        Commands::Store { command } => with_store(&settings, |store| {
            run_maintenance_command(command, store, human)
        }),
    }
}

/// Open the store, run `f`, and close the store.
fn with_store<F>(settings: &Settings, f: F) -> aui::Result<()>
where
    F: FnOnce(&mut Store) -> aui::Result<()>,
{
    let mut store = Store::open(&settings.database_path.value)?;
    let result = f(&mut store);
    let closed = store.close();
    result.and(closed)
}

fn run_agent_command(command: AgentCommands, store: &mut Store, human: bool) -> aui::Result<()> {
    match command {
        AgentCommands::Add {
            name,
            model,
            provider,
        } => {
            let result = commands::agent_add(store, &name, &model, &provider)?;
            output(&result, human);
        }
        AgentCommands::List => {
            let result = commands::agent_list(store)?;
            output(&result, human);
        }
        AgentCommands::Show { id } => {
            let result = commands::agent_show(store, &id)?;
            output(&result, human);
        }
        AgentCommands::Rm { id } => {
            let result = commands::agent_remove(store, &id)?;
            output(&result, human);
        }
        AgentCommands::Assign { id, task } => {
            let result = commands::agent_assign(store, &id, &task)?;
            output(&result, human);
        }
        AgentCommands::Complete { id } => {
            let result = commands::agent_complete(store, &id)?;
            output(&result, human);
        }
        AgentCommands::Fail { id, message } => {
            let result = commands::agent_fail(store, &id, &message)?;
            output(&result, human);
        }
    }
    Ok(())
}

fn run_context_command(command: ContextCommands, store: &mut Store, human: bool) -> aui::Result<()> {
    match command {
        ContextCommands::Create { name, description } => {
            let result = commands::context_create(store, &name, &description)?;
            output(&result, human);
        }
        ContextCommands::List => {
            let result = commands::context_list(store)?;
            output(&result, human);
        }
        ContextCommands::Show { id } => {
            let result = commands::context_show(store, &id)?;
            output(&result, human);
        }
        ContextCommands::Add { id, paths } => {
            let result = commands::context_add_files(store, &id, &paths)?;
            output(&result, human);
        }
        ContextCommands::Remove { id, path } => {
            let result = commands::context_remove_file(store, &id, &path)?;
            output(&result, human);
        }
        ContextCommands::Clear { id } => {
            let result = commands::context_clear(store, &id)?;
            output(&result, human);
        }
        ContextCommands::Refresh { id } => {
            let result = commands::context_refresh(store, &id)?;
            output(&result, human);
        }
        ContextCommands::Rm { id } => {
            let result = commands::context_remove(store, &id)?;
            output(&result, human);
        }
    }
    Ok(())
}

fn run_maintenance_command(command: StoreCommands, store: &mut Store, human: bool) -> aui::Result<()> {
    match command {
        StoreCommands::Prune => {
            let result = commands::store_prune(store)?;
            output(&result, human);
        }
        StoreCommands::Path => {
            output(&commands::store_path(store), human);
        }
    }
    Ok(())
}

fn run_config_command(
    command: ConfigCommands,
    settings: &Settings,
    config_path: Option<&Path>,
    human: bool,
) -> aui::Result<()> {
    match command {
        ConfigCommands::Show => output(&commands::config_show(settings), human),
        ConfigCommands::Save => {
            let result = commands::config_save(settings, config_path)?;
            output(&result, human);
        }
    }
    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aui::Error;
    use aui::config::{Resolved, ValueSource};

    #[test]
    fn test_with_store_returns_command_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut settings = Settings::defaults(dir.path());
        settings.database_path = Resolved::new(dir.path().join("aui.db"), ValueSource::CliFlag);

        let result = with_store(&settings, |_| Err(Error::NotFound("agent x".to_string())));
        assert!(matches!(result, Err(Error::NotFound(_))));

        let agent = aui::models::Agent::new("a", "m", "p");
        let result = with_store(&settings, |store| store.save_agent(&agent));
        assert!(result.is_ok());
    }
}
