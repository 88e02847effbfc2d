//! Agent commands.

use serde::Serialize;

use super::{Deleted, Output, to_json};
use crate::Result;
use crate::models::{Agent, AgentStatus};
use crate::storage::Store;

/// A single agent.
#[derive(Debug, Serialize)]
pub struct AgentResult {
    #[serde(flatten)]
    pub agent: Agent,
}

impl Output for AgentResult {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        format_agent(&self.agent)
    }
}

/// All agents, newest first.
#[derive(Debug, Serialize)]
pub struct AgentList {
    pub agents: Vec<Agent>,
    pub count: usize,
}

impl Output for AgentList {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        if self.agents.is_empty() {
            return "No agents.".to_string();
        }
        let mut lines = vec![format!("{} agent(s):", self.count)];
        lines.extend(self.agents.iter().map(|a| format!("  {}", format_agent(a))));
        lines.join("\n")
    }
}

fn format_agent(agent: &Agent) -> String {
    let mut line = format!(
        "[{}] {} ({}, {}) - {}",
        agent.id, agent.name, agent.model, agent.provider, agent.status
    );
    match agent.status {
        AgentStatus::Working if !agent.current_task.is_empty() => {
            line.push_str(&format!(": {}", agent.current_task));
        }
        AgentStatus::Error => line.push_str(&format!(": {}", agent.last_error)),
        _ => {}
    }
    line
}

pub fn agent_add(store: &mut Store, name: &str, model: &str, provider: &str) -> Result<AgentResult> {
    let agent = Agent::new(name, model, provider);
    store.save_agent(&agent)?;
    Ok(AgentResult { agent })
}

pub fn agent_list(store: &Store) -> Result<AgentList> {
    let agents = store.list_agents()?;
    let count = agents.len();
    Ok(AgentList { agents, count })
}

pub fn agent_show(store: &Store, id: &str) -> Result<AgentResult> {
    Ok(AgentResult {
        agent: store.get_agent(id)?,
    })
}

pub fn agent_remove(store: &mut Store, id: &str) -> Result<Deleted> {
    store.delete_agent(id)?;
    Ok(Deleted {
        kind: "agent",
        id: id.to_string(),
    })
}

pub fn agent_assign(store: &mut Store, id: &str, task: &str) -> Result<AgentResult> {
    update_agent(store, id, |agent| agent.assign_task(task))
}

pub fn agent_complete(store: &mut Store, id: &str) -> Result<AgentResult> {
    update_agent(store, id, Agent::complete_task)
}

pub fn agent_fail(store: &mut Store, id: &str, message: &str) -> Result<AgentResult> {
    update_agent(store, id, |agent| agent.set_error(message))
}

fn update_agent(store: &mut Store, id: &str, apply: impl FnOnce(&mut Agent)) -> Result<AgentResult> {
    let mut agent = store.get_agent(id)?;
    apply(&mut agent);
    store.save_agent(&agent)?;
    Ok(AgentResult { agent })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    #[test]
    fn test_agent_lifecycle_commands() {
        let env = TestEnv::new();
        let mut store = env.open_store();

        let added = agent_add(&mut store, "Claude", "claude-3.5-sonnet", "anthropic").unwrap();
        let id = added.agent.id.clone();

        let working = agent_assign(&mut store, &id, "Fix bug").unwrap();
        assert_eq!(working.agent.status, AgentStatus::Working);
        assert!(working.to_human().ends_with("working: Fix bug"));

        let failed = agent_fail(&mut store, &id, "timeout").unwrap();
        assert_eq!(store.get_agent(&id).unwrap().last_error, "timeout");
        assert!(failed.to_human().ends_with("error: timeout"));

        agent_complete(&mut store, &id).unwrap();
        let loaded = store.get_agent(&id).unwrap();
        assert_eq!(loaded.status, AgentStatus::Ready);
        assert!(loaded.current_task.is_empty());
    }

    #[test]
    fn test_agent_json_is_flat() {
        let env = TestEnv::new();
        let mut store = env.open_store();
        let added = agent_add(&mut store, "Gemini", "gemini-1.5-pro", "google").unwrap();

        let value: serde_json::Value = serde_json::from_str(&added.to_json()).unwrap();
        assert_eq!(value["name"], "Gemini");
        assert_eq!(value["status"], "ready");
    }

    #[test]
    fn test_agent_list_and_remove() {
        let env = TestEnv::new();
        let mut store = env.open_store();
        assert_eq!(agent_list(&store).unwrap().to_human(), "No agents.");

        let a = agent_add(&mut store, "a", "m", "p").unwrap();
        agent_add(&mut store, "b", "m", "p").unwrap();
        assert_eq!(agent_list(&store).unwrap().count, 2);

        agent_remove(&mut store, &a.agent.id).unwrap();
        assert_eq!(agent_list(&store).unwrap().count, 1);
        assert!(agent_show(&store, &a.agent.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_missing_agent() {
        let env = TestEnv::new();
        let mut store = env.open_store();
        assert!(agent_assign(&mut store, "missing", "task")
            .unwrap_err()
            .is_not_found());
    }
}
