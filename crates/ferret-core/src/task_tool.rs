// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use ferret_model::{Message, ModelProvider};
use ferret_tools::{
    merge_files, AgentError, AgentState, StateUpdate, StepBudget, Tool, ToolCall, ToolContext, ToolKind,
    ToolOutput, ToolRegistry,
};

use crate::agent::Agent;
use crate::prompts;
use crate::subagent::{RegistryError, SubAgentRegistry};

/// Delegation failures the calling agent can correct by itself.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DelegationError {
    #[error(
        "Error: invoked agent of type {requested}, the only allowed types are [{}]",
        backticked(.allowed)
    )]
    UnknownSubAgent { requested: String, allowed: Vec<String> },
    #[error("Error: step budget of {limit} exhausted; cannot delegate further")]
    BudgetExhausted { limit: u32 },
}

fn backticked(names: &[String]) -> String {
    names.iter().map(|n| format!("`{n}`")).collect::<Vec<_>>().join(", ")
}

/// Hands a task to a named sub-agent running in an isolated context.
///
/// The sub-agent starts from the parent's files and todos plus a single
/// user message holding the task description.  Only its files and its
/// final message come back.
pub struct TaskTool {
    agents: Vec<Agent>,
    description: String,
}

#[derive(Deserialize)]
struct Args {
    description: String,
    subagent_type: String,
}

impl TaskTool {
    /// Build one agent per registry entry.  A sub-agent without a tool list
    /// gets all of `delegation_tools`; one naming a tool missing from
    /// `delegation_tools` is a configuration error.
    pub fn new(
        registry: &SubAgentRegistry,
        model: Arc<dyn ModelProvider>,
        delegation_tools: &ToolRegistry,
    ) -> Result<Self, RegistryError> {
        let mut agents = Vec::new();
        for spec in registry.iter() {
            let tools = match &spec.tools {
                Some(kinds) => {
                    if let Some(missing) = kinds.iter().find(|k| !delegation_tools.contains(**k)) {
                        return Err(RegistryError::UnavailableTool {
                            agent: spec.name.clone(),
                            tool: *missing,
                        });
                    }
                    delegation_tools.subset(kinds)
                }
                None => delegation_tools.clone(),
            };
            debug!(agent = %spec.name, tools = ?tools.names(), "sub-agent configured");
            agents.push(Agent::new(
                &spec.name,
                model.clone(),
                tools,
                prompts::render_subagent_prompt(&spec.prompt),
            ));
        }
        Ok(Self { agents, description: prompts::task_description(&registry.describe()) })
    }

    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name()).collect()
    }

    /// Run `subagent_type` on `task` and return the delta for the parent:
    /// merged files plus the sub-agent's final message as the tool response.
    pub async fn delegate(
        &self,
        call_id: &str,
        parent: &AgentState,
        subagent_type: &str,
        task: &str,
        budget: &StepBudget,
    ) -> Result<ToolOutput, AgentError> {
        let Some(agent) = self.agents.iter().find(|a| a.name() == subagent_type) else {
            let err = DelegationError::UnknownSubAgent {
                requested: subagent_type.to_string(),
                allowed: self.agent_names().into_iter().map(String::from).collect(),
            };
            warn!(requested = %subagent_type, "unknown sub-agent");
            return Ok(ToolOutput::err(call_id, err.to_string()));
        };

        if budget.is_exhausted() {
            let err = DelegationError::BudgetExhausted { limit: budget.limit() };
            warn!(agent = %subagent_type, "refusing delegation: step budget exhausted");
            return Ok(ToolOutput::err(call_id, err.to_string()));
        }

        let isolated = AgentState {
            messages: vec![Message::user(task)],
            todos: parent.todos.clone(),
            files: parent.files.clone(),
        };

        info!(agent = %subagent_type, task_len = task.len(), "delegating task");
        let result = agent.invoke(isolated, budget).await.map_err(|e| {
            if e.is_recursion_limit() {
                e
            } else {
                AgentError::SubAgent { name: subagent_type.to_string(), source: Box::new(e) }
            }
        })?;
        info!(
            agent = %subagent_type,
            messages = result.messages.len(),
            files = result.files.len(),
            "sub-agent finished"
        );

        let answer = result.last_message_text().to_string();
        let files = merge_files(Some(parent.files.clone()), Some(result.files)).unwrap_or_default();
        Ok(ToolOutput::ok(call_id, answer).with_update(StateUpdate::default().with_files(files)))
    }
}

#[async_trait]
impl Tool for TaskTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Task
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "description": {
                    "type": "string",
                    "description": "Self-contained description of the task for the sub-agent"
                },
                "subagent_type": {
                    "type": "string",
                    "enum": self.agent_names(),
                    "description": "Name of the sub-agent to delegate to"
                }
            },
            "required": ["description", "subagent_type"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall, ctx: ToolContext<'_>) -> Result<ToolOutput, AgentError> {
        let args: Args = match call.parse_args() {
            Ok(a) => a,
            Err(out) => return Ok(out),
        };
        self.delegate(&call.id, ctx.state, &args.subagent_type, &args.description, ctx.budget)
            .await
    }
}
