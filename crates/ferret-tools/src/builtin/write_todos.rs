// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::tool::{Tool, ToolCall, ToolContext, ToolKind, ToolOutput};
use crate::{parse_todos, AgentError, StateUpdate};

pub struct WriteTodosTool;

#[async_trait]
impl Tool for WriteTodosTool {
    fn kind(&self) -> ToolKind {
        ToolKind::WriteTodos
    }

    fn description(&self) -> String {
        "Create or update the TODO list used for task planning and tracking.\n\n\
         ## Task Statuses\n\
         - pending: Not yet started\n\
         - in_progress: Currently being worked on\n\
         - completed: Finished\n\n\
         ## When to Use\n\
         - Multi-step requests that benefit from an explicit plan\n\
         - Before delegating research, so progress stays visible\n\n\
         ## IMPORTANT\n\
         - Calling write_todos replaces the entire list (not a merge/patch)\n\
         - Mark an item completed as soon as it is done\n\
         - Use read_todos to check the current list before revising it"
            .into()
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "todos": {
                    "type": "array",
                    "description": "Complete replacement TODO list",
                    "items": {
                        "type": "object",
                        "properties": {
                            "content": {
                                "type": "string",
                                "description": "Description of the task"
                            },
                            "status": {
                                "type": "string",
                                "enum": ["pending", "in_progress", "completed"]
                            }
                        },
                        "required": ["content", "status"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["todos"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall, _ctx: ToolContext<'_>) -> Result<ToolOutput, AgentError> {
        let Some(raw) = call.args.get("todos") else {
            return Ok(ToolOutput::err(&call.id, "Error: missing 'todos' array"));
        };
        let todos = match parse_todos(raw) {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "rejected todo list");
                return Ok(ToolOutput::err(&call.id, e.to_string()));
            }
        };

        info!(count = todos.len(), "write_todos tool");
        debug!(?todos, "new todo list");

        let listing = serde_json::to_string(&todos).unwrap_or_default();
        Ok(ToolOutput::ok(&call.id, format!("Updated todo list to {listing}"))
            .with_update(StateUpdate::default().with_todos(todos)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::builtin::test_support::run;
    use crate::{AgentState, Todo, TodoStatus};

    #[tokio::test]
    async fn replaces_list_verbatim() {
        let mut state = AgentState::default();
        state.todos = vec![Todo::new("stale", TodoStatus::Completed)];
        let out = run(
            &WriteTodosTool,
            &state,
            json!({ "todos": [
                { "content": "research topic", "status": "in_progress" },
                { "content": "write report", "status": "pending" }
            ]}),
        )
        .await;
        assert!(!out.is_error, "{}", out.content);
        assert_eq!(
            out.update.todos.unwrap(),
            vec![
                Todo::new("research topic", TodoStatus::InProgress),
                Todo::new("write report", TodoStatus::Pending),
            ]
        );
        assert!(out.content.starts_with("Updated todo list to ["));
        assert!(out.content.contains(r#""status":"in_progress""#));
    }

    #[tokio::test]
    async fn empty_list_clears() {
        let out = run(&WriteTodosTool, &AgentState::default(), json!({ "todos": [] })).await;
        assert_eq!(out.update.todos, Some(vec![]));
        assert_eq!(out.content, "Updated todo list to []");
    }

    #[tokio::test]
    async fn unknown_status_leaves_list_untouched() {
        let out = run(
            &WriteTodosTool,
            &AgentState::default(),
            json!({ "todos": [{ "content": "x", "status": "blocked" }] }),
        )
        .await;
        assert!(out.is_error);
        assert!(out.update.is_empty());
    }

    #[tokio::test]
    async fn missing_todos_is_error() {
        let out = run(&WriteTodosTool, &AgentState::default(), json!({})).await;
        assert!(out.is_error);
        assert!(out.content.contains("missing 'todos'"));
    }
}
