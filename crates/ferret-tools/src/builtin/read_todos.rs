use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::tool::{Tool, ToolCall, ToolContext, ToolKind, ToolOutput};
use crate::{render_todos, AgentError};

pub struct ReadTodosTool;

#[async_trait]
impl Tool for ReadTodosTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ReadTodos
    }

    fn description(&self) -> String {
        "Read the current TODO list with each item's status.".into()
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {}, "additionalProperties": false })
    }

    async fn execute(&self, call: &ToolCall, ctx: ToolContext<'_>) -> Result<ToolOutput, AgentError> {
        debug!(count = ctx.state.todos.len(), "read_todos tool");
        Ok(ToolOutput::ok(&call.id, render_todos(&ctx.state.todos)))
    }
}
