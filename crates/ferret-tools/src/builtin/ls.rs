use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::tool::{Tool, ToolCall, ToolContext, ToolKind, ToolOutput};
use crate::{list_files, AgentError};

pub struct LsTool;

#[async_trait]
impl Tool for LsTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Ls
    }

    fn description(&self) -> String {
        "List all files in the virtual filesystem. Returns a JSON array of paths in sorted order."
            .into()
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {}, "additionalProperties": false })
    }

    async fn execute(&self, call: &ToolCall, ctx: ToolContext<'_>) -> Result<ToolOutput, AgentError> {
        let paths = list_files(&ctx.state.files);
        debug!(count = paths.len(), "ls tool");
        Ok(ToolOutput::ok(&call.id, Value::from(paths).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::builtin::test_support::run;
    use crate::AgentState;

    #[tokio::test]
    async fn lists_paths_as_json_array() {
        let mut state = AgentState::default();
        state.files.insert("notes.md".into(), "x".into());
        state.files.insert("a.md".into(), "y".into());
        let out = run(&LsTool, &state, json!({})).await;
        assert_eq!(out.content, r#"["a.md","notes.md"]"#);
        assert!(out.update.is_empty());
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let out = run(&LsTool, &AgentState::default(), json!({})).await;
        assert_eq!(out.content, "[]");
    }
}
