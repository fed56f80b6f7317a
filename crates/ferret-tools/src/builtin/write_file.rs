use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::tool::{Tool, ToolCall, ToolContext, ToolKind, ToolOutput};
use crate::{write_file, AgentError, WriteOutcome};

pub struct WriteFileTool;

#[derive(Deserialize)]
struct Args {
    file_path: String,
    content: String,
}

#[async_trait]
impl Tool for WriteFileTool {
    fn kind(&self) -> ToolKind {
        ToolKind::WriteFile
    }

    fn description(&self) -> String {
        "Create a file in the virtual filesystem or overwrite an existing one. \
         The whole file is replaced with `content`."
            .into()
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": { "type": "string", "description": "Path of the file to write" },
                "content": { "type": "string", "description": "Full new contents of the file" }
            },
            "required": ["file_path", "content"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall, ctx: ToolContext<'_>) -> Result<ToolOutput, AgentError> {
        let args: Args = match call.parse_args() {
            Ok(a) => a,
            Err(out) => return Ok(out),
        };
        let (update, outcome) = write_file(&ctx.state.files, &args.file_path, &args.content);
        let verb = match outcome {
            WriteOutcome::Created => "Created",
            WriteOutcome::Updated => "Updated",
        };
        info!(path = %args.file_path, bytes = args.content.len(), "{} virtual file", verb.to_lowercase());
        Ok(ToolOutput::ok(&call.id, format!("{verb} file {}", args.file_path)).with_update(update))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::builtin::test_support::run;
    use crate::AgentState;

    #[tokio::test]
    async fn new_path_is_created() {
        let out =
            run(&WriteFileTool, &AgentState::default(), json!({ "file_path": "a.md", "content": "hi" }))
                .await;
        assert_eq!(out.content, "Created file a.md");
        assert_eq!(out.update.files.unwrap()["a.md"], "hi");
        assert!(out.update.todos.is_none());
    }

    #[tokio::test]
    async fn existing_path_is_updated() {
        let mut state = AgentState::default();
        state.files.insert("a.md".into(), "old".into());
        let out = run(&WriteFileTool, &state, json!({ "file_path": "a.md", "content": "" })).await;
        assert_eq!(out.content, "Updated file a.md");
        assert_eq!(out.update.files.unwrap()["a.md"], "");
    }
}
