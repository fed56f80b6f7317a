use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::tool::{Tool, ToolCall, ToolContext, ToolKind, ToolOutput};
use crate::{read_file, AgentError, DEFAULT_READ_LIMIT};

pub struct ReadFileTool;

#[derive(Deserialize)]
struct Args {
    file_path: String,
    #[serde(default)]
    offset: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_READ_LIMIT
}

#[async_trait]
impl Tool for ReadFileTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ReadFile
    }

    fn description(&self) -> String {
        format!(
            "Read a file from the virtual filesystem.\n\n\
             - Output is numbered like `cat -n`: line number, a tab, then the line\n\
             - Reads up to {DEFAULT_READ_LIMIT} lines from the start by default; pass \
             offset (0-based line) and limit for long files\n\
             - Lines longer than 2000 characters are truncated\n\
             - Call ls first if you are unsure which files exist"
        )
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": { "type": "string", "description": "Path of the file to read" },
                "offset": { "type": "integer", "minimum": 0, "description": "Line to start from (0-based, default 0)" },
                "limit": { "type": "integer", "minimum": 0, "description": "Maximum lines to return (default 2000)" }
            },
            "required": ["file_path"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall, ctx: ToolContext<'_>) -> Result<ToolOutput, AgentError> {
        let args: Args = match call.parse_args() {
            Ok(a) => a,
            Err(out) => return Ok(out),
        };
        debug!(path = %args.file_path, offset = args.offset, limit = args.limit, "read_file tool");

        Ok(match read_file(&ctx.state.files, &args.file_path, args.offset, args.limit) {
            Ok(text) => ToolOutput::ok(&call.id, text),
            Err(e) => ToolOutput::err(&call.id, e.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::builtin::test_support::run;
    use crate::AgentState;

    fn state() -> AgentState {
        let mut s = AgentState::default();
        s.files.insert("a.md".into(), "one\ntwo\nthree".into());
        s
    }

    #[tokio::test]
    async fn defaults_read_whole_file() {
        let out = run(&ReadFileTool, &state(), json!({ "file_path": "a.md" })).await;
        assert!(!out.is_error);
        assert_eq!(out.content, "     1\tone\n     2\ttwo\n     3\tthree");
    }

    #[tokio::test]
    async fn offset_and_limit_are_honoured() {
        let out =
            run(&ReadFileTool, &state(), json!({ "file_path": "a.md", "offset": 1, "limit": 1 }))
                .await;
        assert_eq!(out.content, "     2\ttwo");
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let out = run(&ReadFileTool, &state(), json!({ "file_path": "b.md" })).await;
        assert!(out.is_error);
        assert_eq!(out.content, "Error: File 'b.md' not found");
    }

    #[tokio::test]
    async fn missing_path_argument_is_reported() {
        let out = run(&ReadFileTool, &state(), json!({ "offset": 2 })).await;
        assert!(out.is_error);
        assert!(out.content.contains("file_path"));
    }
}
