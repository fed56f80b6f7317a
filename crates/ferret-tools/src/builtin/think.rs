use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::tool::{Tool, ToolCall, ToolContext, ToolKind, ToolOutput};
use crate::AgentError;

/// Scratchpad for reflecting between searches.  Leaves state untouched.
pub struct ThinkTool;

#[derive(Deserialize)]
struct Args {
    reflection: String,
}

#[async_trait]
impl Tool for ThinkTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Think
    }

    fn description(&self) -> String {
        "Record a strategic reflection on research progress.\n\n\
         Use after each search to note what was found, what is still missing, and \
         whether to search again or answer. The reflection is echoed back and \
         changes nothing else."
            .into()
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "reflection": {
                    "type": "string",
                    "description": "Your reflection on progress, gaps and next steps"
                }
            },
            "required": ["reflection"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall, _ctx: ToolContext<'_>) -> Result<ToolOutput, AgentError> {
        let args: Args = match call.parse_args() {
            Ok(a) => a,
            Err(out) => return Ok(out),
        };
        debug!(len = args.reflection.len(), "think tool");
        Ok(ToolOutput::ok(&call.id, format!("Reflection recorded: {}", args.reflection)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::builtin::test_support::run;
    use crate::AgentState;

    #[tokio::test]
    async fn echoes_reflection() {
        let out = run(&ThinkTool, &AgentState::default(), json!({ "reflection": "need more" })).await;
        assert_eq!(out.content, "Reflection recorded: need more");
        assert!(out.update.is_empty());
    }
}
