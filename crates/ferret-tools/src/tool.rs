use std::str::FromStr;

use async_trait::async_trait;
use ferret_model::Message;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::{AgentError, AgentState, StateUpdate, StepBudget};

/// Every tool an agent can be given.  Tool names coming from the model or
/// from configuration are parsed into this set at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolKind {
    Ls,
    ReadFile,
    WriteFile,
    WriteTodos,
    ReadTodos,
    Think,
    WebSearch,
    Task,
}

impl ToolKind {
    pub const ALL: [ToolKind; 8] = [
        ToolKind::Ls,
        ToolKind::ReadFile,
        ToolKind::WriteFile,
        ToolKind::WriteTodos,
        ToolKind::ReadTodos,
        ToolKind::Think,
        ToolKind::WebSearch,
        ToolKind::Task,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Ls => "ls",
            ToolKind::ReadFile => "read_file",
            ToolKind::WriteFile => "write_file",
            ToolKind::WriteTodos => "write_todos",
            ToolKind::ReadTodos => "read_todos",
            ToolKind::Think => "think",
            ToolKind::WebSearch => "web_search",
            ToolKind::Task => "task",
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tool: {0}")]
pub struct UnknownToolKind(pub String);

impl FromStr for ToolKind {
    type Err = UnknownToolKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownToolKind(s.to_string()))
    }
}

/// A single tool invocation requested by the model.
#[derive(Debug, Clone)]
pub struct ToolCall {
    /// Opaque identifier returned by the model (forwarded verbatim)
    pub id: String,
    pub name: String,
    /// Parsed JSON arguments
    pub args: Value,
}

impl ToolCall {
    /// Deserialize the arguments into a typed struct, or produce the error
    /// output the model should see.
    pub fn parse_args<T: DeserializeOwned>(&self) -> Result<T, ToolOutput> {
        serde_json::from_value(self.args.clone()).map_err(|e| {
            ToolOutput::err(&self.id, format!("Error: invalid arguments for {}: {e}", self.name))
        })
    }
}

/// Read-only view handed to a tool: the caller's current state and the
/// shared step budget.
#[derive(Clone, Copy)]
pub struct ToolContext<'a> {
    pub state: &'a AgentState,
    pub budget: &'a StepBudget,
}

/// The result of executing a tool.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub call_id: String,
    /// Text returned to the model as the tool response.
    pub content: String,
    /// If true, the tool execution failed non-fatally (returned error message).
    pub is_error: bool,
    /// State changes other than the tool response message itself.
    pub update: StateUpdate,
}

impl ToolOutput {
    pub fn ok(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
            update: StateUpdate::default(),
        }
    }

    pub fn err(call_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self { is_error: true, ..Self::ok(call_id, msg) }
    }

    pub fn with_update(mut self, update: StateUpdate) -> Self {
        self.update = update;
        self
    }

    /// The full delta to apply: the tool's own changes plus the
    /// tool-response message.
    pub fn into_update(self) -> StateUpdate {
        self.update.with_message(Message::tool_result(self.call_id, self.content))
    }
}

/// Trait every tool implements.
#[async_trait]
pub trait Tool: Send + Sync {
    fn kind(&self) -> ToolKind;

    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    fn description(&self) -> String;

    /// JSON Schema for parameters
    fn parameters_schema(&self) -> Value;

    /// Run the tool against the caller's state.  Recoverable failures are
    /// returned as [`ToolOutput::err`]; `Err` aborts the calling loop.
    async fn execute(&self, call: &ToolCall, ctx: ToolContext<'_>) -> Result<ToolOutput, AgentError>;
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use ferret_model::MessageContent;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[test]
    fn kind_names_round_trip_through_from_str() {
        for kind in ToolKind::ALL {
            assert_eq!(kind.as_str().parse::<ToolKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = "tavily_search".parse::<ToolKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown tool: tavily_search");
    }

    #[test]
    fn into_update_appends_tool_response() {
        let out = ToolOutput::ok("c1", "done").with_update(StateUpdate::default().with_file("a", "b"));
        let update = out.into_update();
        assert_eq!(update.files.unwrap()["a"], "b");
        assert_eq!(update.messages.len(), 1);
        match &update.messages[0].content {
            MessageContent::ToolResult { tool_call_id, content } => {
                assert_eq!(tool_call_id, "c1");
                assert_eq!(content, "done");
            }
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[test]
    fn parse_args_reports_bad_arguments() {
        #[derive(Deserialize)]
        #[allow(dead_code)]
        struct Args {
            file_path: String,
        }
        let call = ToolCall { id: "x".into(), name: "read_file".into(), args: json!({}) };
        let err = call.parse_args::<Args>().err().unwrap();
        assert!(err.is_error);
        assert!(err.content.starts_with("Error: invalid arguments for read_file"));
    }
}
