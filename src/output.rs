//! Rendering of a finished conversation for stdout.

use ferret_model::{MessageContent, Role};
use ferret_tools::{render_todos, AgentState};

/// Full conversation: each message under a role heading, then the files and
/// the todo list.
pub fn conversation(state: &AgentState) -> String {
    let mut out = String::new();
    for msg in &state.messages {
        let (heading, body) = match (&msg.role, &msg.content) {
            (_, MessageContent::ToolCall { function, .. }) => {
                ("Tool", format!("{}({})", function.name, function.arguments))
            }
            (_, MessageContent::ToolResult { content, .. }) => ("Tool Result", content.clone()),
            (Role::System, MessageContent::Text(t)) => ("System", t.clone()),
            (Role::User, MessageContent::Text(t)) => ("User", t.clone()),
            (Role::Assistant | Role::Tool, MessageContent::Text(t)) => ("Assistant", t.clone()),
        };
        out.push_str(&format!("## {heading}\n\n{}\n\n", body.trim_end()));
    }

    out.push_str("## Files\n\n");
    if state.files.is_empty() {
        out.push_str("(none)\n");
    }
    for (path, content) in &state.files {
        out.push_str(&format!("### {path}\n\n{}\n\n", content.trim_end()));
    }

    out.push_str(&format!("\n## Todos\n\n{}\n", render_todos(&state.todos)));
    out
}

/// Only the last message's text.
pub fn compact(state: &AgentState) -> String {
    format!("{}\n", state.last_message_text())
}

pub fn json(state: &AgentState) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(state)?)
}
