// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use futures::StreamExt;
use tracing::{debug, warn};

use ferret_model::{CompletionRequest, Message, ModelProvider, ResponseEvent};
use ferret_tools::{AgentError, AgentState, StepBudget, ToolCall, ToolContext, ToolOutput, ToolRegistry};

/// A reasoning loop: a model, the tools it may call and its instructions.
///
/// The agent holds no conversation; [`Agent::invoke`] takes a state by value
/// and returns the state it ends with.
pub struct Agent {
    name: String,
    model: Arc<dyn ModelProvider>,
    tools: ToolRegistry,
    system_prompt: String,
}

/// A tool call as requested by the model, before dispatch.
struct RequestedCall {
    call: ToolCall,
    raw_args: String,
    parse_error: Option<String>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        model: Arc<dyn ModelProvider>,
        tools: ToolRegistry,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), model, tools, system_prompt: system_prompt.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Run until the model answers without calling tools.
    ///
    /// Every model round spends one step from `budget`.  Tool calls of one
    /// round run in the order the model emitted them, each seeing the state
    /// left by the previous one.
    pub async fn invoke(
        &self,
        mut state: AgentState,
        budget: &StepBudget,
    ) -> Result<AgentState, AgentError> {
        loop {
            budget.consume()?;

            let (text, calls) = self.stream_one_turn(&state).await?;

            if calls.is_empty() {
                state.messages.push(Message::assistant(text));
                break;
            }
            if !text.is_empty() {
                state.messages.push(Message::assistant(text));
            }

            // All call messages precede their results.
            for rc in &calls {
                state.messages.push(Message::tool_call(&rc.call.id, &rc.call.name, &rc.raw_args));
            }

            for rc in calls {
                let output = match rc.parse_error {
                    Some(e) => ToolOutput::err(
                        &rc.call.id,
                        format!("Error: malformed arguments for {}: {e}", rc.call.name),
                    ),
                    None => {
                        self.tools
                            .execute(&rc.call, ToolContext { state: &state, budget })
                            .await?
                    }
                };
                if output.is_error {
                    debug!(agent = %self.name, tool = %rc.call.name, error = %output.content, "tool reported error");
                }
                state.apply(output.into_update());
            }
        }

        debug!(agent = %self.name, messages = state.messages.len(), remaining = budget.remaining(), "agent finished");
        Ok(state)
    }

    /// Call the model once, collecting text and tool-call events.
    async fn stream_one_turn(
        &self,
        state: &AgentState,
    ) -> Result<(String, Vec<RequestedCall>), AgentError> {
        let mut messages = Vec::with_capacity(state.messages.len() + 1);
        messages.push(Message::system(&self.system_prompt));
        messages.extend(state.messages.iter().cloned());

        let req = CompletionRequest { messages, tools: self.tools.schemas(), stream: true };

        let mut stream = self.model.complete(req).await.context("model completion failed")?;

        let mut full_text = String::new();
        // Keyed by the parallel-tool-call index from the provider.
        let mut pending: BTreeMap<u32, PendingToolCall> = BTreeMap::new();

        while let Some(event) = stream.next().await {
            match event? {
                ResponseEvent::TextDelta(delta) => full_text.push_str(&delta),
                ResponseEvent::ToolCall { index, id, name, arguments } => {
                    let ptc = pending.entry(index).or_default();
                    if !id.is_empty() {
                        ptc.id = id;
                    }
                    if !name.is_empty() {
                        ptc.name = name;
                    }
                    ptc.args_buf.push_str(&arguments);
                }
                ResponseEvent::Usage { input_tokens, output_tokens } => {
                    debug!(agent = %self.name, input_tokens, output_tokens, "token usage");
                }
                ResponseEvent::Done => break,
                ResponseEvent::Error(e) => {
                    warn!(agent = %self.name, error = %e, "model stream error");
                    return Err(AgentError::Model(anyhow::anyhow!("model stream error: {e}")));
                }
            }
        }

        let mut calls = Vec::with_capacity(pending.len());
        for (i, (_, ptc)) in pending.into_iter().enumerate() {
            if ptc.name.is_empty() {
                warn!(tool_call_id = %ptc.id, "dropping tool call with empty name from model");
                continue;
            }
            calls.push(ptc.finish(i));
        }
        Ok((full_text, calls))
    }
}

#[derive(Default)]
struct PendingToolCall {
    id: String,
    name: String,
    args_buf: String,
}

impl PendingToolCall {
    fn finish(self, position: usize) -> RequestedCall {
        let id = if self.id.is_empty() {
            warn!(tool_name = %self.name, "tool call had empty id; generated synthetic id");
            format!("tc_synthetic_{position}")
        } else {
            self.id
        };

        let (args, raw_args, parse_error) = if self.args_buf.trim().is_empty() {
            (serde_json::Value::Object(Default::default()), "{}".to_string(), None)
        } else {
            match serde_json::from_str(&self.args_buf) {
                Ok(v) => (v, self.args_buf, None),
                Err(e) => {
                    warn!(tool_name = %self.name, error = %e, "model sent invalid JSON arguments");
                    (serde_json::Value::Null, self.args_buf, Some(e.to_string()))
                }
            }
        };

        RequestedCall { call: ToolCall { id, name: self.name, args }, raw_args, parse_error }
    }
}
