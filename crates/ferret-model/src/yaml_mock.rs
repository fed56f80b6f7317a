// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
/// YAML-configured mock model provider for end-to-end tests.
///
/// The provider reads a YAML file that maps the most recent user message to
/// a scripted conversation.  A rule either answers with text, emits one
/// batch of tool calls followed by `after_tool_reply`, or lists explicit
/// `turns`, one per model round after that user message.
///
/// # YAML format
///
/// ```yaml
/// responses:
///   - match_type: equals          # contains | equals | starts_with | regex | default
///     pattern: "ping"
///     reply: "pong"
///
///   - match_type: contains
///     pattern: "save a note"
///     tool_calls:
///       - id: tc-1
///         tool: write_file
///         args: { file_path: notes.md, content: "hello" }
///     after_tool_reply: "Saved."
///
///   - match_type: contains
///     pattern: "research"
///     turns:
///       - tool_calls:
///           - { id: t1, tool: write_todos, args: { todos: [] } }
///       - tool_calls:
///           - { id: t2, tool: task, args: { description: "...", subagent_type: research-agent } }
///       - reply: "Done."
///
///   - match_type: default
///     reply: "I understand your request."
/// ```
///
/// The round number is the count of tool-result blocks that follow the last
/// user message, so a sub-agent, which always starts from a fresh user
/// message, is matched independently of its parent.
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Context;
use async_trait::async_trait;
use futures::stream;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{provider::ResponseStream, CompletionRequest, Message, ResponseEvent, Role};

// ─── YAML schema ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MockConfig {
    pub responses: Vec<ResponseRule>,
}

/// One entry in the responses list.
#[derive(Debug, Deserialize)]
pub struct ResponseRule {
    pub match_type: MatchType,
    /// Ignored for `default`.
    #[serde(default)]
    pub pattern: String,
    pub reply: Option<String>,
    /// Tool calls emitted in the first round.
    #[serde(default)]
    pub tool_calls: Vec<ToolCallDef>,
    /// Text sent once tool results have arrived.
    pub after_tool_reply: Option<String>,
    /// Explicit per-round script; takes precedence over the fields above.
    #[serde(default)]
    pub turns: Vec<Turn>,
}

#[derive(Debug, Deserialize)]
pub struct Turn {
    pub reply: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Contains,
    Equals,
    StartsWith,
    Regex,
    Default,
}

#[derive(Debug, Deserialize)]
pub struct ToolCallDef {
    pub id: String,
    pub tool: String,
    /// Serialized to a JSON string for the tool arguments.
    pub args: serde_json::Value,
}

// ─── Provider ────────────────────────────────────────────────────────────────

pub struct YamlMockProvider {
    config: MockConfig,
    call_count: AtomicU32,
}

impl YamlMockProvider {
    /// Load a provider from a YAML file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading mock responses file: {}", path.display()))?;
        Self::load(&text)
    }

    /// Load a provider from a YAML string.
    pub fn load(yaml: &str) -> anyhow::Result<Self> {
        let config: MockConfig =
            serde_yaml::from_str(yaml).context("parsing mock responses YAML")?;
        Ok(Self { config, call_count: AtomicU32::new(0) })
    }

    fn find_rule(&self, user_text: &str) -> Option<&ResponseRule> {
        let lower = user_text.to_lowercase();
        let mut default_rule = None;

        for rule in &self.config.responses {
            let hit = match rule.match_type {
                MatchType::Default => {
                    default_rule.get_or_insert(rule);
                    false
                }
                MatchType::Contains => lower.contains(&rule.pattern.to_lowercase()),
                MatchType::Equals => lower == rule.pattern.to_lowercase(),
                MatchType::StartsWith => lower.starts_with(&rule.pattern.to_lowercase()),
                MatchType::Regex => regex::Regex::new(&rule.pattern)
                    .map(|re| re.is_match(user_text))
                    .unwrap_or(false),
            };
            if hit {
                return Some(rule);
            }
        }

        default_rule
    }
}

/// Index of the last user message and the number of tool-result blocks after it.
fn current_round(messages: &[Message]) -> (Option<usize>, usize) {
    let last_user = messages.iter().rposition(|m| m.role == Role::User);
    let tail = &messages[last_user.map_or(0, |i| i + 1)..];
    let mut rounds = 0;
    let mut in_block = false;
    for m in tail {
        let is_tool = m.role == Role::Tool;
        if is_tool && !in_block {
            rounds += 1;
        }
        in_block = is_tool;
    }
    (last_user, rounds)
}

#[async_trait]
impl crate::ModelProvider for YamlMockProvider {
    fn name(&self) -> &str {
        "yaml-mock"
    }
    fn model_name(&self) -> &str {
        "yaml-mock-model"
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<ResponseStream> {
        let call_num = self.call_count.fetch_add(1, Ordering::Relaxed) + 1;

        let (last_user, round) = current_round(&req.messages);
        let last_user_text = last_user
            .and_then(|i| req.messages[i].as_text())
            .unwrap_or("[no user message]");

        debug!(call_num, round, last_user = %last_user_text, "yaml mock complete()");

        let events = match self.find_rule(last_user_text) {
            None => text_events("[no mock rule matched]"),
            Some(rule) if !rule.turns.is_empty() => match rule.turns.get(round) {
                Some(turn) if !turn.tool_calls.is_empty() => tool_call_events(&turn.tool_calls),
                Some(turn) => text_events(turn.reply.as_deref().unwrap_or("[no reply configured]")),
                None => text_events("[no more turns configured]"),
            },
            Some(rule) if round > 0 => text_events(
                rule.after_tool_reply
                    .as_deref()
                    .or(rule.reply.as_deref())
                    .unwrap_or("[no after-tool reply configured]"),
            ),
            Some(rule) if rule.tool_calls.is_empty() => {
                text_events(rule.reply.as_deref().unwrap_or("[no reply configured]"))
            }
            Some(rule) => tool_call_events(&rule.tool_calls),
        };

        Ok(Box::pin(stream::iter(events)))
    }
}

// ─── Event constructors ───────────────────────────────────────────────────────

fn text_events(text: &str) -> Vec<anyhow::Result<ResponseEvent>> {
    vec![
        Ok(ResponseEvent::TextDelta(text.to_string())),
        Ok(ResponseEvent::Usage { input_tokens: 5, output_tokens: text.len() as u32 / 4 + 1 }),
        Ok(ResponseEvent::Done),
    ]
}

fn tool_call_events(tool_calls: &[ToolCallDef]) -> Vec<anyhow::Result<ResponseEvent>> {
    let mut events: Vec<anyhow::Result<ResponseEvent>> = tool_calls
        .iter()
        .enumerate()
        .map(|(i, tc)| {
            Ok(ResponseEvent::ToolCall {
                index: i as u32,
                id: tc.id.clone(),
                name: tc.tool.clone(),
                arguments: tc.args.to_string(),
            })
        })
        .collect();
    events.push(Ok(ResponseEvent::Done));
    events
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
