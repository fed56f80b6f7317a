// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Free-form environment name (`dev`, `staging`, `prod`).  Only used for
    /// log context; behaviour does not change with it.
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// Sub-agents the delegation tool may hand work to.
    ///
    /// ```toml
    /// [[subagents]]
    /// name = "research-agent"
    /// description = "Delegate research to the sub-agent researcher."
    /// prompt = "You are a research assistant..."
    /// tools = ["web_search", "think"]
    /// ```
    ///
    /// Omitting `tools` gives the sub-agent every tool available to the
    /// delegation tool.
    #[serde(default = "default_subagents")]
    pub subagents: Vec<SubAgentConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            model: ModelConfig::default(),
            agent: AgentConfig::default(),
            search: SearchConfig::default(),
            log: LogConfig::default(),
            subagents: default_subagents(),
        }
    }
}

fn default_environment() -> String {
    "dev".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider identifier: "mock" (echo-back) or "yaml-mock" (scripted
    /// responses loaded from `mock_responses_file`).
    pub provider: String,
    /// Model name reported to users
    pub name: String,
    /// Path to YAML mock-responses file (used when provider = "yaml-mock").
    /// Can also be set via the FERRET_MOCK_RESPONSES environment variable.
    pub mock_responses_file: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "mock".into(),
            name: "mock-model".into(),
            mock_responses_file: None,
        }
    }
}

fn default_recursion_limit() -> u32 {
    50
}
fn default_research_units() -> u32 {
    3
}
fn default_researcher_iterations() -> u32 {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Total reasoning steps allowed across the whole nested call tree of one
    /// conversation, sub-agents included.
    #[serde(default = "default_recursion_limit")]
    pub recursion_limit: u32,
    /// Upper bound on parallel research units advertised to the main agent.
    #[serde(default = "default_research_units")]
    pub max_concurrent_research_units: u32,
    /// Upper bound on delegation rounds advertised to the main agent.
    #[serde(default = "default_researcher_iterations")]
    pub max_researcher_iterations: u32,
    /// Replaces the built-in main-agent instructions when set.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            recursion_limit: default_recursion_limit(),
            max_concurrent_research_units: default_research_units(),
            max_researcher_iterations: default_researcher_iterations(),
            system_prompt: None,
        }
    }
}

/// Search category forwarded to the search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchTopic {
    #[default]
    General,
    News,
    Finance,
}

impl std::fmt::Display for SearchTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchTopic::General => write!(f, "general"),
            SearchTopic::News => write!(f, "news"),
            SearchTopic::Finance => write!(f, "finance"),
        }
    }
}

fn default_api_key_env() -> String {
    "TAVILY_API_KEY".into()
}
fn default_max_results() -> u32 {
    1
}
fn default_fetch_timeout_secs() -> u64 {
    15
}
fn default_fallback_chars() -> usize {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Environment variable that holds the search API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Explicit API key; prefer api_key_env in config files
    #[serde(default)]
    pub api_key: Option<String>,
    /// Results requested per query.  Not exposed to the model.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default)]
    pub topic: SearchTopic,
    /// Timeout for fetching each result page
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Characters of raw page text kept when summarization fails
    #[serde(default = "default_fallback_chars")]
    pub summary_fallback_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            api_key: None,
            max_results: default_max_results(),
            topic: SearchTopic::default(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            summary_fallback_chars: default_fallback_chars(),
        }
    }
}

impl SearchConfig {
    /// Explicit key first, then the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(k) = &self.api_key {
            return Some(k.clone());
        }
        std::env::var(&self.api_key_env).ok()
    }
}

fn default_log_level() -> String {
    "warn".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter when RUST_LOG is unset: error | warn | info | debug | trace
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

/// Static description of one sub-agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubAgentConfig {
    pub name: String,
    /// Advertised to the delegating agent in the task tool description
    pub description: String,
    /// System prompt for the sub-agent.  `{date}` is replaced with today's date.
    pub prompt: String,
    /// Restricted tool subset by tool name; `None` means every delegation tool.
    #[serde(default)]
    pub tools: Option<Vec<String>>,
}

/// Built-in researcher prompt used by the default `research-agent`.
pub const DEFAULT_RESEARCHER_PROMPT: &str = "\
You are a research assistant conducting research on the user's input topic. \
For context, today's date is {date}.

Use web_search to gather information, then call think after each search to \
assess what you found and what is still missing. Stop once you can answer \
comprehensively; simple topics need two or three searches, complex ones at \
most five.

Your final message is the only thing the delegating agent will see: state \
your findings concisely and name the files where the full search results \
were saved.";

fn default_subagents() -> Vec<SubAgentConfig> {
    vec![SubAgentConfig {
        name: "research-agent".into(),
        description: "Delegate research to the sub-agent researcher. \
                      Only give this researcher one topic at a time."
            .into(),
        prompt: DEFAULT_RESEARCHER_PROMPT.into(),
        tools: Some(vec!["web_search".into(), "think".into()]),
    }]
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
