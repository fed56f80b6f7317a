// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ferret_config::{SearchConfig, SearchTopic};
use ferret_model::ModelProvider;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::search::{
    fallback_summary, today, HttpFetcher, ModelSummarizer, PageFetcher, SearchHit, SearchProvider,
    Summarizer, Summary, TavilyClient,
};
use crate::tool::{Tool, ToolCall, ToolContext, ToolKind, ToolOutput};
use crate::{AgentError, StateUpdate};

const FETCH_ERROR_SUMMARY: &str = "Error reading URL; try another search.";

/// Searches the web and saves every result as a Markdown file, returning
/// only a short listing to keep the caller's context small.
pub struct WebSearchTool {
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    summarizer: Arc<dyn Summarizer>,
    max_results: u32,
    topic: SearchTopic,
    fallback_chars: usize,
}

#[derive(Deserialize)]
struct Args {
    query: String,
}

struct Processed {
    hit: SearchHit,
    summary: Summary,
    raw_content: String,
}

impl WebSearchTool {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        let defaults = SearchConfig::default();
        Self {
            search,
            fetcher,
            summarizer,
            max_results: defaults.max_results,
            topic: defaults.topic,
            fallback_chars: defaults.summary_fallback_chars,
        }
    }

    /// Tavily search, HTTP fetching and model-backed summaries.
    pub fn from_config(cfg: &SearchConfig, model: Arc<dyn ModelProvider>) -> anyhow::Result<Self> {
        let search = TavilyClient::new(cfg.resolve_api_key())?;
        let fetcher = HttpFetcher::new(Duration::from_secs(cfg.fetch_timeout_secs))?;
        Ok(Self::new(Arc::new(search), Arc::new(fetcher), Arc::new(ModelSummarizer::new(model)))
            .with_settings(cfg))
    }

    pub fn with_settings(mut self, cfg: &SearchConfig) -> Self {
        self.max_results = cfg.max_results;
        self.topic = cfg.topic;
        self.fallback_chars = cfg.summary_fallback_chars;
        self
    }

    async fn process(&self, hit: SearchHit) -> Processed {
        match self.fetcher.fetch(&hit.url).await {
            Ok(raw_content) => {
                let summary = match self.summarizer.summarize(&raw_content).await {
                    Ok(s) => s,
                    Err(e) => {
                        warn!(url = %hit.url, error = %e, "summarization failed; using excerpt");
                        fallback_summary(&raw_content, self.fallback_chars)
                    }
                };
                Processed { hit, summary, raw_content }
            }
            Err(e) => {
                warn!(url = %hit.url, error = %e, "fetch failed; using search snippet");
                let summary = if hit.content.is_empty() {
                    FETCH_ERROR_SUMMARY.to_string()
                } else {
                    hit.content.clone()
                };
                let raw_content = hit.raw_content.clone().unwrap_or_default();
                Processed {
                    hit,
                    summary: Summary { filename: "URL_error.md".into(), summary },
                    raw_content,
                }
            }
        }
    }
}

/// `name.ext` → `name_<8 hex>.ext`.
fn unique_filename(name: &str) -> String {
    let uid: String = uuid::Uuid::new_v4().simple().to_string().chars().take(8).collect();
    let (stem, ext) = match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    };
    format!("{stem}_{uid}{ext}")
}

fn render_result(p: &Processed, query: &str, date: &str) -> String {
    let raw = if p.raw_content.is_empty() { "No raw content available" } else { &p.raw_content };
    format!(
        "# Search Result: {}\n\n**URL:** {}\n**Query:** {query}\n**Date:** {date}\n\n\
         ## Summary\n{}\n\n## Raw Content\n{raw}\n",
        p.hit.title, p.hit.url, p.summary.summary
    )
}

#[async_trait]
impl Tool for WebSearchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::WebSearch
    }

    fn description(&self) -> String {
        "Search the web and save the detailed results to files.\n\n\
         Each result is fetched, summarized and stored in the virtual filesystem; \
         the response lists the saved file names with a short summary. Use \
         read_file to open a result when you need the full details."
            .into()
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search query to execute" }
            },
            "required": ["query"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall, _ctx: ToolContext<'_>) -> Result<ToolOutput, AgentError> {
        let args: Args = match call.parse_args() {
            Ok(a) => a,
            Err(out) => return Ok(out),
        };
        let query = args.query;
        info!(query = %query, max_results = self.max_results, topic = %self.topic, "web_search tool");

        let hits = match self.search.search(&query, self.max_results, self.topic).await {
            Ok(h) => h,
            Err(e) => {
                warn!(error = %e, "search failed");
                return Ok(ToolOutput::err(&call.id, format!("Error: search failed: {e:#}")));
            }
        };

        let date = today();
        let mut update = StateUpdate::default();
        let mut saved = Vec::new();
        let mut summaries = Vec::new();

        for hit in hits {
            let processed = self.process(hit).await;
            let filename = unique_filename(&processed.summary.filename);
            update = update.with_file(&filename, render_result(&processed, &query, &date));
            summaries.push(format!("- {filename}: {}...", processed.summary.summary));
            saved.push(filename);
        }

        info!(count = saved.len(), files = ?saved, "web_search saved results");

        let text = format!(
            "🔍 Found {} result(s) for '{query}':\n\n{}\n\nFiles: {}\n💡 Use read_file() to access full details when needed.",
            saved.len(),
            summaries.join("\n"),
            saved.join(", ")
        );
        Ok(ToolOutput::ok(&call.id, text).with_update(update))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;
    use serde_json::json;

    use super::*;
    use crate::builtin::test_support::run;
    use crate::AgentState;

    struct FakeSearch(Vec<SearchHit>);

    #[async_trait]
    impl SearchProvider for FakeSearch {
        async fn search(&self, _: &str, _: u32, _: SearchTopic) -> anyhow::Result<Vec<SearchHit>> {
            Ok(self.0.clone())
        }
    }

    struct DownSearch;

    #[async_trait]
    impl SearchProvider for DownSearch {
        async fn search(&self, _: &str, _: u32, _: SearchTopic) -> anyhow::Result<Vec<SearchHit>> {
            bail!("service unavailable")
        }
    }

    struct Pages(Option<&'static str>);

    #[async_trait]
    impl PageFetcher for Pages {
        async fn fetch(&self, url: &str) -> anyhow::Result<String> {
            match self.0 {
                Some(body) => Ok(body.to_string()),
                None => bail!("timeout fetching {url}"),
            }
        }
    }

    struct FixedSummary(Option<&'static str>);

    #[async_trait]
    impl Summarizer for FixedSummary {
        async fn summarize(&self, _: &str) -> anyhow::Result<Summary> {
            match self.0 {
                Some(name) => Ok(Summary { filename: name.into(), summary: "key facts".into() }),
                None => bail!("model refused"),
            }
        }
    }

    fn hit() -> SearchHit {
        SearchHit {
            title: "Rust 2026".into(),
            url: "https://example.com/rust".into(),
            content: "snippet".into(),
            raw_content: Some("raw from search".into()),
        }
    }

    fn tool(
        search: impl SearchProvider + 'static,
        page: Option<&'static str>,
        name: Option<&'static str>,
    ) -> WebSearchTool {
        WebSearchTool::new(Arc::new(search), Arc::new(Pages(page)), Arc::new(FixedSummary(name)))
    }

    fn is_suffixed(name: &str, stem: &str, ext: &str) -> bool {
        let Some(rest) = name.strip_prefix(&format!("{stem}_")) else { return false };
        let Some(uid) = rest.strip_suffix(ext) else { return false };
        uid.len() == 8 && uid.chars().all(|c| c.is_ascii_hexdigit())
    }

    #[tokio::test]
    async fn saves_summarized_result_file() {
        let t = tool(FakeSearch(vec![hit()]), Some("page body"), Some("result.md"));
        let out = run(&t, &AgentState::default(), json!({ "query": "rust news" })).await;
        assert!(!out.is_error, "{}", out.content);

        let files = out.update.files.unwrap();
        assert_eq!(files.len(), 1);
        let (name, body) = files.iter().next().unwrap();
        assert!(is_suffixed(name, "result", ".md"), "{name}");
        assert!(body.starts_with("# Search Result: Rust 2026\n\n**URL:** https://example.com/rust\n**Query:** rust news\n"));
        assert!(body.contains("## Summary\nkey facts\n\n## Raw Content\npage body\n"));

        assert!(out.content.starts_with("🔍 Found 1 result(s) for 'rust news':"));
        assert!(out.content.contains(&format!("- {name}: key facts...")));
        assert!(out.content.contains(&format!("Files: {name}")));
    }

    #[tokio::test]
    async fn fetch_failure_uses_search_snippet() {
        let t = tool(FakeSearch(vec![hit()]), None, Some("unused.md"));
        let out = run(&t, &AgentState::default(), json!({ "query": "q" })).await;
        let files = out.update.files.unwrap();
        let (name, body) = files.iter().next().unwrap();
        assert!(is_suffixed(name, "URL_error", ".md"), "{name}");
        assert!(body.contains("## Summary\nsnippet\n"));
        assert!(body.contains("## Raw Content\nraw from search\n"));
    }

    #[tokio::test]
    async fn summarizer_failure_falls_back_to_excerpt() {
        let t = tool(FakeSearch(vec![hit()]), Some("short page"), None);
        let out = run(&t, &AgentState::default(), json!({ "query": "q" })).await;
        let files = out.update.files.unwrap();
        let name = files.keys().next().unwrap();
        assert!(is_suffixed(name, "search_result", ".md"), "{name}");
        assert!(out.content.contains(": short page..."));
    }

    #[tokio::test]
    async fn search_failure_is_reported() {
        let t = tool(DownSearch, Some("x"), Some("x.md"));
        let out = run(&t, &AgentState::default(), json!({ "query": "q" })).await;
        assert!(out.is_error);
        assert!(out.content.contains("service unavailable"));
        assert!(out.update.is_empty());
    }

    #[tokio::test]
    async fn no_hits_saves_nothing() {
        let t = tool(FakeSearch(vec![]), Some("x"), Some("x.md"));
        let out = run(&t, &AgentState::default(), json!({ "query": "q" })).await;
        assert!(!out.is_error);
        assert!(out.update.files.is_none());
        assert!(out.content.starts_with("🔍 Found 0 result(s)"));
    }

    #[test]
    fn unique_filename_keeps_extension() {
        assert!(is_suffixed(&unique_filename("notes.md"), "notes", ".md"));
        assert!(is_suffixed(&unique_filename("plain"), "plain", ""));
        assert!(is_suffixed(&unique_filename(".hidden"), ".hidden", ""));
    }
}
