// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Web search, page fetching and summarization used by the `web_search` tool.
//!
//! Each concern is a trait so tests and alternative backends can stand in
//! for the network.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use ferret_config::SearchTopic;
use ferret_model::{CompletionRequest, Message, ModelProvider, ResponseEvent};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";
const USER_AGENT: &str = "ferret-agent/0.1";

/// One result returned by a search backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// Short snippet chosen by the search backend
    #[serde(default)]
    pub content: String,
    /// Full page text when the backend provides it
    #[serde(default)]
    pub raw_content: Option<String>,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
        topic: SearchTopic,
    ) -> anyhow::Result<Vec<SearchHit>>;
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its readable text.
    async fn fetch(&self, url: &str) -> anyhow::Result<String>;
}

/// A saved-file name plus the key learnings of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub filename: String,
    pub summary: String,
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, content: &str) -> anyhow::Result<Summary>;
}

/// Today's date in the form used across prompts and saved results.
pub fn today() -> String {
    chrono::Local::now().format("%a %b %-d, %Y").to_string()
}

// ─── Tavily ──────────────────────────────────────────────────────────────────

/// Client for the Tavily search API.
pub struct TavilyClient {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
    topic: SearchTopic,
    include_raw_content: bool,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

impl TavilyClient {
    /// A missing key is accepted here and reported on the first search.
    pub fn new(api_key: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .context("building search HTTP client")?;
        Ok(Self { http, api_key, endpoint: TAVILY_ENDPOINT.into() })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
        topic: SearchTopic,
    ) -> anyhow::Result<Vec<SearchHit>> {
        let Some(api_key) = &self.api_key else {
            bail!("no search API key configured; set TAVILY_API_KEY or search.api_key");
        };
        debug!(query, max_results, %topic, "tavily search");

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&TavilyRequest { query, max_results, topic, include_raw_content: true })
            .send()
            .await?;

        if !resp.status().is_success() {
            bail!("search API returned status {}", resp.status());
        }
        let body: TavilyResponse = resp.json().await.context("decoding search response")?;
        Ok(body.results)
    }
}

// ─── Page fetching ───────────────────────────────────────────────────────────

/// Fetches pages over HTTP and converts HTML to plain text.
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(3))
            .user_agent(USER_AGENT)
            .build()
            .context("building fetch HTTP client")?;
        Ok(Self { http })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<String> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            bail!("fetching {url} returned status {}", response.status());
        }
        let is_html = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_lowercase().contains("html"))
            .unwrap_or(false);
        let body = response.text().await?;
        Ok(if is_html { html_to_text(&body) } else { body })
    }
}

pub fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), 100)
}

// ─── Summarization ───────────────────────────────────────────────────────────

const SUMMARIZE_PROMPT: &str = "\
You are creating a concise summary of a web page for a research file store.
Today's date is {date}.

Keep the key facts, figures, names and dates; drop navigation and boilerplate.
Choose a short descriptive file name ending in .md.

Reply with a single JSON object and nothing else:
{\"filename\": \"<name>.md\", \"summary\": \"<key learnings>\"}

<webpage_content>
{content}
</webpage_content>";

/// Summarizes through a language model asked to reply with JSON.
pub struct ModelSummarizer {
    model: Arc<dyn ModelProvider>,
}

impl ModelSummarizer {
    pub fn new(model: Arc<dyn ModelProvider>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Summarizer for ModelSummarizer {
    async fn summarize(&self, content: &str) -> anyhow::Result<Summary> {
        let prompt = SUMMARIZE_PROMPT.replace("{date}", &today()).replace("{content}", content);
        let req = CompletionRequest { messages: vec![Message::user(prompt)], tools: vec![], stream: true };

        let mut stream = self.model.complete(req).await?;
        let mut text = String::new();
        while let Some(event) = stream.next().await {
            if let ResponseEvent::TextDelta(delta) = event? {
                text.push_str(&delta);
            }
        }
        parse_summary(&text)
    }
}

/// Extract the first `{...}` span of `text` and decode it as a [`Summary`].
fn parse_summary(text: &str) -> anyhow::Result<Summary> {
    let start = text.find('{').context("summary reply contains no JSON object")?;
    let end = text.rfind('}').filter(|&e| e > start).context("summary reply is not closed")?;
    let summary: Summary =
        serde_json::from_str(&text[start..=end]).context("decoding summary JSON")?;
    if summary.filename.trim().is_empty() {
        bail!("summary has an empty filename");
    }
    Ok(summary)
}

/// Used when summarization fails: the first `max_chars` characters of the
/// page, marked with `...` when cut.
pub fn fallback_summary(content: &str, max_chars: usize) -> Summary {
    let summary = if content.chars().count() > max_chars {
        let head: String = content.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        content.to_string()
    };
    Summary { filename: "search_result.md".into(), summary }
}
