//! `scrape_news_article`: fetch a page, reduce it to text and optionally
//! extract a structured article analysis with the model.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::agent::config::AgentConfig;
use crate::agent::provider::LlmProvider;
use crate::agent::report::strip_code_fence;
use crate::agent::tool::Tool;
use crate::agent::traits::Agent;
use crate::error::AgentError;

/// Registered tool name.
pub const SCRAPE_TOOL: &str = "scrape_news_article";

/// Tool description shown to the model.
pub const DESCRIPTION: &str = "Scrape and analyze news article content";

/// Page text beyond this many characters is cut before it is returned or analyzed.
const MAX_ARTICLE_CHARS: usize = 20_000;

/// Response bytes read before the body is cut off.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Elements whose content never belongs to the article text.
const HIDDEN_ELEMENTS: [&str; 6] = ["script", "style", "nav", "footer", "aside", "noscript"];

static RE_HIDDEN: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    HIDDEN_ELEMENTS
        .iter()
        .filter_map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).ok())
        .collect()
});

static RE_COMMENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").ok());

static RE_BLOCK_END: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:p|div|h[1-6]|li|tr|section|article|header|blockquote)\s*>").ok()
});

static RE_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").ok());

/// Parameter schema for `scrape_news_article`.
#[must_use]
pub fn parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "url": {
                "type": "string",
                "description": "URL of the news article"
            },
            "analyze": {
                "type": "boolean",
                "description": "Whether to perform content analysis (default true)"
            }
        },
        "required": ["url"]
    })
}

/// Reduces an HTML document to readable text.
///
/// Drops script, style, navigation, footer and aside blocks, turns block
/// boundaries into line breaks, removes remaining tags and decodes
/// entities.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let mut text = html.to_string();

    for re in RE_HIDDEN.iter() {
        text = re.replace_all(&text, " ").into_owned();
    }
    if let Some(re) = RE_COMMENT.as_ref() {
        text = re.replace_all(&text, " ").into_owned();
    }
    if let Some(re) = RE_BLOCK_END.as_ref() {
        text = re.replace_all(&text, "\n").into_owned();
    }
    if let Some(re) = RE_TAG.as_ref() {
        text = re.replace_all(&text, " ").into_owned();
    }

    let decoded = html_escape::decode_html_entities(&text);

    decoded
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Accepts only absolute http(s) URLs.
fn validate_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("invalid URL '{raw}': {e}"))?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(format!(
                "URL scheme '{scheme}' is not allowed, only http and https"
            ));
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(format!("URL '{raw}' has no host"));
    }
    Ok(url)
}

/// Truncates `text` to at most `max` characters.
fn truncate_chars(text: &str, max: usize) -> &str {
    text.char_indices()
        .nth(max)
        .map_or(text, |(idx, _)| &text[..idx])
}

/// Single-shot agent that extracts a structured article summary.
struct ArticleAnalyzer {
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

#[async_trait]
impl Agent for ArticleAnalyzer {
    fn name(&self) -> &'static str {
        "article_analyzer"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn json_mode(&self) -> bool {
        true
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// `scrape_news_article` tool handler.
pub struct ScrapeArticleTool {
    client: reqwest::Client,
    provider: Arc<dyn LlmProvider>,
    analyzer: ArticleAnalyzer,
}

impl ScrapeArticleTool {
    /// Creates the tool; analyses run on `provider` with `analysis_prompt`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        provider: Arc<dyn LlmProvider>,
        config: &AgentConfig,
        analysis_prompt: String,
    ) -> Self {
        Self {
            client,
            provider,
            analyzer: ArticleAnalyzer {
                model: config.model.clone(),
                temperature: config.temperature,
                max_tokens: config.agent_max_tokens,
                system_prompt: analysis_prompt,
            },
        }
    }

    async fn fetch(&self, url: Url) -> Result<String, String> {
        debug!(url = %url, "fetching article");
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| e.to_string())? {
            let room = MAX_BODY_BYTES - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                debug!(limit = MAX_BODY_BYTES, "article body truncated");
                break;
            }
            body.extend_from_slice(&chunk);
        }
        Ok(page_text(&String::from_utf8_lossy(&body)))
    }

    /// Runs the model analysis over extracted page text.
    ///
    /// Returns the analysis object with `url` attached, or
    /// `{"error": "Failed to analyze article: ...", "url": ...}`.
    async fn analyze(&self, text: &str, url: &str) -> Value {
        let outcome = match self.analyzer.execute(&*self.provider, text).await {
            Ok(response) => serde_json::from_str::<Value>(strip_code_fence(&response.content))
                .map_err(|e| format!("analysis is not valid JSON: {e}")),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(Value::Object(mut article)) => {
                article.insert("url".to_string(), Value::String(url.to_string()));
                Value::Object(article)
            }
            Ok(other) => json!({
                "error": format!("Failed to analyze article: expected a JSON object, got {other}"),
                "url": url,
            }),
            Err(message) => {
                warn!(url, error = %message, "article analysis failed");
                json!({
                    "error": format!("Failed to analyze article: {message}"),
                    "url": url,
                })
            }
        }
    }
}

impl std::fmt::Debug for ScrapeArticleTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapeArticleTool")
            .field("provider", &self.provider.name())
            .field("model", &self.analyzer.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Tool for ScrapeArticleTool {
    async fn call(&self, arguments: Map<String, Value>) -> Result<Value, AgentError> {
        let Some(raw_url) = arguments.get("url").and_then(Value::as_str) else {
            return Ok(Value::String(
                "Error scraping article: missing required parameter 'url'".to_string(),
            ));
        };
        let analyze = arguments
            .get("analyze")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        let url = match validate_url(raw_url.trim()) {
            Ok(url) => url,
            Err(message) => {
                return Ok(Value::String(format!("Error scraping article: {message}")));
            }
        };
        let url_text = url.to_string();

        let text = match self.fetch(url).await {
            Ok(text) => text,
            Err(message) => {
                warn!(url = %url_text, error = %message, "scrape failed");
                return Ok(Value::String(format!("Error scraping article: {message}")));
            }
        };

        if analyze {
            Ok(self.analyze(&text, &url_text).await)
        } else {
            Ok(Value::String(text))
        }
    }
}

/// Extracted, length-capped article text for a fetched page.
fn page_text(body: &str) -> String {
    let text = html_to_text(body);
    truncate_chars(&text, MAX_ARTICLE_CHARS).to_string()
}
