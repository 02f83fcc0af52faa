//! `search_news`: recent news search via the Google Custom Search JSON API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::agent::config::AgentConfig;
use crate::agent::tool::Tool;
use crate::error::AgentError;

/// Registered tool name.
pub const SEARCH_TOOL: &str = "search_news";

/// Tool description shown to the model.
pub const DESCRIPTION: &str = "Search for recent news articles (last 7 days)";

/// Google Custom Search endpoint.
const CSE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Only results from the last seven days.
const DATE_RESTRICT: &str = "d7";

/// The API returns at most 10 results per request.
const MAX_RESULTS: usize = 10;

/// Parameter schema for `search_news`.
#[must_use]
pub fn parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "Search query for news articles"
            },
            "num": {
                "type": "integer",
                "description": "Number of results to return (1-10, default 5)"
            }
        },
        "required": ["query"]
    })
}

/// One search hit as returned to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsHit {
    /// Page title.
    pub title: String,
    /// Article URL.
    pub link: String,
    /// Result snippet.
    pub snippet: String,
    /// `article:published_time` meta tag, when the page declares one.
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    pagemap: Option<CsePagemap>,
}

#[derive(Debug, Default, Deserialize)]
struct CsePagemap {
    #[serde(default)]
    metatags: Vec<Map<String, Value>>,
}

impl From<CseItem> for NewsHit {
    fn from(item: CseItem) -> Self {
        let date = item
            .pagemap
            .and_then(|p| p.metatags.into_iter().next())
            .and_then(|tags| {
                tags.get("article:published_time")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });
        Self {
            title: item.title,
            link: item.link,
            snippet: item.snippet,
            date,
        }
    }
}

/// `search_news` tool handler.
#[derive(Debug, Clone)]
pub struct SearchNewsTool {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    engine_id: Option<String>,
    default_results: usize,
}

impl SearchNewsTool {
    /// Creates the tool with credentials from `config`.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &AgentConfig) -> Self {
        Self {
            client,
            endpoint: CSE_ENDPOINT.to_string(),
            api_key: config.search_api_key.clone(),
            engine_id: config.search_engine_id.clone(),
            default_results: config.search_results.clamp(1, MAX_RESULTS),
        }
    }

    /// Overrides the search endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn search(&self, query: &str, num: usize) -> Result<Vec<NewsHit>, String> {
        let (Some(key), Some(cx)) = (self.api_key.as_deref(), self.engine_id.as_deref()) else {
            return Err("GOOGLE_API_KEY and GOOGLE_CSE_ID must be set".to_string());
        };

        debug!(query, num, "searching news");
        let num = num.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", key),
                ("cx", cx),
                ("q", query),
                ("num", num.as_str()),
                ("dateRestrict", DATE_RESTRICT),
            ])
            .send()
            .await
            .map_err(|e| e.without_url().to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("search API returned HTTP {status}"));
        }

        let body = response.text().await.map_err(|e| e.to_string())?;
        parse_results(&body)
    }
}

/// Parses a Custom Search response body into hits.
fn parse_results(body: &str) -> Result<Vec<NewsHit>, String> {
    let parsed: CseResponse =
        serde_json::from_str(body).map_err(|e| format!("invalid search response: {e}"))?;
    Ok(parsed.items.into_iter().map(NewsHit::from).collect())
}

#[async_trait]
impl Tool for SearchNewsTool {
    async fn call(&self, arguments: Map<String, Value>) -> Result<Value, AgentError> {
        let Some(query) = arguments
            .get("query")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|q| !q.is_empty())
        else {
            return Ok(Value::String(
                "Error performing news search: missing required parameter 'query'".to_string(),
            ));
        };

        let num = arguments
            .get("num")
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(self.default_results)
            .clamp(1, MAX_RESULTS);

        match self.search(query, num).await {
            Ok(hits) => serde_json::to_value(hits).map_err(|e| AgentError::ToolExecution {
                name: SEARCH_TOOL.to_string(),
                message: e.to_string(),
            }),
            Err(message) => {
                warn!(query, error = %message, "news search failed");
                Ok(Value::String(format!("Error performing news search: {message}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(with_credentials: bool) -> SearchNewsTool {
        let mut builder = AgentConfig::builder().api_key("test");
        if with_credentials {
            builder = builder.search_credentials("key", "cx");
        }
        let config = builder.build().unwrap_or_else(|_| unreachable!());
        SearchNewsTool::new(reqwest::Client::new(), &config)
    }

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_parse_results() {
        let body = r#"{
            "items": [
                {
                    "title": "AI regulation advances",
                    "link": "https://news.test/ai",
                    "snippet": "Lawmakers agreed...",
                    "pagemap": {"metatags": [{"article:published_time": "2024-05-01T10:00:00Z"}]}
                },
                {"title": "No date", "link": "https://news.test/b", "snippet": "..."}
            ]
        }"#;
        let hits = parse_results(body).unwrap_or_default();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "AI regulation advances");
        assert_eq!(hits[0].date.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(hits[1].date, None);
    }

    #[test]
    fn test_parse_results_without_items() {
        assert_eq!(parse_results("{}").unwrap_or_default(), Vec::new());
        assert!(parse_results("<html>").is_err());
    }

    #[test]
    fn test_hit_serializes_with_date_field() {
        let hit = NewsHit {
            title: "t".to_string(),
            link: "l".to_string(),
            snippet: "s".to_string(),
            date: None,
        };
        let value = serde_json::to_value(hit).unwrap_or_default();
        assert_eq!(value, json!({"title": "t", "link": "l", "snippet": "s", "date": null}));
    }

    #[tokio::test]
    async fn test_missing_query_reported() {
        let result = tool(true)
            .call(args(json!({"num": 3})))
            .await
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(
            result,
            json!("Error performing news search: missing required parameter 'query'")
        );
    }

    #[tokio::test]
    async fn test_missing_credentials_reported() {
        let result = tool(false)
            .call(args(json!({"query": "ai"})))
            .await
            .unwrap_or_else(|e| unreachable!("{e}"));
        let text = result.as_str().unwrap_or_default();
        assert!(text.starts_with("Error performing news search: "));
        assert!(text.contains("GOOGLE_API_KEY"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reported() {
        let result = tool(true)
            .with_endpoint("http://127.0.0.1:9/customsearch")
            .call(args(json!({"query": "ai"})))
            .await
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert!(
            result
                .as_str()
                .is_some_and(|t| t.starts_with("Error performing news search: "))
        );
    }
}
