//! Web tools available to roster agents.
//!
//! - [`search`]: `search_news`, Google Custom Search restricted to the last
//!   seven days.
//! - [`scrape`]: `scrape_news_article`, page fetch with HTML-to-text and an
//!   optional model-backed article analysis.
//!
//! Both tools report expected failures (bad URL, HTTP errors, missing
//! credentials) as result text so the model can react to them.

pub mod scrape;
pub mod search;

use std::sync::Arc;

use crate::agent::config::AgentConfig;
use crate::agent::provider::LlmProvider;
use crate::agent::tool::ToolRegistry;
use crate::error::AgentError;

pub use scrape::{SCRAPE_TOOL, ScrapeArticleTool};
pub use search::{SEARCH_TOOL, SearchNewsTool};

/// User agent sent by the HTTP tools.
const USER_AGENT: &str = concat!("swarm-rs/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client shared by the web tools.
///
/// # Errors
///
/// Returns [`AgentError::Config`] if the client cannot be constructed.
pub fn http_client(config: &AgentConfig) -> Result<reqwest::Client, AgentError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| AgentError::Config {
            message: format!("failed to build HTTP client: {e}"),
        })
}

/// Registers `search_news` and `scrape_news_article` in `registry`.
///
/// The scrape tool analyzes articles through `provider` using
/// `analysis_prompt`.
///
/// # Errors
///
/// Returns [`AgentError::Config`] if the HTTP client cannot be built or a
/// tool name is already registered.
pub fn register_web_tools(
    registry: &mut ToolRegistry,
    config: &AgentConfig,
    provider: Arc<dyn LlmProvider>,
    analysis_prompt: String,
) -> Result<(), AgentError> {
    let client = http_client(config)?;

    let search = SearchNewsTool::new(client.clone(), config);
    registry.register(
        SEARCH_TOOL,
        search::DESCRIPTION,
        search::parameters(),
        Arc::new(search),
    )?;

    let scrape = ScrapeArticleTool::new(client, provider, config, analysis_prompt);
    registry.register(
        SCRAPE_TOOL,
        scrape::DESCRIPTION,
        scrape::parameters(),
        Arc::new(scrape),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::{ChatRequest, ChatResponse};
    use async_trait::async_trait;

    struct NullProvider;

    #[async_trait]
    impl LlmProvider for NullProvider {
        fn name(&self) -> &'static str {
            "null"
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, AgentError> {
            Ok(ChatResponse::default())
        }
    }

    #[test]
    fn test_register_web_tools() {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let mut registry = ToolRegistry::new();
        register_web_tools(
            &mut registry,
            &config,
            Arc::new(NullProvider),
            "analyze".to_string(),
        )
        .unwrap_or_else(|e| unreachable!("{e}"));

        assert_eq!(registry.names(), vec![SCRAPE_TOOL, SEARCH_TOOL]);
        let search = registry.definition(SEARCH_TOOL).unwrap_or_else(|| unreachable!());
        assert_eq!(search.parameters["required"][0], "query");

        // second registration collides
        let again = register_web_tools(
            &mut registry,
            &config,
            Arc::new(NullProvider),
            "analyze".to_string(),
        );
        assert!(matches!(again, Err(AgentError::Config { .. })));
    }
}
