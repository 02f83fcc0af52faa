//! Agentic tool-calling loop.
//!
//! Drives the LLM ↔ tool execution round-trip: sends a request to the model,
//! executes any tool calls in the response, appends results, and repeats
//! until the model produces a final text response or the round bound is
//! reached.

use tracing::debug;

use super::executor::ToolExecutor;
use super::message::{ChatRequest, ChatResponse, assistant_tool_calls_message, tool_message};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Runs an agentic loop: model → tool calls → tool results → model → …
///
/// Each round is one model call plus the resolution of the tool calls it
/// requested. The loop ends on the first reply without tool calls.
///
/// # Arguments
///
/// * `provider` - LLM provider to call.
/// * `request` - Conversation so far (mutated in-place with tool messages).
/// * `executor` - Dispatches tool calls into the agent's tool set.
/// * `max_rounds` - Bound on model calls.
///
/// # Returns
///
/// The final [`ChatResponse`], with `usage` summed over every round.
///
/// # Errors
///
/// Returns [`AgentError::RoundLimitExceeded`] if the model is still
/// requesting tools after `max_rounds` calls. Propagates provider and
/// executor errors.
pub async fn agentic_loop(
    provider: &dyn LlmProvider,
    request: &mut ChatRequest,
    executor: &ToolExecutor<'_>,
    max_rounds: usize,
) -> Result<ChatResponse, AgentError> {
    let mut usage = super::message::TokenUsage::default();

    for round in 0..max_rounds {
        let mut response = provider.chat(request).await?;
        usage.accumulate(response.usage);

        if response.tool_calls.is_empty() {
            debug!(round, "agentic loop completed with final text response");
            response.usage = usage;
            return Ok(response);
        }

        debug!(
            round,
            tool_count = response.tool_calls.len(),
            "executing tool calls"
        );

        request.messages.push(assistant_tool_calls_message(
            &response.content,
            response.tool_calls.clone(),
        ));

        for call in &response.tool_calls {
            let result = executor.execute(call).await?;
            debug!(
                tool = call.name,
                call_id = call.id,
                is_error = result.is_error,
                "tool execution complete"
            );
            request
                .messages
                .push(tool_message(&result.tool_call_id, &result.content));
        }
    }

    Err(AgentError::RoundLimitExceeded { max_rounds })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::agent::config::UnknownToolPolicy;
    use crate::agent::message::{Role, TokenUsage, system_message, user_message};
    use crate::agent::tool::{ToolCall, ToolRegistry, ToolSet, tool_fn};

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    /// Mock provider that requests `tool` on the first N calls,
    /// then returns a final text response.
    struct MockToolProvider {
        call_count: AtomicUsize,
        tool_rounds: usize,
        tool: &'static str,
    }

    impl MockToolProvider {
        fn new(tool_rounds: usize) -> Self {
            Self::calling("search_news", tool_rounds)
        }

        fn calling(tool: &'static str, tool_rounds: usize) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                tool_rounds,
                tool,
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockToolProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, AgentError> {
            let count = self.call_count.fetch_add(1, Ordering::SeqCst);
            let usage = TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 2,
                total_tokens: 12,
            };

            if count < self.tool_rounds {
                Ok(ChatResponse {
                    content: String::new(),
                    usage,
                    tool_calls: vec![ToolCall {
                        id: format!("call_{count}"),
                        name: self.tool.to_string(),
                        arguments: r#"{"query":"ai"}"#.to_string(),
                    }],
                    finish_reason: Some("tool_calls".to_string()),
                })
            } else {
                Ok(ChatResponse {
                    content: "Final answer based on tool results.".to_string(),
                    usage,
                    tool_calls: Vec::new(),
                    finish_reason: Some("stop".to_string()),
                })
            }
        }
    }

    fn setup() -> (ToolRegistry, ToolSet) {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                "search_news",
                "Search for news articles",
                json!({"type": "object"}),
                tool_fn(|_| async { Ok(json!([])) }),
            )
            .unwrap_or_else(|e| panic!("register failed: {e}"));
        let allowed = registry
            .scoped(&["search_news"])
            .unwrap_or_else(|e| panic!("scope failed: {e}"));
        (registry, allowed)
    }

    fn request() -> ChatRequest {
        ChatRequest {
            model: "test".to_string(),
            messages: vec![system_message("You are a test agent."), user_message("query")],
            temperature: Some(0.0),
            max_tokens: Some(1024),
            json_mode: false,
            tools: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_agentic_loop_single_tool_round() {
        let (registry, allowed) = setup();
        let executor = ToolExecutor::new(&registry, &allowed, UnknownToolPolicy::Abort);
        let provider = MockToolProvider::new(1);
        let mut request = request();

        let response = agentic_loop(&provider, &mut request, &executor, 8)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        assert_eq!(response.content, "Final answer based on tool results.");
        // system + user + assistant(tool_calls) + tool(result)
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[2].role, Role::Assistant);
        assert_eq!(request.messages[3].tool_call_id.as_deref(), Some("call_0"));
        // usage summed over both model calls
        assert_eq!(response.usage.total_tokens, 24);
    }

    #[tokio::test]
    async fn test_agentic_loop_multiple_rounds() {
        let (registry, allowed) = setup();
        let executor = ToolExecutor::new(&registry, &allowed, UnknownToolPolicy::Abort);
        let provider = MockToolProvider::new(3);
        let mut request = request();

        let response = agentic_loop(&provider, &mut request, &executor, 8)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        assert_eq!(response.content, "Final answer based on tool results.");
        // 2 initial + 3 rounds * 2 (assistant + tool) = 8 messages
        assert_eq!(request.messages.len(), 8);
    }

    #[tokio::test]
    async fn test_agentic_loop_exceeds_bound() {
        let (registry, allowed) = setup();
        let executor = ToolExecutor::new(&registry, &allowed, UnknownToolPolicy::Abort);
        // Provider never stops requesting tools
        let provider = MockToolProvider::new(usize::MAX);
        let mut request = request();

        let result = agentic_loop(&provider, &mut request, &executor, 2).await;
        assert!(
            matches!(result, Err(AgentError::RoundLimitExceeded { max_rounds: 2 })),
            "Expected RoundLimitExceeded, got: {result:?}"
        );
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_agentic_loop_no_tools() {
        let (registry, allowed) = setup();
        let executor = ToolExecutor::new(&registry, &allowed, UnknownToolPolicy::Abort);
        let provider = MockToolProvider::new(0);
        let mut request = request();

        let response = agentic_loop(&provider, &mut request, &executor, 8)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
        assert_eq!(request.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_agentic_loop_unknown_tool_aborts() {
        let (registry, allowed) = setup();
        let executor = ToolExecutor::new(&registry, &allowed, UnknownToolPolicy::Abort);
        let provider = MockToolProvider::calling("teleport", 1);
        let mut request = request();

        let result = agentic_loop(&provider, &mut request, &executor, 8).await;
        assert!(matches!(result, Err(AgentError::UnknownTool { ref name }) if name == "teleport"));
    }

    #[tokio::test]
    async fn test_agentic_loop_unknown_tool_reported() {
        let (registry, allowed) = setup();
        let executor = ToolExecutor::new(&registry, &allowed, UnknownToolPolicy::ReportToModel);
        let provider = MockToolProvider::calling("teleport", 1);
        let mut request = request();

        let response = agentic_loop(&provider, &mut request, &executor, 8)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));
        assert_eq!(response.content, "Final answer based on tool results.");
        assert_eq!(request.messages[3].content, "Error: Function teleport not found");
    }
}
