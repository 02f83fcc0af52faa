//! Agent trait definition.
//!
//! Persona agents, the planner and the synthesizer all implement this
//! trait, which provides a uniform way to build and send their requests.

use async_trait::async_trait;

use super::executor::ToolExecutor;
use super::message::{ChatRequest, ChatResponse, TokenUsage, system_message, user_message};
use super::provider::LlmProvider;
use super::tool::ToolDefinition;
use crate::error::AgentError;

/// Response from an agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's text output.
    pub content: String,
    /// Token usage for this execution (all rounds).
    pub usage: TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

impl From<ChatResponse> for AgentResponse {
    fn from(response: ChatResponse) -> Self {
        Self {
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        }
    }
}

/// Trait implemented by all agents in the system.
///
/// Agents encapsulate a role (persona, planning, synthesis) with a fixed
/// system prompt and model configuration.
///
/// Agents that support tool-calling override [`Agent::tools`] and are run
/// through [`execute_with_tools`].
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &str;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System prompt that defines the agent's role and behavior.
    fn system_prompt(&self) -> &str;

    /// Whether to request JSON-formatted output.
    fn json_mode(&self) -> bool {
        false
    }

    /// Sampling temperature (0.0 = deterministic, higher = more creative).
    fn temperature(&self) -> f32 {
        0.7
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        2048
    }

    /// Tool definitions available to this agent.
    fn tools(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }

    /// Maximum model ↔ tool rounds before aborting.
    fn max_rounds(&self) -> usize {
        8
    }

    /// Builds the initial request: `[system persona, user task]`.
    fn build_request(&self, user_msg: &str) -> ChatRequest {
        ChatRequest {
            model: self.model().to_string(),
            messages: vec![system_message(self.system_prompt()), user_message(user_msg)],
            temperature: Some(self.temperature()),
            max_tokens: Some(self.max_tokens()),
            json_mode: self.json_mode(),
            tools: self.tools(),
        }
    }

    /// Executes the agent with the given user message as a single call.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        user_msg: &str,
    ) -> Result<AgentResponse, AgentError> {
        let mut request = self.build_request(user_msg);
        request.tools.clear();
        let response = provider.chat(&request).await?;
        Ok(response.into())
    }
}

/// Executes an agent with tool-calling support.
///
/// If the agent declares tools, runs the agentic loop with its round
/// bound. Otherwise falls through to [`Agent::execute`].
///
/// # Errors
///
/// Returns [`AgentError`] on API failures, tool execution errors,
/// unknown tools (under the abort policy) or when the round bound is hit.
pub async fn execute_with_tools(
    agent: &dyn Agent,
    provider: &dyn LlmProvider,
    user_msg: &str,
    executor: &ToolExecutor<'_>,
) -> Result<AgentResponse, AgentError> {
    if agent.tools().is_empty() {
        return agent.execute(provider, user_msg).await;
    }

    let mut request = agent.build_request(user_msg);
    let response = super::agentic_loop::agentic_loop(
        provider,
        &mut request,
        executor,
        agent.max_rounds(),
    )
    .await?;

    Ok(response.into())
}
