//! Synthesizer agent for merging sub-agent results.
//!
//! Receives the ordered [`SubAgentResult`]s of a run and produces the final
//! report text. Structured replies are kept as JSON.

use async_trait::async_trait;
use serde_json::Value;

use super::config::AgentConfig;
use super::prompt::build_synthesis_message;
use super::provider::LlmProvider;
use super::report::{SubAgentResult, strip_code_fence};
use super::traits::{Agent, AgentResponse};
use crate::error::AgentError;

/// Agent that synthesizes collected results into the final report.
pub struct SynthesizerAgent {
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

impl SynthesizerAgent {
    /// Creates a new synthesizer agent with the given configuration and system prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: String) -> Self {
        Self {
            model: config.synthesizer_model.clone(),
            temperature: config.temperature,
            max_tokens: config.synthesizer_max_tokens,
            system_prompt,
        }
    }

    /// Runs the synthesis call over `results`.
    ///
    /// The reply is returned as JSON when it parses as a JSON object or
    /// array, and as a string otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UpstreamFailure`] when the model call fails.
    pub async fn synthesize(
        &self,
        provider: &dyn LlmProvider,
        results: &[SubAgentResult],
    ) -> Result<(Value, AgentResponse), AgentError> {
        let message = build_synthesis_message(results);
        let response = self.execute(provider, &message).await?;
        let output = match serde_json::from_str::<Value>(strip_code_fence(&response.content)) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => value,
            _ => Value::String(response.content.clone()),
        };
        Ok((output, response))
    }
}

#[async_trait]
impl Agent for SynthesizerAgent {
    fn name(&self) -> &'static str {
        "synthesizer"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
