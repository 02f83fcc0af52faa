//! Persona agents: named sub-agents the orchestrator dispatches to.
//!
//! A persona wraps a system prompt and a scoped subset of the shared
//! [`ToolRegistry`]. [`PersonaAgent::run`] drives one task to completion
//! and always returns an [`AgentRunResult`]; failures are rendered as
//! `{"error": "<Kind>: <message>"}` instead of propagating.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::config::{AgentConfig, UnknownToolPolicy};
use super::executor::ToolExecutor;
use super::message::TokenUsage;
use super::prompt::build_persona_prompt;
use super::provider::LlmProvider;
use super::report::{AgentRunResult, strip_code_fence};
use super::tool::{ToolDefinition, ToolRegistry, ToolSet};
use super::traits::{Agent, execute_with_tools};
use crate::error::AgentError;

/// Static description of a persona, as listed in a roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaSpec {
    /// Dispatch key used in plans (e.g. `news_searcher`).
    pub name: String,
    /// Human-readable persona name (e.g. `News Searcher`).
    pub display_name: String,
    /// What the agent does; shown to the planner.
    pub description: String,
    /// Names of registry tools the agent may call.
    pub tools: Vec<String>,
    /// Parse the final reply as JSON.
    pub json_output: bool,
}

impl PersonaSpec {
    /// Creates a persona description without tools.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: description.into(),
            tools: Vec::new(),
            json_output: false,
        }
    }

    /// Adds a tool to the persona's allowed set.
    #[must_use]
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tools.push(tool.into());
        self
    }

    /// Marks the persona's final reply as structured JSON.
    #[must_use]
    pub const fn json_output(mut self, enabled: bool) -> Self {
        self.json_output = enabled;
        self
    }
}

/// A named sub-agent with a persona and a scoped tool set.
pub struct PersonaAgent {
    spec: PersonaSpec,
    system_prompt: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_rounds: usize,
    policy: UnknownToolPolicy,
    registry: Arc<ToolRegistry>,
    tools: ToolSet,
}

impl PersonaAgent {
    /// Builds a persona agent over the shared registry.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] for an empty name and
    /// [`AgentError::UnknownTool`] if the persona names a tool the registry
    /// does not have.
    pub fn new(
        spec: PersonaSpec,
        registry: Arc<ToolRegistry>,
        config: &AgentConfig,
    ) -> Result<Self, AgentError> {
        if spec.name.trim().is_empty() {
            return Err(AgentError::Config {
                message: "persona name must not be empty".to_string(),
            });
        }

        let names: Vec<&str> = spec.tools.iter().map(String::as_str).collect();
        let tools = registry.scoped(&names)?;
        let system_prompt =
            build_persona_prompt(&spec.display_name, &spec.description, !tools.is_empty());

        Ok(Self {
            spec,
            system_prompt,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.agent_max_tokens,
            max_rounds: config.max_rounds,
            policy: config.unknown_tool_policy,
            registry,
            tools,
        })
    }

    /// Human-readable persona name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.spec.display_name
    }

    /// Persona description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.spec.description
    }

    /// Names of the tools this agent may call.
    #[must_use]
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools
            .definitions()
            .iter()
            .map(|d| d.name.as_str())
            .collect()
    }

    /// Runs `task` to completion.
    ///
    /// Never fails: any error from the model or tool layer becomes
    /// `{"error": "<Kind>: <message>"}`.
    pub async fn run(&self, provider: &dyn LlmProvider, task: &str) -> AgentRunResult {
        self.run_with_usage(provider, task).await.0
    }

    /// Like [`PersonaAgent::run`], also returning the tokens the run used.
    ///
    /// Usage is zero for failed runs.
    pub async fn run_with_usage(
        &self,
        provider: &dyn LlmProvider,
        task: &str,
    ) -> (AgentRunResult, TokenUsage) {
        let executor = ToolExecutor::new(&self.registry, &self.tools, self.policy);

        match execute_with_tools(self, provider, task, &executor).await {
            Ok(response) => {
                debug!(
                    agent = %self.spec.name,
                    tokens = response.usage.total_tokens,
                    "agent run complete"
                );
                let output = self.parse_output(response.content);
                (AgentRunResult::Completed { output }, response.usage)
            }
            Err(e) => {
                warn!(agent = %self.spec.name, kind = e.kind(), error = %e, "agent run failed");
                (e.into(), TokenUsage::default())
            }
        }
    }

    /// Structured personas return parsed JSON when the reply is JSON and the
    /// raw text otherwise.
    fn parse_output(&self, content: String) -> Value {
        if self.spec.json_output
            && let Ok(value) = serde_json::from_str::<Value>(strip_code_fence(&content))
        {
            return value;
        }
        Value::String(content)
    }
}

impl std::fmt::Debug for PersonaAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonaAgent")
            .field("name", &self.spec.name)
            .field("model", &self.model)
            .field("tools", &self.tool_names())
            .field("max_rounds", &self.max_rounds)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Agent for PersonaAgent {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn json_mode(&self) -> bool {
        self.spec.json_output
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        self.tools.definitions().to_vec()
    }

    fn max_rounds(&self) -> usize {
        self.max_rounds
    }
}
