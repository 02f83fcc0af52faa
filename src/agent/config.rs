//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//! Nothing here is global: the built [`AgentConfig`] is passed to the
//! provider factory, the orchestrator and the tools explicitly.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::error::AgentError;

/// Default model for persona agents.
const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default Azure OpenAI API version.
const DEFAULT_AZURE_API_VERSION: &str = "2024-08-01-preview";
/// Default sampling temperature for persona agents.
const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Default persona agent max tokens.
const DEFAULT_AGENT_MAX_TOKENS: u32 = 2048;
/// Default planner max tokens.
const DEFAULT_PLANNER_MAX_TOKENS: u32 = 1024;
/// Default synthesizer max tokens.
const DEFAULT_SYNTHESIZER_MAX_TOKENS: u32 = 4096;
/// Default bound on model ↔ tool rounds per agent run.
const DEFAULT_MAX_ROUNDS: usize = 8;
/// Default maximum concurrent sub-agents when dispatch is parallel.
const DEFAULT_MAX_CONCURRENCY: usize = 4;
/// Default HTTP timeout for the web tools, in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Default number of search results per `search_news` call.
const DEFAULT_SEARCH_RESULTS: usize = 5;

/// What the agent loop does when the model calls a tool outside its set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownToolPolicy {
    /// End the agent run with an `UnknownTool` error result.
    #[default]
    Abort,
    /// Send an error tool result back to the model and keep looping.
    ReportToModel,
}

impl UnknownToolPolicy {
    /// Parses a policy name (`abort` or `report`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "abort" => Some(Self::Abort),
            "report" | "report-to-model" => Some(Self::ReportToModel),
            _ => None,
        }
    }
}

/// Configuration for the agent system.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (`"openai"` or `"azure"`).
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (OpenAI proxies) or Azure endpoint.
    pub base_url: Option<String>,
    /// Azure API version.
    pub api_version: String,
    /// Azure deployment name. Defaults to [`AgentConfig::model`].
    pub deployment: Option<String>,
    /// Model for persona agents.
    pub model: String,
    /// Model for the planning call.
    pub planner_model: String,
    /// Model for the synthesis call.
    pub synthesizer_model: String,
    /// Sampling temperature for persona agents.
    pub temperature: f32,
    /// Maximum tokens for persona agent responses.
    pub agent_max_tokens: u32,
    /// Maximum tokens for the planner response.
    pub planner_max_tokens: u32,
    /// Maximum tokens for the synthesizer response.
    pub synthesizer_max_tokens: u32,
    /// Maximum model ↔ tool rounds per agent run. Always > 0.
    pub max_rounds: usize,
    /// Handling of tool calls outside an agent's tool set.
    pub unknown_tool_policy: UnknownToolPolicy,
    /// Run plan steps concurrently instead of one after another.
    pub parallel_dispatch: bool,
    /// Maximum concurrent sub-agents under parallel dispatch. Always > 0.
    pub max_concurrency: usize,
    /// HTTP timeout for the web tools.
    pub request_timeout: Duration,
    /// Google API key for the `search_news` tool.
    pub search_api_key: Option<String>,
    /// Google Custom Search engine ID for the `search_news` tool.
    pub search_engine_id: Option<String>,
    /// Results per search call.
    pub search_results: usize,
    /// Directory containing prompt template files.
    ///
    /// Missing files fall back to compiled-in defaults.
    pub prompt_dir: Option<PathBuf>,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }

    /// Deployment name used with Azure.
    #[must_use]
    pub fn deployment_name(&self) -> &str {
        self.deployment.as_deref().unwrap_or(&self.model)
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    api_version: Option<String>,
    deployment: Option<String>,
    model: Option<String>,
    planner_model: Option<String>,
    synthesizer_model: Option<String>,
    temperature: Option<f32>,
    agent_max_tokens: Option<u32>,
    planner_max_tokens: Option<u32>,
    synthesizer_max_tokens: Option<u32>,
    max_rounds: Option<usize>,
    unknown_tool_policy: Option<UnknownToolPolicy>,
    parallel_dispatch: Option<bool>,
    max_concurrency: Option<usize>,
    request_timeout: Option<Duration>,
    search_api_key: Option<String>,
    search_engine_id: Option<String>,
    search_results: Option<usize>,
    prompt_dir: Option<PathBuf>,
}

fn env_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = env_var(&["SWARM_PROVIDER"]);
        }
        let azure = self
            .provider
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case("azure"));
        if self.api_key.is_none() {
            self.api_key = if azure {
                env_var(&["AZURE_OPENAI_API_KEY", "SWARM_API_KEY"])
            } else {
                env_var(&["OPENAI_API_KEY", "SWARM_API_KEY"])
            };
        }
        if self.base_url.is_none() {
            self.base_url = if azure {
                env_var(&["AZURE_OPENAI_ENDPOINT", "SWARM_BASE_URL"])
            } else {
                env_var(&["OPENAI_BASE_URL", "SWARM_BASE_URL"])
            };
        }
        if self.api_version.is_none() {
            self.api_version = env_var(&["AZURE_OPENAI_API_VERSION"]);
        }
        if self.deployment.is_none() {
            self.deployment = env_var(&["AZURE_OPENAI_DEPLOYMENT"]);
        }
        if self.model.is_none() {
            self.model = env_var(&["SWARM_MODEL"]);
        }
        if self.planner_model.is_none() {
            self.planner_model = env_var(&["SWARM_PLANNER_MODEL"]);
        }
        if self.synthesizer_model.is_none() {
            self.synthesizer_model = env_var(&["SWARM_SYNTHESIZER_MODEL"]);
        }
        if self.max_rounds.is_none() {
            self.max_rounds = env_parse("SWARM_MAX_ROUNDS");
        }
        if self.max_concurrency.is_none() {
            self.max_concurrency = env_parse("SWARM_MAX_CONCURRENCY");
        }
        if self.parallel_dispatch.is_none() {
            self.parallel_dispatch =
                env_var(&["SWARM_PARALLEL_DISPATCH"]).and_then(|v| parse_flag(&v));
        }
        if self.unknown_tool_policy.is_none() {
            self.unknown_tool_policy =
                env_var(&["SWARM_UNKNOWN_TOOL_POLICY"]).and_then(|v| UnknownToolPolicy::parse(&v));
        }
        if self.search_api_key.is_none() {
            self.search_api_key = env_var(&["GOOGLE_API_KEY"]);
        }
        if self.search_engine_id.is_none() {
            self.search_engine_id = env_var(&["GOOGLE_CSE_ID"]);
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = env_var(&["SWARM_PROMPT_DIR"]).map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override (or Azure endpoint).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the Azure API version.
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the Azure deployment name.
    #[must_use]
    pub fn deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = Some(deployment.into());
        self
    }

    /// Sets the persona agent model. Planner and synthesizer follow it
    /// unless set separately.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the planner model.
    #[must_use]
    pub fn planner_model(mut self, model: impl Into<String>) -> Self {
        self.planner_model = Some(model.into());
        self
    }

    /// Sets the synthesizer model.
    #[must_use]
    pub fn synthesizer_model(mut self, model: impl Into<String>) -> Self {
        self.synthesizer_model = Some(model.into());
        self
    }

    /// Sets the persona agent temperature.
    #[must_use]
    pub const fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    /// Sets the persona agent max tokens.
    #[must_use]
    pub const fn agent_max_tokens(mut self, n: u32) -> Self {
        self.agent_max_tokens = Some(n);
        self
    }

    /// Sets the synthesizer max tokens.
    #[must_use]
    pub const fn synthesizer_max_tokens(mut self, n: u32) -> Self {
        self.synthesizer_max_tokens = Some(n);
        self
    }

    /// Sets the round bound.
    #[must_use]
    pub const fn max_rounds(mut self, n: usize) -> Self {
        self.max_rounds = Some(n);
        self
    }

    /// Sets the unknown tool policy.
    #[must_use]
    pub const fn unknown_tool_policy(mut self, policy: UnknownToolPolicy) -> Self {
        self.unknown_tool_policy = Some(policy);
        self
    }

    /// Enables or disables parallel dispatch.
    #[must_use]
    pub const fn parallel_dispatch(mut self, enabled: bool) -> Self {
        self.parallel_dispatch = Some(enabled);
        self
    }

    /// Sets the maximum concurrency for parallel dispatch.
    #[must_use]
    pub const fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = Some(n);
        self
    }

    /// Sets the web tool request timeout.
    #[must_use]
    pub const fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Sets the Google API key and Custom Search engine ID.
    #[must_use]
    pub fn search_credentials(
        mut self,
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
    ) -> Self {
        self.search_api_key = Some(api_key.into());
        self.search_engine_id = Some(engine_id.into());
        self
    }

    /// Sets the number of results per search call.
    #[must_use]
    pub const fn search_results(mut self, n: usize) -> Self {
        self.search_results = Some(n);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set, or
    /// [`AgentError::Config`] when a bound is zero or `max_concurrency`
    /// exceeds [`Semaphore::MAX_PERMITS`].
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self.api_key.ok_or(AgentError::ApiKeyMissing)?;

        let max_rounds = self.max_rounds.unwrap_or(DEFAULT_MAX_ROUNDS);
        if max_rounds == 0 {
            return Err(AgentError::Config {
                message: "max_rounds must be greater than zero".to_string(),
            });
        }
        let max_concurrency = self.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY);
        if max_concurrency == 0 {
            return Err(AgentError::Config {
                message: "max_concurrency must be greater than zero".to_string(),
            });
        }
        if max_concurrency > Semaphore::MAX_PERMITS {
            return Err(AgentError::Config {
                message: format!(
                    "max_concurrency must be at most {} (got {max_concurrency})",
                    Semaphore::MAX_PERMITS
                ),
            });
        }

        let model = self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(AgentConfig {
            provider: self
                .provider
                .map_or_else(|| "openai".to_string(), |p| p.to_ascii_lowercase()),
            api_key,
            base_url: self.base_url,
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
            deployment: self.deployment,
            planner_model: self.planner_model.unwrap_or_else(|| model.clone()),
            synthesizer_model: self.synthesizer_model.unwrap_or_else(|| model.clone()),
            model,
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            agent_max_tokens: self.agent_max_tokens.unwrap_or(DEFAULT_AGENT_MAX_TOKENS),
            planner_max_tokens: self
                .planner_max_tokens
                .unwrap_or(DEFAULT_PLANNER_MAX_TOKENS),
            synthesizer_max_tokens: self
                .synthesizer_max_tokens
                .unwrap_or(DEFAULT_SYNTHESIZER_MAX_TOKENS),
            max_rounds,
            unknown_tool_policy: self.unknown_tool_policy.unwrap_or_default(),
            parallel_dispatch: self.parallel_dispatch.unwrap_or(false),
            max_concurrency,
            request_timeout: self
                .request_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            search_api_key: self.search_api_key,
            search_engine_id: self.search_engine_id,
            search_results: self.search_results.unwrap_or(DEFAULT_SEARCH_RESULTS),
            prompt_dir: self.prompt_dir,
        })
    }
}
