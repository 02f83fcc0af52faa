//! Error types for swarm-rs.
//!
//! [`AgentError`] covers everything that can go wrong inside an agent or
//! orchestrator run. Those errors never escape the public run entry points;
//! they are rendered into result values at that boundary. [`CommandError`]
//! is the CLI layer's error and [`Error`] unifies both for the binary.

use thiserror::Error;

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Agent system failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// CLI command failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by agents, tools, the planner and the orchestrator.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model (or a roster definition) referenced a tool that is not
    /// registered or not allowed for the invoking agent.
    #[error("tool '{name}' is not registered for this agent")]
    UnknownTool {
        /// Requested tool name.
        name: String,
    },

    /// The tool-calling loop used every round without a final answer.
    #[error("no final answer after {max_rounds} tool-calling rounds")]
    RoundLimitExceeded {
        /// Configured round bound.
        max_rounds: usize,
    },

    /// The planning reply could not be parsed as a plan.
    #[error("{message}")]
    MalformedPlan {
        /// Parse diagnostic.
        message: String,
        /// Raw model reply.
        content: String,
    },

    /// The model endpoint failed.
    #[error("model request failed: {message}")]
    UpstreamFailure {
        /// Provider error text.
        message: String,
        /// HTTP status, when known.
        status: Option<u16>,
    },

    /// A tool handler failed.
    #[error("tool '{name}' failed: {message}")]
    ToolExecution {
        /// Tool name.
        name: String,
        /// Failure description.
        message: String,
    },

    /// Tool-call arguments were not a JSON object.
    #[error("invalid arguments for tool '{name}': {message}")]
    InvalidToolArguments {
        /// Tool name.
        name: String,
        /// Decode diagnostic.
        message: String,
    },

    /// No API key was configured.
    #[error("API key missing: set OPENAI_API_KEY, AZURE_OPENAI_API_KEY or SWARM_API_KEY")]
    ApiKeyMissing,

    /// Unknown provider name in configuration.
    #[error("unsupported provider '{name}' (expected 'openai' or 'azure')")]
    UnsupportedProvider {
        /// Configured provider name.
        name: String,
    },

    /// Invalid configuration value.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// Orchestrator-level failure not covered above.
    #[error("{message}")]
    Orchestration {
        /// Description of the problem.
        message: String,
    },
}

impl AgentError {
    /// Stable label for the error kind, used as the prefix of error
    /// strings carried by run results.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownTool { .. } => "UnknownTool",
            Self::RoundLimitExceeded { .. } => "RoundLimitExceeded",
            Self::MalformedPlan { .. } => "MalformedPlan",
            Self::UpstreamFailure { .. } | Self::ToolExecution { .. } => "UpstreamFailure",
            Self::InvalidToolArguments { .. } => "InvalidToolArguments",
            Self::ApiKeyMissing | Self::UnsupportedProvider { .. } | Self::Config { .. } => {
                "ConfigError"
            }
            Self::Orchestration { .. } => "OrchestrationError",
        }
    }

    /// Renders the error as `"<Kind>: <message>"`.
    #[must_use]
    pub fn to_result_string(&self) -> String {
        format!("{}: {self}", self.kind())
    }
}

/// Errors raised by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A command could not complete.
    #[error("{0}")]
    ExecutionFailed(String),

    /// A command argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
