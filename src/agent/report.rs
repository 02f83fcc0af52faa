//! Data types for plans, sub-agent results and the final report.
//!
//! These types form the JSON contract of an orchestrator run: the plan the
//! model produces, the per-step results, and the synthesized report.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AgentError;

/// Strips a surrounding markdown code fence from a model reply.
///
/// The opening fence line is dropped whatever its info string
/// (```` ```json ````, ```` ```JSON ````, bare ```` ``` ````).
pub(crate) fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.split_once('\n') {
        Some((_info, body)) => body,
        // single-line fence: only a bare info word can precede the payload
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// One planned sub-task, assigned to a named agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Name of the roster agent that should run the sub-task.
    pub agent_name: String,
    /// Natural-language description of the sub-task.
    pub sub_task: String,
}

impl PlanStep {
    /// Creates a plan step.
    #[must_use]
    pub fn new(agent_name: impl Into<String>, sub_task: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            sub_task: sub_task.into(),
        }
    }
}

/// Terminal value of one agent run.
///
/// Serializes to exactly `{"output": ...}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentRunResult {
    /// The agent produced a final answer (text or structured).
    Completed {
        /// Final output.
        output: Value,
    },
    /// The run failed; `error` is prefixed with the error kind.
    Failed {
        /// `"<Kind>: <message>"`.
        error: String,
    },
}

impl AgentRunResult {
    /// Wraps a final output.
    #[must_use]
    pub fn output(output: impl Into<Value>) -> Self {
        Self::Completed {
            output: output.into(),
        }
    }

    /// Whether the run failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Error text, if the run failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            Self::Completed { .. } => None,
        }
    }

    /// Output value, if the run completed.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Completed { output } => Some(output),
            Self::Failed { .. } => None,
        }
    }
}

impl From<AgentError> for AgentRunResult {
    fn from(err: AgentError) -> Self {
        Self::Failed {
            error: err.to_result_string(),
        }
    }
}

/// Result of one dispatched plan step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAgentResult {
    /// Agent that ran the step.
    pub agent: String,
    /// The sub-task it was given.
    pub task: String,
    /// What it produced.
    pub result: AgentRunResult,
}

/// Synthesized output of a successful orchestrator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Synthesized final answer.
    pub output: Value,
    /// Per-step results in plan order.
    pub analysis_results: Vec<SubAgentResult>,
    /// Tokens reported across every model call of the run.
    #[serde(default)]
    pub total_tokens: u32,
    /// Wall-clock duration of the run in milliseconds.
    #[serde(default)]
    pub elapsed_ms: u64,
}

impl Report {
    /// Number of steps whose agent run failed.
    #[must_use]
    pub fn failed_steps(&self) -> usize {
        self.analysis_results
            .iter()
            .filter(|r| r.result.is_error())
            .count()
    }
}

/// Terminal value of an orchestrator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunReport {
    /// Planning and synthesis succeeded.
    Completed(Report),
    /// The run failed before a report could be produced.
    Failed {
        /// `"Orchestration error: ..."`.
        error: String,
    },
}

impl RunReport {
    /// Builds the failure value for an orchestration error.
    #[must_use]
    pub fn failed(err: &AgentError) -> Self {
        Self::Failed {
            error: format!("Orchestration error: {}", err.to_result_string()),
        }
    }

    /// Whether the run failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// The report, if the run completed.
    #[must_use]
    pub const fn report(&self) -> Option<&Report> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Failed { .. } => None,
        }
    }
}
