//! Tool executor that dispatches model tool calls into the registry.
//!
//! An executor is scoped to one agent run: it only resolves names in that
//! agent's [`ToolSet`], decodes the JSON argument text into an object and
//! renders handler results as message text for the conversation.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::config::UnknownToolPolicy;
use super::tool::{ToolCall, ToolRegistry, ToolResult, ToolSet};
use crate::error::AgentError;

/// Maximum raw byte length of tool argument JSON from the LLM.
const MAX_TOOL_ARGS_LEN: usize = 100_000;

/// Executes tool calls on behalf of one agent.
pub struct ToolExecutor<'a> {
    registry: &'a ToolRegistry,
    allowed: &'a ToolSet,
    policy: UnknownToolPolicy,
}

impl<'a> ToolExecutor<'a> {
    /// Creates an executor limited to `allowed`.
    #[must_use]
    pub const fn new(
        registry: &'a ToolRegistry,
        allowed: &'a ToolSet,
        policy: UnknownToolPolicy,
    ) -> Self {
        Self {
            registry,
            allowed,
            policy,
        }
    }

    /// Dispatches a tool call.
    ///
    /// Oversized or non-object arguments are reported back to the model as
    /// error results so it can correct itself.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownTool`] for names outside the agent's set
    /// under [`UnknownToolPolicy::Abort`], and propagates handler failures.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult, AgentError> {
        if !self.allowed.contains(&call.name) || !self.registry.contains(&call.name) {
            warn!(tool = %call.name, call_id = %call.id, "model requested unknown tool");
            return match self.policy {
                UnknownToolPolicy::Abort => Err(AgentError::UnknownTool {
                    name: call.name.clone(),
                }),
                UnknownToolPolicy::ReportToModel => Ok(error_result(
                    call,
                    format!("Error: Function {} not found", call.name),
                )),
            };
        }

        if call.arguments.len() > MAX_TOOL_ARGS_LEN {
            return Ok(error_result(
                call,
                format!(
                    "tool arguments too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
                    call.arguments.len()
                ),
            ));
        }

        let arguments = match decode_arguments(&call.name, &call.arguments) {
            Ok(args) => args,
            Err(e) => return Ok(error_result(call, e.to_string())),
        };

        debug!(tool = %call.name, call_id = %call.id, "invoking tool");
        let value = self.registry.invoke(&call.name, arguments).await?;

        Ok(ToolResult {
            tool_call_id: call.id.clone(),
            content: render_value(value),
            is_error: false,
        })
    }
}

fn error_result(call: &ToolCall, content: String) -> ToolResult {
    ToolResult {
        tool_call_id: call.id.clone(),
        content,
        is_error: true,
    }
}

/// Decodes tool-call argument text into an object. Empty text is `{}`.
fn decode_arguments(name: &str, raw: &str) -> Result<Map<String, Value>, AgentError> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AgentError::InvalidToolArguments {
            name: name.to_string(),
            message: format!("expected a JSON object, got {other}"),
        }),
        Err(e) => Err(AgentError::InvalidToolArguments {
            name: name.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Renders a tool result for the conversation: strings verbatim, anything
/// else as pretty JSON.
fn render_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
    }
}
