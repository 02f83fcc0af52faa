//! Tool types and the tool registry.
//!
//! A tool is a named, schema-described capability an agent may invoke
//! mid-task. The [`ToolRegistry`] binds each name to a [`ToolDefinition`]
//! (what the model sees) and a [`Tool`] handler (what actually runs). It is
//! built once, shared read-only through `Arc`, and never calls back into
//! the orchestrator.

use std::collections::BTreeMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::AgentError;

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (unique within a registry).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: Value,
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// The result of executing a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result corresponds to.
    pub tool_call_id: String,
    /// Result content sent back to the model.
    pub content: String,
    /// Whether this result represents an error reported to the model.
    pub is_error: bool,
}

/// An executable tool.
///
/// Handlers receive the decoded argument object and return any JSON value
/// (a plain string result is a [`Value::String`]). Argument validation is
/// the handler's job; the registry only guarantees `arguments` is an
/// object.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Runs the tool.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ToolExecution`] when the tool cannot produce
    /// a result at all. Expected, reportable failures (a 404 page, an empty
    /// search) should be returned as `Ok` values describing the problem.
    async fn call(&self, arguments: Map<String, Value>) -> Result<Value, AgentError>;
}

/// Adapter that turns an async closure into a [`Tool`].
struct FnTool<F, Fut> {
    f: F,
    _fut: PhantomData<fn() -> Fut>,
}

#[async_trait]
impl<F, Fut> Tool for FnTool<F, Fut>
where
    F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, AgentError>> + Send + 'static,
{
    async fn call(&self, arguments: Map<String, Value>) -> Result<Value, AgentError> {
        (self.f)(arguments).await
    }
}

/// Wraps an async closure as a shareable [`Tool`] handler.
pub fn tool_fn<F, Fut>(f: F) -> Arc<dyn Tool>
where
    F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, AgentError>> + Send + 'static,
{
    Arc::new(FnTool {
        f,
        _fut: PhantomData,
    })
}

#[derive(Clone)]
struct Registered {
    definition: ToolDefinition,
    handler: Arc<dyn Tool>,
}

/// Closed mapping from tool name to definition and handler.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Registered>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if `name` is empty or already taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        handler: Arc<dyn Tool>,
    ) -> Result<(), AgentError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AgentError::Config {
                message: "tool name cannot be empty".to_string(),
            });
        }
        if self.tools.contains_key(&name) {
            return Err(AgentError::Config {
                message: format!("tool '{name}' is already registered"),
            });
        }

        debug!(tool = %name, "registering tool");
        let definition = ToolDefinition {
            name: name.clone(),
            description: description.into(),
            parameters,
        };
        self.tools.insert(
            name,
            Registered {
                definition,
                handler,
            },
        );
        Ok(())
    }

    /// Invokes a tool by name.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownTool`] when `name` is not registered,
    /// or whatever the handler itself fails with.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<Value, AgentError> {
        let entry = self.tools.get(name).ok_or_else(|| AgentError::UnknownTool {
            name: name.to_string(),
        })?;
        entry.handler.call(arguments).await
    }

    /// Returns the definition registered under `name`.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name).map(|r| &r.definition)
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Builds the tool subset an agent is allowed to use.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownTool`] for the first name that is not
    /// registered.
    pub fn scoped(&self, names: &[&str]) -> Result<ToolSet, AgentError> {
        let definitions = names
            .iter()
            .map(|name| {
                self.definition(name)
                    .cloned()
                    .ok_or_else(|| AgentError::UnknownTool {
                        name: (*name).to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ToolSet { definitions })
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

/// A set of tool definitions scoped to one agent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolSet {
    definitions: Vec<ToolDefinition>,
}

impl ToolSet {
    /// Returns the tool definitions in this set.
    #[must_use]
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Returns `true` if `name` is part of this set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.iter().any(|d| d.name == name)
    }

    /// Returns `true` if this set contains no tools.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the number of tools in this set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Empty tool set (no tools available).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                "echo",
                "Echo the `text` argument.",
                json!({
                    "type": "object",
                    "properties": { "text": { "type": "string" } },
                    "required": ["text"]
                }),
                tool_fn(|args| async move {
                    Ok(args.get("text").cloned().unwrap_or(Value::Null))
                }),
            )
            .unwrap_or_else(|_| unreachable!());
        registry
    }

    #[tokio::test]
    async fn test_invoke_registered_tool() {
        let registry = echo_registry();
        let mut args = Map::new();
        args.insert("text".to_string(), json!("hello"));
        let value = registry.invoke("echo", args).await;
        assert_eq!(value.ok(), Some(json!("hello")));
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let registry = echo_registry();
        let result = registry.invoke("teleport", Map::new()).await;
        assert!(matches!(result, Err(AgentError::UnknownTool { ref name }) if name == "teleport"));
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = echo_registry();
        let result = registry.register(
            "echo",
            "again",
            json!({"type": "object"}),
            tool_fn(|_| async { Ok(Value::Null) }),
        );
        assert!(matches!(result, Err(AgentError::Config { .. })));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_scoped_subset() {
        let registry = echo_registry();
        let set = registry.scoped(&["echo"]).unwrap_or_default();
        assert_eq!(set.len(), 1);
        assert!(set.contains("echo"));
        assert_eq!(set.definitions()[0].parameters["type"], "object");

        let missing = registry.scoped(&["echo", "scrape"]);
        assert!(matches!(missing, Err(AgentError::UnknownTool { ref name }) if name == "scrape"));
    }

    #[test]
    fn test_toolset_none() {
        let ts = ToolSet::none();
        assert!(ts.is_empty());
        assert_eq!(ts.len(), 0);
        assert!(!ts.contains("echo"));
    }

    #[test]
    fn test_tool_call_serialization() {
        let call = ToolCall {
            id: "call_123".to_string(),
            name: "search_news".to_string(),
            arguments: r#"{"query":"rust"}"#.to_string(),
        };
        let json = serde_json::to_string(&call).unwrap_or_default();
        assert!(json.contains("call_123"));
        assert!(json.contains("search_news"));
    }
}
