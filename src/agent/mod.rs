//! Agent orchestration and tool-invocation engine.
//!
//! A planner decomposes the request into steps over named persona agents,
//! each persona runs a bounded tool-calling loop against an
//! OpenAI-compatible provider, and a synthesizer merges the results.
//!
//! # Architecture
//!
//! ```text
//! prompt → Orchestrator
//!   ├── PlannerAgent (plans {agent_name, sub_task} steps)
//!   ├── Dispatch → PersonaAgent per step (sequential or bounded parallel)
//!   │   └── agentic loop: model ↔ ToolExecutor ↔ ToolRegistry
//!   ├── Collect SubAgentResults in plan order
//!   └── SynthesizerAgent → Report
//! ```

pub mod agentic_loop;
pub mod client;
pub mod config;
pub mod executor;
pub mod message;
pub mod orchestrator;
pub mod persona;
pub mod planner;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod report;
pub mod roster;
pub mod synthesizer;
pub mod tool;
pub mod traits;

// Re-export key types
pub use config::{AgentConfig, UnknownToolPolicy};
pub use executor::ToolExecutor;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::Orchestrator;
pub use persona::{PersonaAgent, PersonaSpec};
pub use planner::PlannerAgent;
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use report::{AgentRunResult, PlanStep, Report, RunReport, SubAgentResult};
pub use roster::Roster;
pub use synthesizer::SynthesizerAgent;
pub use tool::{Tool, ToolCall, ToolDefinition, ToolRegistry, ToolResult, ToolSet, tool_fn};
pub use traits::{Agent, AgentResponse, execute_with_tools};
