//! # swarm-rs
//!
//! Planner-driven multi-agent orchestration.
//!
//! A free-form request is decomposed by a planning call into ordered
//! `{agent_name, sub_task}` steps, each step is dispatched to a named
//! persona agent that may call tools (web search, page scraping) through a
//! bounded tool-calling loop, and a final synthesis call merges every
//! sub-agent result into one JSON report.
//!
//! ```text
//! prompt → Orchestrator
//!   ├── PlannerAgent      → Vec<PlanStep>
//!   ├── dispatch          → PersonaAgent::run per step (tool loop)
//!   └── SynthesizerAgent  → Report { output, analysis_results }
//! ```
//!
//! Every public run entry point returns a value: failures are carried as
//! an `error` field, never propagated to the caller.

pub mod agent;
pub mod cli;
pub mod error;
pub mod tools;

pub use agent::{
    AgentConfig, AgentRunResult, LlmProvider, Orchestrator, PersonaAgent, PlanStep, Report,
    RunReport, SubAgentResult, ToolRegistry,
};
pub use error::{AgentError, CommandError, Error, Result};
