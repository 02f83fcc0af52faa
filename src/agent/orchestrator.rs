//! Orchestrator for plan → dispatch → synthesize workflows.
//!
//! Coordinates a full run: the planner decomposes the request into
//! [`PlanStep`]s, each step is dispatched to the named [`PersonaAgent`], and
//! the synthesizer merges the collected results into one [`Report`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::config::AgentConfig;
use super::message::TokenUsage;
use super::persona::PersonaAgent;
use super::planner::PlannerAgent;
use super::prompt::PromptSet;
use super::provider::LlmProvider;
use super::report::{AgentRunResult, PlanStep, Report, RunReport, SubAgentResult};
use super::synthesizer::SynthesizerAgent;
use super::traits::Agent;
use crate::error::AgentError;

/// Maximum accepted prompt length in bytes.
const MAX_PROMPT_LEN: usize = 10_000;

/// A plan step resolved to a roster agent.
struct Dispatch {
    agent: Arc<PersonaAgent>,
    step: PlanStep,
}

/// Orchestrates the plan → dispatch → synthesize workflow.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
    prompts: PromptSet,
    agents: Vec<Arc<PersonaAgent>>,
    by_name: HashMap<String, usize>,
}

impl Orchestrator {
    /// Creates an orchestrator over the given roster.
    ///
    /// Loads prompt templates from the directory specified in
    /// [`AgentConfig::prompt_dir`], falling back to compiled-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if two agents share a name.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        config: AgentConfig,
        agents: Vec<PersonaAgent>,
    ) -> Result<Self, AgentError> {
        let mut by_name = HashMap::with_capacity(agents.len());
        for (idx, agent) in agents.iter().enumerate() {
            if by_name.insert(agent.name().to_string(), idx).is_some() {
                return Err(AgentError::Config {
                    message: format!("duplicate agent name '{}'", agent.name()),
                });
            }
        }

        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Ok(Self {
            provider,
            config,
            prompts,
            agents: agents.into_iter().map(Arc::new).collect(),
            by_name,
        })
    }

    /// Replaces the loaded prompt set.
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Roster agents in registration order.
    pub fn agents(&self) -> impl Iterator<Item = &PersonaAgent> {
        self.agents.iter().map(AsRef::as_ref)
    }

    /// Looks up a roster agent by name.
    #[must_use]
    pub fn agent(&self, name: &str) -> Option<&PersonaAgent> {
        self.by_name.get(name).map(|&idx| self.agents[idx].as_ref())
    }

    /// Executes a full run for `prompt`.
    ///
    /// Never fails: planning and synthesis errors are returned as
    /// [`RunReport::Failed`] with an `"Orchestration error: ..."` message.
    /// Individual agent failures are recorded in the report's results.
    pub async fn run(&self, prompt: &str) -> RunReport {
        match self.try_run(prompt).await {
            Ok(report) => RunReport::Completed(report),
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "orchestration failed");
                RunReport::failed(&e)
            }
        }
    }

    async fn try_run(&self, prompt: &str) -> Result<Report, AgentError> {
        if prompt.trim().is_empty() {
            return Err(AgentError::Orchestration {
                message: "Prompt cannot be empty".to_string(),
            });
        }

        if prompt.len() > MAX_PROMPT_LEN {
            return Err(AgentError::Orchestration {
                message: format!(
                    "Prompt exceeds maximum length ({} bytes, max {MAX_PROMPT_LEN})",
                    prompt.len()
                ),
            });
        }

        let start = Instant::now();
        let mut usage = TokenUsage::default();

        // Plan
        let listing: Vec<(&str, &str)> = self
            .agents
            .iter()
            .map(|a| (a.name(), a.description()))
            .collect();
        let planner = PlannerAgent::new(&self.config, &self.prompts.planner, &listing);
        let (steps, plan_response) = planner.plan(&*self.provider, prompt).await?;
        usage.accumulate(plan_response.usage);
        info!(steps = steps.len(), "plan ready");

        // Dispatch
        let dispatches = self.resolve(steps);
        let outcomes = if self.config.parallel_dispatch && dispatches.len() > 1 {
            self.dispatch_parallel(dispatches).await
        } else {
            self.dispatch_sequential(dispatches).await
        };

        let mut analysis_results = Vec::with_capacity(outcomes.len());
        for (result, step_usage) in outcomes {
            usage.accumulate(step_usage);
            analysis_results.push(result);
        }

        // Synthesize
        let synthesizer = SynthesizerAgent::new(&self.config, self.prompts.synthesizer.clone());
        let (output, synthesis_response) = synthesizer
            .synthesize(&*self.provider, &analysis_results)
            .await?;
        usage.accumulate(synthesis_response.usage);

        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            results = analysis_results.len(),
            tokens = usage.total_tokens,
            elapsed_ms,
            "run complete"
        );

        Ok(Report {
            output,
            analysis_results,
            total_tokens: usage.total_tokens,
            elapsed_ms,
        })
    }

    /// Maps plan steps to roster agents, dropping unknown names.
    fn resolve(&self, steps: Vec<PlanStep>) -> Vec<Dispatch> {
        steps
            .into_iter()
            .enumerate()
            .filter_map(|(index, step)| {
                if let Some(&idx) = self.by_name.get(&step.agent_name) {
                    Some(Dispatch {
                        agent: Arc::clone(&self.agents[idx]),
                        step,
                    })
                } else {
                    warn!(
                        step = index,
                        agent = %step.agent_name,
                        "skipping plan step for unregistered agent"
                    );
                    None
                }
            })
            .collect()
    }

    async fn dispatch_sequential(
        &self,
        dispatches: Vec<Dispatch>,
    ) -> Vec<(SubAgentResult, TokenUsage)> {
        let mut outcomes = Vec::with_capacity(dispatches.len());
        for (index, Dispatch { agent, step }) in dispatches.into_iter().enumerate() {
            debug!(step = index, agent = %step.agent_name, "dispatching");
            let (result, usage) = agent.run_with_usage(&*self.provider, &step.sub_task).await;
            outcomes.push((sub_agent_result(step, result), usage));
        }
        outcomes
    }

    /// Runs every step on its own task, bounded by `max_concurrency`.
    ///
    /// Handles are awaited in plan order, so results keep plan order
    /// regardless of completion order.
    async fn dispatch_parallel(
        &self,
        dispatches: Vec<Dispatch>,
    ) -> Vec<(SubAgentResult, TokenUsage)> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut handles = Vec::with_capacity(dispatches.len());

        for (index, Dispatch { agent, step }) in dispatches.into_iter().enumerate() {
            let sem = Arc::clone(&semaphore);
            let prov = Arc::clone(&self.provider);
            let task = step.sub_task.clone();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = sem.acquire().await else {
                    let err = AgentError::Orchestration {
                        message: "dispatch semaphore closed".to_string(),
                    };
                    return (AgentRunResult::from(err), TokenUsage::default());
                };
                debug!(step = index, agent = %agent.name(), "dispatching");
                agent.run_with_usage(&*prov, &task).await
            });

            handles.push((step, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (step, handle) in handles {
            let (result, usage) = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(agent = %step.agent_name, error = %e, "agent task failed to join");
                    let err = AgentError::Orchestration {
                        message: format!("Task join failed: {e}"),
                    };
                    (err.into(), TokenUsage::default())
                }
            };
            outcomes.push((sub_agent_result(step, result), usage));
        }

        outcomes
    }
}

fn sub_agent_result(step: PlanStep, result: AgentRunResult) -> SubAgentResult {
    SubAgentResult {
        agent: step.agent_name,
        task: step.sub_task,
        result,
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .field("agents", &self.agents)
            .finish_non_exhaustive()
    }
}
