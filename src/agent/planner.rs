//! Planning agent.
//!
//! Asks the model to decompose the user's request into an ordered list of
//! [`PlanStep`]s over the available agents, and parses the reply
//! tolerantly.

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::config::AgentConfig;
use super::prompt::build_planner_prompt;
use super::provider::LlmProvider;
use super::report::{PlanStep, strip_code_fence};
use super::traits::{Agent, AgentResponse};
use crate::error::AgentError;

/// Object keys under which a model sometimes nests the plan array.
const PLAN_ENVELOPE_KEYS: [&str; 3] = ["plan", "tasks", "steps"];

/// Agent that plans which roster agents handle which sub-tasks.
pub struct PlannerAgent {
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

impl PlannerAgent {
    /// Creates a planner whose system prompt lists `agents` as
    /// `(name, description)` pairs.
    #[must_use]
    pub fn new(config: &AgentConfig, base_prompt: &str, agents: &[(&str, &str)]) -> Self {
        Self {
            model: config.planner_model.clone(),
            temperature: config.temperature,
            max_tokens: config.planner_max_tokens,
            system_prompt: build_planner_prompt(base_prompt, agents),
        }
    }

    /// Executes the planning call and parses the plan.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UpstreamFailure`] when the model call fails and
    /// [`AgentError::MalformedPlan`] when the reply is not JSON.
    pub async fn plan(
        &self,
        provider: &dyn LlmProvider,
        prompt: &str,
    ) -> Result<(Vec<PlanStep>, AgentResponse), AgentError> {
        let response = self.execute(provider, prompt).await?;
        let steps = parse_plan(&response.content)?;
        Ok((steps, response))
    }
}

/// Parses a planning reply into steps.
///
/// Accepts a JSON array of steps, a single step object, or an object that
/// wraps the array under `plan`, `tasks` or `steps`. Code fences are
/// stripped. Elements that are not objects with string `agent_name` and
/// `sub_task` fields are dropped with a warning.
///
/// # Errors
///
/// Returns [`AgentError::MalformedPlan`] if the reply is not JSON, or is a
/// JSON scalar rather than an array or object.
pub fn parse_plan(content: &str) -> Result<Vec<PlanStep>, AgentError> {
    let json_str = strip_code_fence(content);

    let value: Value = serde_json::from_str(json_str).map_err(|e| {
        let preview: String = json_str.chars().take(200).collect();
        AgentError::MalformedPlan {
            message: format!("plan is not valid JSON: {e}. Preview: {preview:?}"),
            content: content.to_string(),
        }
    })?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let envelope = PLAN_ENVELOPE_KEYS
                .iter()
                .find(|key| map.get(**key).is_some_and(Value::is_array))
                .and_then(|key| map.remove(*key));
            match envelope {
                Some(Value::Array(items)) => items,
                _ => vec![Value::Object(map)],
            }
        }
        other => {
            return Err(AgentError::MalformedPlan {
                message: format!("plan must be a JSON array or object, got: {other}"),
                content: content.to_string(),
            });
        }
    };

    let total = items.len();
    let steps: Vec<PlanStep> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let step = plan_step(&item);
            if step.is_none() {
                warn!(index, element = %item, "dropping malformed plan step");
            }
            step
        })
        .collect();

    if steps.len() < total {
        warn!(
            kept = steps.len(),
            dropped = total - steps.len(),
            "plan contained malformed steps"
        );
    }

    Ok(steps)
}

fn plan_step(item: &Value) -> Option<PlanStep> {
    let agent_name = item.get("agent_name")?.as_str()?;
    let sub_task = item.get("sub_task")?.as_str()?;
    Some(PlanStep::new(agent_name, sub_task))
}

#[async_trait]
impl Agent for PlannerAgent {
    fn name(&self) -> &'static str {
        "planner"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::prompt::PLANNER_SYSTEM_PROMPT;
    use test_case::test_case;

    #[test_case(
        r#"[{"agent_name": "news_searcher", "sub_task": "find"}, {"agent_name": "content_analyzer", "sub_task": "read"}]"#,
        &[("news_searcher", "find"), ("content_analyzer", "read")];
        "array"
    )]
    #[test_case(
        r#"{"agent_name": "news_searcher", "sub_task": "find"}"#,
        &[("news_searcher", "find")];
        "singleton object"
    )]
    #[test_case(
        "```json\n[{\"agent_name\": \"recipe_finder\", \"sub_task\": \"search\"}]\n```",
        &[("recipe_finder", "search")];
        "fenced array"
    )]
    #[test_case(
        "```JSON\n[{\"agent_name\": \"news_searcher\", \"sub_task\": \"find\"}]\n```",
        &[("news_searcher", "find")];
        "uppercase fence tag"
    )]
    #[test_case(
        r#"{"plan": [{"agent_name": "a", "sub_task": "x"}, {"agent_name": "b", "sub_task": "y"}]}"#,
        &[("a", "x"), ("b", "y")];
        "plan envelope"
    )]
    #[test_case(
        r#"{"steps": [{"agent_name": "a", "sub_task": "x"}]}"#,
        &[("a", "x")];
        "steps envelope"
    )]
    #[test_case(
        r#"[{"agent_name": "a", "sub_task": "x"}, {"agent": "b"}, 7, {"agent_name": 3, "sub_task": "y"}]"#,
        &[("a", "x")];
        "malformed elements dropped"
    )]
    #[test_case("[]", &[]; "empty plan")]
    fn test_parse_plan(content: &str, expected: &[(&str, &str)]) {
        let steps = parse_plan(content).unwrap_or_else(|e| unreachable!("{e}"));
        let expected: Vec<PlanStep> = expected
            .iter()
            .map(|(agent, task)| PlanStep::new(*agent, *task))
            .collect();
        assert_eq!(steps, expected);
    }

    #[test_case("Sure! First search, then analyze."; "prose")]
    #[test_case("[{\"agent_name\": \"a\""; "truncated json")]
    #[test_case(""; "empty reply")]
    #[test_case("42"; "number")]
    #[test_case("null"; "null")]
    #[test_case("true"; "boolean")]
    #[test_case("\"search then analyze\""; "json string")]
    fn test_parse_plan_malformed(content: &str) {
        let result = parse_plan(content);
        assert!(matches!(result, Err(AgentError::MalformedPlan { .. })));
    }

    #[test]
    fn test_agent_properties() {
        let config = AgentConfig::builder()
            .api_key("test")
            .planner_model("gpt-4o")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let agent = PlannerAgent::new(
            &config,
            PLANNER_SYSTEM_PROMPT,
            &[("news_searcher", "Finds news")],
        );
        assert_eq!(agent.name(), "planner");
        assert_eq!(agent.model(), "gpt-4o");
        assert!(!agent.json_mode());
        assert!(agent.system_prompt().contains("- news_searcher: Finds news"));
        assert!(agent.tools().is_empty());
    }
}
