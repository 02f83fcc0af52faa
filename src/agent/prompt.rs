//! System prompts and message builders for agents.
//!
//! Prompts are the core instructions that define each agent's behavior.
//! Builders format the planner's agent listing, persona prompts and the
//! synthesis message carrying the collected results.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use super::report::SubAgentResult;

/// System prompt for the planning call.
pub const PLANNER_SYSTEM_PROMPT: &str = r#"You are a research orchestrator. You break a user's request into sub-tasks and assign each one to the agent best suited to it.

## Instructions

1. Read the request and the list of available agents below.
2. Split the request into the smallest useful sequence of sub-tasks.
3. Assign every sub-task to exactly one available agent by its name.
4. Order the sub-tasks so that later steps can build on earlier ones.

## Output Format (JSON)

Return a JSON array of steps:
```json
[
  {"agent_name": "<agent name>", "sub_task": "<specific task for the agent>"}
]
```

## Rules

- Only use agent names from the list of available agents.
- Write each sub_task as a complete instruction the agent can act on without seeing the original request.
- Return ONLY the JSON array, no surrounding text."#;

/// System prompt for the synthesis call.
pub const SYNTHESIZER_SYSTEM_PROMPT: &str = "Synthesize the analysis results into a final report.

Each result names the agent, the task it was given and either its output or an error. Combine the outputs into one coherent answer to the original request. Mention failed steps briefly and do not invent content they would have produced.";

/// System prompt for the article analysis performed by the scrape tool.
pub const ARTICLE_ANALYSIS_PROMPT: &str = r#"You are a news analysis specialist. Extract and analyze article content according to this schema:
{
  "title": string,
  "summary": string,
  "quotes": [{"text": string, "speaker": string, "context": string}],
  "entities": [{"name": string, "type": string, "sentiment": number}],
  "sentiment_score": number (-1 to 1),
  "topics": [string],
  "category": string
}
Return ONLY the JSON object."#;

/// Default prompt directory under user config.
const DEFAULT_PROMPT_DIR: &str = ".config/swarm-rs/prompts";

/// Filename for the planner prompt template.
const PLANNER_FILENAME: &str = "planner.md";
/// Filename for the synthesizer prompt template.
const SYNTHESIZER_FILENAME: &str = "synthesizer.md";
/// Filename for the article analysis prompt template.
const ANALYSIS_FILENAME: &str = "article_analysis.md";

/// A set of system prompts for the orchestrator and tools.
///
/// Loaded from external template files when available, falling back to
/// compiled-in defaults. Use [`PromptSet::load`] to resolve the prompt
/// directory from CLI flags, environment variables, or the default path.
#[derive(Debug, Clone)]
pub struct PromptSet {
    /// System prompt for the planning call.
    pub planner: String,
    /// System prompt for the synthesis call.
    pub synthesizer: String,
    /// System prompt for article analysis.
    pub article_analysis: String,
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Resolution order for `prompt_dir`:
    /// 1. Explicit `prompt_dir` argument (`--prompt-dir` or config)
    /// 2. `SWARM_PROMPT_DIR` environment variable
    /// 3. `~/.config/swarm-rs/prompts/`
    ///
    /// Each file is loaded independently, so a missing file uses its default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(PathBuf::from)
            .or_else(|| std::env::var("SWARM_PROMPT_DIR").ok().map(PathBuf::from))
            .or_else(Self::default_dir);

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(path).ok())
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            planner: load_file(PLANNER_FILENAME, PLANNER_SYSTEM_PROMPT),
            synthesizer: load_file(SYNTHESIZER_FILENAME, SYNTHESIZER_SYSTEM_PROMPT),
            article_analysis: load_file(ANALYSIS_FILENAME, ARTICLE_ANALYSIS_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            planner: PLANNER_SYSTEM_PROMPT.to_string(),
            synthesizer: SYNTHESIZER_SYSTEM_PROMPT.to_string(),
            article_analysis: ARTICLE_ANALYSIS_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in default prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are
    /// **not** overwritten.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (PLANNER_FILENAME, PLANNER_SYSTEM_PROMPT),
            (SYNTHESIZER_FILENAME, SYNTHESIZER_SYSTEM_PROMPT),
            (ANALYSIS_FILENAME, ARTICLE_ANALYSIS_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Returns the default prompt directory under the user's home.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}

/// Builds the system persona for a roster agent.
#[must_use]
pub fn build_persona_prompt(display_name: &str, description: &str, has_tools: bool) -> String {
    let mut prompt = format!("You are {display_name}. {description}");
    if has_tools {
        prompt.push_str(
            "\nYou have access to tools for searching and reading web content. \
             Use these tools to provide accurate and comprehensive answers.",
        );
    }
    prompt
}

/// Builds the planner system message: base prompt plus the agent listing.
#[must_use]
pub fn build_planner_prompt(base: &str, agents: &[(&str, &str)]) -> String {
    let mut prompt = format!("{base}\n\n## Available agents\n");
    for (name, description) in agents {
        let _ = writeln!(prompt, "- {name}: {description}");
    }
    if agents.is_empty() {
        prompt.push_str("(none)\n");
    }
    prompt
}

/// Builds the user message for the synthesis call.
#[must_use]
pub fn build_synthesis_message(results: &[SubAgentResult]) -> String {
    let results_json = serde_json::to_string_pretty(results).unwrap_or_else(|_| "[]".to_string());
    format!("Results: {results_json}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::report::AgentRunResult;

    #[test]
    fn test_build_persona_prompt() {
        let prompt = build_persona_prompt(
            "News Searcher",
            "Finds relevant news articles from reliable sources.",
            true,
        );
        assert!(prompt.starts_with("You are News Searcher. Finds relevant"));
        assert!(prompt.contains("access to tools"));

        let plain = build_persona_prompt("Recipe Formatter", "Formats recipes.", false);
        assert!(!plain.contains("tools"));
    }

    #[test]
    fn test_build_planner_prompt_lists_agents() {
        let prompt = build_planner_prompt(
            PLANNER_SYSTEM_PROMPT,
            &[
                ("news_searcher", "Finds news"),
                ("content_analyzer", "Reads articles"),
            ],
        );
        assert!(prompt.contains("- news_searcher: Finds news"));
        assert!(prompt.contains("- content_analyzer: Reads articles"));
        assert!(build_planner_prompt("base", &[]).contains("(none)"));
    }

    #[test]
    fn test_build_synthesis_message() {
        let results = vec![SubAgentResult {
            agent: "news_searcher".to_string(),
            task: "find AI news".to_string(),
            result: AgentRunResult::output("three articles"),
        }];
        let msg = build_synthesis_message(&results);
        assert!(msg.starts_with("Results: ["));
        assert!(msg.contains("\"agent\": \"news_searcher\""));
        assert_eq!(build_synthesis_message(&[]), "Results: []");
    }

    #[test]
    fn test_load_overrides_and_fallbacks() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        std::fs::write(dir.path().join(PLANNER_FILENAME), "custom planner")
            .unwrap_or_else(|_| unreachable!());

        let prompts = PromptSet::load(Some(dir.path()));
        assert_eq!(prompts.planner, "custom planner");
        assert_eq!(prompts.synthesizer, SYNTHESIZER_SYSTEM_PROMPT);
        assert_eq!(prompts.article_analysis, ARTICLE_ANALYSIS_PROMPT);
    }

    #[test]
    fn test_write_defaults_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        std::fs::write(dir.path().join(SYNTHESIZER_FILENAME), "mine")
            .unwrap_or_else(|_| unreachable!());

        let written = PromptSet::write_defaults(dir.path()).unwrap_or_default();
        assert_eq!(written.len(), 2);
        let kept = std::fs::read_to_string(dir.path().join(SYNTHESIZER_FILENAME))
            .unwrap_or_default();
        assert_eq!(kept, "mine");
    }
}
