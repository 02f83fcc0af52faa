//! Built-in agent rosters.
//!
//! A roster is the set of [`PersonaAgent`]s the planner may dispatch to.
//! `news` researches a topic from recent coverage; `recipe` finds a recipe
//! and returns it as structured JSON.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::config::AgentConfig;
use super::persona::{PersonaAgent, PersonaSpec};
use super::tool::ToolRegistry;
use crate::error::AgentError;
use crate::tools::{SCRAPE_TOOL, SEARCH_TOOL};

/// Built-in roster selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Roster {
    /// News search and article analysis.
    #[default]
    News,
    /// Recipe search, analysis and formatting.
    Recipe,
}

impl Roster {
    /// Every built-in roster.
    pub const ALL: [Self; 2] = [Self::News, Self::Recipe];

    /// Roster name as used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Recipe => "recipe",
        }
    }

    /// Persona descriptions for this roster.
    #[must_use]
    pub fn specs(self) -> Vec<PersonaSpec> {
        match self {
            Self::News => vec![
                PersonaSpec::new(
                    "news_searcher",
                    "News Searcher",
                    "Finds relevant news articles from reliable sources.",
                )
                .with_tool(SEARCH_TOOL),
                PersonaSpec::new(
                    "content_analyzer",
                    "Content Analyzer",
                    "Analyzes article content: summary, quotes, entities, sentiment and topics.",
                )
                .with_tool(SCRAPE_TOOL),
            ],
            Self::Recipe => vec![
                PersonaSpec::new(
                    "recipe_finder",
                    "Recipe Finder",
                    "Finds the best recipes online based on user requirements.",
                )
                .with_tool(SEARCH_TOOL)
                .with_tool(SCRAPE_TOOL),
                PersonaSpec::new(
                    "recipe_analyzer",
                    "Recipe Analyzer",
                    "Analyzes recipes and extracts ingredients, steps, timings and nutrition.",
                )
                .with_tool(SCRAPE_TOOL),
                PersonaSpec::new(
                    "recipe_formatter",
                    "Recipe Formatter",
                    "Formats recipe information into a clean, standardized JSON structure.",
                )
                .json_output(true),
            ],
        }
    }

    /// Builds the roster's agents over `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownTool`] if the registry lacks a tool a
    /// persona needs.
    pub fn build(
        self,
        registry: &Arc<ToolRegistry>,
        config: &AgentConfig,
    ) -> Result<Vec<PersonaAgent>, AgentError> {
        self.specs()
            .into_iter()
            .map(|spec| PersonaAgent::new(spec, Arc::clone(registry), config))
            .collect()
    }
}

impl fmt::Display for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Roster {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "news" => Ok(Self::News),
            "recipe" | "recipes" => Ok(Self::Recipe),
            other => Err(AgentError::Config {
                message: format!("unknown roster '{other}' (expected 'news' or 'recipe')"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::tool::tool_fn;
    use crate::agent::traits::Agent;
    use serde_json::json;

    fn registry(tools: &[&str]) -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        for name in tools {
            registry
                .register(
                    *name,
                    "test tool",
                    json!({"type": "object"}),
                    tool_fn(|_| async { Ok(json!(null)) }),
                )
                .unwrap_or_else(|_| unreachable!());
        }
        Arc::new(registry)
    }

    fn config() -> AgentConfig {
        AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn test_parse_roster() {
        assert_eq!("news".parse::<Roster>().ok(), Some(Roster::News));
        assert_eq!(" Recipe ".parse::<Roster>().ok(), Some(Roster::Recipe));
        assert!("sports".parse::<Roster>().is_err());
        assert_eq!(Roster::Recipe.to_string(), "recipe");
    }

    #[test]
    fn test_news_roster() {
        let agents = Roster::News
            .build(&registry(&[SEARCH_TOOL, SCRAPE_TOOL]), &config())
            .unwrap_or_else(|e| unreachable!("{e}"));
        let names: Vec<&str> = agents.iter().map(Agent::name).collect();
        assert_eq!(names, ["news_searcher", "content_analyzer"]);
        assert_eq!(agents[0].tool_names(), [SEARCH_TOOL]);
        assert_eq!(agents[1].tool_names(), [SCRAPE_TOOL]);
    }

    #[test]
    fn test_recipe_roster() {
        let agents = Roster::Recipe
            .build(&registry(&[SEARCH_TOOL, SCRAPE_TOOL]), &config())
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(agents.len(), 3);
        assert_eq!(agents[0].tool_names().len(), 2);
        assert!(agents[2].tool_names().is_empty());
        assert!(agents[2].json_mode());
    }

    #[test]
    fn test_missing_tool_fails_build() {
        let result = Roster::News.build(&registry(&[SEARCH_TOOL]), &config());
        assert!(matches!(result, Err(AgentError::UnknownTool { .. })));
    }
}
