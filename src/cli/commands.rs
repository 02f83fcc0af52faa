//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

#![allow(clippy::format_push_string)]

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::agent::client::create_provider;
use crate::agent::config::AgentConfig;
use crate::agent::orchestrator::Orchestrator;
use crate::agent::prompt::PromptSet;
use crate::agent::provider::LlmProvider;
use crate::agent::report::RunReport;
use crate::agent::roster::Roster;
use crate::agent::tool::ToolRegistry;
use crate::cli::output::{OutputFormat, format_roster, format_run_report};
use crate::cli::parser::{Cli, Commands};
use crate::error::{CommandError, Result};
use crate::tools::register_web_tools;

/// Parameters for the run command.
#[derive(Debug, Clone, Default)]
pub struct RunParams<'a> {
    /// The request to fulfil.
    pub prompt: &'a str,
    /// Roster name.
    pub roster: &'a str,
    /// Dispatch plan steps concurrently.
    pub parallel: bool,
    /// Round bound override.
    pub max_rounds: Option<usize>,
    /// Model override for every agent.
    pub model: Option<&'a str>,
    /// File to write the JSON report to.
    pub output: Option<&'a Path>,
    /// Prompt template directory.
    pub prompt_dir: Option<&'a Path>,
}

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Run {
            prompt,
            roster,
            parallel,
            max_rounds,
            model,
            output,
        } => {
            let params = RunParams {
                prompt,
                roster,
                parallel: *parallel,
                max_rounds: *max_rounds,
                model: model.as_deref(),
                output: output.as_deref(),
                prompt_dir: cli.prompt_dir.as_deref(),
            };
            cmd_run(&params, format)
        }
        Commands::Agents { roster } => cmd_agents(roster, format),
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref(), format),
    }
}

fn parse_roster(name: &str) -> Result<Roster> {
    name.parse::<Roster>()
        .map_err(|e| CommandError::InvalidArgument(e.to_string()).into())
}

/// Builds the configuration for a run: flags first, then the environment.
fn run_config(params: &RunParams<'_>) -> Result<AgentConfig> {
    let mut builder = AgentConfig::builder();
    if params.parallel {
        builder = builder.parallel_dispatch(true);
    }
    if let Some(n) = params.max_rounds {
        builder = builder.max_rounds(n);
    }
    if let Some(model) = params.model {
        builder = builder.model(model);
    }
    if let Some(dir) = params.prompt_dir {
        builder = builder.prompt_dir(dir);
    }

    builder.from_env().build().map_err(|e| {
        CommandError::ExecutionFailed(format!("Agent configuration error: {e}")).into()
    })
}

/// Assembles the orchestrator for `roster` over the web tools.
fn build_orchestrator(
    roster: Roster,
    config: &AgentConfig,
    provider: Arc<dyn LlmProvider>,
    prompts: PromptSet,
) -> Result<Orchestrator> {
    let mut registry = ToolRegistry::new();
    register_web_tools(
        &mut registry,
        config,
        Arc::clone(&provider),
        prompts.article_analysis.clone(),
    )?;
    let registry = Arc::new(registry);

    let agents = roster.build(&registry, config)?;
    let orchestrator = Orchestrator::new(provider, config.clone(), agents)?.with_prompts(prompts);
    Ok(orchestrator)
}

fn cmd_run(params: &RunParams<'_>, format: OutputFormat) -> Result<String> {
    let roster = parse_roster(params.roster)?;
    let config = run_config(params)?;

    let provider = create_provider(&config).map_err(|e| {
        CommandError::ExecutionFailed(format!("Provider creation failed: {e}"))
    })?;
    let prompts = PromptSet::load(config.prompt_dir.as_deref());
    let orchestrator = build_orchestrator(roster, &config, Arc::from(provider), prompts)?;

    info!(
        roster = %roster,
        model = %config.model,
        parallel = config.parallel_dispatch,
        "starting run"
    );

    // Create tokio runtime as sync/async bridge
    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}"))
    })?;
    let run = rt.block_on(orchestrator.run(params.prompt));

    if let Some(path) = params.output {
        write_report(path, &run)?;
    }

    let output = format_run_report(&run, format);
    if run.is_failed() {
        return Err(CommandError::ExecutionFailed(output.trim_end().to_string()).into());
    }
    Ok(output)
}

fn write_report(path: &Path, run: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(run)?;
    std::fs::write(path, json).map_err(|e| {
        CommandError::ExecutionFailed(format!(
            "Failed to write report to {}: {e}",
            path.display()
        ))
    })?;
    info!(path = %path.display(), "report written");
    Ok(())
}

fn cmd_agents(roster: &str, format: OutputFormat) -> Result<String> {
    let roster = parse_roster(roster)?;
    Ok(format_roster(roster, &roster.specs(), format))
}

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(Path::to_path_buf)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                return Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ));
            }
            let mut output = format!(
                "Wrote {} prompt template(s) to: {}\n",
                written.len(),
                target_dir.display()
            );
            for path in &written {
                output.push_str(&format!(
                    "  {}\n",
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("unknown")
                ));
            }
            output.push_str("\nEdit these files to customize the planner, synthesizer and article analysis prompts.\n");
            Ok(output)
        }
        OutputFormat::Json => Ok(format.to_json(&serde_json::json!({
            "directory": target_dir.to_string_lossy(),
            "written": written
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect::<Vec<_>>(),
            "count": written.len(),
        }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::{ChatRequest, ChatResponse};
    use crate::agent::persona::PersonaAgent;
    use crate::error::{AgentError, Error};
    use async_trait::async_trait;

    struct NullProvider;

    #[async_trait]
    impl LlmProvider for NullProvider {
        fn name(&self) -> &'static str {
            "null"
        }

        async fn chat(&self, _request: &ChatRequest) -> std::result::Result<ChatResponse, AgentError> {
            Ok(ChatResponse::default())
        }
    }

    #[test]
    fn test_unknown_roster_is_invalid_argument() {
        let result = cmd_agents("sports", OutputFormat::Text);
        assert!(matches!(
            result,
            Err(Error::Command(CommandError::InvalidArgument(_)))
        ));
    }

    #[test]
    fn test_agents_json() {
        let out = cmd_agents("news", OutputFormat::Json).unwrap_or_else(|e| unreachable!("{e}"));
        let value: serde_json::Value =
            serde_json::from_str(&out).unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(value["roster"], "news");
        assert_eq!(value["agents"][0]["name"], "news_searcher");
        assert_eq!(value["agents"][1]["tools"][0], "scrape_news_article");
    }

    #[test]
    fn test_init_prompts_writes_once() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let first = cmd_init_prompts(Some(dir.path()), OutputFormat::Text)
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert!(first.starts_with("Wrote 3 prompt template(s)"));
        assert!(first.contains("planner.md"));

        let second = cmd_init_prompts(Some(dir.path()), OutputFormat::Json)
            .unwrap_or_else(|e| unreachable!("{e}"));
        let value: serde_json::Value =
            serde_json::from_str(&second).unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(value["count"], 0);
    }

    #[test]
    fn test_build_orchestrator_for_each_roster() {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        for roster in Roster::ALL {
            let orchestrator = build_orchestrator(
                roster,
                &config,
                Arc::new(NullProvider),
                PromptSet::defaults(),
            )
            .unwrap_or_else(|e| unreachable!("{e}"));
            let names: Vec<String> = orchestrator
                .agents()
                .map(|a: &PersonaAgent| a.display_name().to_string())
                .collect();
            assert_eq!(names.len(), roster.specs().len());
        }
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let path = dir.path().join("report.json");
        let run = RunReport::Failed {
            error: "Orchestration error: UpstreamFailure: 500".to_string(),
        };
        write_report(&path, &run).unwrap_or_else(|e| unreachable!("{e}"));
        let written = std::fs::read_to_string(&path).unwrap_or_default();
        assert!(written.contains("\"error\": \"Orchestration error: UpstreamFailure: 500\""));
    }
}
