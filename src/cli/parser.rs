//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// swarm-rs: planner-driven multi-agent orchestration.
///
/// A planner splits the request into sub-tasks for named agents, each agent
/// works through its tools, and a synthesizer merges the results into one
/// report.
#[derive(Parser, Debug)]
#[command(name = "swarm-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory containing prompt template files.
    ///
    /// Falls back to `SWARM_PROMPT_DIR`, then `~/.config/swarm-rs/prompts`.
    #[arg(long, global = true)]
    pub prompt_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a request through the planner, the roster agents and the synthesizer.
    ///
    /// Requires an API key (`OPENAI_API_KEY`, or `AZURE_OPENAI_API_KEY` with
    /// `SWARM_PROVIDER=azure`). The news tools also need `GOOGLE_API_KEY`
    /// and `GOOGLE_CSE_ID`.
    #[command(after_help = r#"Examples:
  swarm-rs run "What happened in AI regulation this week?"
  swarm-rs run "Find a vegetarian lasagna recipe" --roster recipe
  swarm-rs run "Latest chip export news" --parallel --max-rounds 5
  swarm-rs --format json run "EU energy prices" | jq '.output'
  swarm-rs run "Mars missions" --output report.json
"#)]
    Run {
        /// The request to fulfil.
        prompt: String,

        /// Agent roster: news, recipe.
        #[arg(short, long, default_value = "news")]
        roster: String,

        /// Dispatch plan steps concurrently.
        #[arg(short, long)]
        parallel: bool,

        /// Maximum model/tool rounds per agent.
        #[arg(long)]
        max_rounds: Option<usize>,

        /// Model for every agent (overrides `SWARM_MODEL`).
        #[arg(short, long)]
        model: Option<String>,

        /// Also write the report as pretty JSON to this file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the agents of a roster and the tools they may call.
    #[command(after_help = r#"Examples:
  swarm-rs agents                   # News roster
  swarm-rs agents --roster recipe   # Recipe roster
  swarm-rs --format json agents
"#)]
    Agents {
        /// Agent roster: news, recipe.
        #[arg(short, long, default_value = "news")]
        roster: String,
    },

    /// Write the default prompt templates to a directory.
    ///
    /// Existing files are left untouched.
    #[command(after_help = r#"Examples:
  swarm-rs init-prompts                   # ~/.config/swarm-rs/prompts
  swarm-rs init-prompts --dir ./prompts   # Custom directory
"#)]
    InitPrompts {
        /// Target directory.
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["swarm-rs", "run", "ai news"])
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(cli.format, "text");
        match cli.command {
            Commands::Run {
                prompt,
                roster,
                parallel,
                max_rounds,
                model,
                output,
            } => {
                assert_eq!(prompt, "ai news");
                assert_eq!(roster, "news");
                assert!(!parallel);
                assert_eq!(max_rounds, None);
                assert_eq!(model, None);
                assert_eq!(output, None);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "swarm-rs",
            "run",
            "lasagna",
            "--roster",
            "recipe",
            "--parallel",
            "--max-rounds",
            "3",
            "--format",
            "json",
            "-o",
            "out.json",
        ])
        .unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(cli.format, "json");
        match cli.command {
            Commands::Run {
                roster,
                parallel,
                max_rounds,
                output,
                ..
            } => {
                assert_eq!(roster, "recipe");
                assert!(parallel);
                assert_eq!(max_rounds, Some(3));
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_run_requires_prompt() {
        assert!(Cli::try_parse_from(["swarm-rs", "run"]).is_err());
    }

    #[test]
    fn test_global_prompt_dir() {
        let cli = Cli::try_parse_from(["swarm-rs", "init-prompts", "--prompt-dir", "/tmp/p"])
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(cli.prompt_dir, Some(PathBuf::from("/tmp/p")));
    }
}
