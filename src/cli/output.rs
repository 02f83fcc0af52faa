//! Output formatting for CLI commands.

#![allow(clippy::format_push_string)]

use serde::Serialize;
use serde_json::Value;

use crate::agent::persona::PersonaSpec;
use crate::agent::report::{AgentRunResult, RunReport};
use crate::agent::roster::Roster;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name, falling back to text for anything unknown.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Serializes `value` as pretty JSON.
    #[must_use]
    pub fn to_json<T: Serialize + ?Sized>(self, value: &T) -> String {
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
    }
}

/// Renders a JSON value for text output: strings verbatim, the rest pretty.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Formats an orchestrator run.
#[must_use]
pub fn format_run_report(run: &RunReport, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return format.to_json(run);
    }

    let report = match run {
        RunReport::Completed(report) => report,
        RunReport::Failed { error } => return format!("{error}\n"),
    };

    let mut output = render_value(&report.output);
    output.push_str("\n\n---\n");
    for (index, step) in report.analysis_results.iter().enumerate() {
        let status = match &step.result {
            AgentRunResult::Completed { .. } => "ok".to_string(),
            AgentRunResult::Failed { error } => format!("failed: {error}"),
        };
        output.push_str(&format!(
            "{}. [{}] {} ({status})\n",
            index + 1,
            step.agent,
            step.task
        ));
    }
    #[allow(clippy::cast_precision_loss)]
    let seconds = report.elapsed_ms as f64 / 1000.0;
    output.push_str(&format!(
        "Steps: {} ({} failed) | Tokens: {} | Time: {seconds:.1}s\n",
        report.analysis_results.len(),
        report.failed_steps(),
        report.total_tokens,
    ));
    output
}

/// Formats the agents of a roster.
#[must_use]
pub fn format_roster(roster: Roster, specs: &[PersonaSpec], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let agents: Vec<Value> = specs
                .iter()
                .map(|spec| {
                    serde_json::json!({
                        "name": spec.name,
                        "display_name": spec.display_name,
                        "description": spec.description,
                        "tools": spec.tools,
                        "json_output": spec.json_output,
                    })
                })
                .collect();
            format.to_json(&serde_json::json!({
                "roster": roster.as_str(),
                "agents": agents,
            }))
        }
        OutputFormat::Text => {
            let mut output = format!("Roster: {roster} ({} agents)\n\n", specs.len());
            for spec in specs {
                output.push_str(&format!("{} ({})\n", spec.name, spec.display_name));
                output.push_str(&format!("  {}\n", spec.description));
                if spec.tools.is_empty() {
                    output.push_str("  tools: (none)\n");
                } else {
                    output.push_str(&format!("  tools: {}\n", spec.tools.join(", ")));
                }
            }
            output
        }
    }
}
