//! Command-line integration tests.

use assert_cmd::Command;
use predicates::prelude::*;

const KEY_VARS: [&str; 3] = ["OPENAI_API_KEY", "AZURE_OPENAI_API_KEY", "SWARM_API_KEY"];

fn swarm() -> Command {
    let mut cmd = Command::cargo_bin("swarm-rs").unwrap_or_else(|e| unreachable!("{e}"));
    for var in KEY_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("SWARM_PROVIDER");
    cmd.env_remove("SWARM_PROMPT_DIR");
    cmd
}

#[test]
fn help_lists_commands() {
    swarm()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("agents"))
        .stdout(predicate::str::contains("init-prompts"));
}

#[test]
fn agents_lists_news_roster() {
    swarm()
        .arg("agents")
        .assert()
        .success()
        .stdout(predicate::str::contains("news_searcher (News Searcher)"))
        .stdout(predicate::str::contains("tools: scrape_news_article"));
}

#[test]
fn agents_json_for_recipe_roster() {
    swarm()
        .args(["--format", "json", "agents", "--roster", "recipe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"roster\": \"recipe\""))
        .stdout(predicate::str::contains("recipe_formatter"));
}

#[test]
fn agents_rejects_unknown_roster() {
    swarm()
        .args(["agents", "--roster", "sports"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown roster"));
}

#[test]
fn init_prompts_writes_templates() {
    let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
    swarm()
        .args(["init-prompts", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 prompt template(s)"));

    assert!(dir.path().join("planner.md").exists());
    assert!(dir.path().join("synthesizer.md").exists());
    assert!(dir.path().join("article_analysis.md").exists());

    swarm()
        .args(["init-prompts", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already exist"));
}

#[test]
fn run_without_api_key_fails() {
    let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
    swarm()
        .current_dir(dir.path())
        .args(["run", "latest AI regulation news"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key missing"));
}

#[test]
fn run_requires_prompt() {
    swarm().arg("run").assert().failure();
}
