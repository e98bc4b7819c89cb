//! Tests for the `run` command (dry-run paths)

use crate::helpers::*;
use anyhow::Result;
use serde_json::Value;

#[test]
fn test_run_dry_run_shows_stages() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;

  let output = run_parti_forge(&workspace.path, &["run", "--dry-run"])?;
  let stdout = stdout_of(&output);

  let sha = workspace.head_sha()?;
  assert!(stdout.contains(&format!("Pipeline plan for commit {}", sha)));
  assert!(stdout.contains("Stage 1:"));
  assert!(stdout.contains("Stage 2: publish"));
  assert!(stdout.contains("Build plan:"));
  assert!(stdout.contains("Release plan:"));

  // No run record is written in dry-run mode
  assert!(!workspace.file_exists(".forge/runs"));

  Ok(())
}

#[test]
fn test_run_dry_run_skip_publish() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;

  let output = run_parti_forge(&workspace.path, &["run", "--dry-run", "--skip-publish"])?;
  let stdout = stdout_of(&output);

  assert!(stdout.contains("Stage 1:"));
  assert!(!stdout.contains("Stage 2"));
  assert!(!stdout.contains("Release plan:"));

  Ok(())
}

#[test]
fn test_run_dry_run_json() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;

  let output = run_parti_forge(&workspace.path, &["run", "--dry-run", "--json"])?;
  let plan: Value = serde_json::from_str(&stdout_of(&output))?;

  let stages = plan["stages"].as_array().unwrap();
  assert_eq!(stages.len(), 2);
  // One builder per host-buildable target, then the publish barrier
  assert_eq!(stages[0].as_array().unwrap().len(), 1);
  assert_eq!(stages[1], serde_json::json!(["publish"]));

  assert_eq!(plan["builds"].as_array().unwrap().len(), 1);

  let publish = &plan["publish"];
  assert_eq!(
    publish["tag"].as_str().unwrap(),
    format!("release-{}", workspace.head_sha()?)
  );
  // Nothing has been built, so every asset is still missing
  assert!(publish["assets"].as_array().unwrap().iter().all(|a| a["present"] == false));

  Ok(())
}

#[test]
fn test_run_aborts_on_fetch_failure() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file(
    "forge.toml",
    "[source]\nrepo = \"/nonexistent/forge-test-source.git\"\n",
  )?;

  let output = run_parti_forge_raw(&workspace.path, &["run"])?;
  assert!(!output.status.success());

  // The run record reaches the aborted terminal state and nothing is uploaded
  let sha = workspace.head_sha()?;
  let record: Value = serde_json::from_str(&workspace.read_file(&format!(".forge/runs/{}.json", sha))?)?;
  assert_eq!(record["state"], "aborted");
  assert!(record["builds"].as_array().unwrap().iter().all(|b| !b["error"].is_null()));
  assert!(!workspace.file_exists(".forge/artifacts"));

  Ok(())
}

#[test]
fn test_run_requires_config() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_parti_forge_raw(&workspace.path, &["run", "--dry-run"])?;
  assert!(!output.status.success());

  Ok(())
}
