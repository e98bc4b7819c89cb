//! Tests for the `status` command

use crate::helpers::*;
use anyhow::Result;
use serde_json::Value;

#[test]
fn test_status_on_fresh_workspace() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;
  let sha = workspace.head_sha()?;

  let output = run_parti_forge(&workspace.path, &["status"])?;
  let stdout = stdout_of(&output);

  assert!(stdout.contains(&sha));
  assert!(stdout.contains("No artifacts in the store yet"));
  assert!(stdout.contains("No pipeline runs recorded"));

  Ok(())
}

#[test]
fn test_status_json() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;
  let sha = workspace.head_sha()?;

  let output = run_parti_forge(&workspace.path, &["status", "--json"])?;
  let status: Value = serde_json::from_str(&stdout_of(&output))?;

  assert_eq!(status["commit_sha"].as_str().unwrap(), sha);
  assert_eq!(status["branch"], "master");
  assert_eq!(status["release_tag"].as_str().unwrap(), format!("release-{}", sha));
  assert_eq!(status["branch_allows_publish"], true);
  assert_eq!(status["ready_to_publish"], false);
  assert_eq!(status["missing"].as_array().unwrap().len(), 3);
  assert!(status["artifacts"].as_array().unwrap().is_empty());
  assert!(status["last_run"].is_null());

  Ok(())
}

#[test]
fn test_status_reflects_branch_gate() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;
  workspace.checkout_branch("feature")?;

  let output = run_parti_forge(&workspace.path, &["status", "--json"])?;
  let status: Value = serde_json::from_str(&stdout_of(&output))?;

  assert_eq!(status["branch"], "feature");
  assert_eq!(status["branch_allows_publish"], false);

  Ok(())
}

#[test]
fn test_status_requires_config() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_parti_forge_raw(&workspace.path, &["status"])?;
  assert!(!output.status.success());

  Ok(())
}

#[test]
fn test_malformed_config_is_not_reported_as_missing() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file("forge.toml", "this is not [ valid toml")?;

  let output = run_parti_forge_raw(&workspace.path, &["status"])?;
  assert!(!output.status.success());

  // The real parse failure surfaces; suggesting `init` would be a dead end
  // since the file already exists
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("forge.toml"));
  assert!(!stderr.contains("parti-forge init"));

  Ok(())
}

#[test]
fn test_invalid_config_value_surfaces() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file(
    "forge.toml",
    "[source]\nrepo = \"https://example.com/repo.git\"\n\n[package]\nentry_script = \".forge/work/linux/src/archiver.py\"\n",
  )?;

  let output = run_parti_forge_raw(&workspace.path, &["status"])?;
  assert!(!output.status.success());

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("state directory"));

  Ok(())
}
