//! Tests for the `doctor` command

use crate::helpers::*;
use anyhow::Result;
use serde_json::Value;

fn check<'a>(results: &'a [Value], name: &str) -> Option<&'a Value> {
  results.iter().find(|r| r["check_name"] == name)
}

#[test]
fn test_doctor_json_lists_checks() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;

  // JSON mode reports results and leaves exit-code policy to the caller
  let output = run_parti_forge(&workspace.path, &["doctor", "--json"])?;
  let results: Vec<Value> = serde_json::from_str(&stdout_of(&output))?;

  // Toolchain probes are always present, whatever the machine has installed
  for name in ["git", "pyinstaller", "gh", "workspace", "config"] {
    assert!(check(&results, name).is_some(), "missing check: {}", name);
  }

  // git and the workspace repo exist in every test environment
  assert_eq!(check(&results, "git").unwrap()["passed"], true);
  assert_eq!(check(&results, "workspace").unwrap()["passed"], true);
  assert_eq!(check(&results, "config").unwrap()["passed"], true);

  Ok(())
}

#[test]
fn test_doctor_warns_on_unpinned_source() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;

  // The starter config has no rev pin
  let output = run_parti_forge(&workspace.path, &["doctor", "--json"])?;
  let results: Vec<Value> = serde_json::from_str(&stdout_of(&output))?;

  let pin = check(&results, "source-pin").unwrap();
  assert_eq!(pin["passed"], false);
  assert_eq!(pin["severity"], "warning");
  assert!(pin["suggestion"].as_str().unwrap().contains("rev"));

  Ok(())
}

#[test]
fn test_doctor_accepts_pinned_source() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file(
    "forge.toml",
    "[source]\nrepo = \"https://example.com/repo.git\"\nrev = \"2025.08.11\"\n",
  )?;

  let output = run_parti_forge(&workspace.path, &["doctor", "--json"])?;
  let results: Vec<Value> = serde_json::from_str(&stdout_of(&output))?;

  assert_eq!(check(&results, "source-pin").unwrap()["passed"], true);

  Ok(())
}

#[test]
fn test_doctor_without_config() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_parti_forge(&workspace.path, &["doctor", "--json"])?;
  let results: Vec<Value> = serde_json::from_str(&stdout_of(&output))?;

  let config = check(&results, "config").unwrap();
  assert_eq!(config["passed"], false);
  assert!(config["suggestion"].as_str().unwrap().contains("init"));

  // Pin state is unknowable without a config
  assert!(check(&results, "source-pin").is_none());

  Ok(())
}
