//! Tests for the `build` command (dry-run paths)

use crate::helpers::*;
use anyhow::Result;
use serde_json::Value;

#[test]
fn test_build_dry_run_shows_plan() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;

  let output = run_parti_forge(&workspace.path, &["build", "--platform", "linux", "--dry-run"])?;
  let stdout = stdout_of(&output);

  assert!(stdout.contains("Build plan: linux"));
  assert!(stdout.contains("Artifact: parti-archiver-linux"));
  assert!(stdout.contains("Clone https://github.com/yt-dlp/yt-dlp.git"));
  assert!(stdout.contains("pip3 install -r requirements.txt"));
  assert!(stdout.contains("pyinstaller"));
  assert!(stdout.contains("--onefile"));
  assert!(stdout.contains("devscripts/make_lazy_extractors.py"));
  assert!(stdout.contains("Dry-run mode"));

  // Nothing was executed
  assert!(!workspace.file_exists(".forge/work"));

  Ok(())
}

#[test]
fn test_build_dry_run_json_plan() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;

  let output = run_parti_forge(
    &workspace.path,
    &["build", "--platform", "windows", "--dry-run", "--json"],
  )?;
  let plan: Value = serde_json::from_str(&stdout_of(&output))?;

  assert_eq!(plan["metadata"]["platform"], "windows");
  assert_eq!(plan["metadata"]["artifact"], "parti-archiver-windows");

  let steps = plan["steps"].as_array().unwrap();
  assert_eq!(steps.first().unwrap()["type"], "fetch_source");
  assert_eq!(steps.last().unwrap()["type"], "upload_artifact");

  // Windows uses the unsuffixed interpreter/installer and keeps .exe
  assert_eq!(steps[1]["installer"], "pip");
  assert!(steps.last().unwrap()["binary"].as_str().unwrap().ends_with("parti-archiver.exe"));

  Ok(())
}

#[test]
fn test_build_rejects_unknown_platform() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;

  let output = run_parti_forge_raw(&workspace.path, &["build", "--platform", "freebsd", "--dry-run"])?;
  assert!(!output.status.success());

  Ok(())
}

#[test]
fn test_build_requires_config() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_parti_forge_raw(&workspace.path, &["build", "--dry-run"])?;
  assert!(!output.status.success());

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("forge.toml"));

  Ok(())
}

#[test]
fn test_failed_fetch_uploads_nothing() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file(
    "forge.toml",
    "[source]\nrepo = \"/nonexistent/forge-test-source.git\"\n",
  )?;

  // Host-platform build; the clone fails before any tool is needed
  let output = run_parti_forge_raw(&workspace.path, &["build"])?;
  assert!(!output.status.success());

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("/nonexistent/forge-test-source.git"));
  assert!(!workspace.file_exists(".forge/artifacts"));

  Ok(())
}

#[test]
fn test_smoke_test_step_appears_when_configured() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;

  workspace.write_file(
    "forge.toml",
    r#"platforms = ["linux"]

[pipeline]
release_branch = "master"
smoke_args = ["--version"]

[source]
repo = "https://github.com/yt-dlp/yt-dlp.git"
"#,
  )?;

  let output = run_parti_forge(
    &workspace.path,
    &["build", "--platform", "linux", "--dry-run", "--json"],
  )?;
  let plan: Value = serde_json::from_str(&stdout_of(&output))?;

  let types: Vec<&str> = plan["steps"]
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["type"].as_str().unwrap())
    .collect();
  assert!(types.contains(&"smoke_test"));

  Ok(())
}
