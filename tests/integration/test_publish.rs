//! Tests for the `publish` command

use crate::helpers::*;
use anyhow::Result;
use serde_json::Value;

#[test]
fn test_publish_dry_run_tags_full_sha() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;
  let sha = workspace.head_sha()?;

  let output = run_parti_forge(&workspace.path, &["publish", "--dry-run"])?;
  let stdout = stdout_of(&output);

  assert_eq!(sha.len(), 40);
  assert!(stdout.contains(&format!("Release plan: release-{}", sha)));
  assert!(stdout.contains("parti-archiver-linux"));
  assert!(stdout.contains("parti-archiver-windows"));
  assert!(stdout.contains("parti-archiver-macos"));
  // Windows asset keeps its raw .exe name
  assert!(stdout.contains("parti-archiver.exe"));

  Ok(())
}

#[test]
fn test_publish_dry_run_json() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;

  let output = run_parti_forge(&workspace.path, &["publish", "--dry-run", "--json"])?;
  let plan: Value = serde_json::from_str(&stdout_of(&output))?;

  assert_eq!(
    plan["tag"].as_str().unwrap(),
    format!("release-{}", workspace.head_sha()?)
  );
  assert_eq!(plan["title"], plan["tag"]);
  assert_eq!(plan["branch"], "master");
  assert_eq!(plan["release_branch"], "master");

  let assets = plan["assets"].as_array().unwrap();
  assert_eq!(assets.len(), 3);
  assert!(assets.iter().all(|a| a["present"] == false));

  Ok(())
}

#[test]
fn test_publish_skips_off_release_branch() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;
  workspace.checkout_branch("feature")?;

  // A skipped publish is a clean exit, not an error
  let output = run_parti_forge(&workspace.path, &["publish"])?;
  let stdout = stdout_of(&output);

  assert!(stdout.contains("Publish skipped"));
  assert!(stdout.contains("'feature'"));

  Ok(())
}

#[test]
fn test_publish_fails_with_missing_artifacts() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;

  // On the release branch but with an empty artifact store
  let output = run_parti_forge_raw(&workspace.path, &["publish"])?;
  assert!(!output.status.success());

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("parti-archiver"));

  // Nothing was staged for release
  assert!(!workspace.file_exists(".forge/staging"));

  Ok(())
}

#[test]
fn test_publish_dry_run_notes_branch_gate() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;
  workspace.checkout_branch("topic")?;

  let output = run_parti_forge(&workspace.path, &["publish", "--dry-run"])?;
  let stdout = stdout_of(&output);

  assert!(stdout.contains("Branch gate"));

  Ok(())
}
