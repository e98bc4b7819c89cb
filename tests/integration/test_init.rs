//! Tests for the `init` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_init_creates_config() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  run_parti_forge(&workspace.path, &["init"])?;

  assert!(workspace.file_exists("forge.toml"));

  let config = workspace.read_file("forge.toml")?;
  assert!(config.contains("[pipeline]"));
  assert!(config.contains("[source]"));
  assert!(config.contains("[package]"));
  assert!(config.contains("yt-dlp"));
  assert!(config.contains("archiver.py"));
  assert!(config.contains("parti-archiver"));

  Ok(())
}

#[test]
fn test_init_with_custom_repo() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  run_parti_forge(
    &workspace.path,
    &["init", "--repo", "https://example.com/custom.git"],
  )?;

  let config = workspace.read_file("forge.toml")?;
  assert!(config.contains("https://example.com/custom.git"));

  Ok(())
}

#[test]
fn test_init_refuses_overwrite() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  run_parti_forge(&workspace.path, &["init"])?;
  let first = workspace.read_file("forge.toml")?;

  let output = run_parti_forge_raw(&workspace.path, &["init", "--repo", "https://example.com/other.git"])?;
  assert!(!output.status.success());

  // The existing config is untouched
  assert_eq!(workspace.read_file("forge.toml")?, first);

  Ok(())
}

#[test]
fn test_starter_config_targets_all_platforms() -> Result<()> {
  let workspace = TestWorkspace::with_config()?;

  let config = workspace.read_file("forge.toml")?;
  assert!(config.contains("linux"));
  assert!(config.contains("windows"));
  assert!(config.contains("macos"));

  Ok(())
}
