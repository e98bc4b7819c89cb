//! Unified pipeline context - build once, pass everywhere
//!
//! PipelineContext eliminates redundant config/git loads by building all
//! run-level data once in main.rs, then passing by reference to all commands.
//!
//! ```text
//! main.rs:
//!   PipelineContext::build() -> &PipelineContext
//!   |
//!   v
//! commands/build.rs, run.rs, publish.rs, etc:
//!   fn run_*(ctx: &PipelineContext)
//! ```

use crate::core::config::ForgeConfig;
use crate::core::error::{ConfigError, ForgeError, ForgeResult};
use crate::core::vcs::SystemGit;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared context for one pipeline invocation.
///
/// Built once at startup, passed by reference to all commands. The triggering
/// commit and branch are captured here so every stage of a run agrees on the
/// release tag and the branch gate.
#[derive(Clone)]
pub struct PipelineContext {
  /// Workspace root directory (absolute path)
  pub root: PathBuf,

  /// Full SHA of the commit the pipeline runs for
  pub commit_sha: String,

  /// Branch the pipeline was triggered on
  pub branch: String,

  /// Forge configuration (forge.toml)
  /// Optional because not all commands require configuration
  pub config: Option<Arc<ForgeConfig>>,
}

impl PipelineContext {
  /// Build pipeline context from a workspace root.
  ///
  /// Resolves HEAD and the current branch from the workspace repository and
  /// attempts to load forge.toml. Config is optional - commands that require
  /// it should check and error.
  pub fn build(workspace_root: &Path) -> ForgeResult<Self> {
    let git = SystemGit::open(workspace_root)?;
    let root = git.work_tree().to_path_buf();
    let commit_sha = git.head_commit()?;
    let branch = git.current_branch()?;

    // A missing forge.toml is fine here (not all commands need one), but a
    // malformed or invalid one is the user's error and must not be collapsed
    // into "run init" advice
    let config = match ForgeConfig::load(&root) {
      Ok(config) => Some(Arc::new(config)),
      Err(ForgeError::Config(ConfigError::NotFound { .. })) => None,
      Err(e) => return Err(e),
    };

    Ok(Self {
      root,
      commit_sha,
      branch,
      config,
    })
  }

  /// Get config or error if not found.
  ///
  /// Use this in commands that require forge.toml configuration.
  pub fn require_config(&self) -> ForgeResult<&Arc<ForgeConfig>> {
    self
      .config
      .as_ref()
      .ok_or_else(|| ForgeError::message("No forge.toml found. Run 'parti-forge init' to create one."))
  }

  /// Get workspace root as Path reference (convenience)
  pub fn workspace_root(&self) -> &Path {
    &self.root
  }

  /// Tag for a release of the triggering commit
  pub fn release_tag(&self) -> String {
    format!("release-{}", self.commit_sha)
  }

  /// State directory for artifacts, work trees, and run records
  pub fn state_dir(&self) -> PathBuf {
    self.root.join(".forge")
  }
}
