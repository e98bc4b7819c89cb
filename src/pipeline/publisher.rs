//! Release publication
//!
//! Runs after the full build barrier: collects every platform artifact,
//! renames the Unix binaries to platform-qualified asset names, and creates
//! one release tagged with the triggering commit. Partial asset sets are
//! never published; a missing artifact fails the publisher before any call
//! to the release host. Atomicity of the release itself is provided by the
//! host's create call, not by this pipeline.

use crate::core::config::ForgeConfig;
use crate::core::context::PipelineContext;
use crate::core::error::{ArtifactError, ForgeError, ForgeResult, ToolError};
use crate::pipeline::artifact::ArtifactStore;
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;

/// One asset to attach to the release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetPlan {
  pub platform: Platform,
  /// Name in the artifact store
  pub artifact: String,
  /// Name attached to the release
  pub asset: String,
  /// Whether the artifact is present in the store
  pub present: bool,
}

/// What the publisher will do, for dry-run display and `--json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishPlan {
  /// Tag: `release-` + the full triggering commit SHA
  pub tag: String,

  /// Release title (same identifier as the tag)
  pub title: String,

  /// Branch gate: branch the run was triggered on vs. the release branch
  pub branch: String,
  pub release_branch: String,

  pub assets: Vec<AssetPlan>,
}

impl PublishPlan {
  /// Branch gate: the publisher only runs on the release branch
  pub fn branch_allows_publish(&self) -> bool {
    self.branch == self.release_branch
  }

  /// Barrier invariant: one artifact per configured platform
  pub fn all_artifacts_present(&self) -> bool {
    self.assets.iter().all(|a| a.present)
  }

  /// Names of missing artifacts
  pub fn missing(&self) -> Vec<&str> {
    self
      .assets
      .iter()
      .filter(|a| !a.present)
      .map(|a| a.artifact.as_str())
      .collect()
  }

  /// Get human-readable representation
  pub fn to_human_readable(&self) -> String {
    let mut output = String::new();

    output.push_str(&format!("📦 Release plan: {}\n", self.tag));
    output.push_str(&format!("   Branch: {} (release branch: {})\n", self.branch, self.release_branch));
    output.push_str(&format!("\n   Assets ({}):\n", self.assets.len()));

    for asset in &self.assets {
      let marker = if asset.present { "✅" } else { "❌ missing" };
      output.push_str(&format!("   {} {} → {}\n", marker, asset.artifact, asset.asset));
    }

    if !self.branch_allows_publish() {
      output.push_str("\n⏭️  Branch gate: publish would be skipped on this branch\n");
    }

    output
  }
}

/// Publisher job for one pipeline run
pub struct Publisher<'a> {
  ctx: &'a PipelineContext,
  config: &'a ForgeConfig,
}

impl<'a> Publisher<'a> {
  pub fn new(ctx: &'a PipelineContext, config: &'a ForgeConfig) -> Self {
    Self { ctx, config }
  }

  /// Build the publish plan from the artifact store's current contents
  pub fn plan(&self) -> ForgeResult<PublishPlan> {
    let store = ArtifactStore::open(&self.ctx.state_dir());
    let base = &self.config.package.binary_name;
    let tag = self.ctx.release_tag();

    let assets = self
      .config
      .platforms
      .iter()
      .map(|platform| AssetPlan {
        platform: *platform,
        artifact: platform.artifact_name(base),
        asset: platform.asset_name(base),
        present: store.contains(&platform.artifact_name(base)),
      })
      .collect();

    Ok(PublishPlan {
      title: tag.clone(),
      tag,
      branch: self.ctx.branch.clone(),
      release_branch: self.config.pipeline.release_branch.clone(),
      assets,
    })
  }

  /// Execute a publish plan: stage all assets and create the release.
  ///
  /// Fails before any host call when an expected artifact is missing, so a
  /// partial asset set is never attached to a release.
  pub fn execute(&self, plan: &PublishPlan) -> ForgeResult<String> {
    if let Some(missing) = plan.missing().first() {
      return Err(ForgeError::Artifact(ArtifactError::Missing {
        name: missing.to_string(),
      }));
    }

    let store = ArtifactStore::open(&self.ctx.state_dir());
    let staging_dir = self.ctx.state_dir().join("staging").join(&plan.tag);

    let mut staged: Vec<PathBuf> = Vec::new();
    for asset in &plan.assets {
      staged.push(store.stage(&asset.artifact, &asset.asset, &staging_dir)?);
    }

    self.create_release(&plan.tag, &plan.title, &staged)?;
    Ok(plan.tag.clone())
  }

  /// Create the release via the gh CLI.
  ///
  /// gh creates final (non-draft, non-prerelease) releases by default.
  /// Duplicate-tag handling is the host's policy; its rejection surfaces as
  /// a ReleaseFailed error with a contextual hint.
  fn create_release(&self, tag: &str, title: &str, assets: &[PathBuf]) -> ForgeResult<()> {
    let mut cmd = Command::new("gh");
    cmd
      .current_dir(self.ctx.workspace_root())
      .args(["release", "create", tag, "--title", title]);
    for asset in assets {
      cmd.arg(asset);
    }

    let output = cmd.output().map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        ForgeError::Tool(ToolError::NotFound { tool: "gh".to_string() })
      } else {
        ForgeError::Io(e)
      }
    })?;

    if !output.status.success() {
      return Err(ForgeError::Tool(ToolError::ReleaseFailed {
        tag: tag.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    Ok(())
  }
}
