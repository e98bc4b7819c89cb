//! System git backend - zero dependencies, maximum performance
//!
//! Uses git plumbing commands for all operations. Optimized for:
//! - Metadata lookups (HEAD, branch) without repository parsing
//! - Safe subprocess execution (isolated environment)
//! - Fetching the external source dependency, pinned or at tip

use crate::core::error::{ForgeError, ForgeResult, GitError, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> ForgeResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(ForgeError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(ForgeError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(work_tree),
    })
  }

  /// Working tree root as discovered by `rev-parse --show-toplevel`
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Get HEAD commit SHA (full 40 characters)
  pub fn head_commit(&self) -> ForgeResult<String> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "HEAD"])
      .output()
      .context("Failed to get HEAD commit")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ForgeError::Git(GitError::CommandFailed {
        command: "git rev-parse HEAD".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Get current branch name
  pub fn current_branch(&self) -> ForgeResult<String> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "--abbrev-ref", "HEAD"])
      .output()
      .context("Failed to get current branch")?;

    if !output.status.success() {
      return Ok("HEAD".to_string()); // Detached HEAD
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Clone the external source dependency into `dest`
  ///
  /// With `rev = None` this clones the default-branch tip, exactly like the
  /// original pipeline. With a pin, the clone is detached at that revision.
  pub fn clone_source(url: &str, dest: &Path, rev: Option<&str>) -> ForgeResult<Self> {
    let output = isolated_git()
      .arg("clone")
      .arg(url)
      .arg(dest)
      .output()
      .context("Failed to execute git clone")?;

    if !output.status.success() {
      return Err(ForgeError::Git(GitError::CloneFailed {
        url: url.to_string(),
        reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    let repo = Self::open(dest)?;

    if let Some(rev) = rev {
      repo.checkout_detached(rev)?;
    }

    Ok(repo)
  }

  /// Detach the working tree at the given revision
  pub fn checkout_detached(&self, rev: &str) -> ForgeResult<()> {
    let output = self
      .git_cmd()
      .args(["checkout", "--detach", rev])
      .output()
      .context("Failed to execute git checkout")?;

    if !output.status.success() {
      return Err(ForgeError::Git(GitError::RevNotFound { rev: rev.to_string() }));
    }

    Ok(())
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = isolated_git();
    cmd.arg("-C").arg(&self.repo_path);
    cmd
  }
}

fn isolated_git() -> Command {
  let mut cmd = Command::new("git");

  // Isolated environment (don't trust global config)
  cmd.env_clear();
  if let Ok(path) = std::env::var("PATH") {
    cmd.env("PATH", path);
  }
  if let Ok(home) = std::env::var("HOME") {
    cmd.env("HOME", home);
  }

  // Force safe behavior (override user config)
  cmd.arg("-c").arg("protocol.version=2");
  cmd.arg("-c").arg("advice.detachedHead=false");
  cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

  cmd
}
