//! Pipeline run records and the per-run state machine
//!
//! `triggered → building → {publishing → released | skipped | aborted}`
//!
//! No retries: a failed run stays aborted and a new invocation starts a new
//! record. Records are keyed by the triggering commit SHA and persisted under
//! `.forge/runs/` so `status` can report the last outcome.

use crate::core::error::{ForgeError, ForgeResult, ResultExt};
use crate::platform::Platform;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// State of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
  /// Run created, nothing executed yet
  Triggered,
  /// Builders executing (parallel, independent)
  Building,
  /// All builders succeeded, publisher executing
  Publishing,
  /// Release created with the full asset set
  Released,
  /// Builders succeeded but the publish gate declined (branch mismatch or
  /// publishing explicitly skipped)
  Skipped,
  /// A builder or the publisher failed; no release was created
  Aborted,
}

impl RunState {
  /// Whether the run has reached a terminal state
  pub fn is_terminal(self) -> bool {
    matches!(self, RunState::Released | RunState::Skipped | RunState::Aborted)
  }

  fn can_transition_to(self, next: RunState) -> bool {
    use RunState::*;
    matches!(
      (self, next),
      (Triggered, Building) | (Building, Publishing) | (Building, Skipped) | (Building, Aborted) | (Publishing, Released) | (Publishing, Aborted)
    )
  }
}

impl fmt::Display for RunState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      RunState::Triggered => "triggered",
      RunState::Building => "building",
      RunState::Publishing => "publishing",
      RunState::Released => "released",
      RunState::Skipped => "skipped",
      RunState::Aborted => "aborted",
    };
    write!(f, "{}", s)
  }
}

/// Outcome of one builder within a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOutcome {
  pub platform: Platform,
  /// Artifact name on success
  pub artifact: Option<String>,
  /// Failure message on error
  pub error: Option<String>,
}

impl BuildOutcome {
  pub fn success(platform: Platform, artifact: impl Into<String>) -> Self {
    Self {
      platform,
      artifact: Some(artifact.into()),
      error: None,
    }
  }

  pub fn failure(platform: Platform, error: impl Into<String>) -> Self {
    Self {
      platform,
      artifact: None,
      error: Some(error.into()),
    }
  }

  pub fn succeeded(&self) -> bool {
    self.error.is_none()
  }
}

/// Persisted record of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
  /// Full SHA of the triggering commit
  pub commit_sha: String,

  /// Branch the run was triggered on
  pub branch: String,

  pub state: RunState,

  pub started_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,

  /// Per-platform outcomes, recorded as builders finish
  #[serde(default)]
  pub builds: Vec<BuildOutcome>,

  /// Tag of the created release, set on `released`
  #[serde(default)]
  pub release_tag: Option<String>,
}

impl RunRecord {
  pub fn new(commit_sha: impl Into<String>, branch: impl Into<String>) -> Self {
    let now = Utc::now();
    Self {
      commit_sha: commit_sha.into(),
      branch: branch.into(),
      state: RunState::Triggered,
      started_at: now,
      updated_at: now,
      builds: Vec::new(),
      release_tag: None,
    }
  }

  /// Advance the state machine, rejecting invalid transitions
  pub fn transition(&mut self, next: RunState) -> ForgeResult<()> {
    if !self.state.can_transition_to(next) {
      return Err(ForgeError::message(format!(
        "Invalid run state transition: {} → {}",
        self.state, next
      )));
    }
    self.state = next;
    self.updated_at = Utc::now();
    Ok(())
  }

  /// Record one builder's outcome
  pub fn record_build(&mut self, outcome: BuildOutcome) {
    self.builds.push(outcome);
    self.updated_at = Utc::now();
  }

  /// Whether every recorded builder succeeded
  pub fn all_builds_succeeded(&self) -> bool {
    !self.builds.is_empty() && self.builds.iter().all(BuildOutcome::succeeded)
  }

  fn record_path(state_dir: &Path, commit_sha: &str) -> PathBuf {
    state_dir.join("runs").join(format!("{}.json", commit_sha))
  }

  /// Persist the record under `.forge/runs/<sha>.json`
  pub fn save(&self, state_dir: &Path) -> ForgeResult<()> {
    let path = Self::record_path(state_dir, &self.commit_sha);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(self)?;
    fs::write(&path, json).with_context(|| format!("Failed to write run record {}", path.display()))?;
    Ok(())
  }

  /// Load the record for a commit, if one exists
  pub fn load(state_dir: &Path, commit_sha: &str) -> ForgeResult<Option<Self>> {
    let path = Self::record_path(state_dir, commit_sha);
    if !path.exists() {
      return Ok(None);
    }
    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Some(serde_json::from_str(&content)?))
  }

  /// Load the most recently updated record, if any
  pub fn load_latest(state_dir: &Path) -> ForgeResult<Option<Self>> {
    let runs_dir = state_dir.join("runs");
    if !runs_dir.exists() {
      return Ok(None);
    }

    let mut latest: Option<Self> = None;
    for entry in fs::read_dir(&runs_dir).with_context(|| format!("Failed to read {}", runs_dir.display()))? {
      let entry = entry?;
      if entry.path().extension().and_then(|e| e.to_str()) != Some("json") {
        continue;
      }
      let content = fs::read_to_string(entry.path())?;
      let record: Self = serde_json::from_str(&content)?;
      if latest.as_ref().is_none_or(|l| record.updated_at > l.updated_at) {
        latest = Some(record);
      }
    }

    Ok(latest)
  }
}
