//! Plan-based builds for reviewable, dry-runnable pipeline jobs
//!
//! Every builder produces a `BuildPlan` before execution, enabling:
//!
//! - **Dry-run mode**: Show what will happen without actually doing it
//! - **Idempotency**: Same input → same plan → same result
//! - **Auditability**: Plans are JSON-serializable for logging/review
//!
//! ```text
//! Command (build, run)
//!   ↓
//! BuildPlan (what to do)
//!   ↓
//! Builder (execute the steps)
//!   ↓
//! Artifact
//! ```

use crate::core::error::ForgeResult;
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Plan identifier (SHA256 hash of plan contents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanId(String);

impl PlanId {
  /// Create a plan ID from plan contents
  pub fn from_contents(contents: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let result = hasher.finalize();
    Self(format!("{:x}", result))
  }

  /// Get the short ID (first 12 characters)
  pub fn short(&self) -> &str {
    &self.0[..12.min(self.0.len())]
  }
}

impl fmt::Display for PlanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// One build step, each a blocking external command invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
  /// Clone the external source dependency
  FetchSource {
    url: String,
    rev: Option<String>,
    dest: String,
  },

  /// Install the dependency's declared requirements
  InstallRequirements { installer: String, requirements: String },

  /// Install the packaging tool
  InstallPackager { installer: String },

  /// Run the dependency's source-generation step
  GenerateSources { interpreter: String, script: String },

  /// Invoke the packaging tool in single-file mode
  Package { tool: String, args: Vec<String> },

  /// Execute the produced binary to confirm it runs
  SmokeTest { binary: String, args: Vec<String> },

  /// Copy the binary into the artifact store
  UploadArtifact { binary: String, artifact: String },
}

/// Plan metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
  /// Plan ID (content hash)
  pub id: PlanId,

  /// Platform target this plan builds
  pub platform: Platform,

  /// Artifact name the plan produces
  pub artifact: String,
}

/// A build plan is the ordered step sequence for one platform's builder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildPlan {
  /// Plan metadata
  pub metadata: PlanMetadata,

  /// Steps to perform (in order)
  pub steps: Vec<Step>,
}

impl BuildPlan {
  /// Create a plan from an ordered step list
  pub fn new(platform: Platform, artifact: impl Into<String>, steps: Vec<Step>) -> Self {
    let json = serde_json::to_vec(&steps).unwrap_or_default();
    let id = PlanId::from_contents(&json);

    Self {
      metadata: PlanMetadata {
        id,
        platform,
        artifact: artifact.into(),
      },
      steps,
    }
  }

  /// Serialize to JSON
  pub fn to_json(&self) -> ForgeResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Deserialize from JSON
  pub fn from_json(json: &str) -> ForgeResult<Self> {
    Ok(serde_json::from_str(json)?)
  }

  /// Get human-readable representation
  pub fn to_human_readable(&self) -> String {
    let mut output = String::new();

    output.push_str(&format!(
      "📋 Build plan: {} ({})\n",
      self.metadata.platform, self.metadata.id
    ));
    output.push_str(&format!("   Artifact: {}\n", self.metadata.artifact));
    output.push_str(&format!("\n   Steps ({}):\n", self.steps.len()));

    for (i, step) in self.steps.iter().enumerate() {
      output.push_str(&format!("   {}. {}\n", i + 1, step_to_string(step)));
    }

    output
  }

  /// Get number of steps
  pub fn len(&self) -> usize {
    self.steps.len()
  }

  /// Check if plan is empty
  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }
}

/// Convert step to human-readable string
fn step_to_string(step: &Step) -> String {
  match step {
    Step::FetchSource { url, rev, dest } => match rev {
      Some(rev) => format!("Clone {} at {} to {}", url, rev, dest),
      None => format!("Clone {} (default-branch tip) to {}", url, dest),
    },
    Step::InstallRequirements { installer, requirements } => {
      format!("Install requirements: {} install -r {}", installer, requirements)
    }
    Step::InstallPackager { installer } => {
      format!("Install packaging tool: {} install pyinstaller", installer)
    }
    Step::GenerateSources { interpreter, script } => {
      format!("Generate sources: {} {}", interpreter, script)
    }
    Step::Package { tool, args } => format!("Package: {} {}", tool, args.join(" ")),
    Step::SmokeTest { binary, args } => format!("Smoke test: {} {}", binary, args.join(" ")),
    Step::UploadArtifact { binary, artifact } => {
      format!("Upload {} as artifact '{}'", binary, artifact)
    }
  }
}
