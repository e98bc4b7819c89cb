//! Status command - artifact and run state for the current commit

use serde::Serialize;

use crate::core::context::PipelineContext;
use crate::core::error::ForgeResult;
use crate::pipeline::artifact::{ArtifactManifest, ArtifactStore};
use crate::pipeline::publisher::Publisher;
use crate::pipeline::run::RunRecord;

/// Status snapshot, also the `--json` payload
#[derive(Serialize)]
struct PipelineStatus {
  commit_sha: String,
  branch: String,
  release_tag: String,
  /// Everything currently in the artifact store
  artifacts: Vec<ArtifactManifest>,
  /// Configured targets with no artifact yet
  missing: Vec<String>,
  branch_allows_publish: bool,
  ready_to_publish: bool,
  last_run: Option<RunRecord>,
}

/// Run the status command
pub fn run_status(ctx: &PipelineContext, json: bool) -> ForgeResult<()> {
  let config = ctx.require_config()?;

  let store = ArtifactStore::open(&ctx.state_dir());
  let artifacts = store.list()?;

  let plan = Publisher::new(ctx, config).plan()?;
  let missing: Vec<String> = plan.missing().iter().map(|m| m.to_string()).collect();

  let status = PipelineStatus {
    commit_sha: ctx.commit_sha.clone(),
    branch: ctx.branch.clone(),
    release_tag: ctx.release_tag(),
    artifacts,
    missing,
    branch_allows_publish: plan.branch_allows_publish(),
    ready_to_publish: plan.all_artifacts_present() && plan.branch_allows_publish(),
    last_run: RunRecord::load_latest(&ctx.state_dir())?,
  };

  if json {
    println!("{}", serde_json::to_string_pretty(&status)?);
  } else {
    print_status(&status);
  }

  Ok(())
}

fn print_status(status: &PipelineStatus) {
  println!("\n📊 Pipeline Status\n");
  println!("   Commit:  {}", status.commit_sha);
  println!("   Branch:  {}", status.branch);
  println!("   Tag:     {}", status.release_tag);
  println!();

  if status.artifacts.is_empty() {
    println!("   No artifacts in the store yet.");
  } else {
    println!("   Artifacts ({}):", status.artifacts.len());
    for artifact in &status.artifacts {
      println!(
        "   ✅ {} ({} bytes, sha256 {}…)",
        artifact.name,
        artifact.size,
        &artifact.digest[..12.min(artifact.digest.len())]
      );
    }
  }

  for name in &status.missing {
    println!("   ❌ {} (missing)", name);
  }
  println!();

  match &status.last_run {
    Some(run) => {
      println!("   Last run: {} ({} on {})", run.state, run.commit_sha, run.branch);
      if let Some(tag) = &run.release_tag {
        println!("   Released: {}", tag);
      }
    }
    None => println!("   No pipeline runs recorded."),
  }
  println!();

  if status.ready_to_publish {
    println!("✨ All artifacts present; ready to publish.");
  } else if !status.branch_allows_publish {
    println!("⏭️  Branch gate: publishing is skipped on this branch.");
  } else {
    println!("⏳ Waiting on {} artifact(s) before publishing.", status.missing.len());
  }
}
