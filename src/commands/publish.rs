//! Publish command - create a release from the artifacts in the store

use crate::core::context::PipelineContext;
use crate::core::error::ForgeResult;
use crate::pipeline::publisher::Publisher;

/// Publish the release for the current commit.
///
/// A branch that is not the release branch skips publication and exits
/// cleanly; that is the expected outcome for feature branches, not an error.
pub fn run_publish(ctx: &PipelineContext, dry_run: bool, json: bool) -> ForgeResult<()> {
  let config = ctx.require_config()?;

  let publisher = Publisher::new(ctx, config);
  let plan = publisher.plan()?;

  if dry_run {
    if json {
      println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
      println!("{}", plan.to_human_readable());
      println!("🔍 Dry-run mode. Run without --dry-run to execute.");
    }
    return Ok(());
  }

  if !plan.branch_allows_publish() {
    println!(
      "⏭️  Publish skipped: branch '{}' is not the release branch '{}'",
      plan.branch, plan.release_branch
    );
    return Ok(());
  }

  let tag = publisher.execute(&plan)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "tag": tag }))?);
  } else {
    println!("🎉 Release created: {}", tag);
    for asset in &plan.assets {
      println!("   📎 {}", asset.asset);
    }
  }

  Ok(())
}
