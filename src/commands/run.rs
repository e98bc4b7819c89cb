//! Run command - the full pipeline for the current commit
//!
//! Stage 1 runs one builder per host-buildable platform target in parallel.
//! Stage 2 (the publisher) only runs once every builder has succeeded and the
//! branch gate allows it. Outcomes are persisted as a run record keyed by the
//! triggering commit.

use rayon::prelude::*;
use serde::Serialize;

use crate::core::context::PipelineContext;
use crate::core::error::{ForgeError, ForgeResult};
use crate::pipeline::builder::Builder;
use crate::pipeline::graph::PipelineGraph;
use crate::pipeline::plan::BuildPlan;
use crate::pipeline::publisher::{PublishPlan, Publisher};
use crate::pipeline::run::{BuildOutcome, RunRecord, RunState};
use crate::platform::Platform;
use crate::ui::progress::MultiProgress;

/// Dry-run view of a whole pipeline run, for `--json`
#[derive(Serialize)]
struct RunPlan {
  stages: Vec<Vec<String>>,
  builds: Vec<BuildPlan>,
  publish: Option<PublishPlan>,
}

/// Run the full pipeline: parallel builds, then publish
pub fn run_pipeline(ctx: &PipelineContext, skip_publish: bool, dry_run: bool, json: bool) -> ForgeResult<()> {
  let config = ctx.require_config()?;

  // Builders run for the configured targets this host can produce; artifacts
  // for the other targets arrive in the store from runs on matching hosts.
  let targets: Vec<Platform> = config.platforms.iter().copied().filter(|p| p.buildable_on_host()).collect();
  if targets.is_empty() {
    return Err(ForgeError::with_help(
      format!("No configured platform target matches this {} host", Platform::host()),
      "Add the host's platform to [platforms] in forge.toml, or run on a matching host.",
    ));
  }

  let graph = PipelineGraph::new(&targets, !skip_publish);
  let stages = graph.stages()?;

  let publisher = Publisher::new(ctx, config);

  if dry_run {
    let plans: Vec<BuildPlan> = targets.iter().map(|&p| Builder::new(ctx, config, p).plan()).collect();
    let publish_plan = if skip_publish { None } else { Some(publisher.plan()?) };

    if json {
      let run_plan = RunPlan {
        stages: stages
          .iter()
          .map(|stage| stage.iter().map(|job| job.to_string()).collect())
          .collect(),
        builds: plans,
        publish: publish_plan,
      };
      println!("{}", serde_json::to_string_pretty(&run_plan)?);
    } else {
      println!("🚀 Pipeline plan for commit {}", ctx.commit_sha);
      for (i, stage) in stages.iter().enumerate() {
        let jobs: Vec<String> = stage.iter().map(|job| job.to_string()).collect();
        println!("   Stage {}: {}", i + 1, jobs.join(", "));
      }
      println!();
      for plan in &plans {
        println!("{}", plan.to_human_readable());
      }
      if let Some(plan) = &publish_plan {
        println!("{}", plan.to_human_readable());
      }
      println!("🔍 Dry-run mode. Run without --dry-run to execute.");
    }
    return Ok(());
  }

  let state_dir = ctx.state_dir();
  let mut record = RunRecord::new(ctx.commit_sha.clone(), ctx.branch.clone());
  record.transition(RunState::Building)?;
  record.save(&state_dir)?;

  println!("🚀 Pipeline run for commit {} on branch {}", ctx.commit_sha, ctx.branch);

  let progress = MultiProgress::new();
  let outcomes: Vec<BuildOutcome> = targets
    .par_iter()
    .map(|&platform| {
      let builder = Builder::new(ctx, config, platform);
      let plan = builder.plan();
      match builder.execute(&plan, Some(&progress)) {
        Ok(manifest) => BuildOutcome::success(platform, manifest.name),
        Err(e) => BuildOutcome::failure(platform, e.to_string()),
      }
    })
    .collect();

  for outcome in outcomes {
    record.record_build(outcome);
  }
  record.save(&state_dir)?;

  if !record.all_builds_succeeded() {
    record.transition(RunState::Aborted)?;
    record.save(&state_dir)?;

    let failed: Vec<String> = record
      .builds
      .iter()
      .filter(|b| !b.succeeded())
      .map(|b| format!("{}: {}", b.platform, b.error.as_deref().unwrap_or("unknown error")))
      .collect();
    return Err(ForgeError::message(format!("Build failed for:\n   {}", failed.join("\n   "))));
  }

  println!("✅ All builds succeeded ({} target(s))", record.builds.len());

  if skip_publish {
    record.transition(RunState::Skipped)?;
    record.save(&state_dir)?;
    println!("⏭️  Publish skipped (--skip-publish)");
    finish(&record, json)?;
    return Ok(());
  }

  let publish_plan = publisher.plan()?;
  if !publish_plan.branch_allows_publish() {
    record.transition(RunState::Skipped)?;
    record.save(&state_dir)?;
    println!(
      "⏭️  Publish skipped: branch '{}' is not the release branch '{}'",
      publish_plan.branch, publish_plan.release_branch
    );
    finish(&record, json)?;
    return Ok(());
  }

  record.transition(RunState::Publishing)?;
  record.save(&state_dir)?;

  match publisher.execute(&publish_plan) {
    Ok(tag) => {
      record.release_tag = Some(tag.clone());
      record.transition(RunState::Released)?;
      record.save(&state_dir)?;
      println!("🎉 Release created: {}", tag);
      finish(&record, json)?;
      Ok(())
    }
    Err(e) => {
      record.transition(RunState::Aborted)?;
      record.save(&state_dir)?;
      Err(e)
    }
  }
}

fn finish(record: &RunRecord, json: bool) -> ForgeResult<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(record)?);
  }
  Ok(())
}
