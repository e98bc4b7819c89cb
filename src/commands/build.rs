//! Build command - produce the binary for one platform target

use crate::core::context::PipelineContext;
use crate::core::error::ForgeResult;
use crate::pipeline::builder::Builder;
use crate::platform::Platform;
use crate::ui::progress::MultiProgress;

/// Run a single platform build.
///
/// Without `--platform` the host's own target is built. Dry-run prints the
/// step plan without executing anything.
pub fn run_build(ctx: &PipelineContext, platform: Option<String>, dry_run: bool, json: bool) -> ForgeResult<()> {
  let config = ctx.require_config()?;

  let platform = match platform {
    Some(id) => Platform::parse(&id)?,
    None => Platform::host(),
  };

  let builder = Builder::new(ctx, config, platform);
  let plan = builder.plan();

  if dry_run {
    if json {
      println!("{}", plan.to_json()?);
    } else {
      println!("{}", plan.to_human_readable());
      println!("🔍 Dry-run mode. Run without --dry-run to execute.");
    }
    return Ok(());
  }

  println!("🔨 Building {} for {}", config.package.binary_name, platform);

  let progress = MultiProgress::new();
  let manifest = builder.execute(&plan, Some(&progress))?;

  if json {
    println!("{}", serde_json::to_string_pretty(&manifest)?);
  } else {
    println!();
    println!("✅ Built and uploaded {}", manifest.name);
    println!("   sha256: {}", manifest.digest);
    println!("   size:   {} bytes", manifest.size);
  }

  Ok(())
}
