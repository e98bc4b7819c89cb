//! Initialize forge.toml configuration

use std::env;

use crate::core::config::ForgeConfig;
use crate::core::error::{ForgeError, ForgeResult};

/// Default source repository for the starter config
const DEFAULT_REPO: &str = "https://github.com/yt-dlp/yt-dlp.git";

/// Create a starter forge.toml in the current directory
pub fn run_init(repo: Option<String>) -> ForgeResult<()> {
  let current_dir = env::current_dir()?;

  if ForgeConfig::exists(&current_dir) {
    return Err(ForgeError::with_help(
      "forge.toml already exists in this directory",
      "Edit the existing file, or delete it first to start over.",
    ));
  }

  let repo = repo.unwrap_or_else(|| DEFAULT_REPO.to_string());
  let config = ForgeConfig::starter(&repo);
  config.save(&current_dir)?;

  println!("✅ Created forge.toml");
  println!("   Source repository: {}", repo);
  println!();
  println!("Next steps:");
  println!("   1. Review forge.toml (platforms, entry script, release branch)");
  println!("   2. Pin [source] rev to a commit for reproducible builds");
  println!("   3. Run 'parti-forge doctor' to verify your toolchain");
  println!("   4. Run 'parti-forge run --dry-run' to see the pipeline plan");

  Ok(())
}
