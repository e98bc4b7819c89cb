//! Health check command for diagnosing issues
//!
//! The doctor command verifies the local toolchain and configuration before a
//! pipeline run: git, the Python interpreter and installer, the packaging
//! tool, and the release host CLI, plus forge.toml validity and the source
//! pin. Thorough mode adds a network reachability check against the source
//! repository.

use serde::Serialize;
use std::env;
use std::process::Command;

use crate::core::config::ForgeConfig;
use crate::core::error::{ExitCode, ForgeResult};
use crate::core::vcs::SystemGit;
use crate::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Severity {
  Error,
  Warning,
}

/// Outcome of one health check
#[derive(Debug, Clone, Serialize)]
struct CheckResult {
  check_name: String,
  passed: bool,
  message: String,
  severity: Severity,
  #[serde(skip_serializing_if = "Option::is_none")]
  suggestion: Option<String>,
}

impl CheckResult {
  fn pass(name: &str, message: impl Into<String>) -> Self {
    Self {
      check_name: name.to_string(),
      passed: true,
      message: message.into(),
      severity: Severity::Error,
      suggestion: None,
    }
  }

  fn fail(name: &str, severity: Severity, message: impl Into<String>, suggestion: impl Into<String>) -> Self {
    Self {
      check_name: name.to_string(),
      passed: false,
      message: message.into(),
      severity,
      suggestion: Some(suggestion.into()),
    }
  }
}

/// Run the doctor command to diagnose issues
///
/// Returns Ok(()) if all checks pass, or exits with error code if checks fail
pub fn run_doctor(thorough: bool, json: bool) -> ForgeResult<()> {
  let current_dir = env::current_dir()?;
  let mut results = Vec::new();

  // Tool availability. gh is only needed at publish time, so its absence is
  // a warning rather than an error.
  let host = Platform::host();
  results.push(check_tool("git", Severity::Error, "Install git and ensure it is on PATH."));
  results.push(check_tool(
    host.interpreter(),
    Severity::Error,
    "Install Python 3 and ensure it is on PATH.",
  ));
  results.push(check_tool(
    host.installer(),
    Severity::Error,
    "Install pip and ensure it is on PATH.",
  ));
  results.push(check_tool(
    "pyinstaller",
    Severity::Warning,
    "pip install pyinstaller (the builder also installs it per run).",
  ));
  results.push(check_tool(
    "gh",
    Severity::Warning,
    "Install the GitHub CLI to publish releases: https://cli.github.com",
  ));

  // Workspace and configuration
  let repo = match SystemGit::open(&current_dir) {
    Ok(git) => {
      results.push(CheckResult::pass(
        "workspace",
        format!("Git repository at {}", git.work_tree().display()),
      ));
      Some(git)
    }
    Err(_) => {
      results.push(CheckResult::fail(
        "workspace",
        Severity::Error,
        "Current directory is not inside a git repository",
        "Run parti-forge from the repository that holds the entry script.",
      ));
      None
    }
  };

  let root = repo.as_ref().map(|g| g.work_tree().to_path_buf()).unwrap_or(current_dir);
  let config = match ForgeConfig::load(&root) {
    Ok(config) => {
      results.push(CheckResult::pass("config", "forge.toml found and valid"));

      if config.is_pinned() {
        results.push(CheckResult::pass("source-pin", "Source repository is pinned to a revision"));
      } else {
        results.push(CheckResult::fail(
          "source-pin",
          Severity::Warning,
          "Source repository is unpinned; each run builds whatever its default branch holds",
          "Set [source] rev in forge.toml to a commit SHA or tag for reproducible builds.",
        ));
      }
      Some(config)
    }
    Err(e) => {
      results.push(CheckResult::fail(
        "config",
        Severity::Error,
        format!("forge.toml problem: {}", e),
        "Run 'parti-forge init' to create a starter config.",
      ));
      None
    }
  };

  if thorough {
    if let Some(config) = &config {
      results.push(check_source_reachable(&config.source.repo));
    }
  }

  if json {
    println!("{}", serde_json::to_string_pretty(&results)?);
    return Ok(());
  }

  println!("🏥 Running health checks...\n");

  let mut has_errors = false;
  let mut has_warnings = false;

  for result in &results {
    let icon = if result.passed { "✅" } else { "❌" };
    println!("{} {}: {}", icon, result.check_name, result.message);

    if !result.passed {
      if let Some(suggestion) = &result.suggestion {
        println!("   💡 Fix: {}", suggestion);
      }
      match result.severity {
        Severity::Error => has_errors = true,
        Severity::Warning => has_warnings = true,
      }
    }
  }

  let passed_count = results.iter().filter(|r| r.passed).count();
  println!();
  println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
  println!("Summary: {}/{} checks passed", passed_count, results.len());

  if has_errors {
    println!("\n⚠️  Critical issues found. Please fix errors before running the pipeline.");
    std::process::exit(ExitCode::Validation.as_i32());
  } else if has_warnings {
    println!("\n⚠️  Some warnings found. Consider addressing them.");
  } else {
    println!("\n✨ All checks passed! Your setup looks healthy.");
  }

  Ok(())
}

/// Probe a tool by asking for its version
fn check_tool(tool: &str, severity: Severity, suggestion: &str) -> CheckResult {
  match Command::new(tool).arg("--version").output() {
    Ok(output) if output.status.success() => {
      let version = String::from_utf8_lossy(&output.stdout);
      let version = version.lines().next().unwrap_or("").trim();
      CheckResult::pass(tool, format!("Found {}", version))
    }
    Ok(_) => CheckResult::fail(
      tool,
      severity,
      format!("{} is present but '--version' failed", tool),
      suggestion,
    ),
    Err(_) => CheckResult::fail(tool, severity, format!("{} not found on PATH", tool), suggestion),
  }
}

/// Network check: can the source repository be reached?
fn check_source_reachable(repo: &str) -> CheckResult {
  let reachable = Command::new("git")
    .args(["ls-remote", "--exit-code", repo, "HEAD"])
    .output()
    .map(|o| o.status.success())
    .unwrap_or(false);

  if reachable {
    CheckResult::pass("source-remote", format!("Source repository {} is reachable", repo))
  } else {
    CheckResult::fail(
      "source-remote",
      Severity::Error,
      format!("Cannot reach source repository {}", repo),
      "Check the [source] repo URL in forge.toml and your network connection.",
    )
  }
}
