mod commands;
mod core;
mod pipeline;
mod platform;
mod ui;

use clap::{Parser, Subcommand};
use core::error::{ForgeError, ForgeResult, print_error};

/// Package an external source tree into per-platform single-file binaries
/// and publish them as one release per commit
#[derive(Parser)]
#[command(name = "parti-forge")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct ForgeCli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Create a starter forge.toml in the current repository
  Init {
    /// Source repository URL to package
    #[arg(long)]
    repo: Option<String>,
  },

  /// Run health checks and diagnostics
  Doctor {
    /// Run thorough checks (includes network tests)
    #[arg(long)]
    thorough: bool,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Show artifact and run status for the current commit
  Status {
    /// Output status in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Build the binary for one platform target
  Build {
    /// Platform target: linux, windows, or macos (default: the host)
    #[arg(long)]
    platform: Option<String>,
    /// Show the step plan without executing
    #[arg(long)]
    dry_run: bool,
    /// Output the plan or result in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Run the full pipeline: parallel builds, then publish
  Run {
    /// Build artifacts but do not publish
    #[arg(long)]
    skip_publish: bool,
    /// Show the pipeline plan without executing
    #[arg(long)]
    dry_run: bool,
    /// Output the plan or run record in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Publish a release from the artifacts in the store
  Publish {
    /// Show the publish plan without executing
    #[arg(long)]
    dry_run: bool,
    /// Output the plan or result in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = ForgeCli::parse();

  if let Err(err) = run(cli.command) {
    handle_error(err);
  }
}

fn run(command: Commands) -> ForgeResult<()> {
  match command {
    // init and doctor must work before forge.toml (or even the context) exists
    Commands::Init { repo } => commands::run_init(repo),
    Commands::Doctor { thorough, json } => commands::run_doctor(thorough, json),

    Commands::Status { json } => commands::run_status(&context()?, json),
    Commands::Build {
      platform,
      dry_run,
      json,
    } => commands::run_build(&context()?, platform, dry_run, json),
    Commands::Run {
      skip_publish,
      dry_run,
      json,
    } => commands::run_pipeline(&context()?, skip_publish, dry_run, json),
    Commands::Publish { dry_run, json } => commands::run_publish(&context()?, dry_run, json),
  }
}

/// Build pipeline context once for commands that need the workspace
fn context() -> ForgeResult<core::context::PipelineContext> {
  let workspace_root = std::env::current_dir()?;
  core::context::PipelineContext::build(&workspace_root)
}

fn handle_error(err: ForgeError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
