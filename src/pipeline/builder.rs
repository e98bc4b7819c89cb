//! Per-platform build job
//!
//! One builder produces one binary: fetch the external source dependency,
//! install its requirements plus the packaging tool, regenerate derived
//! sources, package the entry script into a single file, optionally smoke
//! test it, and upload the result as a named artifact.
//!
//! Each step is a blocking external command. The first failing step aborts
//! this platform's build; sibling builders are unaffected.

use crate::core::config::ForgeConfig;
use crate::core::context::PipelineContext;
use crate::core::error::{ForgeError, ForgeResult, ResultExt, ToolError};
use crate::core::vcs::SystemGit;
use crate::pipeline::artifact::{ArtifactManifest, ArtifactStore};
use crate::pipeline::plan::{BuildPlan, Step};
use crate::platform::Platform;
use crate::ui::progress::MultiProgress;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Packaging tool executable name
const PACKAGER: &str = "pyinstaller";

/// Builder for one platform target
pub struct Builder<'a> {
  ctx: &'a PipelineContext,
  config: &'a ForgeConfig,
  platform: Platform,
}

impl<'a> Builder<'a> {
  pub fn new(ctx: &'a PipelineContext, config: &'a ForgeConfig, platform: Platform) -> Self {
    Self { ctx, config, platform }
  }

  pub fn platform(&self) -> Platform {
    self.platform
  }

  /// Work directory for this platform's builder
  fn work_dir(&self) -> PathBuf {
    self.ctx.state_dir().join("work").join(self.platform.id())
  }

  /// Directory the dependency is cloned into
  fn source_dir(&self) -> PathBuf {
    self.work_dir().join("src")
  }

  /// Deterministic output path of the packaged binary
  pub fn binary_path(&self) -> PathBuf {
    self
      .work_dir()
      .join("dist")
      .join(self.platform.raw_binary_name(&self.config.package.binary_name))
  }

  /// Name under which the produced binary is uploaded
  pub fn artifact_name(&self) -> String {
    self.platform.artifact_name(&self.config.package.binary_name)
  }

  /// Build the step plan for this platform
  pub fn plan(&self) -> BuildPlan {
    let source = &self.config.source;
    let installer = self.platform.installer().to_string();

    let mut steps = vec![
      Step::FetchSource {
        url: source.repo.clone(),
        rev: source.rev.clone(),
        dest: self.source_dir().display().to_string(),
      },
      Step::InstallRequirements {
        installer: installer.clone(),
        requirements: source.requirements.clone(),
      },
      Step::InstallPackager { installer },
      Step::GenerateSources {
        interpreter: self.platform.interpreter().to_string(),
        script: source.generate.clone(),
      },
      Step::Package {
        tool: PACKAGER.to_string(),
        args: self.packager_args(),
      },
    ];

    if let Some(smoke_args) = &self.config.pipeline.smoke_args {
      steps.push(Step::SmokeTest {
        binary: self.binary_path().display().to_string(),
        args: smoke_args.clone(),
      });
    }

    steps.push(Step::UploadArtifact {
      binary: self.binary_path().display().to_string(),
      artifact: self.artifact_name(),
    });

    BuildPlan::new(self.platform, self.artifact_name(), steps)
  }

  /// Flags for the packaging tool: single-file mode, fixed name, extra
  /// search paths, the dependency's hook directory, the forced hidden
  /// imports, and finally the entry script.
  fn packager_args(&self) -> Vec<String> {
    let package = &self.config.package;
    let source_dir = self.source_dir();

    let mut args = vec![
      "--onefile".to_string(),
      "--name".to_string(),
      package.binary_name.clone(),
      "--distpath".to_string(),
      self.work_dir().join("dist").display().to_string(),
      "--workpath".to_string(),
      self.work_dir().join("build").display().to_string(),
      "--specpath".to_string(),
      self.work_dir().display().to_string(),
    ];

    for search_path in &package.search_paths {
      args.push("--paths".to_string());
      args.push(source_dir.join(search_path).display().to_string());
    }

    // The entry script's own directory holds its sibling modules
    let entry = self.ctx.root.join(&package.entry_script);
    if let Some(parent) = entry.parent() {
      args.push("--paths".to_string());
      args.push(parent.display().to_string());
    }

    args.push("--additional-hooks-dir".to_string());
    args.push(source_dir.join(&package.hook_dir).display().to_string());

    for hidden in &package.hidden_imports {
      args.push("--hidden-import".to_string());
      args.push(hidden.clone());
    }

    args.push(entry.display().to_string());
    args
  }

  /// Execute a plan, returning the manifest of the uploaded artifact
  pub fn execute(&self, plan: &BuildPlan, progress: Option<&MultiProgress>) -> ForgeResult<ArtifactManifest> {
    if !self.platform.buildable_on_host() {
      return Err(ForgeError::with_help(
        format!(
          "Cannot build the {} target on a {} host",
          self.platform,
          Platform::host()
        ),
        "Run this builder on a matching host; its artifact lands in the shared store like any other.",
      ));
    }

    let bar = progress.map(|p| p.add_bar(plan.len(), format!("build {}", self.platform)));

    let mut manifest = None;
    for step in &plan.steps {
      manifest = self.execute_step(step)?;
      if let (Some(p), Some(b)) = (progress, bar.as_ref()) {
        p.inc(b);
      }
    }

    manifest.ok_or_else(|| ForgeError::message("Build plan produced no artifact"))
  }

  fn execute_step(&self, step: &Step) -> ForgeResult<Option<ArtifactManifest>> {
    match step {
      Step::FetchSource { url, rev, dest } => {
        let dest = PathBuf::from(dest);
        if dest.exists() {
          fs::remove_dir_all(&dest).with_context(|| format!("Failed to clear stale checkout at {}", dest.display()))?;
        }
        if let Some(parent) = dest.parent() {
          fs::create_dir_all(parent)?;
        }
        SystemGit::clone_source(url, &dest, rev.as_deref())?;
        Ok(None)
      }

      Step::InstallRequirements { installer, requirements } => {
        let mut cmd = Command::new(installer);
        cmd
          .current_dir(self.source_dir())
          .args(["install", "-r", requirements]);
        run_tool(installer, &mut cmd)?;
        Ok(None)
      }

      Step::InstallPackager { installer } => {
        let mut cmd = Command::new(installer);
        cmd.current_dir(self.source_dir()).args(["install", PACKAGER]);
        run_tool(installer, &mut cmd)?;
        Ok(None)
      }

      Step::GenerateSources { interpreter, script } => {
        let mut cmd = Command::new(interpreter);
        cmd.current_dir(self.source_dir()).arg(script);
        run_tool(interpreter, &mut cmd)?;
        Ok(None)
      }

      Step::Package { tool, args } => {
        let mut cmd = Command::new(tool);
        cmd.current_dir(self.source_dir()).args(args);
        run_tool(tool, &mut cmd)?;

        // Exit zero is not proof the binary works; the smoke test is
        let binary = self.binary_path();
        if !binary.exists() {
          return Err(ForgeError::message(format!(
            "Packaging reported success but no binary at {}",
            binary.display()
          )));
        }
        Ok(None)
      }

      Step::SmokeTest { binary, args } => {
        let mut cmd = Command::new(binary);
        cmd.current_dir(self.work_dir()).args(args);
        run_tool(binary, &mut cmd)?;
        Ok(None)
      }

      Step::UploadArtifact { binary, artifact } => {
        let store = ArtifactStore::open(&self.ctx.state_dir());
        let manifest = store.upload(artifact, self.platform, Path::new(binary))?;
        Ok(Some(manifest))
      }
    }
  }
}

/// Run an external tool, mapping a missing executable and a non-zero exit
/// to their tool errors
fn run_tool(tool: &str, cmd: &mut Command) -> ForgeResult<()> {
  let rendered = render_command(cmd);

  let output = cmd.output().map_err(|e| {
    if e.kind() == std::io::ErrorKind::NotFound {
      ForgeError::Tool(ToolError::NotFound { tool: tool.to_string() })
    } else {
      ForgeError::Io(e)
    }
  })?;

  if !output.status.success() {
    return Err(ForgeError::Tool(ToolError::CommandFailed {
      tool: tool.to_string(),
      command: rendered,
      stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }));
  }

  Ok(())
}

fn render_command(cmd: &Command) -> String {
  let mut parts = vec![cmd.get_program().to_string_lossy().to_string()];
  parts.extend(cmd.get_args().map(|a| a.to_string_lossy().to_string()));
  parts.join(" ")
}
