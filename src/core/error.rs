//! Error types for parti-forge with contextual messages and exit codes
//!
//! This module provides a unified error type that categorizes errors and provides
//! contextual help messages to users. Every error includes a helpful suggestion
//! to guide users toward resolution.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for parti-forge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (git, subprocess, network, I/O)
  System = 2,
  /// Validation failure (barrier violations, digest mismatches)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for parti-forge
#[derive(Debug)]
pub enum ForgeError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// External build tool errors (pip, pyinstaller, gh)
  Tool(ToolError),

  /// Artifact store errors
  Artifact(ArtifactError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ForgeError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ForgeError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ForgeError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ForgeError::Message { message, context, help } => ForgeError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ForgeError::Config(_) => ExitCode::User,
      ForgeError::Git(_) => ExitCode::System,
      ForgeError::Tool(_) => ExitCode::System,
      ForgeError::Artifact(_) => ExitCode::Validation,
      ForgeError::Io(_) => ExitCode::System,
      ForgeError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ForgeError::Config(e) => e.help_message(),
      ForgeError::Git(e) => e.help_message(),
      ForgeError::Tool(e) => e.help_message(),
      ForgeError::Artifact(e) => e.help_message(),
      ForgeError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ForgeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ForgeError::Config(e) => write!(f, "{}", e),
      ForgeError::Git(e) => write!(f, "{}", e),
      ForgeError::Tool(e) => write!(f, "{}", e),
      ForgeError::Artifact(e) => write!(f, "{}", e),
      ForgeError::Io(e) => write!(f, "I/O error: {}", e),
      ForgeError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ForgeError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ForgeError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ForgeError {
  fn from(err: io::Error) -> Self {
    ForgeError::Io(err)
  }
}

impl From<String> for ForgeError {
  fn from(msg: String) -> Self {
    ForgeError::message(msg)
  }
}

impl From<&str> for ForgeError {
  fn from(msg: &str) -> Self {
    ForgeError::message(msg)
  }
}

impl From<toml_edit::TomlError> for ForgeError {
  fn from(err: toml_edit::TomlError) -> Self {
    ForgeError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for ForgeError {
  fn from(err: toml_edit::de::Error) -> Self {
    ForgeError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for ForgeError {
  fn from(err: toml_edit::ser::Error) -> Self {
    ForgeError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for ForgeError {
  fn from(err: serde_json::Error) -> Self {
    ForgeError::message(format!("JSON error: {}", err))
  }
}

impl From<std::str::Utf8Error> for ForgeError {
  fn from(err: std::str::Utf8Error) -> Self {
    ForgeError::message(format!("UTF-8 error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ForgeError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ForgeError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<std::path::StripPrefixError> for ForgeError {
  fn from(err: std::path::StripPrefixError) -> Self {
    ForgeError::message(format!("Path strip prefix error: {}", err))
  }
}

impl From<std::env::VarError> for ForgeError {
  fn from(err: std::env::VarError) -> Self {
    ForgeError::message(format!("Environment variable error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// forge.toml not found
  NotFound { workspace_root: PathBuf },

  /// Missing required field
  MissingField { field: String },

  /// Unknown platform identifier
  UnknownPlatform { id: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some("Run `parti-forge init` to create a configuration file.".to_string()),
      ConfigError::UnknownPlatform { id } => Some(format!(
        "'{}' is not a known platform. Valid identifiers: linux, windows, macos.",
        id
      )),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { workspace_root } => {
        write!(
          f,
          "No parti-forge configuration found.\nExpected file: {}/forge.toml",
          workspace_root.display()
        )
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::UnknownPlatform { id } => {
        write!(f, "Unknown platform identifier: '{}'", id)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Clone of the external source dependency failed
  CloneFailed { url: String, reason: String },

  /// Requested revision not found in the clone
  RevNotFound { rev: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      GitError::CloneFailed { url, .. } => {
        Some(format!("Check network connectivity and that {} is reachable.", url))
      }
      GitError::RevNotFound { .. } => {
        Some("Check the `rev` pin in forge.toml [source], or remove it to build the default-branch tip.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::CloneFailed { url, reason } => {
        write!(f, "Clone of {} failed: {}", url, reason)
      }
      GitError::RevNotFound { rev } => {
        write!(f, "Revision not found: {}", rev)
      }
    }
  }
}

/// External tool errors (pip, pyinstaller, gh)
#[derive(Debug)]
pub enum ToolError {
  /// Tool binary not found on PATH
  NotFound { tool: String },

  /// Tool invocation exited non-zero
  CommandFailed {
    tool: String,
    command: String,
    stderr: String,
  },

  /// Release creation rejected by the host
  ReleaseFailed { tag: String, stderr: String },
}

impl ToolError {
  fn help_message(&self) -> Option<String> {
    match self {
      ToolError::NotFound { tool } => Some(format!(
        "Install '{}' and make sure it is on PATH. Run `parti-forge doctor` to check all tools.",
        tool
      )),
      ToolError::ReleaseFailed { tag, stderr } => {
        if stderr.contains("already exists") {
          Some(format!(
            "A release tagged '{}' already exists. Duplicate-tag policy belongs to the release host; delete the existing release to re-publish this commit.",
            tag
          ))
        } else if stderr.contains("auth") || stderr.contains("401") || stderr.contains("403") {
          Some("Check `gh auth status`; release creation needs write access to repository contents.".to_string())
        } else {
          None
        }
      }
      _ => None,
    }
  }
}

impl fmt::Display for ToolError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ToolError::NotFound { tool } => {
        write!(f, "Required tool not found: {}", tool)
      }
      ToolError::CommandFailed { tool, command, stderr } => {
        write!(f, "{} failed: {}\n{}", tool, command, stderr)
      }
      ToolError::ReleaseFailed { tag, stderr } => {
        write!(f, "Release creation for tag '{}' failed:\n{}", tag, stderr)
      }
    }
  }
}

/// Artifact store errors
#[derive(Debug)]
pub enum ArtifactError {
  /// Expected artifact is missing from the store
  Missing { name: String },

  /// Write-once violation: name exists with a different digest
  DigestConflict {
    name: String,
    existing: String,
    incoming: String,
  },

  /// On-disk bytes no longer match the recorded digest
  Corrupted { name: String },
}

impl ArtifactError {
  fn help_message(&self) -> Option<String> {
    match self {
      ArtifactError::Missing { name } => Some(format!(
        "Run `parti-forge build` for the platform that produces '{}', or copy the artifact from the runner that built it.",
        name
      )),
      ArtifactError::DigestConflict { name, .. } => Some(format!(
        "Artifact names are write-once per run. Remove .forge/artifacts/{} to rebuild from scratch.",
        name
      )),
      ArtifactError::Corrupted { .. } => {
        Some("Delete the artifact directory and rebuild; the binary on disk was modified after upload.".to_string())
      }
    }
  }
}

impl fmt::Display for ArtifactError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ArtifactError::Missing { name } => {
        write!(f, "Artifact '{}' not found in store", name)
      }
      ArtifactError::DigestConflict { name, existing, incoming } => {
        write!(
          f,
          "Artifact '{}' already uploaded with a different digest\n  existing: {}\n  incoming: {}",
          name, existing, incoming
        )
      }
      ArtifactError::Corrupted { name } => {
        write!(f, "Artifact '{}' failed digest verification", name)
      }
    }
  }
}

/// Result type alias for parti-forge
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ForgeResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ForgeResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ForgeError>,
{
  fn context(self, ctx: impl Into<String>) -> ForgeResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ForgeResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with colors and help text
pub fn print_error(error: &ForgeError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

/// Convert anyhow::Error to ForgeError (for transition period)
impl From<anyhow::Error> for ForgeError {
  fn from(err: anyhow::Error) -> Self {
    ForgeError::message(err.to_string())
  }
}
