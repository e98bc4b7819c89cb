use crate::core::error::{ConfigError, ForgeError, ForgeResult, ResultExt};
use crate::platform::{BINARY_BASE_NAME, Platform};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for parti-forge
/// Searched in order: forge.toml, .forge.toml, .config/forge.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgeConfig {
  #[serde(default)]
  pub pipeline: PipelineConfig,
  pub source: SourceConfig,
  #[serde(default)]
  pub package: PackageConfig,
  /// Platform targets to build (default: all three)
  #[serde(default = "default_platforms")]
  pub platforms: Vec<Platform>,
}

fn default_platforms() -> Vec<Platform> {
  Platform::ALL.to_vec()
}

/// Pipeline-level settings: publish gating and the post-build smoke test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
  /// Branch on which the publisher is allowed to run (default: "master")
  #[serde(default = "default_release_branch")]
  pub release_branch: String,

  /// Arguments for the post-build smoke test of the produced binary
  ///
  /// When set, each builder executes the packaged binary with these
  /// arguments after packaging and fails on non-zero exit. Unset disables
  /// the smoke test.
  #[serde(default)]
  pub smoke_args: Option<Vec<String>>,
}

fn default_release_branch() -> String {
  "master".to_string()
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      release_branch: default_release_branch(),
      smoke_args: None,
    }
  }
}

/// External source dependency settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
  /// Public clone URL of the downloader source tree
  pub repo: String,

  /// Revision pin for the clone
  ///
  /// Unset builds the default-branch tip, matching the original pipeline;
  /// `doctor` flags the missing pin as a reproducibility hazard.
  #[serde(default)]
  pub rev: Option<String>,

  /// Requirements file installed before packaging
  #[serde(default = "default_requirements")]
  pub requirements: String,

  /// Source-generation script run inside the dependency before packaging
  #[serde(default = "default_generate")]
  pub generate: String,
}

fn default_requirements() -> String {
  "requirements.txt".to_string()
}

fn default_generate() -> String {
  "devscripts/make_lazy_extractors.py".to_string()
}

/// Packaging tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
  /// Base name of the produced binary
  #[serde(default = "default_binary_name")]
  pub binary_name: String,

  /// Entry script bundled into the binary (relative to the workspace root,
  /// outside the dependency tree)
  #[serde(default = "default_entry_script")]
  pub entry_script: PathBuf,

  /// Hook directory inside the dependency tree
  #[serde(default = "default_hook_dir")]
  pub hook_dir: PathBuf,

  /// Extra module search paths, relative to the dependency checkout
  #[serde(default = "default_search_paths")]
  pub search_paths: Vec<String>,

  /// Modules the packaging tool must force-bundle because they are not
  /// statically discoverable from the entry script's import graph
  #[serde(default = "default_hidden_imports")]
  pub hidden_imports: Vec<String>,
}

fn default_binary_name() -> String {
  BINARY_BASE_NAME.to_string()
}

fn default_entry_script() -> PathBuf {
  PathBuf::from("archiver.py")
}

fn default_hook_dir() -> PathBuf {
  PathBuf::from("yt_dlp/__pyinstaller")
}

fn default_search_paths() -> Vec<String> {
  vec!["..".to_string()]
}

fn default_hidden_imports() -> Vec<String> {
  // The downloader's compat/utils shims are imported lazily at runtime and
  // invisible to static analysis of the entry script.
  vec![
    "yt_dlp.compat._legacy".to_string(),
    "yt_dlp.compat._deprecated".to_string(),
    "yt_dlp.utils._legacy".to_string(),
    "yt_dlp.utils._deprecated".to_string(),
  ]
}

impl Default for PackageConfig {
  fn default() -> Self {
    Self {
      binary_name: default_binary_name(),
      entry_script: default_entry_script(),
      hook_dir: default_hook_dir(),
      search_paths: default_search_paths(),
      hidden_imports: default_hidden_imports(),
    }
  }
}

impl ForgeConfig {
  /// Find config file in search order: forge.toml, .forge.toml, .config/forge.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("forge.toml"),
      path.join(".forge.toml"),
      path.join(".config").join("forge.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from forge.toml (searches multiple locations)
  pub fn load(path: &Path) -> ForgeResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      ForgeError::Config(ConfigError::NotFound {
        workspace_root: path.to_path_buf(),
      })
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ForgeConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config
      .validate()
      .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    Ok(config)
  }

  /// Save config to forge.toml (default location)
  pub fn save(&self, path: &Path) -> ForgeResult<()> {
    let config_path = path.join("forge.toml");
    let content = toml_edit::ser::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(&config_path, content).with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(())
  }

  /// Check if config exists at the given path
  pub fn exists(path: &Path) -> bool {
    Self::find_config_path(path).is_some()
  }

  /// Create a config with the defaults the original pipeline used
  pub fn starter(repo: impl Into<String>) -> Self {
    Self {
      pipeline: PipelineConfig::default(),
      source: SourceConfig {
        repo: repo.into(),
        rev: None,
        requirements: default_requirements(),
        generate: default_generate(),
      },
      package: PackageConfig::default(),
      platforms: default_platforms(),
    }
  }

  /// Validate the configuration
  pub fn validate(&self) -> ForgeResult<()> {
    if self.source.repo.is_empty() {
      return Err(ForgeError::Config(ConfigError::MissingField {
        field: "source.repo".to_string(),
      }));
    }

    if self.platforms.is_empty() {
      return Err(ForgeError::with_help(
        "No platform targets configured",
        "List at least one of linux, windows, macos under `platforms` in forge.toml",
      ));
    }

    let mut seen = Vec::new();
    for platform in &self.platforms {
      if seen.contains(platform) {
        return Err(ForgeError::message(format!(
          "Platform '{}' listed more than once in forge.toml",
          platform
        )));
      }
      seen.push(*platform);
    }

    if self.package.binary_name.is_empty() {
      return Err(ForgeError::Config(ConfigError::MissingField {
        field: "package.binary_name".to_string(),
      }));
    }

    // The entry script lives in this repository, never inside the clone
    if self.package.entry_script.is_absolute() {
      return Err(ForgeError::with_help(
        format!(
          "Entry script must be a workspace-relative path: {}",
          self.package.entry_script.display()
        ),
        "Point package.entry_script at a script in this repository, e.g. \"archiver.py\"",
      ));
    }

    // Builders clear their work directories under .forge between runs, so an
    // entry script in there would be deleted mid-build
    if self.package.entry_script.starts_with(".forge") {
      return Err(ForgeError::with_help(
        format!(
          "Entry script must not live under the pipeline state directory: {}",
          self.package.entry_script.display()
        ),
        "Keep package.entry_script outside .forge; that directory is cleared and rewritten by builders.",
      ));
    }

    Ok(())
  }

  /// Whether the source clone is pinned to an explicit revision
  pub fn is_pinned(&self) -> bool {
    self.source.rev.is_some()
  }
}
