//! Platform targets for the build pipeline
//!
//! The target set is fixed: one builder per operating system, each producing
//! a single self-contained binary. Command invocation differs between Windows
//! and the Unix-like targets (interpreter and installer executable names);
//! functional behavior is identical across all three.

use crate::core::error::{ConfigError, ForgeError, ForgeResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base name of the packaged binary (before platform qualification)
pub const BINARY_BASE_NAME: &str = "parti-archiver";

/// One of the three platform targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  Linux,
  Windows,
  Macos,
}

impl Platform {
  /// All platform targets, in publication order
  pub const ALL: [Platform; 3] = [Platform::Linux, Platform::Windows, Platform::Macos];

  /// Stable identifier used in config, artifact names, and output
  pub fn id(self) -> &'static str {
    match self {
      Platform::Linux => "linux",
      Platform::Windows => "windows",
      Platform::Macos => "macos",
    }
  }

  /// Parse a platform identifier from config or CLI input
  pub fn parse(id: &str) -> ForgeResult<Self> {
    match id {
      "linux" => Ok(Platform::Linux),
      "windows" => Ok(Platform::Windows),
      "macos" => Ok(Platform::Macos),
      other => Err(ForgeError::Config(ConfigError::UnknownPlatform { id: other.to_string() })),
    }
  }

  /// Name of the binary as the packaging tool emits it
  pub fn raw_binary_name(self, base: &str) -> String {
    match self {
      Platform::Windows => format!("{}.exe", base),
      _ => base.to_string(),
    }
  }

  /// Name of the artifact as uploaded between pipeline stages
  pub fn artifact_name(self, base: &str) -> String {
    format!("{}-{}", base, self.id())
  }

  /// Name of the asset as attached to the published release
  ///
  /// The Windows binary already carries a unique extension, so it is
  /// published under its raw name. Linux and macOS binaries collide on the
  /// raw name and are platform-qualified at publish time.
  pub fn asset_name(self, base: &str) -> String {
    match self {
      Platform::Windows => self.raw_binary_name(base),
      _ => self.artifact_name(base),
    }
  }

  /// Interpreter executable name for this platform
  pub fn interpreter(self) -> &'static str {
    match self {
      Platform::Windows => "python",
      _ => "python3",
    }
  }

  /// Dependency installer executable name for this platform
  pub fn installer(self) -> &'static str {
    match self {
      Platform::Windows => "pip",
      _ => "pip3",
    }
  }

  /// The platform target matching the host OS
  pub fn host() -> Platform {
    if cfg!(target_os = "windows") {
      Platform::Windows
    } else if cfg!(target_os = "macos") {
      Platform::Macos
    } else {
      Platform::Linux
    }
  }

  /// Whether a builder for this target can run on the current host
  pub fn buildable_on_host(self) -> bool {
    self == Platform::host()
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.id())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_roundtrip() {
    for platform in Platform::ALL {
      assert_eq!(Platform::parse(platform.id()).unwrap(), platform);
    }
    assert!(Platform::parse("freebsd").is_err());
  }

  #[test]
  fn test_raw_binary_names() {
    assert_eq!(Platform::Linux.raw_binary_name("parti-archiver"), "parti-archiver");
    assert_eq!(Platform::Macos.raw_binary_name("parti-archiver"), "parti-archiver");
    assert_eq!(Platform::Windows.raw_binary_name("parti-archiver"), "parti-archiver.exe");
  }

  #[test]
  fn test_artifact_names_are_platform_qualified() {
    assert_eq!(Platform::Linux.artifact_name("parti-archiver"), "parti-archiver-linux");
    assert_eq!(Platform::Windows.artifact_name("parti-archiver"), "parti-archiver-windows");
    assert_eq!(Platform::Macos.artifact_name("parti-archiver"), "parti-archiver-macos");
  }

  #[test]
  fn test_asset_names() {
    // Unix binaries get qualified; the .exe extension already disambiguates
    assert_eq!(Platform::Linux.asset_name("parti-archiver"), "parti-archiver-linux");
    assert_eq!(Platform::Macos.asset_name("parti-archiver"), "parti-archiver-macos");
    assert_eq!(Platform::Windows.asset_name("parti-archiver"), "parti-archiver.exe");
  }

  #[test]
  fn test_command_variance() {
    assert_eq!(Platform::Windows.interpreter(), "python");
    assert_eq!(Platform::Windows.installer(), "pip");
    assert_eq!(Platform::Linux.interpreter(), "python3");
    assert_eq!(Platform::Macos.installer(), "pip3");
  }

  #[test]
  fn test_host_is_in_target_set() {
    assert!(Platform::ALL.contains(&Platform::host()));
  }
}
