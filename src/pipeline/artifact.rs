//! Write-once artifact store shared between pipeline stages
//!
//! Each builder uploads exactly one named artifact; the publisher later
//! retrieves the union of all of them. Names are write-once: re-uploading
//! identical bytes is an idempotent no-op, differing bytes are rejected.
//! Every artifact carries a SHA-256 digest in a manifest so retrieval can
//! verify that the bytes on disk are the bytes that were uploaded.

use crate::core::error::{ArtifactError, ForgeError, ForgeResult, ResultExt};
use crate::platform::Platform;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest recorded alongside each uploaded artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
  /// Artifact name (the platform's artifact name, e.g. parti-archiver-linux)
  pub name: String,

  /// Platform whose builder produced this artifact
  pub platform: Platform,

  /// File name of the stored binary (the raw binary name)
  pub file_name: String,

  /// SHA-256 digest of the binary
  pub digest: String,

  /// Size in bytes
  pub size: u64,

  /// Upload timestamp
  pub uploaded_at: DateTime<Utc>,
}

/// A retrieved artifact: manifest plus the on-disk binary path
#[derive(Debug, Clone)]
pub struct StoredArtifact {
  pub manifest: ArtifactManifest,
  pub path: PathBuf,
}

/// Artifact store rooted at `.forge/artifacts`
pub struct ArtifactStore {
  root: PathBuf,
}

impl ArtifactStore {
  /// Open (or lazily create) the store under the given state directory
  pub fn open(state_dir: &Path) -> Self {
    Self {
      root: state_dir.join("artifacts"),
    }
  }

  /// Store root directory
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Upload a binary under the given artifact name
  ///
  /// Write-once semantics: an existing artifact with the same digest makes
  /// this a no-op; a different digest is a conflict.
  pub fn upload(&self, name: &str, platform: Platform, binary: &Path) -> ForgeResult<ArtifactManifest> {
    let digest = sha256_file(binary)?;
    let size = fs::metadata(binary)
      .with_context(|| format!("Failed to stat {}", binary.display()))?
      .len();

    if let Some(existing) = self.manifest(name)? {
      if existing.digest == digest {
        return Ok(existing);
      }
      return Err(ForgeError::Artifact(ArtifactError::DigestConflict {
        name: name.to_string(),
        existing: existing.digest,
        incoming: digest,
      }));
    }

    let file_name = binary
      .file_name()
      .and_then(|n| n.to_str())
      .ok_or_else(|| ForgeError::message(format!("Binary path has no file name: {}", binary.display())))?
      .to_string();

    let dir = self.root.join(name);
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create artifact directory {}", dir.display()))?;

    let dest = dir.join(&file_name);
    fs::copy(binary, &dest)
      .with_context(|| format!("Failed to copy {} into the artifact store", binary.display()))?;

    let manifest = ArtifactManifest {
      name: name.to_string(),
      platform,
      file_name,
      digest,
      size,
      uploaded_at: Utc::now(),
    };

    let manifest_json = serde_json::to_string_pretty(&manifest)?;
    fs::write(dir.join("manifest.json"), manifest_json)
      .with_context(|| format!("Failed to write manifest for artifact '{}'", name))?;

    Ok(manifest)
  }

  /// Whether an artifact with this name exists
  pub fn contains(&self, name: &str) -> bool {
    self.root.join(name).join("manifest.json").exists()
  }

  /// Read the manifest for a named artifact, if present
  pub fn manifest(&self, name: &str) -> ForgeResult<Option<ArtifactManifest>> {
    let path = self.root.join(name).join("manifest.json");
    if !path.exists() {
      return Ok(None);
    }
    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Some(serde_json::from_str(&content)?))
  }

  /// Retrieve a named artifact, verifying the binary against its digest
  pub fn fetch(&self, name: &str) -> ForgeResult<StoredArtifact> {
    let manifest = self
      .manifest(name)?
      .ok_or_else(|| ForgeError::Artifact(ArtifactError::Missing { name: name.to_string() }))?;

    let path = self.root.join(name).join(&manifest.file_name);
    if !path.exists() {
      return Err(ForgeError::Artifact(ArtifactError::Missing { name: name.to_string() }));
    }

    if sha256_file(&path)? != manifest.digest {
      return Err(ForgeError::Artifact(ArtifactError::Corrupted { name: name.to_string() }));
    }

    Ok(StoredArtifact { manifest, path })
  }

  /// List manifests for every artifact in the store, sorted by name
  pub fn list(&self) -> ForgeResult<Vec<ArtifactManifest>> {
    if !self.root.exists() {
      return Ok(Vec::new());
    }

    let mut manifests = Vec::new();
    for entry in fs::read_dir(&self.root).with_context(|| format!("Failed to read {}", self.root.display()))? {
      let entry = entry?;
      if !entry.path().is_dir() {
        continue;
      }
      let name = entry.file_name().to_string_lossy().to_string();
      if let Some(manifest) = self.manifest(&name)? {
        manifests.push(manifest);
      }
    }

    manifests.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(manifests)
  }

  /// Copy an artifact into a staging directory under its published asset name
  ///
  /// This is the publisher's renaming step: the linux and macos binaries are
  /// disambiguated to `<base>-<platform>`, the Windows binary keeps its
  /// `.exe` name. The copy is verified byte-identical by digest.
  pub fn stage(&self, name: &str, asset_name: &str, staging_dir: &Path) -> ForgeResult<PathBuf> {
    let artifact = self.fetch(name)?;

    fs::create_dir_all(staging_dir)
      .with_context(|| format!("Failed to create staging directory {}", staging_dir.display()))?;

    let dest = staging_dir.join(asset_name);
    fs::copy(&artifact.path, &dest)
      .with_context(|| format!("Failed to stage artifact '{}' as {}", name, asset_name))?;

    // The staged copy must be byte-identical to the uploaded artifact
    if sha256_file(&dest)? != artifact.manifest.digest {
      return Err(ForgeError::Artifact(ArtifactError::Corrupted { name: name.to_string() }));
    }

    Ok(dest)
  }
}

/// SHA-256 digest of a file's contents, lowercase hex
pub fn sha256_file(path: &Path) -> ForgeResult<String> {
  let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
  let mut hasher = Sha256::new();
  hasher.update(&bytes);
  Ok(format!("{:x}", hasher.finalize()))
}
