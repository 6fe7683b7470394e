//! Artifact serialization.
//!
//! Each compiled model is wrapped in a versioned JSON envelope:
//!
//! ```text
//! {
//!   "format_version": 1,
//!   "kind": "linear",
//!   "platform": "unix",
//!   "compiler": "stanc",
//!   "source_sha256": "…",
//!   "model": { … }
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ArtifactError;
use crate::consts::ARTIFACT_FORMAT_VERSION;
use crate::model::ModelKind;
use crate::platform::PlatformVariant;
use crate::util::fs::write_atomic;
use crate::util::hash::ContentHash;

/// A compiled model as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact<M> {
  pub format_version: u32,
  pub kind: ModelKind,
  pub platform: PlatformVariant,
  pub compiler: String,
  pub source_sha256: ContentHash,
  pub model: M,
}

#[derive(Debug, Error)]
pub enum LoadError {
  #[error("failed to read artifact {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse artifact {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("unsupported artifact format version {found} in {}", path.display())]
  UnsupportedVersion { path: PathBuf, found: u32 },

  #[error("artifact {} has a malformed source digest", path.display())]
  InvalidDigest { path: PathBuf },

  #[error("artifact {} holds a {found} model, expected {expected}", path.display())]
  KindMismatch {
    path: PathBuf,
    expected: ModelKind,
    found: ModelKind,
  },
}

pub(crate) fn write_artifact<M: Serialize>(path: &Path, artifact: &Artifact<M>) -> Result<(), ArtifactError> {
  let content = serde_json::to_vec_pretty(artifact).map_err(|e| ArtifactError::Serialize {
    kind: artifact.kind,
    source: e,
  })?;
  write_atomic(path, &content).map_err(|e| ArtifactError::Write {
    path: path.to_path_buf(),
    source: e,
  })
}

/// Load an artifact written by the builder.
pub fn load_artifact<M: DeserializeOwned>(path: &Path) -> Result<Artifact<M>, LoadError> {
  let content = fs::read(path).map_err(|e| LoadError::Read {
    path: path.to_path_buf(),
    source: e,
  })?;

  // Check the version before committing to the model's shape.
  #[derive(Deserialize)]
  struct Header {
    format_version: u32,
  }
  let header: Header = serde_json::from_slice(&content).map_err(|e| LoadError::Parse {
    path: path.to_path_buf(),
    source: e,
  })?;
  if header.format_version != ARTIFACT_FORMAT_VERSION {
    return Err(LoadError::UnsupportedVersion {
      path: path.to_path_buf(),
      found: header.format_version,
    });
  }

  let artifact: Artifact<M> = serde_json::from_slice(&content).map_err(|e| LoadError::Parse {
    path: path.to_path_buf(),
    source: e,
  })?;
  if !artifact.source_sha256.is_well_formed() {
    return Err(LoadError::InvalidDigest { path: path.to_path_buf() });
  }
  Ok(artifact)
}

/// Load the artifact for `kind` from a target directory, checking that the
/// file really holds that kind.
pub fn load_kind<M: DeserializeOwned>(target_dir: &Path, kind: ModelKind) -> Result<Artifact<M>, LoadError> {
  let path = target_dir.join(kind.artifact_file_name());
  let artifact: Artifact<M> = load_artifact(&path)?;
  if artifact.kind != kind {
    return Err(LoadError::KindMismatch {
      path,
      expected: kind,
      found: artifact.kind,
    });
  }
  Ok(artifact)
}
