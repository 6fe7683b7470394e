//! Package metadata and layout.
//!
//! A directory becomes discoverable as an installed package by carrying a
//! `<name>.pkg-info/metadata.json` entry; the working set in [`crate::env`]
//! scans search-path entries for these.
//!
//! # Submodules
//!
//! - [`layout`] - The wrapped build and develop actions

pub mod layout;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{PKG_INFO_FILENAME, PKG_INFO_SUFFIX};
use crate::util::fs::{CopyError, write_atomic};

#[derive(Debug, Error)]
pub enum PackageError {
  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  #[error("failed to write {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("failed to serialize package metadata: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("package sources not found at {}", path.display())]
  SourcesMissing { path: PathBuf },

  #[error(transparent)]
  Copy(#[from] CopyError),
}

/// Logical identity of a package: name and exact version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageMetadata {
  pub name: String,
  pub version: String,
}

impl PackageMetadata {
  pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      version: version.into(),
    }
  }

  /// Directory name of this package's metadata entry, e.g. `fbprophet.pkg-info`
  pub fn info_dir_name(&self) -> String {
    format!("{}{}", self.name, PKG_INFO_SUFFIX)
  }

  /// Requirement string pinning this exact version, e.g. `fbprophet==0.1`
  pub fn requirement(&self) -> String {
    format!("{}=={}", self.name, self.version)
  }
}

impl fmt::Display for PackageMetadata {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.name, self.version)
  }
}

/// Write fresh metadata for `package` under `base`, replacing any previous
/// entry. Returns the path of the metadata file.
pub fn write_package_info(base: &Path, package: &PackageMetadata) -> Result<PathBuf, PackageError> {
  let info_dir = base.join(package.info_dir_name());
  fs::create_dir_all(&info_dir).map_err(|e| PackageError::CreateDir {
    path: info_dir.clone(),
    source: e,
  })?;

  let path = info_dir.join(PKG_INFO_FILENAME);
  let content = serde_json::to_vec_pretty(package).map_err(PackageError::Serialize)?;
  write_atomic(&path, &content).map_err(|e| PackageError::Write {
    path: path.clone(),
    source: e,
  })?;

  debug!(package = %package, path = %path.display(), "package metadata written");
  Ok(path)
}

/// Read the metadata file inside a `*.pkg-info` directory.
pub fn read_package_info(info_dir: &Path) -> Result<PackageMetadata, PackageError> {
  let path = info_dir.join(PKG_INFO_FILENAME);
  let content = fs::read_to_string(&path).map_err(|e| PackageError::Read {
    path: path.clone(),
    source: e,
  })?;
  serde_json::from_str(&content).map_err(|e| PackageError::Parse { path, source: e })
}
