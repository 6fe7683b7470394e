//! Installed-package tracking.
//!
//! The working set is derived entirely from the search path: each entry is
//! scanned for `*.pkg-info` metadata directories, and the first entry that
//! provides a package name wins. It never changes on its own; callers rescan
//! after touching the search path.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::PKG_INFO_SUFFIX;
use crate::package::{PackageMetadata, read_package_info};

/// The built package could not be made resolvable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActivationError {
  #[error("package {requirement} not found on the search path")]
  NotFound { requirement: String },

  #[error("package {requirement} required but {found} is active")]
  VersionConflict { requirement: String, found: String },
}

/// A package discovered on the search path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
  pub metadata: PackageMetadata,
  /// Search-path entry the package was found in.
  pub location: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingSet {
  distributions: Vec<Distribution>,
}

impl WorkingSet {
  /// Build the working set for a search path.
  pub fn scan(search_path: &[PathBuf]) -> Self {
    let mut distributions: Vec<Distribution> = Vec::new();

    for entry in search_path {
      for metadata in scan_entry(entry) {
        if distributions.iter().any(|d| d.metadata.name == metadata.name) {
          debug!(package = %metadata, location = %entry.display(), "shadowed by earlier search path entry");
          continue;
        }
        distributions.push(Distribution {
          metadata,
          location: entry.clone(),
        });
      }
    }

    Self { distributions }
  }

  pub fn distributions(&self) -> &[Distribution] {
    &self.distributions
  }

  pub fn find(&self, name: &str) -> Option<&Distribution> {
    self.distributions.iter().find(|d| d.metadata.name == name)
  }

  /// Resolve the exact `package` (name and version).
  pub fn require(&self, package: &PackageMetadata) -> Result<&Distribution, ActivationError> {
    let dist = self.find(&package.name).ok_or_else(|| ActivationError::NotFound {
      requirement: package.requirement(),
    })?;

    if dist.metadata.version != package.version {
      return Err(ActivationError::VersionConflict {
        requirement: package.requirement(),
        found: dist.metadata.requirement(),
      });
    }

    Ok(dist)
  }
}

/// Package metadata found directly inside one search-path entry, sorted by
/// directory name.
fn scan_entry(entry: &Path) -> Vec<PackageMetadata> {
  let Ok(read_dir) = fs::read_dir(entry) else {
    return Vec::new();
  };

  let mut info_dirs: Vec<PathBuf> = read_dir
    .flatten()
    .map(|e| e.path())
    .filter(|p| p.is_dir())
    .filter(|p| {
      p.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(PKG_INFO_SUFFIX))
    })
    .collect();
  info_dirs.sort();

  info_dirs
    .iter()
    .filter_map(|dir| match read_package_info(dir) {
      Ok(metadata) => Some(metadata),
      Err(e) => {
        warn!(path = %dir.display(), error = %e, "ignoring unreadable package metadata");
        None
      }
    })
    .collect()
}
