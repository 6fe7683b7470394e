//! Process environment for package resolution.
//!
//! The environment holds the state that decides which package code resolves
//! to: the ordered search path, the registry of already-loaded modules, and
//! the working set of installed packages derived from the search path. It is
//! passed explicitly to whoever needs it; there is no global instance.
//!
//! Temporary changes go through [`ProcessEnvironment::scoped`], which
//! snapshots the state up front and restores it when the scope ends, however
//! it ends.
//!
//! # Submodules
//!
//! - [`scope`] - Guard restoring a snapshot on drop
//! - [`working_set`] - Installed-package tracking

pub mod scope;
pub mod working_set;

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::package::PackageMetadata;

pub use scope::EnvironmentScope;
pub use working_set::{ActivationError, Distribution, WorkingSet};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
  #[error("module {name} not found on the search path")]
  NotFound { name: String },
}

/// A module resolved through the search path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
  pub name: String,
  /// Directory the module was loaded from.
  pub origin: PathBuf,
}

/// Search path and module registry captured at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
  pub search_path: Vec<PathBuf>,
  pub modules: BTreeMap<String, LoadedModule>,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessEnvironment {
  search_path: Vec<PathBuf>,
  modules: BTreeMap<String, LoadedModule>,
  working_set: WorkingSet,
}

impl ProcessEnvironment {
  pub fn new(search_path: Vec<PathBuf>) -> Self {
    let working_set = WorkingSet::scan(&search_path);
    Self {
      search_path,
      modules: BTreeMap::new(),
      working_set,
    }
  }

  /// Seed the search path from a path-list environment variable.
  ///
  /// An unset variable yields an empty search path.
  pub fn from_env_var(var: &str) -> Self {
    let search_path: Vec<PathBuf> = std::env::var_os(var)
      .map(|value| std::env::split_paths(&value).filter(|p| !p.as_os_str().is_empty()).collect())
      .unwrap_or_default();
    Self::new(search_path)
  }

  pub fn search_path(&self) -> &[PathBuf] {
    &self.search_path
  }

  pub fn modules(&self) -> &BTreeMap<String, LoadedModule> {
    &self.modules
  }

  pub fn working_set(&self) -> &WorkingSet {
    &self.working_set
  }

  /// The search path as a platform path list, suitable for exporting to a
  /// child process.
  pub fn joined_search_path(&self) -> Result<OsString, std::env::JoinPathsError> {
    std::env::join_paths(&self.search_path)
  }

  pub fn prepend_search_path(&mut self, path: PathBuf) {
    self.search_path.insert(0, path);
  }

  /// Rescan the working set from the current search path.
  pub fn refresh_working_set(&mut self) {
    self.working_set = WorkingSet::scan(&self.search_path);
    debug!(
      packages = self.working_set.distributions().len(),
      "working set refreshed"
    );
  }

  /// Require the exact `package` and activate it.
  ///
  /// Activation makes sure the distribution's location is on the search path.
  pub fn require(&mut self, package: &PackageMetadata) -> Result<Distribution, ActivationError> {
    let dist = self.working_set.require(package)?.clone();
    if !self.search_path.contains(&dist.location) {
      self.search_path.push(dist.location.clone());
    }
    debug!(package = %dist.metadata, location = %dist.location.display(), "package activated");
    Ok(dist)
  }

  /// Resolve module `name`, loading it from the first search path entry that
  /// has a `name` directory. Loaded modules are cached in the registry.
  pub fn import(&mut self, name: &str) -> Result<&LoadedModule, ImportError> {
    if !self.modules.contains_key(name) {
      let origin = self
        .search_path
        .iter()
        .map(|entry| entry.join(name))
        .find(|candidate| candidate.is_dir())
        .ok_or_else(|| ImportError::NotFound { name: name.to_string() })?;

      debug!(module = name, origin = %origin.display(), "module loaded");
      self.modules.insert(
        name.to_string(),
        LoadedModule {
          name: name.to_string(),
          origin,
        },
      );
    }

    self
      .modules
      .get(name)
      .ok_or_else(|| ImportError::NotFound { name: name.to_string() })
  }

  /// Drop `package` and its submodules from the registry so the next import
  /// resolves them through the current search path. Returns how many were
  /// evicted.
  pub fn evict_package(&mut self, package: &str) -> usize {
    let prefix = format!("{package}.");
    let before = self.modules.len();
    self
      .modules
      .retain(|name, _| name != package && !name.starts_with(&prefix));
    let evicted = before - self.modules.len();
    if evicted > 0 {
      debug!(package, evicted, "loaded modules evicted");
    }
    evicted
  }

  /// Register an already-loaded module.
  pub fn insert_module(&mut self, module: LoadedModule) {
    self.modules.insert(module.name.clone(), module);
  }

  pub fn snapshot(&self) -> EnvironmentSnapshot {
    EnvironmentSnapshot {
      search_path: self.search_path.clone(),
      modules: self.modules.clone(),
    }
  }

  /// Put the environment back into the snapshot's state.
  ///
  /// The registry is cleared and refilled rather than replaced, and the
  /// working set is rescanned for the restored search path.
  pub fn restore(&mut self, snapshot: EnvironmentSnapshot) {
    self.search_path = snapshot.search_path;
    self.modules.clear();
    self.modules.extend(snapshot.modules);
    self.refresh_working_set();
  }

  /// Snapshot the environment and return a guard that restores it on drop.
  pub fn scoped(&mut self) -> EnvironmentScope<'_> {
    EnvironmentScope::new(self)
  }
}
