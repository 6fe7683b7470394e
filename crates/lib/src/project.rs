//! Project configuration and derived paths.
//!
//! A project is a directory with a `prophet-build.toml`:
//!
//! ```toml
//! [package]
//! name = "fbprophet"
//! version = "0.1.post1"
//!
//! [layout]
//! models_dir = "stan"
//! artifacts_subdir = "stan_models"
//!
//! [compiler]
//! program = "stanc"
//! ```
//!
//! Everything except `[package]` has defaults. `PROPHET_BUILD_LIB` overrides
//! the staging root and `PROPHET_BUILD_COMPILER` the compiler program.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::compiler::CommandCompiler;
use crate::consts::{
  BUILD_LIB_ENV, COMPILER_ENV, CONFIG_FILENAME, DEFAULT_ARTIFACTS_SUBDIR, DEFAULT_BUILD_LIB, DEFAULT_COMPILER,
  DEFAULT_MODELS_DIR, DEFAULT_PATH_VAR,
};
use crate::package::PackageMetadata;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config file not found: {}", path.display())]
  NotFound { path: PathBuf },

  #[error("failed to read config {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse config {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },

  #[error("invalid config {}: {message}", path.display())]
  Invalid { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
  pub package: PackageMetadata,
  #[serde(default)]
  pub layout: LayoutConfig,
  #[serde(default)]
  pub compiler: CompilerConfig,
  #[serde(default)]
  pub test: TestConfig,
}

/// Directory layout, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
  /// Root of the per-platform model source directories.
  pub models_dir: PathBuf,
  /// Package sources; defaults to the package name.
  pub package_dir: Option<PathBuf>,
  /// Artifact directory inside the package.
  pub artifacts_subdir: PathBuf,
  /// Staging root for the build lifecycle.
  pub build_lib: PathBuf,
}

impl Default for LayoutConfig {
  fn default() -> Self {
    Self {
      models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
      package_dir: None,
      artifacts_subdir: PathBuf::from(DEFAULT_ARTIFACTS_SUBDIR),
      build_lib: PathBuf::from(DEFAULT_BUILD_LIB),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
  pub program: String,
  pub args: Vec<String>,
}

impl Default for CompilerConfig {
  fn default() -> Self {
    Self {
      program: DEFAULT_COMPILER.to_string(),
      args: Vec::new(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestConfig {
  /// Environment variable carrying the search path to test commands.
  pub path_var: String,
}

impl Default for TestConfig {
  fn default() -> Self {
    Self {
      path_var: DEFAULT_PATH_VAR.to_string(),
    }
  }
}

impl ProjectConfig {
  pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
    let config: ProjectConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      source: e,
    })?;
    config.validate(path)?;
    Ok(config)
  }

  fn validate(&self, path: &Path) -> Result<(), ConfigError> {
    let invalid = |message: &str| ConfigError::Invalid {
      path: path.to_path_buf(),
      message: message.to_string(),
    };

    if self.package.name.trim().is_empty() {
      return Err(invalid("package.name must not be empty"));
    }
    if self.package.version.trim().is_empty() {
      return Err(invalid("package.version must not be empty"));
    }
    if self.compiler.program.trim().is_empty() {
      return Err(invalid("compiler.program must not be empty"));
    }
    if self.layout.artifacts_subdir.is_absolute() {
      return Err(invalid("layout.artifacts_subdir must be relative"));
    }
    Ok(())
  }
}

/// A loaded project: its root directory and configuration.
#[derive(Debug, Clone)]
pub struct Project {
  root: PathBuf,
  config: ProjectConfig,
}

impl Project {
  pub fn new(root: PathBuf, config: ProjectConfig) -> Self {
    Self { root, config }
  }

  /// Load `prophet-build.toml` from `root`.
  pub fn load(root: &Path) -> Result<Self, ConfigError> {
    let root = dunce::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let path = root.join(CONFIG_FILENAME);

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ConfigError::NotFound { path }),
      Err(e) => return Err(ConfigError::Read { path, source: e }),
    };

    let config = ProjectConfig::parse(&content, &path)?;
    debug!(root = %root.display(), package = %config.package, "project loaded");
    Ok(Self::new(root, config))
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn config(&self) -> &ProjectConfig {
    &self.config
  }

  pub fn package(&self) -> &PackageMetadata {
    &self.config.package
  }

  /// Root of the per-platform model source directories.
  pub fn models_root(&self) -> PathBuf {
    self.root.join(&self.config.layout.models_dir)
  }

  /// Package sources inside the project.
  pub fn package_src(&self) -> PathBuf {
    match &self.config.layout.package_dir {
      Some(dir) => self.root.join(dir),
      None => self.root.join(&self.config.package.name),
    }
  }

  pub fn artifacts_subdir(&self) -> &Path {
    &self.config.layout.artifacts_subdir
  }

  /// Staging root for built packages. `PROPHET_BUILD_LIB` takes precedence.
  pub fn build_lib(&self) -> PathBuf {
    match std::env::var_os(BUILD_LIB_ENV) {
      Some(dir) if !dir.is_empty() => self.root.join(dir),
      _ => self.root.join(&self.config.layout.build_lib),
    }
  }

  /// The staged copy of the package inside `build_lib`.
  pub fn staged_package(&self) -> PathBuf {
    self.build_lib().join(&self.config.package.name)
  }

  /// Artifact directory inside the package rooted at `package_root`.
  pub fn artifact_dir(&self, package_root: &Path) -> PathBuf {
    package_root.join(self.artifacts_subdir())
  }

  /// Compiler from config; `PROPHET_BUILD_COMPILER` replaces the program.
  pub fn compiler(&self) -> CommandCompiler {
    let program = std::env::var(COMPILER_ENV)
      .ok()
      .filter(|p| !p.trim().is_empty())
      .unwrap_or_else(|| self.config.compiler.program.clone());
    CommandCompiler::new(program, self.config.compiler.args.clone())
  }
}
