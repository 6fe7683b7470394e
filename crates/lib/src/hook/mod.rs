//! Packaging lifecycle hooks.
//!
//! Every hook is the same composition: a pre-step that compiles the model
//! artifacts into a hook-specific target directory, then the wrapped
//! lifecycle action. Hooks differ only in their [`TargetStrategy`] and in the
//! action they wrap.
//!
//! - `build` compiles into the staging tree, then stages the package sources
//! - `develop` compiles in place, then installs in development mode
//! - `test` runs `build`, then executes tests in an isolated environment
//!
//! A dry run skips the pre-step entirely; the wrapped action still runs and
//! is told about the dry run.
//!
//! # Submodules
//!
//! - [`lifecycle`] - The registered `build` and `develop` hooks
//! - [`test`] - The `test` hook and its isolation protocol

pub mod lifecycle;

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::artifact::{ArtifactBuilder, ArtifactError, BuildReport};
use crate::compiler::ModelCompiler;
use crate::env::ActivationError;
use crate::package::PackageError;
use crate::project::Project;

pub use lifecycle::{build, develop};
pub use test::run_tests;

#[derive(Debug, Error)]
pub enum HookError {
  #[error("failed to create target directory {}: {source}", path.display())]
  DirectoryCreation { path: PathBuf, source: io::Error },

  #[error(transparent)]
  Artifact(#[from] ArtifactError),

  #[error(transparent)]
  Package(#[from] PackageError),

  #[error("package activation failed: {0}")]
  Activation(#[from] ActivationError),
}

/// The lifecycle hooks registered with the packaging driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
  Build,
  Develop,
  Test,
}

impl HookKind {
  pub const ALL: [HookKind; 3] = [HookKind::Build, HookKind::Develop, HookKind::Test];

  pub fn name(&self) -> &'static str {
    match self {
      Self::Build => "build",
      Self::Develop => "develop",
      Self::Test => "test",
    }
  }

  /// Where this hook writes artifacts.
  pub fn strategy(&self) -> TargetStrategy {
    match self {
      Self::Build | Self::Test => TargetStrategy::BuildStaging,
      Self::Develop => TargetStrategy::InPlace,
    }
  }
}

impl fmt::Display for HookKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

/// How a hook picks its target directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStrategy {
  /// The staged package under the build root.
  BuildStaging,
  /// The package sources in the project itself.
  InPlace,
}

impl TargetStrategy {
  pub fn package_root(&self, project: &Project) -> PathBuf {
    match self {
      Self::BuildStaging => project.staged_package(),
      Self::InPlace => project.package_src(),
    }
  }

  pub fn target_dir(&self, project: &Project) -> PathBuf {
    project.artifact_dir(&self.package_root(project))
  }
}

/// Invocation flags passed by the packaging driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookContext {
  pub dry_run: bool,
}

impl HookContext {
  pub fn dry_run() -> Self {
    Self { dry_run: true }
  }
}

/// Outcome of a hook: the artifacts built by the pre-step (none on a dry run)
/// and the wrapped action's own result.
#[derive(Debug)]
pub struct HookRun<T> {
  pub report: Option<BuildReport>,
  pub output: T,
}

/// Compile the artifacts into the strategy's target directory, creating it
/// first.
pub fn prepare_artifacts<C: ModelCompiler>(
  project: &Project,
  builder: &ArtifactBuilder<C>,
  strategy: TargetStrategy,
) -> Result<BuildReport, HookError> {
  let target = strategy.target_dir(project);
  fs::create_dir_all(&target).map_err(|e| HookError::DirectoryCreation {
    path: target.clone(),
    source: e,
  })?;

  let source_dir = builder.source_dir(&project.models_root());
  Ok(builder.build(&source_dir, &target)?)
}

/// Run the artifact pre-step, then `action`.
///
/// If the pre-step fails, `action` is not run. The action's error is returned
/// as is.
pub fn run_hook<C, T, E, F>(
  project: &Project,
  builder: &ArtifactBuilder<C>,
  strategy: TargetStrategy,
  ctx: HookContext,
  action: F,
) -> Result<HookRun<T>, E>
where
  C: ModelCompiler,
  F: FnOnce() -> Result<T, E>,
  E: From<HookError>,
{
  let report = if ctx.dry_run {
    info!(target = %strategy.target_dir(project).display(), "dry run, skipping model compilation");
    None
  } else {
    Some(prepare_artifacts(project, builder, strategy)?)
  };

  let output = action()?;
  Ok(HookRun { report, output })
}
