//! The `build` and `develop` hooks.

use std::path::{Path, PathBuf};

use tracing::info;

use super::{HookContext, HookError, HookKind, HookRun, run_hook};
use crate::artifact::ArtifactBuilder;
use crate::compiler::ModelCompiler;
use crate::package::layout::{install_develop, stage_sources};
use crate::project::Project;

/// Compile artifacts into the staging tree, then stage the package sources.
///
/// Returns the number of source files staged.
pub fn build<C: ModelCompiler>(
  project: &Project,
  builder: &ArtifactBuilder<C>,
  ctx: HookContext,
) -> Result<HookRun<usize>, HookError> {
  info!(hook = %HookKind::Build, dry_run = ctx.dry_run, "running lifecycle hook");
  let strategy = HookKind::Build.strategy();

  run_hook(project, builder, strategy, ctx, || {
    let staged = strategy.package_root(project);
    Ok(stage_sources(
      &project.package_src(),
      &staged,
      project.artifacts_subdir(),
      ctx.dry_run,
    )?)
  })
}

/// Compile artifacts into the package sources, then install in development
/// mode. Returns the development link, if `install_dir` was given.
pub fn develop<C: ModelCompiler>(
  project: &Project,
  builder: &ArtifactBuilder<C>,
  ctx: HookContext,
  install_dir: Option<&Path>,
) -> Result<HookRun<Option<PathBuf>>, HookError> {
  info!(hook = %HookKind::Develop, dry_run = ctx.dry_run, "running lifecycle hook");

  run_hook(project, builder, HookKind::Develop.strategy(), ctx, || {
    Ok(install_develop(
      project.root(),
      project.package(),
      install_dir,
      ctx.dry_run,
    )?)
  })
}
