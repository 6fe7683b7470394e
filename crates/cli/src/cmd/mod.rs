mod build;
mod develop;
mod info;

pub use build::cmd_build;
pub use develop::cmd_develop;
pub use info::cmd_info;
pub use test::cmd_test;

use std::path::Path;

use anyhow::{Context, Result};
use prophet_build_lib::artifact::ArtifactBuilder;
use prophet_build_lib::compiler::CommandCompiler;
use prophet_build_lib::platform;
use prophet_build_lib::project::Project;

/// Load the project at `root` and a builder for the host platform.
fn load(root: &Path) -> Result<(Project, ArtifactBuilder<CommandCompiler>)> {
  let project = Project::load(root).with_context(|| format!("failed to load project at {}", root.display()))?;
  let builder = ArtifactBuilder::new(project.compiler(), platform::resolve());
  Ok((project, builder))
}
