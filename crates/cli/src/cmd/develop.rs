//! Implementation of the `prophet-build develop` command.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use prophet_build_lib::hook::{self, HookContext};

use crate::output::{format_duration, print_info, print_stat, print_success};

pub fn cmd_develop(root: &Path, dry_run: bool, install_dir: Option<&Path>) -> Result<()> {
  let (project, builder) = super::load(root)?;
  let start = Instant::now();

  let run = hook::develop(&project, &builder, HookContext { dry_run }, install_dir)?;

  if dry_run {
    print_info("Dry run: nothing compiled or installed");
    return Ok(());
  }

  print_success(&format!("Installed {} in development mode", project.package()));
  if let Some(report) = &run.report {
    for artifact in &report.artifacts {
      print_stat(artifact.kind.as_str(), &artifact.path.display().to_string());
    }
  }
  if let Some(link) = &run.output {
    print_stat("Link", &link.display().to_string());
  }
  print_stat("Elapsed", &format_duration(start.elapsed()));
  Ok(())
}
