//! Implementation of the `prophet-build build` command.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use prophet_build_lib::hook::{self, HookContext};

use crate::output::{format_duration, print_info, print_stat, print_success};

pub fn cmd_build(root: &Path, dry_run: bool) -> Result<()> {
  let (project, builder) = super::load(root)?;
  let ctx = HookContext { dry_run };
  let start = Instant::now();

  let run = hook::build(&project, &builder, ctx)?;

  if dry_run {
    print_info("Dry run: nothing compiled or staged");
    return Ok(());
  }

  print_success(&format!("Built {}", project.package()));
  if let Some(report) = &run.report {
    for artifact in &report.artifacts {
      print_stat(artifact.kind.as_str(), &artifact.path.display().to_string());
    }
  }
  print_stat("Staged files", &run.output.to_string());
  print_stat("Staging root", &project.build_lib().display().to_string());
  print_stat("Elapsed", &format_duration(start.elapsed()));
  Ok(())
}
