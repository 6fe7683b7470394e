//! Implementation of the `prophet-build info` command.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use prophet_build_lib::artifact::{Artifact, load_kind};
use prophet_build_lib::hook::HookKind;
use prophet_build_lib::model::ModelKind;
use prophet_build_lib::platform::PlatformVariant;

use crate::output::{print_info, print_json, print_stat, print_warning, symbols, truncate_hash};

#[derive(Debug, Serialize)]
struct ProjectInfo {
  package: String,
  version: String,
  platform: PlatformVariant,
  compiler: String,
  source_dir: String,
  targets: Vec<TargetInfo>,
}

#[derive(Debug, Serialize)]
struct TargetInfo {
  hook: String,
  dir: String,
  artifacts: Vec<ArtifactInfo>,
}

#[derive(Debug, Serialize)]
struct ArtifactInfo {
  kind: ModelKind,
  compiler: String,
  source_sha256: String,
}

pub fn cmd_info(root: &Path, json: bool) -> Result<()> {
  let (project, builder) = super::load(root)?;
  let mut warnings = Vec::new();

  let targets = [HookKind::Build, HookKind::Develop]
    .into_iter()
    .map(|hook| {
      let dir = hook.strategy().target_dir(&project);
      let artifacts = ModelKind::ALL
        .into_iter()
        .filter(|kind| dir.join(kind.artifact_file_name()).exists())
        .filter_map(|kind| match load_kind::<serde_json::Value>(&dir, kind) {
          Ok(artifact) => Some(describe(artifact)),
          Err(e) => {
            warnings.push(e.to_string());
            None
          }
        })
        .collect();
      TargetInfo {
        hook: hook.to_string(),
        dir: dir.display().to_string(),
        artifacts,
      }
    })
    .collect();

  let info = ProjectInfo {
    package: project.package().name.clone(),
    version: project.package().version.clone(),
    platform: builder.platform(),
    compiler: builder.compiler().program().to_string(),
    source_dir: builder.source_dir(&project.models_root()).display().to_string(),
    targets,
  };

  if json {
    return print_json(&info);
  }

  print_info(&format!("{} {}", info.package, info.version));
  print_stat("Platform", info.platform.as_str());
  print_stat("Compiler", &info.compiler);
  print_stat("Sources", &info.source_dir);
  for target in &info.targets {
    println!();
    print_stat(&format!("{} target", target.hook), &target.dir);
    if target.artifacts.is_empty() {
      println!("    {} no artifacts", symbols::INFO);
    }
    for artifact in &target.artifacts {
      println!(
        "    {} {} ({}, {})",
        symbols::SUCCESS,
        artifact.kind,
        artifact.compiler,
        truncate_hash(&artifact.source_sha256)
      );
    }
  }
  for warning in &warnings {
    print_warning(warning);
  }
  Ok(())
}

fn describe(artifact: Artifact<serde_json::Value>) -> ArtifactInfo {
  ArtifactInfo {
    kind: artifact.kind,
    compiler: artifact.compiler,
    source_sha256: artifact.source_sha256.0,
  }
}
