//! Compiling model sources into artifacts.
//!
//! A build either produces an artifact for every [`ModelKind`] or fails
//! without leaving a new artifact behind. All sources are read and compiled
//! before the first file is written; if a write fails part way, the files
//! already written by the same build are removed again. A kind that fails to
//! read or compile also loses any artifact an earlier build left for it.
//!
//! There is no caching: every build recompiles and overwrites.
//!
//! # Submodules
//!
//! - [`store`] - Artifact envelope, writing and loading

pub mod store;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::compiler::{CompileError, ModelCompiler};
use crate::consts::ARTIFACT_FORMAT_VERSION;
use crate::model::{ModelKind, ModelSource};
use crate::platform::PlatformVariant;
use crate::util::hash::{ContentHash, hash_bytes};

pub use store::{Artifact, LoadError, load_artifact, load_kind};

/// Errors that abort an artifact build. None of them are retried.
#[derive(Debug, Error)]
pub enum ArtifactError {
  #[error("model source for {kind} not readable at {}: {source}", path.display())]
  SourceNotFound {
    kind: ModelKind,
    path: PathBuf,
    source: io::Error,
  },

  #[error("failed to compile {kind} model: {source}")]
  Compilation { kind: ModelKind, source: CompileError },

  #[error("failed to serialize {kind} artifact: {source}")]
  Serialize { kind: ModelKind, source: serde_json::Error },

  #[error("failed to write artifact {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },
}

/// One artifact produced by a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArtifact {
  pub kind: ModelKind,
  pub path: PathBuf,
  pub source_sha256: ContentHash,
}

/// Result of a successful build: one entry per model kind, in build order.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
  pub artifacts: Vec<BuiltArtifact>,
}

impl BuildReport {
  pub fn paths(&self) -> impl Iterator<Item = &Path> {
    self.artifacts.iter().map(|a| a.path.as_path())
  }
}

/// Compiles every model kind with a fixed compiler and platform variant.
#[derive(Debug, Clone)]
pub struct ArtifactBuilder<C> {
  compiler: C,
  platform: PlatformVariant,
}

impl<C: ModelCompiler> ArtifactBuilder<C> {
  pub fn new(compiler: C, platform: PlatformVariant) -> Self {
    Self { compiler, platform }
  }

  pub fn compiler(&self) -> &C {
    &self.compiler
  }

  pub fn platform(&self) -> PlatformVariant {
    self.platform
  }

  /// The platform-specific source directory under `models_root`.
  pub fn source_dir(&self, models_root: &Path) -> PathBuf {
    self.platform.source_dir(models_root)
  }

  /// Compile all model sources in `source_dir` into `target_dir`.
  ///
  /// `target_dir` must already exist.
  pub fn build(&self, source_dir: &Path, target_dir: &Path) -> Result<BuildReport, ArtifactError> {
    let mut compiled = Vec::with_capacity(ModelKind::ALL.len());

    for kind in ModelKind::ALL {
      match self.compile_kind(kind, source_dir) {
        Ok(artifact) => compiled.push(artifact),
        Err(e) => {
          discard_stale(target_dir, kind);
          return Err(e);
        }
      }
    }

    let mut report = BuildReport::default();
    for artifact in &compiled {
      let path = target_dir.join(artifact.kind.artifact_file_name());
      debug!(kind = %artifact.kind, path = %path.display(), "writing artifact");

      if let Err(e) = store::write_artifact(&path, artifact) {
        discard(&report);
        return Err(e);
      }

      report.artifacts.push(BuiltArtifact {
        kind: artifact.kind,
        path,
        source_sha256: artifact.source_sha256.clone(),
      });
    }

    info!(count = report.artifacts.len(), target = %target_dir.display(), "artifacts written");
    Ok(report)
  }

  fn compile_kind(&self, kind: ModelKind, source_dir: &Path) -> Result<Artifact<C::Model>, ArtifactError> {
    let source = ModelSource::in_dir(kind, self.platform, source_dir);
    info!(kind = %kind, source = %source.path.display(), "compiling model");

    let text = fs::read_to_string(&source.path).map_err(|e| ArtifactError::SourceNotFound {
      kind,
      path: source.path.clone(),
      source: e,
    })?;

    let model = self
      .compiler
      .compile(&text)
      .map_err(|e| ArtifactError::Compilation { kind, source: e })?;

    Ok(Artifact {
      format_version: ARTIFACT_FORMAT_VERSION,
      kind,
      platform: self.platform,
      compiler: self.compiler.name().to_string(),
      source_sha256: hash_bytes(text.as_bytes()),
      model,
    })
  }
}

/// Remove an artifact for `kind` left by an earlier build, so a failed kind
/// never has a loadable artifact.
fn discard_stale(target_dir: &Path, kind: ModelKind) {
  let path = target_dir.join(kind.artifact_file_name());
  match fs::remove_file(&path) {
    Ok(()) => info!(kind = %kind, path = %path.display(), "stale artifact removed"),
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(e) => warn!(path = %path.display(), error = %e, "failed to remove stale artifact"),
  }
}

/// Remove the artifacts of an aborted build.
fn discard(report: &BuildReport) {
  for path in report.paths() {
    if let Err(e) = fs::remove_file(path) {
      warn!(path = %path.display(), error = %e, "failed to remove partial artifact");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::{EchoCompiler, FailingCompiler, write_sources};
  use tempfile::tempdir;

  #[test]
  fn builds_one_artifact_per_kind() {
    let temp = tempdir().unwrap();
    let source_dir = temp.path().join("stan/unix");
    write_sources(&source_dir);
    let target = temp.path().join("out");
    fs::create_dir_all(&target).unwrap();

    let builder = ArtifactBuilder::new(EchoCompiler, PlatformVariant::Unix);
    let report = builder.build(&source_dir, &target).unwrap();

    let kinds: Vec<_> = report.artifacts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, ModelKind::ALL);
    assert!(target.join("linear_growth.json").exists());
    assert!(target.join("logistic_growth.json").exists());
    assert_eq!(fs::read_dir(&target).unwrap().count(), 2);
  }

  #[test]
  fn artifact_decodes_to_direct_compilation() {
    let temp = tempdir().unwrap();
    let source_dir = temp.path().join("src");
    write_sources(&source_dir);
    let target = temp.path().join("out");
    fs::create_dir_all(&target).unwrap();

    ArtifactBuilder::new(EchoCompiler, PlatformVariant::Unix)
      .build(&source_dir, &target)
      .unwrap();

    for kind in ModelKind::ALL {
      let text = fs::read_to_string(source_dir.join(kind.source_file_name())).unwrap();
      let loaded: Artifact<String> = load_kind(&target, kind).unwrap();
      assert_eq!(loaded.model, EchoCompiler.compile(&text).unwrap());
      assert_eq!(loaded.source_sha256, hash_bytes(text.as_bytes()));
      assert_eq!(loaded.compiler, "echo");
    }
  }

  #[test]
  fn missing_source_writes_nothing() {
    let temp = tempdir().unwrap();
    let source_dir = temp.path().join("src");
    write_sources(&source_dir);
    fs::remove_file(source_dir.join(ModelKind::Logistic.source_file_name())).unwrap();
    let target = temp.path().join("out");
    fs::create_dir_all(&target).unwrap();

    let err = ArtifactBuilder::new(EchoCompiler, PlatformVariant::Unix)
      .build(&source_dir, &target)
      .unwrap_err();

    assert!(matches!(
      err,
      ArtifactError::SourceNotFound {
        kind: ModelKind::Logistic,
        ..
      }
    ));
    assert!(!target.join("logistic_growth.json").exists());
    assert!(!target.join("linear_growth.json").exists());
  }

  #[test]
  fn failed_rebuild_removes_stale_artifact_of_failing_kind() {
    let temp = tempdir().unwrap();
    let source_dir = temp.path().join("src");
    write_sources(&source_dir);
    let target = temp.path().join("out");
    fs::create_dir_all(&target).unwrap();
    let builder = ArtifactBuilder::new(EchoCompiler, PlatformVariant::Unix);
    builder.build(&source_dir, &target).unwrap();

    fs::remove_file(source_dir.join(ModelKind::Logistic.source_file_name())).unwrap();
    let err = builder.build(&source_dir, &target).unwrap_err();

    assert!(matches!(
      err,
      ArtifactError::SourceNotFound {
        kind: ModelKind::Logistic,
        ..
      }
    ));
    assert!(!target.join("logistic_growth.json").exists());
    let linear: Artifact<String> = load_kind(&target, ModelKind::Linear).unwrap();
    assert_eq!(linear.kind, ModelKind::Linear);
  }

  #[test]
  fn compiler_failure_is_fatal() {
    let temp = tempdir().unwrap();
    let source_dir = temp.path().join("src");
    write_sources(&source_dir);
    let target = temp.path().join("out");
    fs::create_dir_all(&target).unwrap();

    let err = ArtifactBuilder::new(FailingCompiler, PlatformVariant::Unix)
      .build(&source_dir, &target)
      .unwrap_err();

    assert!(matches!(
      err,
      ArtifactError::Compilation {
        kind: ModelKind::Linear,
        ..
      }
    ));
    assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
  }

  #[test]
  fn failed_write_removes_earlier_artifacts() {
    let temp = tempdir().unwrap();
    let source_dir = temp.path().join("src");
    write_sources(&source_dir);
    let target = temp.path().join("out");
    fs::create_dir_all(&target).unwrap();
    // A directory in the way of the second artifact makes its rename fail.
    fs::create_dir_all(target.join("logistic_growth.json").join("occupied")).unwrap();

    let err = ArtifactBuilder::new(EchoCompiler, PlatformVariant::Unix)
      .build(&source_dir, &target)
      .unwrap_err();

    assert!(matches!(err, ArtifactError::Write { .. }));
    assert!(!target.join("linear_growth.json").exists());
  }

  #[test]
  fn rebuild_overwrites_with_equal_artifacts() {
    let temp = tempdir().unwrap();
    let source_dir = temp.path().join("src");
    write_sources(&source_dir);
    let target = temp.path().join("out");
    fs::create_dir_all(&target).unwrap();
    let builder = ArtifactBuilder::new(EchoCompiler, PlatformVariant::Unix);

    builder.build(&source_dir, &target).unwrap();
    let first: Artifact<String> = load_kind(&target, ModelKind::Logistic).unwrap();
    builder.build(&source_dir, &target).unwrap();
    let second: Artifact<String> = load_kind(&target, ModelKind::Logistic).unwrap();

    assert_eq!(first, second);
  }

  #[test]
  fn source_dir_follows_platform() {
    let builder = ArtifactBuilder::new(EchoCompiler, PlatformVariant::Win);
    assert_eq!(builder.source_dir(Path::new("stan")), PathBuf::from("stan/win"));
  }
}
