//! The packaging actions wrapped by the lifecycle hooks.
//!
//! `stage_sources` is the normal build step: it lays the package out in the
//! staging tree. `install_develop` is the normal development install: the
//! project root itself becomes the installed location. Both honour dry runs
//! by logging what they would do.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{PackageError, PackageMetadata, write_package_info};
use crate::consts::DEV_LINK_SUFFIX;
use crate::util::fs::{copy_tree, write_atomic};

/// Copy the package sources at `package_src` into `staged`.
///
/// The artifacts subdirectory is skipped: the staged copy holds freshly built
/// artifacts that an in-place develop build must not overwrite.
pub fn stage_sources(
  package_src: &Path,
  staged: &Path,
  artifacts_subdir: &Path,
  dry_run: bool,
) -> Result<usize, PackageError> {
  if !package_src.is_dir() {
    return Err(PackageError::SourcesMissing {
      path: package_src.to_path_buf(),
    });
  }

  if dry_run {
    info!(from = %package_src.display(), to = %staged.display(), "would stage package sources");
    return Ok(0);
  }

  let copied = copy_tree(package_src, staged, &[artifacts_subdir])?;
  info!(files = copied, to = %staged.display(), "package sources staged");
  Ok(copied)
}

/// Install `package` in development mode from `project_root`.
///
/// Writes the package metadata next to the sources so the project root is
/// discoverable, and, when `install_dir` is given, a `<name>.dev-link` file
/// there naming the project root. Returns the link path if one was written.
pub fn install_develop(
  project_root: &Path,
  package: &PackageMetadata,
  install_dir: Option<&Path>,
  dry_run: bool,
) -> Result<Option<PathBuf>, PackageError> {
  if dry_run {
    info!(package = %package, root = %project_root.display(), "would install in development mode");
    return Ok(None);
  }

  write_package_info(project_root, package)?;

  let Some(install_dir) = install_dir else {
    info!(package = %package, root = %project_root.display(), "development metadata written");
    return Ok(None);
  };

  fs::create_dir_all(install_dir).map_err(|e| PackageError::CreateDir {
    path: install_dir.to_path_buf(),
    source: e,
  })?;

  let link = install_dir.join(format!("{}{}", package.name, DEV_LINK_SUFFIX));
  let content = format!("{}\n", project_root.display());
  write_atomic(&link, content.as_bytes()).map_err(|e| PackageError::Write {
    path: link.clone(),
    source: e,
  })?;

  info!(package = %package, link = %link.display(), "development link written");
  Ok(Some(link))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::package::read_package_info;
  use crate::util::testutil::file_count;
  use tempfile::tempdir;

  #[test]
  fn stage_sources_skips_artifacts_subdir() {
    let temp = tempdir().unwrap();
    let src = temp.path().join("fbprophet");
    fs::create_dir_all(src.join("stan_models")).unwrap();
    fs::write(src.join("forecaster.py"), "class Prophet: pass").unwrap();
    fs::write(src.join("stan_models/linear_growth.json"), "stale").unwrap();

    let staged = temp.path().join("build/lib/fbprophet");
    let copied = stage_sources(&src, &staged, Path::new("stan_models"), false).unwrap();

    assert_eq!(copied, 1);
    assert!(staged.join("forecaster.py").exists());
    assert!(!staged.join("stan_models/linear_growth.json").exists());
  }

  #[test]
  fn stage_sources_dry_run_writes_nothing() {
    let temp = tempdir().unwrap();
    let src = temp.path().join("fbprophet");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("forecaster.py"), "").unwrap();

    let staged = temp.path().join("build");
    stage_sources(&src, &staged, Path::new("stan_models"), true).unwrap();

    assert_eq!(file_count(&staged), 0);
  }

  #[test]
  fn stage_sources_requires_package_dir() {
    let temp = tempdir().unwrap();
    let err = stage_sources(&temp.path().join("missing"), temp.path(), Path::new("x"), false).unwrap_err();
    assert!(matches!(err, PackageError::SourcesMissing { .. }));
  }

  #[test]
  fn develop_writes_metadata_and_link() {
    let temp = tempdir().unwrap();
    let root = temp.path().join("project");
    fs::create_dir_all(&root).unwrap();
    let site = temp.path().join("site");
    let package = PackageMetadata::new("fbprophet", "0.1.post1");

    let link = install_develop(&root, &package, Some(&site), false).unwrap().unwrap();

    assert_eq!(link, site.join("fbprophet.dev-link"));
    assert_eq!(fs::read_to_string(&link).unwrap().trim(), root.display().to_string());
    assert_eq!(read_package_info(&root.join("fbprophet.pkg-info")).unwrap(), package);
  }

  #[test]
  fn develop_dry_run_writes_nothing() {
    let temp = tempdir().unwrap();
    let package = PackageMetadata::new("fbprophet", "0.1.post1");
    let site = temp.path().join("site");

    let link = install_develop(temp.path(), &package, Some(&site), true).unwrap();

    assert!(link.is_none());
    assert_eq!(file_count(temp.path()), 0);
  }
}
