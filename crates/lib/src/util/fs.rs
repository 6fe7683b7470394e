//! Filesystem helpers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum CopyError {
  #[error("failed to walk {}: {message}", path.display())]
  Walk { path: PathBuf, message: String },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
  Copy {
    from: PathBuf,
    to: PathBuf,
    source: io::Error,
  },
}

/// Write `contents` to `path` via a sibling temp file and a rename, so readers
/// never observe a half-written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
  let file_name = path
    .file_name()
    .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
  let mut temp_name = file_name.to_os_string();
  temp_name.push(".tmp");
  let temp_path = path.with_file_name(temp_name);

  fs::write(&temp_path, contents)?;
  if let Err(e) = fs::rename(&temp_path, path) {
    let _ = fs::remove_file(&temp_path);
    return Err(e);
  }
  Ok(())
}

/// Recursively copy the regular files of `src` into `dst`.
///
/// Entries whose path relative to `src` equals one of `skip` are not copied,
/// and neither is anything below them. Existing files in `dst` are
/// overwritten. Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path, skip: &[&Path]) -> Result<usize, CopyError> {
  let mut copied = 0;

  let walker = WalkDir::new(src)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| {
      let rel = e.path().strip_prefix(src).unwrap_or(e.path());
      !skip.contains(&rel)
    });

  for entry in walker {
    let entry = entry.map_err(|e| CopyError::Walk {
      path: src.to_path_buf(),
      message: e.to_string(),
    })?;
    let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
    let target = dst.join(rel);

    if entry.file_type().is_dir() {
      fs::create_dir_all(&target).map_err(|e| CopyError::CreateDir {
        path: target.clone(),
        source: e,
      })?;
    } else if entry.file_type().is_file() {
      fs::copy(entry.path(), &target).map_err(|e| CopyError::Copy {
        from: entry.path().to_path_buf(),
        to: target.clone(),
        source: e,
      })?;
      copied += 1;
    }
  }

  Ok(copied)
}
