//! Host platform resolution.
//!
//! Stan model sources ship in two flavours, one per platform family. The
//! variant is resolved once per process and passed to the artifact builder as
//! a plain value.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Source-directory variant for the running host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformVariant {
  #[default]
  Unix,
  Win,
}

impl PlatformVariant {
  /// Map a host-identifying string to a variant.
  ///
  /// Anything that does not look like Windows falls back to `Unix`.
  pub fn from_host_id(host: &str) -> Self {
    let prefix = host.get(..3).unwrap_or_default();
    if prefix.eq_ignore_ascii_case("win") {
      Self::Win
    } else {
      Self::Unix
    }
  }

  /// Returns the directory name holding this variant's model sources
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Unix => "unix",
      Self::Win => "win",
    }
  }

  /// Directory holding this variant's model sources under `models_root`
  pub fn source_dir(&self, models_root: &Path) -> PathBuf {
    models_root.join(self.as_str())
  }
}

impl fmt::Display for PlatformVariant {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Returns the platform variant of the running process.
///
/// The host is inspected on the first call only.
pub fn resolve() -> PlatformVariant {
  static VARIANT: OnceLock<PlatformVariant> = OnceLock::new();
  *VARIANT.get_or_init(|| PlatformVariant::from_host_id(std::env::consts::OS))
}
