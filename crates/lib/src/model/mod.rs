//! Model kinds and their on-disk names.
//!
//! The set of growth models is closed: every build compiles all of them, in
//! the order given by [`ModelKind::ALL`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{ARTIFACT_EXTENSION, SOURCE_EXTENSION};
use crate::platform::PlatformVariant;

/// A growth-curve model compiled at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
  Linear,
  Logistic,
}

impl ModelKind {
  /// Every kind, in build order.
  pub const ALL: [ModelKind; 2] = [ModelKind::Linear, ModelKind::Logistic];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linear => "linear",
      Self::Logistic => "logistic",
    }
  }

  /// File name of the model source, e.g. `prophet_linear_growth.stan`
  pub fn source_file_name(&self) -> String {
    format!("prophet_{}_growth.{}", self.as_str(), SOURCE_EXTENSION)
  }

  /// File name of the compiled artifact, e.g. `linear_growth.json`.
  ///
  /// The runtime loader looks artifacts up by this exact name.
  pub fn artifact_file_name(&self) -> String {
    format!("{}_growth.{}", self.as_str(), ARTIFACT_EXTENSION)
  }
}

impl fmt::Display for ModelKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Location of one model's source for a given platform variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSource {
  pub kind: ModelKind,
  pub platform: PlatformVariant,
  pub path: PathBuf,
}

impl ModelSource {
  /// Resolve the source of `kind` inside an already platform-specific directory.
  pub fn in_dir(kind: ModelKind, platform: PlatformVariant, source_dir: &Path) -> Self {
    Self {
      kind,
      platform,
      path: source_dir.join(kind.source_file_name()),
    }
  }
}
