//! Model compilation.
//!
//! The compiler itself is an external collaborator: it takes model source
//! text and returns an opaque, serializable object. [`CommandCompiler`] is the
//! implementation used by the CLI; tests plug in their own.

mod command;

pub use command::{CommandCompiler, CompiledModel};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors reported by a model compiler.
#[derive(Debug, Error)]
pub enum CompileError {
  #[error("failed to start compiler {program}: {source}")]
  Spawn { program: String, source: std::io::Error },

  #[error("compiler {program} exited with code {code:?}: {stderr}")]
  Failed {
    program: String,
    code: Option<i32>,
    stderr: String,
  },

  #[error("compiler output is not valid UTF-8: {0}")]
  InvalidOutput(#[from] std::string::FromUtf8Error),

  #[error("model rejected: {0}")]
  Rejected(String),
}

/// Turns model source text into a compiled object.
///
/// Compilation must be deterministic: identical source text yields equal
/// models, so rebuilding never changes what the loader sees.
pub trait ModelCompiler {
  type Model: Serialize + DeserializeOwned + PartialEq;

  /// Short identifier recorded alongside every artifact.
  fn name(&self) -> &str;

  fn compile(&self, source: &str) -> Result<Self::Model, CompileError>;
}

impl<C: ModelCompiler + ?Sized> ModelCompiler for &C {
  type Model = C::Model;

  fn name(&self) -> &str {
    (**self).name()
  }

  fn compile(&self, source: &str) -> Result<Self::Model, CompileError> {
    (**self).compile(source)
  }
}
