//! Test utilities for prophet-build-lib.
//!
//! In-process compilers and fixture writers, so tests never depend on a Stan
//! toolchain being installed.

use std::cell::Cell;
use std::fs;
use std::path::Path;

use crate::compiler::{CompileError, ModelCompiler};
use crate::model::ModelKind;

pub const LINEAR_SOURCE: &str = "data { int T; } parameters { real k; } model { k ~ normal(0, 5); }\n";
pub const LOGISTIC_SOURCE: &str = "data { int T; vector[T] cap; } parameters { real k; } model { k ~ normal(0, 5); }\n";

/// Deterministic compiler: the model is the source text, tagged.
pub struct EchoCompiler;

impl ModelCompiler for EchoCompiler {
  type Model = String;

  fn name(&self) -> &str {
    "echo"
  }

  fn compile(&self, source: &str) -> Result<String, CompileError> {
    Ok(format!("compiled:{}", source.trim()))
  }
}

/// Compiler that rejects everything.
pub struct FailingCompiler;

impl ModelCompiler for FailingCompiler {
  type Model = String;

  fn name(&self) -> &str {
    "failing"
  }

  fn compile(&self, _source: &str) -> Result<String, CompileError> {
    Err(CompileError::Rejected("syntax error".to_string()))
  }
}

/// Echo compiler that counts its invocations.
#[derive(Default)]
pub struct CountingCompiler {
  pub calls: Cell<usize>,
}

impl ModelCompiler for CountingCompiler {
  type Model = String;

  fn name(&self) -> &str {
    "counting"
  }

  fn compile(&self, source: &str) -> Result<String, CompileError> {
    self.calls.set(self.calls.get() + 1);
    EchoCompiler.compile(source)
  }
}

/// Write valid sources for every model kind into `dir`.
pub fn write_sources(dir: &Path) {
  fs::create_dir_all(dir).unwrap();
  fs::write(dir.join(ModelKind::Linear.source_file_name()), LINEAR_SOURCE).unwrap();
  fs::write(dir.join(ModelKind::Logistic.source_file_name()), LOGISTIC_SOURCE).unwrap();
}

/// Count the files below `dir`, recursively. Missing directories count as empty.
pub fn file_count(dir: &Path) -> usize {
  if !dir.exists() {
    return 0;
  }
  walkdir::WalkDir::new(dir)
    .into_iter()
    .filter_map(Result::ok)
    .filter(|e| e.file_type().is_file())
    .count()
}
