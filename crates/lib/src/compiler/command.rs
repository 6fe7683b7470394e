//! Compiler backed by an external program.
//!
//! The program receives the model source on stdin and prints the compiled
//! model on stdout. `stanc --stdin`-style tools fit this shape directly.

use std::io::Write;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompileError, ModelCompiler};

/// Compiled model as produced by an external compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledModel {
  /// Program that produced `code`.
  pub compiler: String,
  /// Compiler output, verbatim.
  pub code: String,
}

#[derive(Debug, Clone)]
pub struct CommandCompiler {
  program: String,
  args: Vec<String>,
}

impl CommandCompiler {
  pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
    Self {
      program: program.into(),
      args,
    }
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  pub fn args(&self) -> &[String] {
    &self.args
  }
}

impl ModelCompiler for CommandCompiler {
  type Model = CompiledModel;

  fn name(&self) -> &str {
    &self.program
  }

  fn compile(&self, source: &str) -> Result<CompiledModel, CompileError> {
    debug!(program = %self.program, args = ?self.args, "spawning compiler");

    let mut child = Command::new(&self.program)
      .args(&self.args)
      // Reproducible timestamps in generated code
      .env("SOURCE_DATE_EPOCH", "315532800")
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()
      .map_err(|e| CompileError::Spawn {
        program: self.program.clone(),
        source: e,
      })?;

    // Feed stdin from a separate thread so a chatty compiler cannot fill the
    // stdout pipe while we are still writing.
    let stdin = child.stdin.take();
    let input = source.to_string();
    let writer = std::thread::spawn(move || match stdin {
      Some(mut stdin) => stdin.write_all(input.as_bytes()),
      None => Ok(()),
    });

    let output = child.wait_with_output().map_err(|e| CompileError::Spawn {
      program: self.program.clone(),
      source: e,
    })?;

    // A compiler may exit without reading all of its input; that surfaces
    // as a broken pipe here and is only an error if the exit status says so.
    if let Ok(Err(e)) = writer.join() {
      debug!(error = %e, "compiler closed stdin early");
    }

    if !output.status.success() {
      return Err(CompileError::Failed {
        program: self.program.clone(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      });
    }

    let code = String::from_utf8(output.stdout)?;
    debug!(program = %self.program, bytes = code.len(), "compiler finished");

    Ok(CompiledModel {
      compiler: self.program.clone(),
      code,
    })
  }
}
