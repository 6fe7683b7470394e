//! prophet-build-lib: Build-time orchestration for Prophet's Stan models
//!
//! This crate compiles the fixed set of growth-model templates into loadable
//! artifacts as a side effect of packaging lifecycle events:
//! - `platform`: host platform variant selecting the model source directory
//! - `compiler`: the `ModelCompiler` seam and the external-command compiler
//! - `artifact`: compiling every model kind and serializing the results
//! - `hook`: build, develop and test lifecycle hooks
//! - `env`: explicit process environment with snapshot/restore for test isolation

pub mod artifact;
pub mod compiler;
pub mod consts;
pub mod env;
pub mod hook;
pub mod model;
pub mod package;
pub mod platform;
pub mod project;
pub mod util;
