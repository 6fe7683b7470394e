//! CLI smoke tests for prophet-build.
//!
//! These tests run the binary against throwaway projects and check exit codes
//! and the files each lifecycle command leaves behind. `cat` stands in for the
//! model compiler.

use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

const CONFIG: &str = r#"
[package]
name = "fbprophet"
version = "0.1.post1"

[compiler]
program = "cat"
"#;

/// Get a Command for the prophet-build binary, detached from the caller's
/// environment overrides.
fn prophet_cmd(project: &Path) -> Command {
  let mut cmd = cargo_bin_cmd!("prophet-build");
  cmd
    .env_remove("PROPHET_BUILD_LIB")
    .env_remove("PROPHET_BUILD_COMPILER")
    .env_remove("PYTHONPATH")
    .arg("-C")
    .arg(project);
  cmd
}

/// Create a project with model sources for both platform variants.
fn temp_project() -> TempDir {
  let temp = TempDir::new().unwrap();
  let root = temp.path();
  std::fs::write(root.join("prophet-build.toml"), CONFIG).unwrap();
  for variant in ["unix", "win"] {
    let dir = root.join("stan").join(variant);
    std::fs::create_dir_all(&dir).unwrap();
    for kind in ["linear", "logistic"] {
      std::fs::write(
        dir.join(format!("prophet_{kind}_growth.stan")),
        format!("// {variant} {kind}\n"),
      )
      .unwrap();
    }
  }
  std::fs::create_dir_all(root.join("fbprophet")).unwrap();
  std::fs::write(root.join("fbprophet/__init__.py"), "").unwrap();
  temp
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  cargo_bin_cmd!("prophet-build")
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  cargo_bin_cmd!("prophet-build")
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("prophet-build"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["build", "develop", "test", "info"] {
    cargo_bin_cmd!("prophet-build")
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

#[test]
fn test_requires_a_command() {
  let temp = temp_project();
  prophet_cmd(temp.path()).arg("test").assert().failure();
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn missing_config_fails() {
  let temp = TempDir::new().unwrap();
  prophet_cmd(temp.path())
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("prophet-build.toml"));
}

#[test]
fn invalid_config_fails() {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("prophet-build.toml"), "[package]\nname = \"x\"\n").unwrap();
  prophet_cmd(temp.path())
    .arg("info")
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to parse config"));
}

// =============================================================================
// Info
// =============================================================================

#[cfg(unix)]
#[test]
fn info_shows_platform_and_targets() {
  let temp = temp_project();
  prophet_cmd(temp.path())
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("fbprophet 0.1.post1"))
    .stdout(predicate::str::contains("unix"))
    .stdout(predicate::str::contains("stan_models"));
}

#[cfg(unix)]
#[test]
fn info_json_lists_built_artifacts() {
  let temp = temp_project();
  prophet_cmd(temp.path()).arg("build").assert().success();

  let output = prophet_cmd(temp.path()).args(["info", "--json"]).output().unwrap();
  assert!(output.status.success());

  let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(info["platform"], "unix");
  assert_eq!(info["compiler"], "cat");
  let build = &info["targets"][0];
  assert_eq!(build["hook"], "build");
  assert_eq!(build["artifacts"].as_array().unwrap().len(), 2);
  assert_eq!(info["targets"][1]["artifacts"].as_array().unwrap().len(), 0);
}

#[cfg(unix)]
#[test]
fn info_warns_on_corrupt_artifact() {
  let temp = temp_project();
  prophet_cmd(temp.path()).arg("build").assert().success();

  let path = temp.path().join("build/lib/fbprophet/stan_models/linear_growth.json");
  let mut artifact: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
  artifact["source_sha256"] = serde_json::Value::from("aéééééééééééé");
  std::fs::write(&path, serde_json::to_vec(&artifact).unwrap()).unwrap();

  prophet_cmd(temp.path())
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("logistic"))
    .stderr(predicate::str::contains("malformed source digest"));
}

// =============================================================================
// Lifecycle commands
// =============================================================================

#[cfg(unix)]
#[test]
fn build_stages_package_with_artifacts() {
  let temp = temp_project();
  prophet_cmd(temp.path())
    .arg("build")
    .assert()
    .success()
    .stdout(predicate::str::contains("Built fbprophet"));

  let staged = temp.path().join("build/lib/fbprophet");
  assert!(staged.join("__init__.py").exists());
  assert!(staged.join("stan_models/linear_growth.json").exists());
  assert!(staged.join("stan_models/logistic_growth.json").exists());
}

#[test]
fn build_dry_run_writes_nothing() {
  let temp = temp_project();
  prophet_cmd(temp.path())
    .args(["build", "--dry-run"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Dry run"));

  assert!(!temp.path().join("build").exists());
}

#[cfg(unix)]
#[test]
fn build_fails_when_source_is_missing() {
  let temp = temp_project();
  std::fs::remove_file(temp.path().join("stan/unix/prophet_logistic_growth.stan")).unwrap();

  prophet_cmd(temp.path())
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("logistic"));

  assert!(!temp.path().join("build/lib/fbprophet/stan_models/linear_growth.json").exists());
}

#[cfg(unix)]
#[test]
fn develop_builds_in_place_and_links() {
  let temp = temp_project();
  let site = temp.path().join("site");

  prophet_cmd(temp.path())
    .arg("develop")
    .arg("--install-dir")
    .arg(&site)
    .assert()
    .success();

  assert!(temp.path().join("fbprophet/stan_models/linear_growth.json").exists());
  assert!(temp.path().join("fbprophet.pkg-info/metadata.json").exists());
  assert!(site.join("fbprophet.dev-link").exists());
}

#[cfg(unix)]
#[test]
#[serial]
fn test_runs_against_staged_package() {
  let temp = temp_project();
  let staged = dunce::canonicalize(temp.path()).unwrap().join("build/lib/fbprophet");

  prophet_cmd(temp.path())
    .args(["test", "--", "sh", "-c"])
    .arg(format!(
      "test \"$PROPHET_BUILD_PACKAGE_DIR\" = \"{}\" && test -f \"$PROPHET_BUILD_PACKAGE_DIR/stan_models/linear_growth.json\"",
      staged.display()
    ))
    .assert()
    .success()
    .stdout(predicate::str::contains("Tests passed"));
}

#[cfg(unix)]
#[test]
#[serial]
fn test_exports_search_path() {
  let temp = temp_project();
  let staging = dunce::canonicalize(temp.path()).unwrap().join("build/lib");

  prophet_cmd(temp.path())
    .args(["test", "--", "sh", "-c"])
    .arg(format!("test \"$PYTHONPATH\" = \"{}\"", staging.display()))
    .assert()
    .success();
}

#[cfg(unix)]
#[test]
#[serial]
fn failing_test_command_fails() {
  let temp = temp_project();
  prophet_cmd(temp.path())
    .args(["test", "--", "false"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("test command false failed"));
}
