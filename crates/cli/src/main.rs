//! `prophet-build` - compile the Stan growth models as part of packaging.

mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::print_error;

#[derive(Parser)]
#[command(name = "prophet-build")]
#[command(author, version, about = "Packaging lifecycle hooks for the prophet growth models", long_about = None)]
struct Cli {
  /// Project root containing prophet-build.toml
  #[arg(short = 'C', long = "project", global = true, default_value = ".")]
  project: PathBuf,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile the models into the staging tree and stage the package sources
  Build {
    /// Report what would happen without compiling or writing anything
    #[arg(long)]
    dry_run: bool,
  },

  /// Compile the models into the package sources and install for development
  Develop {
    /// Report what would happen without compiling or writing anything
    #[arg(long)]
    dry_run: bool,

    /// Directory that receives the development link
    #[arg(long)]
    install_dir: Option<PathBuf>,
  },

  /// Build, then run a test command against the freshly built package
  Test {
    /// Skip compilation and metadata writes; the command still runs
    #[arg(long)]
    dry_run: bool,

    /// Test command and its arguments
    #[arg(last = true, required = true)]
    command: Vec<String>,
  },

  /// Show the resolved platform variant and model locations
  Info {
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Build { dry_run } => cmd::cmd_build(&cli.project, dry_run),
    Commands::Develop { dry_run, install_dir } => cmd::cmd_develop(&cli.project, dry_run, install_dir.as_deref()),
    Commands::Test { dry_run, command } => cmd::cmd_test(&cli.project, dry_run, &command),
    Commands::Info { json } => cmd::cmd_info(&cli.project, json),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}
