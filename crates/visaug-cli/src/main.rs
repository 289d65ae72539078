//! visaug - augmentation pipeline tool
//!
//! Validates YAML pipeline configs, compiles them into artifacts and runs
//! artifacts on synthetic images.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "visaug")]
#[command(author, version, about = "Image augmentation pipeline tool")]
#[command(long_about = "
Validate, compile and inspect image augmentation pipelines.

Examples:
  visaug check train.yaml                       # Validate and print the pipeline
  visaug compile train.yaml -o train.vaug       # Write a reloadable artifact
  visaug inspect train.vaug --json              # Header and transform tree
  visaug demo train.vaug --seed 3 --size 64x48  # Run on a synthetic gradient
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a YAML config
    Check(CheckArgs),

    /// Compile a YAML config into an artifact
    #[command(visible_alias = "c")]
    Compile(CompileArgs),

    /// Show an artifact's header and transform tree
    #[command(visible_alias = "i")]
    Inspect(InspectArgs),

    /// Run an artifact on a synthetic gradient image
    Demo(DemoArgs),
}

#[derive(Args)]
struct CheckArgs {
    /// Pipeline config (YAML)
    config: PathBuf,
}

#[derive(Args)]
struct CompileArgs {
    /// Pipeline config (YAML)
    config: PathBuf,

    /// Output artifact
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct InspectArgs {
    /// Artifact file
    artifact: PathBuf,

    /// Print the transform tree as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DemoArgs {
    /// Artifact file
    artifact: PathBuf,

    /// Seed for the random state
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Image size as HxW
    #[arg(long, default_value = "64x64")]
    size: String,

    /// Channel count (1, 3 or 4)
    #[arg(short, long, default_value = "3")]
    channels: usize,

    /// Batch size; 0 runs a single unbatched image
    #[arg(short, long, default_value = "0")]
    batch: usize,

    /// Use a packed 8-bit image instead of a grid
    #[arg(long, conflicts_with = "batch")]
    packed: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check(args) => commands::check::run(args, cli.verbose),
        Commands::Compile(args) => commands::compile::run(args, cli.verbose),
        Commands::Inspect(args) => commands::inspect::run(args, cli.verbose),
        Commands::Demo(args) => commands::demo::run(args, cli.verbose),
    }
}
