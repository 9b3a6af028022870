use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::transform::OutputFormat;

mod build;
mod commands;
mod config;
mod resources;
mod style_mods;
mod transform;
mod util;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Log progress at info level instead of using RUST_LOG
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    /// The command to execute
    #[command(subcommand)]
    command: DocweaveCommand,
}

#[derive(Parser)]
struct InitArgs {
    /// The path to initialize the project in
    path: PathBuf,

    /// Whether to create the directory if it doesn't exist
    #[arg(short, long, default_value = "false")]
    create: bool,
}

#[derive(Parser)]
struct BuildArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "docweave.yaml")]
    config_file: Option<PathBuf>,

    /// Output formats to build instead of the configured ones
    #[arg(short, long, value_delimiter = ',')]
    format: Vec<OutputFormat>,
}

#[derive(Parser)]
struct SectionsArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "docweave.yaml")]
    config_file: Option<PathBuf>,
}

#[derive(Parser)]
struct CleanArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "docweave.yaml")]
    config_file: Option<PathBuf>,

    /// Only print what would be deleted
    #[arg(short, long, default_value = "false")]
    dry_run: bool,
}

#[derive(Subcommand)]
enum DocweaveCommand {
    /// Initialize a new docweave project
    Init(InitArgs),

    /// Render all topics to the configured output formats
    Build(BuildArgs),

    /// Show the effective section order and element handlers
    Sections(SectionsArgs),

    /// Delete the build output
    Clean(CleanArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        DocweaveCommand::Init(args) => {
            commands::init::run(&args).await?;
        }
        DocweaveCommand::Build(args) => {
            commands::build::run(&args).await?;
        }
        DocweaveCommand::Sections(args) => {
            commands::sections::run(&args).await?;
        }
        DocweaveCommand::Clean(args) => {
            commands::clean::run(&args).await?;
        }
    }

    Ok(())
}
