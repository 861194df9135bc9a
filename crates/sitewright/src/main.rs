//! Sitewright CLI - documentation site build pipeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "sitewright")]
#[command(about = "Build pipeline for generated documentation sites")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to sitewright.toml config file, relative to the project root
    #[arg(short, long, default_value = "sitewright.toml", global = true)]
    config: PathBuf,

    /// Project root
    #[arg(short = 'C', long, default_value = ".", global = true)]
    root: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean, generate docs and build the site (default)
    Build,

    /// Remove all generated output
    Clean,

    /// Refresh tool dependencies (bundle install, bundle update)
    Update,

    /// Print the build stages
    Graph,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command.unwrap_or(Commands::Build) {
        Commands::Build => commands::build::run(&cli.root, &cli.config).await?,
        Commands::Clean => commands::clean::run(&cli.root, &cli.config).await?,
        Commands::Update => commands::update::run(&cli.root, &cli.config).await?,
        Commands::Graph => commands::graph::run()?,
    }

    Ok(())
}
