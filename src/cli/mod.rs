//! Command-line interface for postmeta
//!
//! `process` rewrites posts in place; `dates` and `tags` print the intermediate results as JSON.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod args;
mod dates;
mod process;
mod tags;
mod utils;

pub use args::RunArgs;

/// Fill in Hexo front matter (dates, tags, categories, cover) for posts generated from a notes repository
#[derive(Parser)]
#[command(name = "postmeta")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (TOML or YAML) [default: postmeta.toml or postmeta.yml at the site root]
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write front matter into every post under the target directory
    Process(RunArgs),

    /// Print creation/update times from the notes history as JSON
    Dates(RunArgs),

    /// Print the tags each post would receive as JSON
    Tags(RunArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose adds DEBUG, otherwise INFO.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Process(args) => process::run(&args, config, cli.verbose),
        Commands::Dates(args) => dates::run(&args, config, cli.verbose),
        Commands::Tags(args) => tags::run(&args, config, cli.verbose),
    }
}
