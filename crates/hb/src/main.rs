//! Homebase CLI - documentation and weekly posts pipeline.
//!
//! Provides commands for:
//! - `build`: Render every page and post to JSON files
//! - `check`: Compile all content and report problems
//! - `toc`: Print the table of contents of a page

mod commands;
mod error;
mod output;
mod site;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, CheckArgs, TocArgs};
use output::Output;

/// Homebase - documentation content pipeline.
#[derive(Parser)]
#[command(name = "homebase", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render all documentation pages and weekly posts.
    Build(BuildArgs),
    /// Compile all content and report warnings and failures.
    Check(CheckArgs),
    /// Print the table of contents of a documentation page as JSON.
    Toc(TocArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Build(args) => args.common.verbose,
            Self::Check(args) => args.common.verbose,
            Self::Toc(args) => args.common.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG (default WARN)
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Check(args) => args.execute(),
        Commands::Toc(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
