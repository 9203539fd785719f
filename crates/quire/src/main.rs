//! quire CLI - documentation site core.
//!
//! Provides commands for:
//! - `nav`: Print the sidebar navigation tree as JSON
//! - `page`: Render one page and print it as JSON
//! - `slugs`: List every page slug

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConfigArgs, PageArgs};
use error::CliError;
use output::Output;

/// quire - documentation site core.
#[derive(Parser)]
#[command(name = "quire", version, about)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Enable verbose output (info-level logs on stderr).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the navigation tree as JSON.
    Nav,
    /// Render a page and print it as JSON.
    Page(PageArgs),
    /// List every page slug, one per line.
    Slugs,
}

impl Cli {
    fn run(&self, output: &Output) -> Result<(), CliError> {
        let config = self.config.load()?;
        match &self.command {
            Commands::Nav => commands::nav::execute(&config, output),
            Commands::Page(args) => args.execute(&config, output),
            Commands::Slugs => commands::slugs::execute(&config, output),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.run(&output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
