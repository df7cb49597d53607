//! docflow CLI
//!
//! Inspect, normalize and scaffold document form configurations.
//!
//! # Usage
//!
//! ```bash
//! docflow init
//! docflow show --format yaml
//! docflow check -c ./config.json
//! docflow export --output normalized.json
//! docflow prefs set config ~/forms/config.json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "docflow")]
#[command(author = "docflow")]
#[command(version)]
#[command(about = "docflow Command Line Interface", long_about = None)]
struct Cli {
    /// Configuration file (falls back to the saved preference, then config.json)
    #[arg(long, short, env = "DOCFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (falls back to the saved preference, then table)
    #[arg(long, short)]
    format: Option<output::OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured document types and their fields
    Show,
    /// Parse strictly and report consistency issues
    Check,
    /// Write the normalized configuration
    Export {
        /// Destination file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a sample configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Manage CLI preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsCommands,
    },
}

#[derive(Subcommand)]
enum PrefsCommands {
    /// Set preference value
    Set { key: String, value: String },
    /// Get preference value
    Get { key: String },
    /// List all preferences
    List,
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let prefs = config::Prefs::load().unwrap_or_default();
    let path = cli.config.unwrap_or_else(|| prefs.config_path());
    let format = cli.format.or_else(|| prefs.format()).unwrap_or(output::OutputFormat::Table);

    let result = match cli.command {
        Commands::Show => commands::show::handle(&path, format),
        Commands::Check => commands::check::handle(&path),
        Commands::Export { output } => commands::export::handle(&path, output.as_deref()),
        Commands::Init { force } => commands::init::handle(&path, force),
        Commands::Prefs { action } => commands::prefs::handle(action),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
