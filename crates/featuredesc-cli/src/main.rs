//! fdesc - describe engineered features in plain English.
//!
//! Reads a JSON definitions document and prints one sentence per feature.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

mod commands;
mod config;

use commands::{config as config_cmd, describe};
use config::{Config, OutputFormat};

/// fdesc - Describe engineered features in plain English.
#[derive(Parser, Debug)]
#[command(
    name = "fdesc",
    author,
    version,
    about = "Describe engineered features in plain English",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Describe the features of a definitions document.
    Describe {
        /// Path to the JSON definitions document.
        definitions: PathBuf,

        /// Metadata file with description and template overrides.
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Only describe the feature with this unique name (repeatable).
        #[arg(long = "feature")]
        features: Vec<String>,

        /// Output format: text or json.
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Get a configuration value.
    Get {
        /// Configuration key.
        key: String,
    },

    /// Reset configuration to defaults.
    Reset,

    /// Show path to config file.
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Describe {
            definitions,
            metadata,
            features,
            format,
        } => {
            let format: OutputFormat = match format {
                Some(format) => format.parse()?,
                None => config.output_format,
            };
            let metadata = metadata.or_else(|| config.metadata_file.clone());
            describe::execute(&definitions, metadata.as_deref(), &features, format)?;
        }

        Commands::Config(config_cmd_inner) => {
            let mut config = config;
            match config_cmd_inner {
                ConfigCommands::Show => {
                    config_cmd::show(&config)?;
                }
                ConfigCommands::Set { key, value } => {
                    config_cmd::set(&mut config, &key, &value)?;
                }
                ConfigCommands::Get { key } => {
                    config_cmd::get(&config, &key)?;
                }
                ConfigCommands::Reset => {
                    config_cmd::reset()?;
                }
                ConfigCommands::Path => {
                    if let Some(path) = Config::config_file_path() {
                        println!("{}", path.display());
                    } else {
                        println!("(no config file path available)");
                    }
                }
            }
        }
    }

    Ok(())
}
