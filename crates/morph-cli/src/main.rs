//! # morph-cli
//!
//! Command-line front end for the morph mapping engine.
//!
//! Loads a schema document, converts data between its internal and external
//! representations, and exports cleaned manifests.

mod commands;
mod config;
mod input;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use config::CliConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "morph")]
#[command(about = "Schema-driven data mapping CLI")]
#[command(version)]
struct Cli {
    /// Schema document (YAML or JSON)
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert internal data to the external representation
    FromInternal {
        /// Type name in the schema document
        type_name: String,

        /// Input file (YAML or JSON)
        input: PathBuf,
    },

    /// Convert external data to the internal representation
    ToInternal {
        /// Type name in the schema document
        type_name: String,

        /// Input file (YAML or JSON)
        input: PathBuf,
    },

    /// Print the external and internal fields of a type
    Describe {
        /// Type name in the schema document
        type_name: String,
    },

    /// Clean manifests and emit them as a YAML stream
    Export {
        /// Input files (YAML streams or JSON)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    fn schema_path(&self) -> anyhow::Result<&Path> {
        match &self.schema {
            Some(path) => Ok(path.as_path()),
            None => bail!("--schema is required for this command"),
        }
    }
}

fn log_filter(verbose: u8, config: &CliConfig) -> anyhow::Result<EnvFilter> {
    let directive = match verbose {
        0 => {
            if let Ok(filter) = EnvFilter::try_from_default_env() {
                return Ok(filter);
            }
            config.log_filter.as_deref().unwrap_or("warn")
        }
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::try_new(directive).with_context(|| format!("Invalid log filter {directive:?}"))
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, &config)?)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::FromInternal { type_name, input } => {
            tracing::info!("Converting {} from internal ({})", input.display(), type_name);
            commands::from_internal(cli.schema_path()?, type_name, input)
        }
        Commands::ToInternal { type_name, input } => {
            tracing::info!("Converting {} to internal ({})", input.display(), type_name);
            commands::to_internal(cli.schema_path()?, type_name, input)
        }
        Commands::Describe { type_name } => commands::describe(cli.schema_path()?, type_name),
        Commands::Export { inputs, output } => {
            commands::export(inputs, output.as_deref(), &config.export_config())
        }
    }
}
