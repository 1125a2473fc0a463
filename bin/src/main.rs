//! Ronda CLI binary.
//!
//! Provides a command-line interface for inspecting a strategy registry and
//! executing its combinations over CSV market data.

mod cmd;
mod data;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use ronda_composer::{Composer, DEFAULT_CONFIG_PATH};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ronda")]
#[command(about = "Strategy composition and filtering engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Registry configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Output format of the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable table
    Text,
    /// Signals plus the execution report as JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List enabled strategies
    Strategies {
        /// Show role, class, keys and filter
        #[arg(short, long)]
        verbose: bool,
    },

    /// List configured combinations
    Combinations {
        /// Show method and strategies
        #[arg(short, long)]
        verbose: bool,
    },

    /// Describe one combination without running it
    Info {
        /// Combination name
        combination: String,
    },

    /// List configured filters
    Filters,

    /// List built-in strategy classes
    Classes {
        /// Filter by category (trend, reversion, momentum)
        #[arg(short = 'C', long)]
        category: Option<String>,
    },

    /// Execute a combination over a CSV file
    Run {
        /// Combination name
        combination: String,

        /// CSV file with a `timestamp` or `date` column plus indicator columns
        #[arg(short, long)]
        data: PathBuf,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Classes { category } = &cli.command {
        return cmd::catalog::list_classes(category.as_deref());
    }

    let composer = Composer::from_path(&cli.config)?;
    tracing::debug!(config = %cli.config.display(), "registry loaded");

    match cli.command {
        Commands::Strategies { verbose } => cmd::catalog::list_strategies(&composer, verbose)?,
        Commands::Combinations { verbose } => cmd::catalog::list_combinations(&composer, verbose)?,
        Commands::Info { combination } => cmd::catalog::show_combination(&composer, &combination)?,
        Commands::Filters => cmd::catalog::list_filters(&composer)?,
        Commands::Classes { .. } => {}
        Commands::Run {
            combination,
            data,
            start,
            end,
            format,
        } => {
            cmd::run::run_combination(
                &composer,
                &combination,
                &data,
                start.as_deref(),
                end.as_deref(),
                format,
            )?;
        }
    }

    Ok(())
}
