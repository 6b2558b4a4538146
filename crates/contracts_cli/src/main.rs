mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dce")]
#[command(version, about = "Data Contracts CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Report format for `check` and `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Projection written by `export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportTarget {
    /// JSON Schema describing one row
    JsonSchema,
    /// CREATE TABLE statement
    Sql,
    /// Arrow schema
    Arrow,
    /// Column parameters of the validation backend
    Columns,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a contract declaration without validating data
    Check {
        /// Path to the contract file (YAML, JSON or TOML)
        contract: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Validate a CSV or JSON data file against a contract
    Validate {
        /// Path to the contract file (YAML, JSON or TOML)
        contract: PathBuf,

        /// Path to the data file (.csv or .json)
        data: PathBuf,

        /// JSON file with existing primary key and referenced foreign key values
        #[arg(short, long)]
        existing_keys: Option<PathBuf>,

        /// Skip primary key validation
        #[arg(long)]
        skip_primary_key: bool,

        /// Skip foreign key validation
        #[arg(long)]
        skip_foreign_key: bool,

        /// Stop at the first failing step instead of collecting every failure
        #[arg(long)]
        fail_fast: bool,

        /// Validation backend
        #[arg(short, long, default_value = "memory")]
        backend: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Export a contract's table schema to another representation
    Export {
        /// Path to the contract file (YAML, JSON or TOML)
        contract: PathBuf,

        /// Target representation
        #[arg(short, long, value_enum, default_value = "json-schema")]
        target: ExportTarget,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .init();

    match cli.command {
        Commands::Check { contract, format } => commands::check::execute(&contract, format),

        Commands::Validate {
            contract,
            data,
            existing_keys,
            skip_primary_key,
            skip_foreign_key,
            fail_fast,
            backend,
            format,
        } => commands::validate::execute(
            &contract,
            &data,
            &commands::validate::ValidateArgs {
                existing_keys,
                skip_primary_key,
                skip_foreign_key,
                fail_fast,
                backend,
                format,
            },
        ),

        Commands::Export { contract, target } => commands::export::execute(&contract, target),
    }
}
