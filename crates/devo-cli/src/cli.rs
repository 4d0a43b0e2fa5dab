//! CLI argument definitions for the devolutions runner.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use devo_cli::types::DEFAULT_DATE_COLUMN;

#[derive(Parser)]
#[command(
    name = "devo",
    version,
    about = "Devolutions ETL - type the return-note ledger and its document line items",
    long_about = "Read the return-note ledger export and the line items scraped from its\n\
                  documents, map and type both datasets, and stage them as Parquet files\n\
                  named after the sink tables (devolutions, pdf_devolutions)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// TOML file overriding the default transform configuration.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Process the ledger rows of one day (yesterday in UTC by default).
    Daily(DailyArgs),

    /// Process every row of both exports.
    InitialLoad(RunArgs),

    /// Reload a staging directory and check it against the schemas.
    Inspect(InspectArgs),

    /// Print the effective transform configuration as TOML.
    Config,
}

#[derive(Args)]
pub struct RunArgs {
    /// Ledger export (CSV) with the spreadsheet headers.
    #[arg(long = "ledger", value_name = "PATH")]
    pub ledger: PathBuf,

    /// Line-item export (CSV) scraped from the return documents.
    #[arg(long = "line-items", value_name = "PATH")]
    pub line_items: PathBuf,

    /// Directory for the staged Parquet files (default: <TMP>/devo-staging).
    #[arg(long = "staging-dir", value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Keep the staged files after a successful run.
    #[arg(long = "keep-staging")]
    pub keep_staging: bool,
}

#[derive(Args)]
pub struct DailyArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Day to process, as YYYY-MM-DD.
    #[arg(long = "date", value_name = "YYYY-MM-DD", value_parser = parse_day)]
    pub date: Option<NaiveDate>,

    /// Ledger header holding the DD/MM/YYYY day of each row.
    #[arg(long = "date-column", value_name = "HEADER", default_value = DEFAULT_DATE_COLUMN)]
    pub date_column: String,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Staging directory written by a previous run.
    #[arg(value_name = "STAGING_DIR")]
    pub staging_dir: PathBuf,
}

fn parse_day(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{value}': {e}"))
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
