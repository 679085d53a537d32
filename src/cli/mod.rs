//! Command-line parsing for the commodity price/event pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the cleaning/feature/impact code.
//!
//! Every pipeline setting can also come from the environment (`CEV_*`), which
//! `app::run` pre-loads from a `.env` file when present.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_OUTLIER_WINDOW, DEFAULT_TOLERANCE_DAYS, DateOrder};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cev", version, about = "Commodity price cleaning, features, and event impact")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clean a price CSV, engineer features, and quantify event impacts.
    Run(RunArgs),
    /// Run the same pipeline over a seeded synthetic series with known shocks.
    Demo(DemoArgs),
}

/// Pipeline settings shared by `run` and `demo`.
#[derive(Debug, Args, Clone)]
pub struct PipelineArgs {
    /// Trailing window (points) for rolling-IQR winsorization.
    #[arg(long, env = "CEV_OUTLIER_WINDOW", default_value_t = DEFAULT_OUTLIER_WINDOW)]
    pub outlier_window: usize,

    /// Rolling-feature windows, comma separated.
    #[arg(long, env = "CEV_WINDOWS", value_delimiter = ',', default_value = "7,30,90")]
    pub windows: Vec<usize>,

    /// Max distance (calendar days) between an event and a reference date.
    #[arg(long, env = "CEV_TOLERANCE_DAYS", default_value_t = DEFAULT_TOLERANCE_DAYS)]
    pub tolerance_days: u32,

    /// How non-ISO dates are read.
    #[arg(long, env = "CEV_DATE_ORDER", value_enum, default_value_t = DateOrder::DayFirst)]
    pub date_order: DateOrder,
}

/// Options for a file-driven run.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Price CSV with `date` and `price` columns.
    #[arg(long, value_name = "CSV")]
    pub prices: PathBuf,

    /// Event CSV with `date` and `name` columns. Optional; runs price-only without it.
    #[arg(long, value_name = "CSV")]
    pub events: Option<PathBuf>,

    /// Reference date for impact analysis (repeatable, YYYY-MM-DD).
    #[arg(short = 'r', long = "reference-date", value_name = "DATE", value_parser = parse_iso_date)]
    pub reference_dates: Vec<NaiveDate>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    #[command(flatten)]
    pub export: ExportArgs,
}

/// Options for the synthetic demo.
#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Random seed for the synthetic series.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of business days to generate.
    #[arg(long, default_value_t = 750)]
    pub days: usize,

    /// First calendar date of the series.
    #[arg(long, value_parser = parse_iso_date, default_value = "2020-01-01")]
    pub start: NaiveDate,

    /// Starting price level.
    #[arg(long, default_value_t = 60.0)]
    pub base_price: f64,

    /// Number of evenly spaced event shocks.
    #[arg(long, default_value_t = 3)]
    pub shocks: usize,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    #[command(flatten)]
    pub export: ExportArgs,
}

/// Optional output files.
#[derive(Debug, Args, Clone, Default)]
pub struct ExportArgs {
    /// Export the engineered series to CSV.
    #[arg(long = "export-features", value_name = "CSV")]
    pub features: Option<PathBuf>,

    /// Export successful impact results to JSON.
    #[arg(long = "export-impacts", value_name = "JSON")]
    pub impacts: Option<PathBuf>,

    /// Export the summary statistics to JSON.
    #[arg(long = "export-summary", value_name = "JSON")]
    pub summary: Option<PathBuf>,
}

fn parse_iso_date(s: &str) -> Result<NaiveDate, String> {
    DateOrder::Iso
        .parse(s)
        .ok_or_else(|| format!("invalid date '{s}' (expected YYYY-MM-DD)"))
}
