//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs the pipeline over files or a synthetic series
//! - prints reports and writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DemoArgs, ExportArgs, PipelineArgs, RunArgs};
use crate::data::{SyntheticConfig, generate_series};
use crate::domain::PipelineConfig;
use crate::error::AppError;

pub mod pipeline;

use pipeline::RunOutput;

/// Entry point for the `cev` binary.
pub fn run() -> Result<(), AppError> {
    // Values from .env feed clap's `env = ...` fallbacks.
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Demo(args) => handle_demo(args),
    }
}

/// Logs go to stderr so stdout stays clean for the reports.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args.pipeline);
    info!(prices = %args.prices.display(), ?config, "starting run");

    let out = pipeline::run_from_files(
        &config,
        &args.prices,
        args.events.as_deref(),
        &args.reference_dates,
    )?;

    print_reports(&out, &config);
    write_exports(&out, &args.export)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args.pipeline);
    let data = generate_series(&SyntheticConfig {
        seed: args.seed,
        days: args.days,
        start: args.start,
        base_price: args.base_price,
        shocks: args.shocks,
        ..SyntheticConfig::default()
    })?;
    info!(seed = args.seed, rows = data.prices.len(), events = data.events.len(), "generated synthetic series");

    // Shock dates are the natural reference dates for the demo.
    let reference_dates = data.shock_dates();
    let out = pipeline::run_with_tables(&config, &data.prices, data.events, &reference_dates)?;

    print_reports(&out, &config);
    write_exports(&out, &args.export)
}

pub fn pipeline_config_from_args(args: &PipelineArgs) -> PipelineConfig {
    PipelineConfig {
        outlier_window: args.outlier_window,
        windows: args.windows.clone(),
        tolerance_days: args.tolerance_days,
        date_order: args.date_order,
    }
}

fn print_reports(out: &RunOutput, config: &PipelineConfig) {
    println!("{}", crate::report::format_summary(&out.summary, &out.cleaned.report));
    if !out.impacts.is_empty() {
        println!("{}", crate::report::format_impacts(&out.impacts, config.tolerance_days));
    }
    if !out.warnings.is_empty() {
        println!("{}", crate::report::format_warnings(&out.warnings));
    }
}

fn write_exports(out: &RunOutput, export: &ExportArgs) -> Result<(), AppError> {
    if let Some(path) = &export.features {
        crate::io::write_features_csv(path, &out.enriched)?;
        info!(path = %path.display(), "wrote features");
    }
    if let Some(path) = &export.impacts {
        crate::io::write_impacts_json(path, &out.impact_results())?;
        info!(path = %path.display(), "wrote impacts");
    }
    if let Some(path) = &export.summary {
        crate::io::write_summary_json(path, &out.summary)?;
        info!(path = %path.display(), "wrote summary");
    }
    Ok(())
}
