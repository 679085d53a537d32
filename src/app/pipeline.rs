//! Shared pipeline logic used by the `run` and `demo` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> clean -> engineer -> {summary, impacts}
//!
//! Each stage takes the previous stage's output by reference and returns a new
//! value; nothing is mutated across stage boundaries.

use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::clean::{CleanedSeries, clean_prices};
use crate::domain::{EnrichedPricePoint, EventRecord, ImpactResult, PipelineConfig, RawPricePoint};
use crate::error::Result;
use crate::features::engineer;
use crate::impact::{ReferenceImpact, quantify_impacts};
use crate::io::ingest::{load_optional_events, load_prices};
use crate::report::{SummaryStats, Warning, summarize};

/// All computed outputs of a single run.
#[derive(Debug)]
pub struct RunOutput {
    pub cleaned: CleanedSeries,
    pub enriched: Vec<EnrichedPricePoint>,
    pub summary: SummaryStats,
    pub impacts: Vec<ReferenceImpact>,
    pub events: Vec<EventRecord>,
    pub warnings: Vec<Warning>,
}

/// Load tables from disk, then run the in-memory pipeline.
///
/// A missing or unreadable event file is a warning, not an error.
pub fn run_from_files(
    config: &PipelineConfig,
    prices_path: &Path,
    events_path: Option<&Path>,
    reference_dates: &[NaiveDate],
) -> Result<RunOutput> {
    config.validate()?;

    let raw = load_prices(prices_path, config.date_order)?;
    let mut warnings = Vec::new();
    let events = load_optional_events(events_path, config.date_order, &mut warnings);

    let mut out = run_with_tables(config, &raw, events, reference_dates)?;
    warnings.append(&mut out.warnings);
    out.warnings = warnings;
    Ok(out)
}

/// Run clean -> engineer -> summary/impacts over in-memory tables.
///
/// Load, clean and engineer failures propagate unchanged. Impact failures are
/// kept per reference date inside `RunOutput::impacts`.
pub fn run_with_tables(
    config: &PipelineConfig,
    raw: &[RawPricePoint],
    events: Vec<EventRecord>,
    reference_dates: &[NaiveDate],
) -> Result<RunOutput> {
    config.validate()?;

    // 1) Clean.
    let cleaned = clean_prices(raw, config.outlier_window);
    let mut warnings = cleaned.report.warnings(config.outlier_window, cleaned.points.len());

    // 2) Engineer features (event attachment included).
    let features = engineer(&cleaned.points, &events, &config.windows)?;
    warnings.extend(features.warnings);

    // 3) Summary and impacts both read the engineered/cleaned tables.
    let summary = summarize(&features.points);
    let impacts = quantify_impacts(&cleaned.points, &events, reference_dates, config.tolerance_days);

    info!(
        points = features.points.len(),
        events = events.len(),
        reference_dates = reference_dates.len(),
        warnings = warnings.len(),
        "pipeline complete"
    );

    Ok(RunOutput {
        cleaned,
        enriched: features.points,
        summary,
        impacts,
        events,
        warnings,
    })
}

impl RunOutput {
    /// Successful impact rows across all reference dates, in order.
    pub fn impact_results(&self) -> Vec<ImpactResult> {
        self.impacts
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok())
            .flatten()
            .cloned()
            .collect()
    }
}
