//! Exports for the serving/report layer.
//!
//! - engineered series as a flat CSV (missing values are empty cells)
//! - impact results and summary as pretty JSON

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::{EnrichedPricePoint, ImpactResult, WindowFeatures};
use crate::error::{PipelineError, Result};
use crate::report::SummaryStats;

/// Write the engineered series to CSV.
pub fn write_features_csv(path: &Path, points: &[EnrichedPricePoint]) -> Result<()> {
    let file = create(path)?;
    write_features(file, points).map_err(|e| io_error(path, e.into()))
}

/// Write the engineered series as CSV to any writer.
pub fn write_features<W: Write>(out: W, points: &[EnrichedPricePoint]) -> csv::Result<()> {
    let windows: Vec<usize> = points
        .first()
        .map(|p| p.windows.iter().map(|w| w.window).collect())
        .unwrap_or_default();

    let mut writer = csv::WriterBuilder::new().from_writer(out);

    let mut header = vec![
        "date".to_string(),
        "price".to_string(),
        "year".to_string(),
        "month".to_string(),
        "day_of_week".to_string(),
        "log_price".to_string(),
        "log_return".to_string(),
    ];
    header.extend(windows.iter().map(|&w| WindowFeatures::ma_column(w)));
    header.extend(windows.iter().map(|&w| WindowFeatures::volatility_column(w)));
    header.extend(["nearest_event_name", "days_since_event", "is_event_day"].map(str::to_string));
    writer.write_record(&header)?;

    for p in points {
        let mut row = vec![
            p.date.to_string(),
            format!("{:.6}", p.price),
            p.year.to_string(),
            p.month.to_string(),
            p.day_of_week.to_string(),
            format!("{:.10}", p.log_price),
            fmt_opt(p.log_return),
        ];
        row.extend(p.windows.iter().map(|w| fmt_opt(w.moving_average)));
        row.extend(p.windows.iter().map(|w| fmt_opt(w.volatility)));
        row.push(p.nearest_event_name.clone().unwrap_or_default());
        row.push(p.days_since_event.map(|d| d.to_string()).unwrap_or_default());
        row.push(p.is_event_day.to_string());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write impact results to JSON.
pub fn write_impacts_json(path: &Path, impacts: &[ImpactResult]) -> Result<()> {
    write_json(path, impacts)
}

/// Write the summary to JSON.
pub fn write_summary_json(path: &Path, summary: &SummaryStats) -> Result<()> {
    write_json(path, summary)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut out = BufWriter::new(create(path)?);
    serde_json::to_writer_pretty(&mut out, value).map_err(|e| io_error(path, std::io::Error::other(e)))?;
    out.flush().map_err(|source| io_error(path, source))
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.10}")).unwrap_or_default()
}
