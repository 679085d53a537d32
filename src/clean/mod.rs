//! Series cleaning: missing values, ordering, uniqueness, and outlier suppression.
//!
//! Steps, in order:
//! 1. drop rows with a missing price (counted, never fatal)
//! 2. stable sort ascending by date
//! 3. dedupe by date, keeping the first row of each date after the sort
//! 4. rolling-IQR winsorization (`winsorize`)
//!
//! The output is sorted with strictly increasing dates, which is what
//! `features::engineer` and `impact` rely on.

use tracing::{debug, info, warn};

use crate::domain::{PricePoint, RawPricePoint};
use crate::report::Warning;

pub mod winsorize;

pub use winsorize::*;

/// What the cleaner did.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CleanReport {
    pub rows_in: usize,
    pub dropped_missing: usize,
    pub duplicates_removed: usize,
    /// Prices changed by winsorization.
    pub clipped: usize,
    /// False when the series was shorter than the outlier window.
    pub winsorized: bool,
}

impl CleanReport {
    /// Warnings a run should record for this report.
    pub fn warnings(&self, outlier_window: usize, len: usize) -> Vec<Warning> {
        let mut out = Vec::new();
        if self.dropped_missing > 0 {
            out.push(Warning::DroppedMissingPrices(self.dropped_missing));
        }
        if self.duplicates_removed > 0 {
            out.push(Warning::DuplicateDates(self.duplicates_removed));
        }
        if !self.winsorized {
            out.push(Warning::OutlierWindowNotFilled {
                window: outlier_window,
                len,
            });
        }
        out
    }
}

/// Cleaned series plus what happened to it.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CleanedSeries {
    pub points: Vec<PricePoint>,
    pub report: CleanReport,
}

/// Clean a raw price table. Never fails; `outlier_window == 0` is treated as 1.
pub fn clean_prices(raw: &[RawPricePoint], outlier_window: usize) -> CleanedSeries {
    let outlier_window = outlier_window.max(1);
    let rows_in = raw.len();

    // 1) Drop missing prices.
    let mut points: Vec<PricePoint> = raw
        .iter()
        .filter_map(|r| r.price.map(|price| PricePoint { date: r.date, price }))
        .collect();
    let dropped_missing = rows_in - points.len();
    if dropped_missing > 0 {
        warn!(dropped = dropped_missing, "dropped rows with missing price");
    }

    // 2) + 3) Stable sort, then keep the first row per date.
    points.sort_by_key(|p| p.date);
    let before_dedup = points.len();
    points.dedup_by_key(|p| p.date);
    let duplicates_removed = before_dedup - points.len();
    if duplicates_removed > 0 {
        warn!(removed = duplicates_removed, "removed duplicate dates (kept first occurrence)");
    }

    debug!(rows = points.len(), "sorted and deduplicated");

    // 4) Winsorize.
    let winsorized = points.len() >= outlier_window;
    let (points, clipped) = if winsorized {
        winsorize(&points, outlier_window)
    } else {
        warn!(
            len = points.len(),
            window = outlier_window,
            "series shorter than outlier window; skipping winsorization"
        );
        (points, 0)
    };

    info!(
        rows_in,
        rows_out = points.len(),
        clipped,
        "cleaned price series"
    );

    CleanedSeries {
        points,
        report: CleanReport {
            rows_in,
            dropped_missing,
            duplicates_removed,
            clipped,
            winsorized,
        },
    }
}
