//! Feature engineering on a cleaned series.
//!
//! For each point:
//! - calendar fields (year, month, day-of-week)
//! - `log_price = ln(price)` and `log_return[i] = log_price[i] - log_price[i-1]`
//! - per configured window `w`: trailing mean of price, and trailing sample std
//!   of log returns scaled by `sqrt(w)`
//! - event tags (see `events`)
//!
//! Output is a pure function of the inputs and the window list.
//!
//! The first `w - 1` moving averages and the first `w` volatilities of every
//! window are always missing; that is the shape of the output, not a finding.
//! `Warning::InsufficientWindowHistory` is recorded only when the whole series is
//! shorter than `w`, i.e. when the window never fills and its columns are
//! missing end to end.

use chrono::Datelike;
use tracing::{debug, info, warn};

use crate::domain::{EnrichedPricePoint, EventRecord, PricePoint, WindowFeatures};
use crate::error::{PipelineError, Result};
use crate::math::{sample_std, trailing_apply, trailing_mean};
use crate::report::Warning;

pub mod events;

pub use events::*;

/// Engineered series plus non-fatal findings.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureOutput {
    pub points: Vec<EnrichedPricePoint>,
    pub warnings: Vec<Warning>,
}

/// Derive features for a cleaned, date-ascending series.
///
/// Fails with `PipelineError::Domain` if any price is not a positive finite
/// number; the cleaner never produces one from sane input, so this signals an
/// upstream invariant violation.
pub fn engineer(prices: &[PricePoint], events: &[EventRecord], windows: &[usize]) -> Result<FeatureOutput> {
    let mut warnings = Vec::new();

    let log_prices = prices
        .iter()
        .map(|p| {
            if p.price.is_finite() && p.price > 0.0 {
                Ok(p.price.ln())
            } else {
                Err(PipelineError::Domain {
                    date: p.date,
                    price: p.price,
                })
            }
        })
        .collect::<Result<Vec<f64>>>()?;

    let log_returns: Vec<Option<f64>> = std::iter::once(None)
        .chain(log_prices.windows(2).map(|w| Some(w[1] - w[0])))
        .take(prices.len())
        .collect();

    let raw_prices: Vec<f64> = prices.iter().map(|p| p.price).collect();
    let per_window: Vec<(usize, Vec<Option<f64>>, Vec<Option<f64>>)> = windows
        .iter()
        .map(|&w| {
            if prices.len() < w {
                warn!(window = w, len = prices.len(), "series shorter than rolling window");
                warnings.push(Warning::InsufficientWindowHistory { window: w, len: prices.len() });
            }
            let scale = (w as f64).sqrt();
            let ma = trailing_mean(&raw_prices, w);
            let vol = trailing_apply(&log_returns, w, |slice| sample_std(slice).map(|s| s * scale));
            (w, ma, vol)
        })
        .collect();

    let dates: Vec<_> = prices.iter().map(|p| p.date).collect();
    let (tags, unmatched) = attach_events(&dates, events);
    if unmatched > 0 {
        warn!(unmatched, "events whose date has no price observation were not attached");
        warnings.push(Warning::UnmatchedEvents(unmatched));
    }

    let points: Vec<EnrichedPricePoint> = prices
        .iter()
        .zip(tags)
        .enumerate()
        .map(|(i, (p, tag))| EnrichedPricePoint {
            date: p.date,
            price: p.price,
            year: p.date.year(),
            month: p.date.month(),
            day_of_week: p.date.weekday().num_days_from_monday(),
            log_price: log_prices[i],
            log_return: log_returns[i],
            windows: per_window
                .iter()
                .map(|(w, ma, vol)| WindowFeatures {
                    window: *w,
                    moving_average: ma[i],
                    volatility: vol[i],
                })
                .collect(),
            nearest_event_name: tag.nearest_event_name,
            days_since_event: tag.days_since_event,
            is_event_day: tag.is_event_day,
        })
        .collect();

    debug!(windows = ?windows, events = events.len(), "engineered features");
    info!(points = points.len(), "feature engineering complete");

    Ok(FeatureOutput { points, warnings })
}
