//! Seeded synthetic price/event tables.
//!
//! A business-day log-normal walk with:
//! - a permanent level shock on each event date
//! - rare one-day spikes (data errors the cleaner should clamp)
//! - a few missing prices and one duplicated row (for the cleaner to handle)
//!
//! Same config + same seed -> identical tables.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{EventRecord, RawPricePoint};
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub seed: u64,
    /// Business days to generate.
    pub days: usize,
    pub start: NaiveDate,
    pub base_price: f64,
    /// Daily log-return standard deviation.
    pub daily_vol: f64,
    /// Number of evenly spaced event shocks.
    pub shocks: usize,
    /// Shock size as a log move (sign alternates, starting up).
    pub shock_size: f64,
    /// Probability that a given day is a spike outlier.
    pub spike_prob: f64,
    /// Spike multiplier applied to that day's price only.
    pub spike_k: f64,
    /// Probability that a given day's price is missing.
    pub missing_prob: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            days: 750,
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            base_price: 60.0,
            daily_vol: 0.02,
            shocks: 3,
            shock_size: 0.15,
            spike_prob: 0.01,
            spike_k: 3.0,
            missing_prob: 0.005,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticData {
    pub prices: Vec<RawPricePoint>,
    pub events: Vec<EventRecord>,
}

impl SyntheticData {
    /// Event dates, i.e. natural reference dates for impact analysis.
    pub fn shock_dates(&self) -> Vec<NaiveDate> {
        self.events.iter().map(|e| e.date).collect()
    }
}

pub fn generate_series(config: &SyntheticConfig) -> Result<SyntheticData> {
    if config.days < 2 {
        return Err(PipelineError::Config("synthetic series needs at least 2 days".to_string()));
    }
    if !(config.base_price.is_finite() && config.base_price > 0.0) {
        return Err(PipelineError::Config("base price must be positive".to_string()));
    }
    if !(0.0..1.0).contains(&config.spike_prob) || !(0.0..1.0).contains(&config.missing_prob) {
        return Err(PipelineError::Config("probabilities must be in [0, 1)".to_string()));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.daily_vol.max(0.0))
        .map_err(|e| PipelineError::Config(format!("noise distribution error: {e}")))?;

    let dates = business_days(config.start, config.days);

    // Shocks at evenly spaced interior positions.
    let shock_idx: Vec<usize> = (1..=config.shocks)
        .map(|k| k * config.days / (config.shocks + 1))
        .filter(|&i| i > 0 && i < config.days)
        .collect();

    let mut events = Vec::with_capacity(shock_idx.len());
    let mut prices = Vec::with_capacity(config.days + 1);
    let mut log_level = config.base_price.ln();

    for (i, &date) in dates.iter().enumerate() {
        if i > 0 {
            log_level += normal.sample(&mut rng);
        }
        if let Some(k) = shock_idx.iter().position(|&s| s == i) {
            let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
            log_level += sign * config.shock_size;
            events.push(EventRecord {
                date,
                name: format!("Synthetic shock {}", k + 1),
                category: Some(if sign > 0.0 { "Supply" } else { "Demand" }.to_string()),
                source: Some("synthetic".to_string()),
                description: Some(format!("Level shift of {:+.1}% in log terms", sign * config.shock_size * 100.0)),
            });
        }

        let mut price = log_level.exp();
        if rng.gen_range(0.0..1.0) < config.spike_prob {
            price *= config.spike_k;
        }
        let price = if rng.gen_range(0.0..1.0) < config.missing_prob {
            None
        } else {
            Some(price)
        };
        prices.push(RawPricePoint { date, price });
    }

    // One repeated row so the dedupe path is exercised.
    if let Some(&dup) = prices.get(prices.len() / 2) {
        prices.push(dup);
    }

    Ok(SyntheticData { prices, events })
}

fn business_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut d = start;
    while out.len() < n {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(d);
        }
        d += Duration::days(1);
    }
    out
}
