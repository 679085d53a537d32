//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed from stage to stage as owned snapshots
//! - exported to JSON/CSV for the serving/report layer
//! - rebuilt from exports in tests

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Default trailing window (points) for rolling-IQR winsorization.
pub const DEFAULT_OUTLIER_WINDOW: usize = 90;

/// Default rolling-feature windows (points).
pub const DEFAULT_WINDOWS: [usize; 3] = [7, 30, 90];

/// Default event-match tolerance (calendar days, inclusive).
pub const DEFAULT_TOLERANCE_DAYS: u32 = 7;

/// How ambiguous slash/dash dates are read.
///
/// ISO forms (`YYYY-MM-DD`, `YYYY/MM/DD`) are unambiguous and always accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DateOrder {
    /// Only ISO forms.
    Iso,
    /// `DD/MM/YYYY`, `DD-MM-YYYY`, `20-May-87`, ...
    DayFirst,
    /// `MM/DD/YYYY`, `May 20, 1987`, ...
    MonthFirst,
}

impl DateOrder {
    const ISO: [&'static str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
    const DAY_FIRST: [&'static str; 5] = ["%d/%m/%Y", "%d-%m-%Y", "%d-%b-%y", "%d-%b-%Y", "%d %b %Y"];
    const MONTH_FIRST: [&'static str; 4] = ["%m/%d/%Y", "%m-%d-%Y", "%b %d, %Y", "%b-%d-%Y"];

    /// Formats tried, in order.
    pub fn formats(self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Self::ISO.to_vec();
        match self {
            DateOrder::Iso => {}
            DateOrder::DayFirst => out.extend(Self::DAY_FIRST),
            DateOrder::MonthFirst => out.extend(Self::MONTH_FIRST),
        }
        out
    }

    pub fn parse(self, s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        self.formats()
            .into_iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    }
}

/// A price row as read from the source. `price` is `None` for missing cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPricePoint {
    pub date: NaiveDate,
    pub price: Option<f64>,
}

/// A cleaned observation: one per date, sorted ascending within a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl From<PricePoint> for RawPricePoint {
    fn from(value: PricePoint) -> Self {
        RawPricePoint {
            date: value.date,
            price: Some(value.price),
        }
    }
}

/// A dated real-world event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub date: NaiveDate,
    pub name: String,
    /// Free text such as "Geopolitical" or "Economic".
    pub category: Option<String>,
    pub source: Option<String>,
    pub description: Option<String>,
}

impl EventRecord {
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            category: None,
            source: None,
            description: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Rolling features for one configured window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowFeatures {
    pub window: usize,
    /// Trailing mean of price; `None` until `window` points are available.
    pub moving_average: Option<f64>,
    /// Trailing sample std of log returns scaled by `sqrt(window)`.
    pub volatility: Option<f64>,
}

impl WindowFeatures {
    pub fn ma_column(window: usize) -> String {
        format!("MA_{window}")
    }

    pub fn volatility_column(window: usize) -> String {
        format!("Volatility_{window}")
    }
}

/// A cleaned point plus derived features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedPricePoint {
    pub date: NaiveDate,
    pub price: f64,
    pub year: i32,
    pub month: u32,
    /// 0 = Monday ... 6 = Sunday.
    pub day_of_week: u32,
    pub log_price: f64,
    /// `None` for the first point of the series.
    pub log_return: Option<f64>,
    /// One entry per configured window, in configured order.
    pub windows: Vec<WindowFeatures>,
    /// Most recent event seen at or before this date.
    pub nearest_event_name: Option<String>,
    /// Days since the most recent event; `None` before the first one.
    pub days_since_event: Option<i64>,
    pub is_event_day: bool,
}

impl EnrichedPricePoint {
    pub fn window(&self, window: usize) -> Option<&WindowFeatures> {
        self.windows.iter().find(|w| w.window == window)
    }
}

/// Price shift across a reference date attributed to one matched event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    pub reference_date: NaiveDate,
    pub event: EventRecord,
    /// `event.date - reference_date` in days (negative = event precedes).
    pub event_offset_days: i64,
    pub before_date: NaiveDate,
    pub price_before: f64,
    pub after_date: NaiveDate,
    pub price_after: f64,
    pub percent_change: f64,
}

/// Pipeline settings.
///
/// Built from CLI flags / environment (see `app::pipeline_config_from_args`) or
/// constructed directly by library callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Trailing window (points) for rolling-IQR winsorization.
    pub outlier_window: usize,
    /// Rolling-feature windows, in output order.
    pub windows: Vec<usize>,
    /// Max |event.date - reference_date| in days for an event to match.
    pub tolerance_days: u32,
    pub date_order: DateOrder,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            outlier_window: DEFAULT_OUTLIER_WINDOW,
            windows: DEFAULT_WINDOWS.to_vec(),
            tolerance_days: DEFAULT_TOLERANCE_DAYS,
            date_order: DateOrder::DayFirst,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.outlier_window == 0 {
            return Err(PipelineError::Config("outlier window must be >= 1".to_string()));
        }
        for (idx, &w) in self.windows.iter().enumerate() {
            if w == 0 {
                return Err(PipelineError::Config("rolling windows must be >= 1".to_string()));
            }
            if self.windows[..idx].contains(&w) {
                return Err(PipelineError::Config(format!("rolling window {w} is listed twice")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn date_order_accepts_iso_everywhere() {
        for order in [DateOrder::Iso, DateOrder::DayFirst, DateOrder::MonthFirst] {
            assert_eq!(order.parse("2022-03-01"), Some(d(2022, 3, 1)));
        }
    }

    #[test]
    fn date_order_resolves_ambiguous_dates() {
        assert_eq!(DateOrder::DayFirst.parse("01/03/2022"), Some(d(2022, 3, 1)));
        assert_eq!(DateOrder::MonthFirst.parse("01/03/2022"), Some(d(2022, 1, 3)));
        assert_eq!(DateOrder::Iso.parse("01/03/2022"), None);
        assert_eq!(DateOrder::DayFirst.parse("20-May-87"), Some(d(1987, 5, 20)));
    }

    #[test]
    fn config_validation() {
        assert!(PipelineConfig::default().validate().is_ok());

        let zero_outlier = PipelineConfig {
            outlier_window: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(zero_outlier.validate(), Err(PipelineError::Config(_))));

        let dup = PipelineConfig {
            windows: vec![7, 30, 7],
            ..PipelineConfig::default()
        };
        assert!(matches!(dup.validate(), Err(PipelineError::Config(_))));

        let empty = PipelineConfig {
            windows: vec![],
            ..PipelineConfig::default()
        };
        assert!(empty.validate().is_ok());
    }
}
