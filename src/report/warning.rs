//! Non-fatal findings recorded during a run.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Warning {
    /// No event table was configured.
    MissingEventSource,
    /// The event table could not be loaded; the run continued price-only.
    EventSourceFailed(String),
    DroppedMissingPrices(usize),
    DuplicateDates(usize),
    /// Fewer points than the outlier window: no winsorization happened.
    OutlierWindowNotFilled { window: usize, len: usize },
    /// Fewer points than a rolling window: that window's features are all missing.
    InsufficientWindowHistory { window: usize, len: usize },
    /// Event dates with no matching price date.
    UnmatchedEvents(usize),
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::MissingEventSource => write!(f, "no event source configured; running price-only"),
            Warning::EventSourceFailed(msg) => write!(f, "event source failed to load ({msg}); running price-only"),
            Warning::DroppedMissingPrices(n) => write!(f, "dropped {n} row(s) with missing price"),
            Warning::DuplicateDates(n) => write!(f, "removed {n} duplicate date row(s), kept first occurrence"),
            Warning::OutlierWindowNotFilled { window, len } => {
                write!(f, "series has {len} point(s) < outlier window {window}; prices not winsorized")
            }
            Warning::InsufficientWindowHistory { window, len } => {
                write!(f, "series has {len} point(s) < rolling window {window}; MA/volatility undefined")
            }
            Warning::UnmatchedEvents(n) => write!(f, "{n} event date(s) have no price observation and were not attached"),
        }
    }
}
