//! Descriptive statistics over an engineered series.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{EnrichedPricePoint, WindowFeatures};
use crate::math::{mean, pearson, quantile_sorted, sample_std, sorted_copy};

/// Distribution of the (cleaned) price column. Everything but `count` is `None`
/// for an empty series; `std` also needs two points.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
}

/// Square matrix of pairwise-complete Pearson coefficients.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `values[i][j]` correlates `columns[i]` with `columns[j]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub price: PriceStats,
    pub span: Option<DateSpan>,
    /// `(column, missing count)` in column order.
    pub missing: Vec<(String, usize)>,
    pub correlation: CorrelationMatrix,
}

impl SummaryStats {
    pub fn missing_for(&self, column: &str) -> Option<usize> {
        self.missing.iter().find(|(c, _)| c == column).map(|(_, n)| *n)
    }
}

/// Numeric derived columns, in a stable order:
/// `price, log_price, log_return, MA_*, Volatility_*, days_since_event`.
pub fn numeric_columns(points: &[EnrichedPricePoint]) -> Vec<(String, Vec<Option<f64>>)> {
    let windows: Vec<usize> = points
        .first()
        .map(|p| p.windows.iter().map(|w| w.window).collect())
        .unwrap_or_default();

    let mut cols: Vec<(String, Vec<Option<f64>>)> = vec![
        ("price".to_string(), points.iter().map(|p| Some(p.price)).collect()),
        ("log_price".to_string(), points.iter().map(|p| Some(p.log_price)).collect()),
        ("log_return".to_string(), points.iter().map(|p| p.log_return).collect()),
    ];
    for (idx, &w) in windows.iter().enumerate() {
        cols.push((
            WindowFeatures::ma_column(w),
            points.iter().map(|p| p.windows.get(idx).and_then(|f| f.moving_average)).collect(),
        ));
    }
    for (idx, &w) in windows.iter().enumerate() {
        cols.push((
            WindowFeatures::volatility_column(w),
            points.iter().map(|p| p.windows.get(idx).and_then(|f| f.volatility)).collect(),
        ));
    }
    cols.push((
        "days_since_event".to_string(),
        points.iter().map(|p| p.days_since_event.map(|d| d as f64)).collect(),
    ));
    cols
}

/// Summarize an engineered series. Pure; empty input gives an all-`None` summary.
pub fn summarize(points: &[EnrichedPricePoint]) -> SummaryStats {
    let prices: Vec<f64> = points.iter().map(|p| p.price).collect();
    let sorted = sorted_copy(&prices);

    let price = PriceStats {
        count: prices.len(),
        mean: mean(&prices),
        std: sample_std(&prices),
        min: sorted.first().copied(),
        q25: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q75: quantile_sorted(&sorted, 0.75),
        max: sorted.last().copied(),
    };

    let span = match (points.first(), points.last()) {
        (Some(first), Some(last)) => Some(DateSpan {
            start: first.date,
            end: last.date,
            days: (last.date - first.date).num_days(),
        }),
        _ => None,
    };

    let columns = numeric_columns(points);

    let mut missing: Vec<(String, usize)> = columns
        .iter()
        .map(|(name, values)| (name.clone(), values.iter().filter(|v| v.is_none()).count()))
        .collect();
    // The only non-numeric derived column.
    missing.insert(
        missing.len() - 1,
        (
            "nearest_event_name".to_string(),
            points.iter().filter(|p| p.nearest_event_name.is_none()).count(),
        ),
    );

    let correlation = CorrelationMatrix {
        columns: columns.iter().map(|(name, _)| name.clone()).collect(),
        values: columns
            .iter()
            .map(|(_, a)| columns.iter().map(|(_, b)| pearson(a, b)).collect())
            .collect(),
    };

    SummaryStats {
        price,
        span,
        missing,
        correlation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventRecord, PricePoint};
    use crate::features::engineer;
    use chrono::Duration;

    fn enriched(prices: &[f64], windows: &[usize]) -> Vec<EnrichedPricePoint> {
        let start = NaiveDate::from_ymd_opt(2022, 2, 25).unwrap();
        let points: Vec<PricePoint> = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                date: start + Duration::days(i as i64),
                price,
            })
            .collect();
        let events = vec![EventRecord::new(start + Duration::days(2), "E")];
        engineer(&points, &events, windows).unwrap().points
    }

    #[test]
    fn price_stats_and_span() {
        let s = summarize(&enriched(&[1.0, 2.0, 3.0, 4.0], &[2]));
        assert_eq!(s.price.count, 4);
        assert!((s.price.mean.unwrap() - 2.5).abs() < 1e-12);
        assert_eq!(s.price.min, Some(1.0));
        assert_eq!(s.price.max, Some(4.0));
        assert!((s.price.q25.unwrap() - 1.75).abs() < 1e-12);
        assert!((s.price.median.unwrap() - 2.5).abs() < 1e-12);
        assert!((s.price.q75.unwrap() - 3.25).abs() < 1e-12);

        let span = s.span.unwrap();
        assert_eq!(span.days, 3);
        assert_eq!(span.end - span.start, Duration::days(3));
    }

    #[test]
    fn missing_counts_per_column() {
        let s = summarize(&enriched(&[1.0, 2.0, 3.0, 4.0], &[2]));
        assert_eq!(s.missing_for("price"), Some(0));
        assert_eq!(s.missing_for("log_return"), Some(1));
        assert_eq!(s.missing_for("MA_2"), Some(1));
        assert_eq!(s.missing_for("Volatility_2"), Some(2));
        assert_eq!(s.missing_for("nearest_event_name"), Some(2));
        assert_eq!(s.missing_for("days_since_event"), Some(2));
        let names: Vec<&str> = s.missing.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names.last(), Some(&"days_since_event"));
    }

    #[test]
    fn correlation_matrix_shape_and_diagonal() {
        let s = summarize(&enriched(&[10.0, 12.0, 11.0, 15.0, 14.0, 18.0], &[2, 3]));
        let cols = &s.correlation.columns;
        assert_eq!(
            cols,
            &vec!["price", "log_price", "log_return", "MA_2", "MA_3", "Volatility_2", "Volatility_3", "days_since_event"]
        );
        assert_eq!(s.correlation.values.len(), cols.len());
        assert!((s.correlation.get("price", "price").unwrap() - 1.0).abs() < 1e-12);
        // ln is monotone; with this spread the linear fit is close to perfect.
        assert!(s.correlation.get("price", "log_price").unwrap() > 0.99);
        assert_eq!(s.correlation.get("price", "log_price"), s.correlation.get("log_price", "price"));
    }

    #[test]
    fn empty_input_does_not_fail() {
        let s = summarize(&[]);
        assert_eq!(s.price.count, 0);
        assert_eq!(s.price.mean, None);
        assert_eq!(s.price.std, None);
        assert_eq!(s.span, None);
        assert!(s.missing.iter().all(|(_, n)| *n == 0));
    }
}
