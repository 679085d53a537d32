//! Event impact quantification around reference dates.
//!
//! For a reference date `R` and tolerance `T` days:
//! - matched events: `|event.date - R| <= T` (inclusive)
//! - `price_before`: last observation strictly before `R`
//! - `price_after`: first observation on or after `R`
//! - `percent_change = (after - before) / before * 100`
//!
//! The shift belongs to the date, not to any one event: every event matched to
//! the same `R` reports the same before/after prices.

use chrono::{Duration, NaiveDate};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::{EventRecord, ImpactResult, PricePoint};
use crate::error::{HistorySide, PipelineError, Result};

/// Outcome for one reference date in a batch.
#[derive(Debug)]
pub struct ReferenceImpact {
    pub reference_date: NaiveDate,
    pub outcome: Result<Vec<ImpactResult>>,
}

/// Events within `tolerance_days` of `reference_date`, in input order.
pub fn select_events<'a>(
    events: &'a [EventRecord],
    reference_date: NaiveDate,
    tolerance_days: u32,
) -> Vec<&'a EventRecord> {
    let tol = i64::from(tolerance_days);
    events
        .iter()
        .filter(|e| (e.date - reference_date).num_days().abs() <= tol)
        .collect()
}

/// Quantify the price shift across `reference_date` for each nearby event.
///
/// `prices` must be date-ascending with unique dates (cleaner output).
/// No matched events gives `Ok(vec![])` without touching the price series.
pub fn quantify_impact(
    prices: &[PricePoint],
    events: &[EventRecord],
    reference_date: NaiveDate,
    tolerance_days: u32,
) -> Result<Vec<ImpactResult>> {
    let matched = select_events(events, reference_date, tolerance_days);
    if matched.is_empty() {
        debug!(%reference_date, tolerance_days, "no events within tolerance");
        return Ok(Vec::new());
    }

    let split = prices.partition_point(|p| p.date < reference_date);
    let before = split
        .checked_sub(1)
        .map(|i| prices[i])
        .ok_or(PipelineError::InsufficientHistory {
            reference_date,
            side: HistorySide::Before,
        })?;
    let after = prices.get(split).copied().ok_or(PipelineError::InsufficientHistory {
        reference_date,
        side: HistorySide::After,
    })?;

    let percent_change = (after.price - before.price) / before.price * 100.0;

    Ok(matched
        .into_iter()
        .map(|event| ImpactResult {
            reference_date,
            event: event.clone(),
            event_offset_days: (event.date - reference_date).num_days(),
            before_date: before.date,
            price_before: before.price,
            after_date: after.date,
            price_after: after.price,
            percent_change,
        })
        .collect())
}

/// Evaluate many reference dates independently (in parallel).
///
/// Each date's failure stays with that date; results keep the input order.
pub fn quantify_impacts(
    prices: &[PricePoint],
    events: &[EventRecord],
    reference_dates: &[NaiveDate],
    tolerance_days: u32,
) -> Vec<ReferenceImpact> {
    reference_dates
        .par_iter()
        .map(|&reference_date| {
            let outcome = quantify_impact(prices, events, reference_date, tolerance_days);
            if let Err(e) = &outcome {
                warn!(%reference_date, error = %e, "impact analysis failed for reference date");
            }
            ReferenceImpact {
                reference_date,
                outcome,
            }
        })
        .collect()
}

/// Window `[reference - tolerance, reference + tolerance]` as dates, clamped to
/// the representable calendar.
pub fn tolerance_window(reference_date: NaiveDate, tolerance_days: u32) -> (NaiveDate, NaiveDate) {
    let tol = Duration::days(i64::from(tolerance_days));
    (
        reference_date.checked_sub_signed(tol).unwrap_or(NaiveDate::MIN),
        reference_date.checked_add_signed(tol).unwrap_or(NaiveDate::MAX),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn prices() -> Vec<PricePoint> {
        vec![
            PricePoint { date: d(2022, 2, 25), price: 90.0 },
            PricePoint { date: d(2022, 2, 28), price: 92.0 },
            PricePoint { date: d(2022, 3, 1), price: 117.25 },
            PricePoint { date: d(2022, 3, 2), price: 110.0 },
        ]
    }

    #[test]
    fn conflict_scenario() {
        let events = vec![EventRecord::new(d(2022, 3, 1), "Conflict begins")];
        let out = quantify_impact(&prices(), &events, d(2022, 3, 1), 7).unwrap();
        assert_eq!(out.len(), 1);
        let r = &out[0];
        assert_eq!(r.price_before, 92.0);
        assert_eq!(r.before_date, d(2022, 2, 28));
        assert_eq!(r.price_after, 117.25);
        assert_eq!(r.after_date, d(2022, 3, 1));
        assert!((r.percent_change - 27.445652173913043).abs() < 1e-9);
        assert_eq!(r.event_offset_days, 0);
    }

    #[test]
    fn reference_before_series_start_is_insufficient_history() {
        let events = vec![EventRecord::new(d(2022, 2, 20), "Early")];
        let err = quantify_impact(&prices(), &events, d(2022, 2, 20), 7).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InsufficientHistory { side: HistorySide::Before, .. }
        ));
    }

    #[test]
    fn reference_after_series_end_is_insufficient_history() {
        let events = vec![EventRecord::new(d(2022, 3, 10), "Late")];
        let err = quantify_impact(&prices(), &events, d(2022, 3, 10), 7).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InsufficientHistory { side: HistorySide::After, .. }
        ));
    }

    #[test]
    fn no_events_in_tolerance_is_empty_not_error() {
        let events = vec![EventRecord::new(d(2022, 6, 1), "Far away")];
        // Even outside series coverage, an empty match short-circuits.
        let out = quantify_impact(&prices(), &events, d(2020, 1, 1), 7).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn tolerance_is_inclusive_on_both_sides() {
        let r = d(2022, 3, 1);
        let events = vec![
            EventRecord::new(d(2022, 2, 22), "minus 7"),
            EventRecord::new(d(2022, 2, 21), "minus 8"),
            EventRecord::new(d(2022, 3, 8), "plus 7"),
            EventRecord::new(d(2022, 3, 9), "plus 8"),
        ];
        let names: Vec<&str> = select_events(&events, r, 7).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["minus 7", "plus 7"]);
        assert_eq!(tolerance_window(r, 7), (d(2022, 2, 22), d(2022, 3, 8)));
    }

    #[test]
    fn huge_tolerance_clamps_to_calendar_bounds() {
        let r = d(2022, 3, 1);
        assert_eq!(tolerance_window(r, 200_000_000), (NaiveDate::MIN, NaiveDate::MAX));
        assert_eq!(tolerance_window(r, u32::MAX), (NaiveDate::MIN, NaiveDate::MAX));

        let events = vec![EventRecord::new(d(1990, 8, 2), "Far but inside")];
        let out = quantify_impact(&prices(), &events, r, u32::MAX).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn multiple_events_share_the_same_shift() {
        let events = vec![
            EventRecord::new(d(2022, 2, 28), "A").with_category("Geopolitical"),
            EventRecord::new(d(2022, 3, 2), "B").with_category("Economic"),
        ];
        let out = quantify_impact(&prices(), &events, d(2022, 3, 1), 7).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].percent_change, out[1].percent_change);
        assert_eq!(out[0].event_offset_days, -1);
        assert_eq!(out[1].event_offset_days, 1);
    }

    #[test]
    fn batch_scopes_failures_per_date() {
        let events = vec![
            EventRecord::new(d(2022, 3, 1), "Conflict begins"),
            EventRecord::new(d(2022, 2, 20), "Early"),
        ];
        let dates = [d(2022, 3, 1), d(2022, 2, 18), d(2023, 1, 1)];
        let out = quantify_impacts(&prices(), &events, &dates, 7);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].reference_date, d(2022, 3, 1));
        // 2022-02-20 is 9 days from 2022-03-01, so only one event matches there.
        assert_eq!(out[0].outcome.as_ref().unwrap().len(), 1);
        assert!(matches!(out[1].outcome, Err(PipelineError::InsufficientHistory { .. })));
        assert!(out[2].outcome.as_ref().unwrap().is_empty());
    }
}
