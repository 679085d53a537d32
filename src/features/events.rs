//! Event attachment.
//!
//! A single forward fold over a date-sorted series. The accumulator carries the
//! most recent event (date + name) seen so far; each point either matches an
//! event on its exact date (and resets the accumulator) or inherits it.
//! No lookahead, no reordering by event date.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::EventRecord;

/// Event fields attached to one price date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTag {
    pub nearest_event_name: Option<String>,
    pub days_since_event: Option<i64>,
    pub is_event_day: bool,
}

#[derive(Debug, Clone, Default)]
struct LastEvent<'a> {
    date: Option<NaiveDate>,
    name: Option<&'a str>,
}

/// Tag each date with its most recent event. `dates` must be ascending.
///
/// When several events share a date, the first in `events` order wins.
/// Returns the tags plus how many distinct event dates never matched a price date.
pub fn attach_events(dates: &[NaiveDate], events: &[EventRecord]) -> (Vec<EventTag>, usize) {
    let mut by_date: HashMap<NaiveDate, &str> = HashMap::with_capacity(events.len());
    for e in events {
        by_date.entry(e.date).or_insert(e.name.as_str());
    }

    let mut matched = 0usize;
    let tags = dates
        .iter()
        .scan(LastEvent::default(), |last, &date| {
            let hit = by_date.get(&date).copied();
            if let Some(name) = hit {
                matched += 1;
                *last = LastEvent {
                    date: Some(date),
                    name: Some(name),
                };
            }
            Some(EventTag {
                nearest_event_name: last.name.map(str::to_string),
                days_since_event: last.date.map(|d| (date - d).num_days()),
                is_event_day: hit.is_some(),
            })
        })
        .collect();

    let unmatched = by_date.len().saturating_sub(matched);
    (tags, unmatched)
}
