//! CSV ingest for price and event tables.
//!
//! This module turns a price CSV (`date`, `price`) and an optional event CSV
//! (`date`, `name`, ...) into typed rows.
//!
//! Design goals:
//! - **Strict schema** for required fields (`PipelineError::Format`, fatal)
//! - **No cleaning**: rows come out in file order, duplicates and gaps included
//! - **Missing prices are data**, not errors: empty cells become `price: None`
//!   for the cleaner to drop

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{DateOrder, EventRecord, RawPricePoint};
use crate::error::{PipelineError, Result};
use crate::report::Warning;

/// Cell values read as "missing" in a price column (case-insensitive).
const MISSING_TOKENS: [&str; 6] = ["", ".", "na", "n/a", "nan", "null"];

/// Load a price CSV from disk.
pub fn load_prices(path: &Path, order: DateOrder) -> Result<Vec<RawPricePoint>> {
    let file = open(path)?;
    let rows = load_prices_from_reader(file, order)?;
    debug!(path = %path.display(), rows = rows.len(), "loaded price rows");
    Ok(rows)
}

/// Load price rows from any reader (header row required).
pub fn load_prices_from_reader<R: Read>(reader: R, order: DateOrder) -> Result<Vec<RawPricePoint>> {
    let mut reader = csv_reader(reader);
    let header_map = read_header_map(&mut reader)?;
    ensure_columns(&header_map, &["date", "price"])?;

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| PipelineError::format(Some(line), format!("CSV parse error: {e}")))?;

        let date = parse_date(get_required(&record, &header_map, "date", line)?, order, line)?;
        let price = parse_price(get_optional(&record, &header_map, "price"), line)?;
        out.push(RawPricePoint { date, price });
    }
    Ok(out)
}

/// Load an event CSV from disk.
pub fn load_events(path: &Path, order: DateOrder) -> Result<Vec<EventRecord>> {
    let file = open(path)?;
    let rows = load_events_from_reader(file, order)?;
    debug!(path = %path.display(), rows = rows.len(), "loaded event rows");
    Ok(rows)
}

/// Load event rows from any reader.
///
/// Accepted headers: `date`; `name` | `event` | `label`; optional
/// `category` | `type`, `source`, `description`.
pub fn load_events_from_reader<R: Read>(reader: R, order: DateOrder) -> Result<Vec<EventRecord>> {
    let mut reader = csv_reader(reader);
    let header_map = read_header_map(&mut reader)?;
    ensure_columns(&header_map, &["date"])?;
    let name_col = first_present(&header_map, &["name", "event", "label"])
        .ok_or_else(|| PipelineError::format(None, "Missing required column: `name` (or `event`/`label`)"))?;
    let category_col = first_present(&header_map, &["category", "type"]);

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| PipelineError::format(Some(line), format!("CSV parse error: {e}")))?;

        let date = parse_date(get_required(&record, &header_map, "date", line)?, order, line)?;
        let name = get_required(&record, &header_map, name_col, line)?.to_string();
        let category = category_col
            .and_then(|col| get_optional(&record, &header_map, col))
            .map(str::to_string);

        out.push(EventRecord {
            date,
            name,
            category,
            source: get_optional(&record, &header_map, "source").map(str::to_string),
            description: get_optional(&record, &header_map, "description").map(str::to_string),
        });
    }
    Ok(out)
}

/// Load the event table if one was configured.
///
/// Events are optional: no path, or a path that fails to load, yields an empty
/// set plus a recorded warning so the run continues price-only.
pub fn load_optional_events(
    path: Option<&Path>,
    order: DateOrder,
    warnings: &mut Vec<Warning>,
) -> Vec<EventRecord> {
    let Some(path) = path else {
        warn!("no event source configured; continuing price-only");
        warnings.push(Warning::MissingEventSource);
        return Vec::new();
    };
    match load_events(path, order) {
        Ok(events) => events,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "event source failed to load; continuing price-only");
            warnings.push(Warning::EventSourceFailed(e.to_string()));
            Vec::new()
        }
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn read_header_map<R: Read>(reader: &mut csv::Reader<R>) -> Result<HashMap<String, usize>> {
    let headers = reader
        .headers()
        .map_err(|e| PipelineError::format(Some(1), format!("Failed to read CSV headers: {e}")))?;
    Ok(build_header_map(headers))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for repeated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_columns(header_map: &HashMap<String, usize>, required: &[&str]) -> Result<()> {
    for name in required {
        if !header_map.contains_key(*name) {
            return Err(PipelineError::format(None, format!("Missing required column: `{name}`")));
        }
    }
    Ok(())
}

fn first_present<'a>(header_map: &HashMap<String, usize>, names: &[&'a str]) -> Option<&'a str> {
    names.iter().copied().find(|n| header_map.contains_key(*n))
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
    line: usize,
) -> Result<&'a str> {
    get_optional(record, header_map, name)
        .ok_or_else(|| PipelineError::format(Some(line), format!("Missing required value: `{name}`")))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str, order: DateOrder, line: usize) -> Result<chrono::NaiveDate> {
    order.parse(s).ok_or_else(|| {
        PipelineError::format(
            Some(line),
            format!("Invalid date '{s}'. Accepted formats: {}", order.formats().join(", ")),
        )
    })
}

fn parse_price(s: Option<&str>, line: usize) -> Result<Option<f64>> {
    let Some(s) = s else { return Ok(None) };
    if MISSING_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t)) {
        return Ok(None);
    }
    // Thousands separators show up in some vendor exports ("1,234.5").
    let cleaned = s.replace(',', "");
    let v = cleaned
        .parse::<f64>()
        .map_err(|_| PipelineError::format(Some(line), format!("Non-numeric price '{s}'")))?;
    if v.is_finite() {
        Ok(Some(v))
    } else {
        Err(PipelineError::format(Some(line), format!("Non-finite price '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn loads_prices_in_file_order_with_missing_values() {
        let csv = "\u{feff}Date,Price\n2022-03-02,110\n20-May-87,18.63\n2022-03-01,\n2022-03-01,NA\n";
        let rows = load_prices_from_reader(csv.as_bytes(), DateOrder::DayFirst).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], RawPricePoint { date: d(2022, 3, 2), price: Some(110.0) });
        assert_eq!(rows[1].date, d(1987, 5, 20));
        assert_eq!(rows[2].price, None);
        assert_eq!(rows[3].price, None);
    }

    #[test]
    fn non_numeric_price_is_a_format_error() {
        let csv = "date,price\n2022-03-01,90\n2022-03-02,abc\n";
        let err = load_prices_from_reader(csv.as_bytes(), DateOrder::Iso).unwrap_err();
        match err {
            PipelineError::Format { line, .. } => assert_eq!(line, Some(3)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_or_bad_dates_are_format_errors() {
        let missing_col = "day,price\n2022-03-01,90\n";
        assert!(matches!(
            load_prices_from_reader(missing_col.as_bytes(), DateOrder::Iso),
            Err(PipelineError::Format { .. })
        ));

        let empty_date = "date,price\n,90\n";
        assert!(matches!(
            load_prices_from_reader(empty_date.as_bytes(), DateOrder::Iso),
            Err(PipelineError::Format { line: Some(2), .. })
        ));

        let ambiguous = "date,price\n01/03/2022,90\n";
        assert!(load_prices_from_reader(ambiguous.as_bytes(), DateOrder::Iso).is_err());
        let rows = load_prices_from_reader(ambiguous.as_bytes(), DateOrder::MonthFirst).unwrap();
        assert_eq!(rows[0].date, d(2022, 1, 3));
    }

    #[test]
    fn missing_price_column_is_a_format_error() {
        let csv = "date,value\n2022-03-01,90\n";
        match load_prices_from_reader(csv.as_bytes(), DateOrder::Iso) {
            Err(PipelineError::Format { line: None, message }) => assert!(message.contains("`price`")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn loads_events_with_header_aliases() {
        let csv = "date,event,type,source,description\n\
                   2022-03-01,Russia-Ukraine conflict begins,Geopolitical,News,Supply fears\n\
                   2022-10-01,OPEC+ production cut announced,Economic,,\n";
        let events = load_events_from_reader(csv.as_bytes(), DateOrder::Iso).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "Russia-Ukraine conflict begins");
        assert_eq!(events[0].category.as_deref(), Some("Geopolitical"));
        assert_eq!(events[0].source.as_deref(), Some("News"));
        assert_eq!(events[1].source, None);
        assert_eq!(events[1].description, None);
    }

    #[test]
    fn event_without_name_column_fails() {
        let csv = "date,category\n2022-03-01,Economic\n";
        assert!(load_events_from_reader(csv.as_bytes(), DateOrder::Iso).is_err());
    }

    #[test]
    fn optional_events_degrade_to_warnings() {
        let mut warnings = Vec::new();
        let events = load_optional_events(None, DateOrder::Iso, &mut warnings);
        assert!(events.is_empty());
        assert_eq!(warnings, vec![Warning::MissingEventSource]);

        let mut warnings = Vec::new();
        let missing = Path::new("/definitely/not/here/events.csv");
        let events = load_optional_events(Some(missing), DateOrder::Iso, &mut warnings);
        assert!(events.is_empty());
        assert!(matches!(warnings.as_slice(), [Warning::EventSourceFailed(_)]));
    }

    #[test]
    fn loads_prices_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, "date,price\n2022-02-25,90\n2022-02-28,92\n").unwrap();
        let rows = load_prices(&path, DateOrder::Iso).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].price, Some(92.0));
    }
}
