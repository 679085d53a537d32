//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the cleaning/feature code stays clean and testable
//! - output changes are localized

use crate::clean::CleanReport;
use crate::impact::{ReferenceImpact, tolerance_window};
use crate::report::{SummaryStats, Warning};

/// Format the run summary: cleaning counts, price stats, span, missing values,
/// and the correlation table.
pub fn format_summary(summary: &SummaryStats, clean: &CleanReport) -> String {
    let mut out = String::new();

    out.push_str("=== cev - Price Series Summary ===\n");
    out.push_str(&format!(
        "Rows: in={} | dropped(missing)={} | duplicates={} | clipped={}{}\n",
        clean.rows_in,
        clean.dropped_missing,
        clean.duplicates_removed,
        clean.clipped,
        if clean.winsorized { "" } else { " (not winsorized)" },
    ));

    match summary.span {
        Some(span) => out.push_str(&format!(
            "Span: {} .. {} ({} days)\n",
            span.start, span.end, span.days
        )),
        None => out.push_str("Span: -\n"),
    }

    let p = &summary.price;
    out.push_str(&format!(
        "Price: n={} mean={} std={} min={} q25={} median={} q75={} max={}\n",
        p.count,
        fmt_opt(p.mean, 2),
        fmt_opt(p.std, 2),
        fmt_opt(p.min, 2),
        fmt_opt(p.q25, 2),
        fmt_opt(p.median, 2),
        fmt_opt(p.q75, 2),
        fmt_opt(p.max, 2),
    ));

    out.push_str("\nMissing values:\n");
    for (column, n) in &summary.missing {
        out.push_str(&format!("  {:<20} {:>8}\n", column, n));
    }

    let cols = &summary.correlation.columns;
    if !cols.is_empty() {
        out.push_str("\nCorrelation (pairwise Pearson):\n");
        let mut header = format!("{:<18}", "");
        for c in cols {
            header.push_str(&format!(" {:>10}", truncate(c, 10)));
        }
        out.push_str(header.trim_end());
        out.push('\n');
        for (c, row) in cols.iter().zip(&summary.correlation.values) {
            let mut line = format!("{:<18}", truncate(c, 18));
            for v in row {
                line.push_str(&format!(" {:>10}", fmt_opt(*v, 3)));
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }

    out
}

/// Format impact results, one row per matched event.
pub fn format_impacts(impacts: &[ReferenceImpact], tolerance_days: u32) -> String {
    let mut out = String::new();
    out.push_str(&format!("Event impact (tolerance ±{tolerance_days}d):\n"));

    if impacts.is_empty() {
        out.push_str("  (no reference dates)\n");
        return out;
    }

    out.push_str(
        format!(
            "{:<10} {:<32} {:>6} {:>10} {:>10} {:>9}\n",
            "reference", "event", "offset", "before", "after", "change"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<10} {:-<32} {:-<6} {:-<10} {:-<10} {:-<9}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for item in impacts {
        match &item.outcome {
            Ok(results) if results.is_empty() => {
                let (from, to) = tolerance_window(item.reference_date, tolerance_days);
                out.push_str(&format!("{:<10} (no events between {from} and {to})\n", item.reference_date));
            }
            Ok(results) => {
                for r in results {
                    out.push_str(
                        format!(
                            "{:<10} {:<32} {:>+6} {:>10} {:>10} {:>+8.2}%\n",
                            r.reference_date,
                            truncate(&r.event.name, 32),
                            r.event_offset_days,
                            format!("${:.2}", r.price_before),
                            format!("${:.2}", r.price_after),
                            r.percent_change,
                        )
                        .trim_end(),
                    );
                    out.push('\n');
                }
            }
            Err(e) => {
                out.push_str(&format!("{:<10} error: {e}\n", item.reference_date));
            }
        }
    }

    out
}

/// Format recorded warnings (empty string when there are none).
pub fn format_warnings(warnings: &[Warning]) -> String {
    let mut out = String::new();
    if warnings.is_empty() {
        return out;
    }
    out.push_str("Warnings:\n");
    for w in warnings {
        out.push_str(&format!("  - {w}\n"));
    }
    out
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
