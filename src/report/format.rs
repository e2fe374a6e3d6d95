//! Formatted terminal output: run summary, extrema table, boom/bust lines.
//!
//! We keep formatting code in one place so:
//! - the smoothing/detection code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::detect::Detection;
use crate::domain::{AnalysisConfig, Extremum, Segment, SmoothedSeries};
use crate::io::ingest::LoadedSeries;

/// One console line per segment, e.g. `Boom from 2011-03-01 to 2016-08-01: 54.10% increase`.
pub fn format_segment_line(segment: &Segment) -> String {
    format!(
        "{} from {} to {}: {:.2}% {}",
        segment.classification.display_name(),
        segment.start.date,
        segment.end.date,
        segment.percent_change.abs(),
        segment.classification.direction(),
    )
}

/// All segment lines, newline-terminated.
pub fn format_segments(segments: &[Segment]) -> String {
    let mut out = String::new();
    for s in segments {
        out.push_str(&format_segment_line(s));
        out.push('\n');
    }
    out
}

/// Format the run header (dataset stats + detection settings).
pub fn format_run_summary(
    loaded: &LoadedSeries,
    smoothed: &SmoothedSeries,
    detection: &Detection,
    config: &AnalysisConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== cycles - Boom/Bust Turning Points ===\n");
    out.push_str(&format!("Source: {}\n", config.input.display()));
    out.push_str(&format!(
        "Cadence: {} | policy: {:?}\n",
        config.cadence, config.policy
    ));
    out.push_str(&format!(
        "Rows: read={} used={} dropped={}\n",
        loaded.rows_read,
        loaded.rows_used,
        loaded.row_errors.len()
    ));
    if let (Some(first), Some(last)) = (loaded.series.first_date(), loaded.series.last_date()) {
        out.push_str(&format!("Span: {first} .. {last}\n"));
    }
    if let Some((lo, hi)) = smoothed.bounds() {
        out.push_str(&format!("Smoothed: [{lo:.2}, {hi:.2}]\n"));
    }
    out.push_str(&format!(
        "Detection: min separation={} | prominence >= {:.2} ({:.0}% of range)\n",
        detection.params.min_separation,
        detection.threshold,
        detection.params.prominence_frac * 100.0
    ));

    for err in loaded.row_errors.iter().take(5) {
        out.push_str(&format!("  (dropped line {}) {}\n", err.line, err.message));
    }
    if loaded.row_errors.len() > 5 {
        out.push_str(&format!("  ... {} more dropped rows\n", loaded.row_errors.len() - 5));
    }

    out
}

/// Format the merged extrema as a table.
pub fn format_extrema(extrema: &[Extremum]) -> String {
    let mut out = String::new();
    if extrema.is_empty() {
        out.push_str("No turning points detected.\n");
        return out;
    }

    out.push_str(&format!(
        "{:>6} {:<10} {:<6} {:>12} {:>12}",
        "index", "date", "kind", "smoothed", "prominence"
    ));
    out.push('\n');
    out.push_str(&format!(
        "{:->6} {:-<10} {:-<6} {:->12} {:->12}",
        "", "", "", "", ""
    ));
    out.push('\n');

    for e in extrema {
        out.push_str(&format!(
            "{:>6} {:<10} {:<6} {:>12.2} {:>12.2}",
            e.index,
            e.date,
            e.kind.display_name(),
            e.value,
            e.prominence
        ));
        out.push('\n');
    }
    out
}
