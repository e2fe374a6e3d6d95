//! CSV ingest and normalization.
//!
//! This module turns a two-column dated CSV (date first, value second) into a
//! validated [`Series`].
//!
//! Design goals:
//! - **Positional schema**: columns are addressed by position, never by name, so
//!   `DATE,PERMITNSA_20240724` and `observation_date,PERMIT` load the same way
//! - **Explicit validation policy**: malformed rows either fail the load
//!   (`Strict`) or are dropped, logged and reported (`Lenient`)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no smoothing logic here

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use log::{info, warn};

use crate::domain::{Series, SeriesPoint, ValidationPolicy};
use crate::error::{AppError, CycleError};

/// A row dropped under the lenient policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: validated series + row accounting.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: Series,
    pub policy: ValidationPolicy,
    pub row_errors: Vec<RowError>,
    /// Data rows seen (header excluded).
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load a series from a CSV file.
pub fn load_series(path: &Path, policy: ValidationPolicy) -> Result<LoadedSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let loaded = read_series(file, policy)?;
    info!(
        "loaded {} rows from {} ({} dropped)",
        loaded.rows_used,
        path.display(),
        loaded.row_errors.len()
    );
    Ok(loaded)
}

/// Parse a series from any CSV reader.
pub fn read_series<R: Read>(reader: R, policy: ValidationPolicy) -> Result<LoadedSeries, CycleError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = match &result {
            Ok(record) => record_line(record).unwrap_or(idx + 1),
            Err(e) => e.position().map(|p| p.line() as usize).unwrap_or(idx + 1),
        };

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| {
                if idx == 0 && is_header(&record) {
                    return Ok(None);
                }
                parse_row(&record).map(Some)
            });

        match parsed {
            Ok(None) => continue,
            Ok(Some(point)) => {
                rows_read += 1;
                rows.push((line, point));
            }
            Err(message) => {
                rows_read += 1;
                match policy {
                    ValidationPolicy::Strict => {
                        return Err(CycleError::MalformedInput { line, message });
                    }
                    ValidationPolicy::Lenient => {
                        warn!("dropping line {line}: {message}");
                        row_errors.push(RowError { line, message });
                    }
                }
            }
        }
    }

    let rows_used = rows.len();
    let series = Series::from_rows(rows)?;

    Ok(LoadedSeries {
        series,
        policy,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn record_line(record: &StringRecord) -> Option<usize> {
    record.position().map(|p| p.line() as usize)
}

/// A first row whose date cell does not parse is a header; the value cell is
/// not consulted, so column names that look numeric are still skipped.
fn is_header(record: &StringRecord) -> bool {
    !record.get(0).is_some_and(|s| parse_date(clean_cell(s)).is_ok())
}

fn parse_row(record: &StringRecord) -> Result<SeriesPoint, String> {
    let date = record
        .get(0)
        .map(clean_cell)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing date.".to_string())?;
    let value = record
        .get(1)
        .ok_or_else(|| "Missing value column.".to_string())?;

    Ok(SeriesPoint {
        date: parse_date(date)?,
        raw_value: parse_value(value)?,
    })
}

fn clean_cell(s: &str) -> &str {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first cell; it must not break date parsing.
    s.trim().trim_start_matches('\u{feff}')
}

/// Parse a date token.
///
/// Accepted: `YYYY-MM-DD`, `YYYY/MM/DD`, `MM/DD/YYYY`, `YYYY-MM` (first of the
/// month) and a bare `YYYY` (January 1st).
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }

    if s.len() == 7 {
        if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
            return Ok(d);
        }
    }
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        if let Some(d) = s.parse::<i32>().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)) {
            return Ok(d);
        }
    }

    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY, YYYY-MM, YYYY."
    ))
}

/// Coerce a value token to a finite float. FRED's `.` marker counts as missing.
pub fn parse_value(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." {
        return Err(format!("Missing value '{trimmed}'."));
    }
    let v = trimmed
        .parse::<f64>()
        .map_err(|_| format!("Invalid value '{trimmed}'."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite value '{trimmed}'."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn header_is_skipped_by_position() {
        let csv = "DATE,PERMITNSA_20240724\n1990-01-01,1000\n1990-02-01,1100.5\n";
        let loaded = read_series(csv.as_bytes(), ValidationPolicy::Strict).unwrap();
        assert_eq!(loaded.series.values(), vec![1000.0, 1100.5]);
        assert_eq!(loaded.rows_read, 2);
        assert_eq!(loaded.series.first_date(), Some(d(1990, 1, 1)));
    }

    #[test]
    fn header_with_numeric_column_name_is_skipped() {
        let csv = "DATE,2024\n2000,100\n2001,80\n2002,60\n";
        let loaded = read_series(csv.as_bytes(), ValidationPolicy::Strict).unwrap();
        assert_eq!(loaded.series.values(), vec![100.0, 80.0, 60.0]);
        assert_eq!(loaded.rows_read, 3);
        assert!(loaded.row_errors.is_empty());
    }

    #[test]
    fn headerless_input_loads() {
        let csv = "2001,5\n2002,6\n";
        let loaded = read_series(csv.as_bytes(), ValidationPolicy::Strict).unwrap();
        assert_eq!(loaded.series.len(), 2);
        assert_eq!(loaded.series.date(1), Some(d(2002, 1, 1)));
    }

    #[test]
    fn strict_policy_fails_on_missing_marker() {
        let csv = "DATE,VALUE\n1990-01-01,1000\n1990-02-01,.\n";
        let err = read_series(csv.as_bytes(), ValidationPolicy::Strict).unwrap_err();
        assert_eq!(
            err,
            CycleError::MalformedInput {
                line: 3,
                message: "Missing value '.'.".to_string(),
            }
        );
    }

    #[test]
    fn lenient_policy_drops_and_reports() {
        let csv = "DATE,VALUE\n1990-01-01,1000\n1990-02-01,.\nnot-a-date,5\n1990-03-01,1200\n";
        let loaded = read_series(csv.as_bytes(), ValidationPolicy::Lenient).unwrap();
        assert_eq!(loaded.series.values(), vec![1000.0, 1200.0]);
        assert_eq!(loaded.rows_read, 4);
        assert_eq!(loaded.rows_used, 2);
        let lines: Vec<usize> = loaded.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4]);
    }

    #[test]
    fn rows_are_sorted_and_duplicates_rejected() {
        let csv = "1990-03-01,3\n1990-01-01,1\n1990-02-01,2\n";
        let loaded = read_series(csv.as_bytes(), ValidationPolicy::Strict).unwrap();
        assert_eq!(loaded.series.values(), vec![1.0, 2.0, 3.0]);

        let csv = "DATE,VALUE\n1990-01-01,1\n1990-02-01,2\n1990-01-01,3\n";
        let err = read_series(csv.as_bytes(), ValidationPolicy::Lenient).unwrap_err();
        assert_eq!(
            err,
            CycleError::DuplicateKey {
                date: d(1990, 1, 1),
                first_row: 2,
                second_row: 4,
            }
        );
    }

    #[test]
    fn accepted_date_formats() {
        assert_eq!(parse_date("2020-07-15"), Ok(d(2020, 7, 15)));
        assert_eq!(parse_date("2020/07/15"), Ok(d(2020, 7, 15)));
        assert_eq!(parse_date("07/15/2020"), Ok(d(2020, 7, 15)));
        assert_eq!(parse_date("2020-07"), Ok(d(2020, 7, 1)));
        assert_eq!(parse_date("2020"), Ok(d(2020, 1, 1)));
        assert!(parse_date("July 2020").is_err());
    }

    #[test]
    fn bom_on_first_cell_is_ignored() {
        let csv = "\u{feff}1990-01-01,10\n1990-02-01,11\n";
        let loaded = read_series(csv.as_bytes(), ValidationPolicy::Strict).unwrap();
        assert_eq!(loaded.series.len(), 2);
    }

    #[test]
    fn value_coercion() {
        assert_eq!(parse_value(" 12.5 "), Ok(12.5));
        assert!(parse_value("").is_err());
        assert!(parse_value("n/a").is_err());
        assert!(parse_value("inf").is_err());
    }
}
