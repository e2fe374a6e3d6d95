//! CSV exports: the annotated series and raw FRED observations.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::AnnotatedRow;
use crate::error::AppError;

/// Suffix appended to the input file stem for the annotated export.
pub const ANNOTATED_SUFFIX: &str = "_annotated";

/// Derive the annotated export path from the input path.
///
/// `data/Monthly.csv` -> `data/Monthly_annotated.csv`
pub fn annotated_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "series".to_string());
    input.with_file_name(format!("{stem}{ANNOTATED_SUFFIX}.csv"))
}

/// Write `date,value,smoothed,turning_point` rows.
pub fn write_annotated_csv(path: &Path, rows: &[AnnotatedRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write downloaded observations as a loader-compatible `DATE,<SERIES>` CSV.
///
/// Value tokens are written verbatim so missing markers (`.`) survive and the
/// loader's validation policy decides what to do with them.
pub fn write_observations_csv(
    path: &Path,
    series_id: &str,
    observations: &[(NaiveDate, String)],
) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["DATE", series_id])
        .map_err(|e| AppError::new(2, format!("Failed to write CSV header: {e}")))?;
    for (date, value) in observations {
        writer
            .write_record([date.to_string().as_str(), value.as_str()])
            .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationPolicy;
    use crate::io::ingest::load_series;

    #[test]
    fn annotated_path_keeps_directory() {
        assert_eq!(
            annotated_path(Path::new("data/Monthly.csv")),
            PathBuf::from("data/Monthly_annotated.csv")
        );
        assert_eq!(annotated_path(Path::new("Annual")), PathBuf::from("Annual_annotated.csv"));
    }

    #[test]
    fn annotated_csv_has_label_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = [
            AnnotatedRow {
                date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
                value: 10.0,
                smoothed: 9.5,
                turning_point: 0,
            },
            AnnotatedRow {
                date: NaiveDate::from_ymd_opt(2000, 2, 1).unwrap(),
                value: 12.0,
                smoothed: 11.25,
                turning_point: 1,
            },
        ];
        write_annotated_csv(&path, &rows).unwrap();

        let txt = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            txt,
            "date,value,smoothed,turning_point\n2000-01-01,10.0,9.5,0\n2000-02-01,12.0,11.25,1\n"
        );
    }

    #[test]
    fn observations_round_trip_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PERMIT.csv");
        let obs = vec![
            (NaiveDate::from_ymd_opt(1960, 1, 1).unwrap(), "1092".to_string()),
            (NaiveDate::from_ymd_opt(1960, 2, 1).unwrap(), ".".to_string()),
            (NaiveDate::from_ymd_opt(1960, 3, 1).unwrap(), "1088".to_string()),
        ];
        write_observations_csv(&path, "PERMIT", &obs).unwrap();

        let loaded = load_series(&path, ValidationPolicy::Lenient).unwrap();
        assert_eq!(loaded.series.values(), vec![1092.0, 1088.0]);
        assert_eq!(loaded.row_errors.len(), 1);
    }
}
