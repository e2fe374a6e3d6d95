//! Read/write JSON run summaries.
//!
//! A run summary is the "portable" representation of one analysis:
//! - run metadata (source, cadence, policy, row counts)
//! - detection settings and the resolved prominence threshold
//! - the annotated rows, the extrema and the boom/bust segments
//!
//! The schema is defined by `domain::RunSummary`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::domain::RunSummary;
use crate::error::AppError;

/// Write a run summary JSON file.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create summary JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .map_err(|e| AppError::new(2, format!("Failed to write summary JSON: {e}")))?;

    Ok(())
}

/// Read a run summary JSON file.
pub fn read_summary_json(path: &Path) -> Result<RunSummary, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open summary JSON '{}': {e}", path.display())))?;
    let summary: RunSummary =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid summary JSON: {e}")))?;
    Ok(summary)
}
