//! Debug bundle writer for inspecting smoothing stages and detected extrema.

use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::RunOutput;
use crate::domain::{Cadence, MONTHLY_WINDOW};
use crate::error::AppError;
use crate::smooth::{ANNUAL_SIGMA, EDGE_PAD, MONTHLY_SIGMA, TAIL_CORRECTION_LEN};

/// Write a markdown debug bundle for `run` into `dir`, returning its path.
pub fn write_debug_bundle(dir: &Path, run: &RunOutput) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let stem = run
        .source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("series");
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("cycles_debug_{stem}_{}_{ts}.md", run.analysis.cadence));

    fs::write(&path, render_debug_markdown(run))
        .map_err(|e| AppError::new(4, format!("Failed to write debug file: {e}")))?;
    Ok(path)
}

/// Markdown body of the debug bundle.
pub fn render_debug_markdown(run: &RunOutput) -> String {
    let analysis = &run.analysis;
    let detection = &analysis.detection;
    let mut out = String::new();

    out.push_str("# cycles debug bundle\n");
    out.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    out.push_str(&format!("- source: {}\n", run.source.display()));
    out.push_str(&format!("- cadence: {}\n", analysis.cadence));
    out.push_str(&format!(
        "- rows: read={} used={} dropped={} (policy {:?})\n",
        run.loaded.rows_read,
        run.loaded.rows_used,
        run.loaded.row_errors.len(),
        run.loaded.policy
    ));
    match analysis.cadence {
        Cadence::Monthly => out.push_str(&format!(
            "- smoothing: centered mean window={MONTHLY_WINDOW}, tail correction={TAIL_CORRECTION_LEN}, \
             edge pad={EDGE_PAD}, gaussian sigma={MONTHLY_SIGMA}\n"
        )),
        Cadence::Annual => out.push_str(&format!("- smoothing: gaussian sigma={ANNUAL_SIGMA}\n")),
    }
    out.push_str(&format!(
        "- detection: min_separation={} prominence_frac={} threshold={:.6}\n",
        detection.params.min_separation, detection.params.prominence_frac, detection.threshold
    ));

    if !run.loaded.row_errors.is_empty() {
        out.push_str("\n## Dropped rows\n");
        for err in &run.loaded.row_errors {
            out.push_str(&format!("- line {}: {}\n", err.line, err.message));
        }
    }

    out.push_str("\n## Stages\n");
    out.push_str("| index | date | raw | centered | corrected | smoothed | label |\n");
    out.push_str("| - | - | - | - | - | - | - |\n");
    let stage = |s: &Option<Vec<Option<f64>>>, i: usize| {
        fmt_opt(s.as_ref().and_then(|v| v.get(i).copied().flatten()))
    };
    for (i, row) in analysis.rows.iter().enumerate() {
        out.push_str(&format!(
            "| {i} | {} | {:.3} | {} | {} | {:.3} | {} |\n",
            row.date,
            row.value,
            stage(&analysis.stages.centered, i),
            stage(&analysis.stages.corrected, i),
            row.smoothed,
            row.turning_point
        ));
    }

    out.push_str("\n## Extrema\n");
    out.push_str("| index | date | kind | smoothed | prominence |\n");
    out.push_str("| - | - | - | - | - |\n");
    for e in &analysis.extrema {
        out.push_str(&format!(
            "| {} | {} | {} | {:.3} | {:.3} |\n",
            e.index,
            e.date,
            e.kind.display_name(),
            e.value,
            e.prominence
        ));
    }

    out.push_str("\n## Segments\n");
    for s in &analysis.segments {
        out.push_str(&format!("- {}\n", crate::report::format_segment_line(s)));
    }

    out
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.3}"),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnalysisConfig;

    #[test]
    fn bundle_lists_every_row_and_stage() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Monthly.csv");
        let mut csv = String::from("DATE,PERMIT\n");
        for i in 0..24 {
            csv.push_str(&format!("{}-{:02}-01,{}\n", 2001 + i / 12, i % 12 + 1, 101 + i));
        }
        fs::write(&input, csv).unwrap();

        let config = AnalysisConfig::for_input(&input, Cadence::Monthly);
        let run = crate::app::pipeline::run_analysis(&config).unwrap();
        let path = write_debug_bundle(&dir.path().join("debug"), &run).unwrap();

        let body = fs::read_to_string(&path).unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("cycles_debug_Monthly_monthly_"));
        assert!(body.contains("tail correction=6"));
        assert!(body.contains("| 0 | 2001-01-01 | 101.000 | - |"));
        assert_eq!(body.lines().filter(|l| l.starts_with("| ") && l.contains("| 2002-")).count(), 12);
    }
}
