//! Shared analysis pipeline used by the CLI, batch and TUI front-ends.
//!
//! load -> smooth -> detect -> merge/segment -> annotate
//!
//! Everything after loading is pure: the same series and cadence always give
//! the same outputs, so front-ends only differ in presentation.

use std::path::{Path, PathBuf};

use log::info;
use rayon::prelude::*;

use crate::detect::Detection;
use crate::domain::{
    AnalysisConfig, AnnotatedRow, Cadence, Extremum, RunSummary, Segment, Series, SmoothedSeries,
};
use crate::error::AppError;
use crate::io::ingest::{LoadedSeries, load_series};
use crate::smooth::SmoothingStages;

/// Outputs of the pure part of the pipeline for one series.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub cadence: Cadence,
    pub stages: SmoothingStages,
    pub detection: Detection,
    /// Peaks and troughs merged in index order.
    pub extrema: Vec<Extremum>,
    pub segments: Vec<Segment>,
    pub rows: Vec<AnnotatedRow>,
}

impl Analysis {
    pub fn smoothed(&self) -> &SmoothedSeries {
        &self.stages.smoothed
    }
}

/// Run smoothing, detection and segmentation on an in-memory series.
pub fn analyze_series(series: &Series, cadence: Cadence) -> Result<Analysis, AppError> {
    let stages = crate::smooth::smooth_stages(series, cadence)?;
    let detection = crate::detect::detect(series, &stages.smoothed, cadence)?;
    info!(
        "detected {} peaks and {} troughs (threshold {:.4})",
        detection.peaks.len(),
        detection.troughs.len(),
        detection.threshold
    );

    let extrema = crate::report::merge_extrema(&detection.peaks, &detection.troughs)?;
    let segments = crate::report::segment(&extrema)?;
    info!("{} boom/bust segments", segments.len());
    let rows = crate::report::annotate(series, &stages.smoothed, &extrema);

    Ok(Analysis {
        cadence,
        stages,
        detection,
        extrema,
        segments,
        rows,
    })
}

/// Loaded input plus its analysis.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub source: PathBuf,
    pub loaded: LoadedSeries,
    pub analysis: Analysis,
}

impl RunOutput {
    /// Portable JSON representation of this run.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            tool: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            source: self.source.display().to_string(),
            cadence: self.analysis.cadence,
            policy: self.loaded.policy,
            rows_read: self.loaded.rows_read,
            rows_used: self.loaded.rows_used,
            detection: self.analysis.detection.params,
            prominence_threshold: self.analysis.detection.threshold,
            rows: self.analysis.rows.clone(),
            extrema: self.analysis.extrema.clone(),
            segments: self.analysis.segments.clone(),
        }
    }
}

/// Load the configured input and run the full pipeline.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    run_analysis_on(&config.input, config)
}

/// Same as [`run_analysis`] for an explicit input path.
pub fn run_analysis_on(path: &Path, config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    let loaded = load_series(path, config.policy)?;
    let analysis = analyze_series(&loaded.series, config.cadence)?;
    Ok(RunOutput {
        source: path.to_path_buf(),
        loaded,
        analysis,
    })
}

/// Run the pipeline over independent inputs in parallel.
///
/// Results are returned in the order of `paths`; a failing input does not
/// affect the others.
pub fn run_batch(paths: &[PathBuf], config: &AnalysisConfig) -> Vec<(PathBuf, Result<RunOutput, AppError>)> {
    paths
        .par_iter()
        .map(|path| (path.clone(), run_analysis_on(path, config)))
        .collect()
}
