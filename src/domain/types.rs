//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between pipeline stages by reference
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::CycleError;

/// Sampling interval of the input series.
///
/// Cadence is chosen by the caller, never inferred from the dates. It selects
/// both the smoothing strategy and the detection thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Monthly,
    Annual,
}

impl Cadence {
    /// Smallest series the pipeline accepts for this cadence.
    ///
    /// Monthly needs one full rolling window; annual needs at least one
    /// interior sample that could become a turning point.
    pub fn min_len(self) -> usize {
        match self {
            Cadence::Monthly => MONTHLY_WINDOW,
            Cadence::Annual => 3,
        }
    }

    /// Detection parameters for this cadence.
    pub fn detection(self) -> DetectionParams {
        match self {
            Cadence::Monthly => DetectionParams {
                min_separation: 24,
                prominence_frac: 0.05,
            },
            Cadence::Annual => DetectionParams {
                min_separation: 2,
                prominence_frac: 0.10,
            },
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Cadence::Monthly => Cadence::Annual,
            Cadence::Annual => Cadence::Monthly,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Cadence::Monthly => "monthly",
            Cadence::Annual => "annual",
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Width of the monthly rolling-mean window (one year of observations).
pub const MONTHLY_WINDOW: usize = 12;

/// How the loader treats rows whose date or value cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Fail the whole load on the first malformed row.
    Strict,
    /// Drop malformed rows, log them, and report them in the load summary.
    Lenient,
}

impl ValidationPolicy {
    pub fn toggle(self) -> Self {
        match self {
            ValidationPolicy::Strict => ValidationPolicy::Lenient,
            ValidationPolicy::Lenient => ValidationPolicy::Strict,
        }
    }
}

/// Minimum-separation and prominence settings for the turning point detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionParams {
    /// Minimum distance (in samples) between two accepted extrema of the same kind.
    pub min_separation: usize,
    /// Prominence threshold as a fraction of the smoothed series' range.
    pub prominence_frac: f64,
}

impl DetectionParams {
    /// Absolute prominence threshold for a smoothed series with the given range.
    pub fn threshold(&self, range: f64) -> f64 {
        self.prominence_frac * range
    }
}

/// A single dated observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub raw_value: f64,
}

/// A strictly date-ordered series without duplicates or missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    points: Vec<SeriesPoint>,
}

impl Series {
    /// Build a series from points in any order.
    ///
    /// Row numbers in errors are 1-based positions in `points`.
    pub fn new(points: Vec<SeriesPoint>) -> Result<Self, CycleError> {
        let rows = points.into_iter().enumerate().map(|(i, p)| (i + 1, p)).collect();
        Self::from_rows(rows)
    }

    /// Build a series from `(row, point)` pairs, sorting by date.
    ///
    /// `row` is only used for error messages (e.g. the source line number).
    pub fn from_rows(mut rows: Vec<(usize, SeriesPoint)>) -> Result<Self, CycleError> {
        for (row, p) in &rows {
            if !p.raw_value.is_finite() {
                return Err(CycleError::MalformedInput {
                    line: *row,
                    message: format!("Non-finite value {} for {}.", p.raw_value, p.date),
                });
            }
        }

        // Stable sort keeps the input order of duplicates for the error message.
        rows.sort_by_key(|(_, p)| p.date);
        for pair in rows.windows(2) {
            let (first_row, a) = pair[0];
            let (second_row, b) = pair[1];
            if a.date == b.date {
                return Err(CycleError::DuplicateKey {
                    date: a.date,
                    first_row,
                    second_row,
                });
            }
        }

        Ok(Self {
            points: rows.into_iter().map(|(_, p)| p).collect(),
        })
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.raw_value).collect()
    }

    pub fn date(&self, index: usize) -> Option<NaiveDate> {
        self.points.get(index).map(|p| p.date)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Reject series shorter than the cadence minimum.
    pub fn ensure_len(&self, cadence: Cadence) -> Result<(), CycleError> {
        let needed = cadence.min_len();
        if self.len() < needed {
            return Err(CycleError::InsufficientData {
                cadence,
                needed,
                got: self.len(),
            });
        }
        Ok(())
    }
}

/// Denoised values aligned index-for-index with a [`Series`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedSeries {
    values: Vec<f64>,
}

impl SmoothedSeries {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(min, max)` of the smoothed values, `None` when empty or non-finite.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &self.values {
            min = min.min(v);
            max = max.max(v);
        }
        if min.is_finite() && max.is_finite() {
            Some((min, max))
        } else {
            None
        }
    }

    pub fn range(&self) -> f64 {
        self.bounds().map(|(lo, hi)| hi - lo).unwrap_or(0.0)
    }
}

/// Kind of turning point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremumKind {
    Peak,
    Trough,
}

impl ExtremumKind {
    /// Label used in the annotated export: `1` peak, `-1` trough.
    pub fn label(self) -> i8 {
        match self {
            ExtremumKind::Peak => 1,
            ExtremumKind::Trough => -1,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ExtremumKind::Peak => "Peak",
            ExtremumKind::Trough => "Trough",
        }
    }
}

/// A detected turning point in the smoothed series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    /// Position in the series.
    pub index: usize,
    pub date: NaiveDate,
    /// Smoothed value at `index`.
    pub value: f64,
    pub kind: ExtremumKind,
    /// How far the extremum stands out from its surrounding terrain.
    pub prominence: f64,
}

/// Direction of a segment between two consecutive turning points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Boom,
    Bust,
}

impl Classification {
    /// `Boom` for a strictly positive change, `Bust` otherwise.
    pub fn from_change(percent_change: f64) -> Self {
        if percent_change > 0.0 {
            Classification::Boom
        } else {
            Classification::Bust
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Classification::Boom => "Boom",
            Classification::Bust => "Bust",
        }
    }

    pub fn direction(self) -> &'static str {
        match self {
            Classification::Boom => "increase",
            Classification::Bust => "decrease",
        }
    }
}

/// The interval between two consecutive turning points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Extremum,
    pub end: Extremum,
    /// `(end.value - start.value) / start.value * 100`.
    pub percent_change: f64,
    pub classification: Classification,
}

/// One row of the annotated export: raw value, smoothed value, turning point label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRow {
    pub date: NaiveDate,
    pub value: f64,
    pub smoothed: f64,
    /// `1` peak, `-1` trough, `0` neither.
    pub turning_point: i8,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub cadence: Cadence,
    pub policy: ValidationPolicy,

    /// Write the annotated CSV next to the input.
    pub export: bool,
    /// Override for the annotated CSV path.
    pub export_path: Option<PathBuf>,
    /// Optional JSON run summary.
    pub export_summary: Option<PathBuf>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    /// Directory for the smoothing-stage debug bundle, if requested.
    pub debug_dir: Option<PathBuf>,
}

impl AnalysisConfig {
    /// Default configuration for a single input file.
    pub fn for_input(input: impl Into<PathBuf>, cadence: Cadence) -> Self {
        Self {
            input: input.into(),
            cadence,
            policy: ValidationPolicy::Strict,
            export: false,
            export_path: None,
            export_summary: None,
            plot: false,
            plot_width: 100,
            plot_height: 25,
            debug_dir: None,
        }
    }
}

/// A saved run summary (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub tool: String,
    pub source: String,
    pub cadence: Cadence,
    pub policy: ValidationPolicy,
    pub rows_read: usize,
    pub rows_used: usize,
    pub detection: DetectionParams,
    pub prominence_threshold: f64,
    pub rows: Vec<AnnotatedRow>,
    pub extrema: Vec<Extremum>,
    pub segments: Vec<Segment>,
}
