//! Turning point detection on the smoothed series.
//!
//! Peaks and troughs are detected independently with the same cadence-dependent
//! separation and prominence settings; nothing forces them to alternate.

pub mod peaks;

use log::debug;

use crate::domain::{Cadence, DetectionParams, Extremum, ExtremumKind, Series, SmoothedSeries};
use crate::error::CycleError;

pub use peaks::{Peak, find_peaks};

/// Output of the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub params: DetectionParams,
    /// Absolute prominence threshold derived from the smoothed range.
    pub threshold: f64,
    pub peaks: Vec<Extremum>,
    pub troughs: Vec<Extremum>,
}

impl Detection {
    pub fn len(&self) -> usize {
        self.peaks.len() + self.troughs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty() && self.troughs.is_empty()
    }
}

/// Detect peaks and troughs with the settings for `cadence`.
pub fn detect(
    series: &Series,
    smoothed: &SmoothedSeries,
    cadence: Cadence,
) -> Result<Detection, CycleError> {
    detect_with_params(series, smoothed, cadence.detection())
}

/// Detect peaks and troughs with explicit settings.
///
/// A flat smoothed series (zero range) has no turning points. `smoothed` must
/// hold exactly one value per observation in `series`.
pub fn detect_with_params(
    series: &Series,
    smoothed: &SmoothedSeries,
    params: DetectionParams,
) -> Result<Detection, CycleError> {
    if series.len() != smoothed.len() {
        return Err(CycleError::LengthMismatch {
            series: series.len(),
            smoothed: smoothed.len(),
        });
    }

    let range = smoothed.range();
    let threshold = params.threshold(range);
    if !(range > 0.0) {
        debug!("flat smoothed series, skipping detection");
        return Ok(Detection {
            params,
            threshold,
            peaks: Vec::new(),
            troughs: Vec::new(),
        });
    }

    let values = smoothed.values();
    let negated: Vec<f64> = values.iter().map(|v| -v).collect();

    let peaks = to_extrema(
        series,
        values,
        find_peaks(values, params.min_separation, threshold),
        ExtremumKind::Peak,
    );
    let troughs = to_extrema(
        series,
        values,
        find_peaks(&negated, params.min_separation, threshold),
        ExtremumKind::Trough,
    );

    debug!(
        "detected {} peaks, {} troughs (separation {}, threshold {:.3})",
        peaks.len(),
        troughs.len(),
        params.min_separation,
        threshold
    );

    Ok(Detection {
        params,
        threshold,
        peaks,
        troughs,
    })
}

// Callers have already checked that `series` and `values` have equal length.
fn to_extrema(series: &Series, values: &[f64], found: Vec<Peak>, kind: ExtremumKind) -> Vec<Extremum> {
    let points = series.points();
    found
        .into_iter()
        .map(|peak| Extremum {
            index: peak.index,
            date: points[peak.index].date,
            value: values[peak.index],
            kind,
            prominence: peak.prominence,
        })
        .collect()
}
