//! Cadence-dependent smoothing pipeline.
//!
//! Monthly series go through three stages:
//!
//! 1. centered 12-month rolling mean (undefined near both ends)
//! 2. trailing correction: the last six points are replaced by a trailing
//!    12-month mean (minimum one period), so the tail does not depend on data
//!    that has not been observed yet
//! 3. edge-padded Gaussian filter (σ = 6): any still-undefined leading samples
//!    take the first defined value, the sequence is padded by 50 replicated edge
//!    samples on each side, filtered, and the padding is discarded
//!
//! Annual series get a single Gaussian filter (σ = 1) applied to the raw values.
//!
//! Every stage is a pure function so each can be tested on its own; [`smooth_stages`]
//! exposes the intermediate monthly stages for debugging.

use log::debug;

use crate::domain::{Cadence, MONTHLY_WINDOW, Series, SmoothedSeries};
use crate::error::CycleError;
use crate::math::{centered_mean, gaussian_filter, pad_edges, trailing_mean_at};

/// Number of trailing samples that get the trailing-window correction.
pub const TAIL_CORRECTION_LEN: usize = 6;

/// Edge replication applied on each side before the monthly Gaussian pass.
pub const EDGE_PAD: usize = 50;

/// Gaussian σ (samples) for monthly data.
pub const MONTHLY_SIGMA: f64 = 6.0;

/// Gaussian σ (samples) for annual data.
pub const ANNUAL_SIGMA: f64 = 1.0;

/// Intermediate and final smoothing outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingStages {
    /// Stage 1 (monthly only): centered rolling mean.
    pub centered: Option<Vec<Option<f64>>>,
    /// Stage 2 (monthly only): centered mean with the trailing tail correction.
    pub corrected: Option<Vec<Option<f64>>>,
    pub smoothed: SmoothedSeries,
}

/// Smooth a series according to its cadence.
pub fn smooth(series: &Series, cadence: Cadence) -> Result<SmoothedSeries, CycleError> {
    smooth_stages(series, cadence).map(|stages| stages.smoothed)
}

/// Smooth a series, keeping the intermediate stages.
pub fn smooth_stages(series: &Series, cadence: Cadence) -> Result<SmoothingStages, CycleError> {
    series.ensure_len(cadence)?;
    let raw = series.values();

    let stages = match cadence {
        Cadence::Monthly => {
            let centered = centered_mean(&raw, MONTHLY_WINDOW);
            let corrected = apply_tail_correction(&centered, &raw, MONTHLY_WINDOW, TAIL_CORRECTION_LEN);
            let smoothed = edge_padded_gaussian(&corrected, EDGE_PAD, MONTHLY_SIGMA);
            SmoothingStages {
                centered: Some(centered),
                corrected: Some(corrected),
                smoothed: SmoothedSeries::new(smoothed),
            }
        }
        Cadence::Annual => SmoothingStages {
            centered: None,
            corrected: None,
            smoothed: SmoothedSeries::new(gaussian_filter(&raw, ANNUAL_SIGMA)),
        },
    };

    debug!(
        "smoothed {} points ({cadence}, range {:.3})",
        stages.smoothed.len(),
        stages.smoothed.range()
    );
    Ok(stages)
}

/// Replace the last `tail` entries of `centered` with trailing means of `raw`.
pub fn apply_tail_correction(
    centered: &[Option<f64>],
    raw: &[f64],
    window: usize,
    tail: usize,
) -> Vec<Option<f64>> {
    let mut out = centered.to_vec();
    let n = out.len().min(raw.len());
    for (i, slot) in out.iter_mut().enumerate().take(n).skip(n.saturating_sub(tail)) {
        *slot = trailing_mean_at(raw, window, i);
    }
    out
}

/// Fill undefined edges, pad by edge replication, filter, and trim the padding.
///
/// Leading gaps take the first defined value and trailing gaps the last one.
/// An input with no defined value at all yields an empty result.
pub fn edge_padded_gaussian(stage: &[Option<f64>], pad: usize, sigma: f64) -> Vec<f64> {
    let filled = fill_edges(stage);
    if filled.is_empty() {
        return filled;
    }
    let padded = pad_edges(&filled, pad);
    let filtered = gaussian_filter(&padded, sigma);
    filtered[pad..pad + filled.len()].to_vec()
}

fn fill_edges(stage: &[Option<f64>]) -> Vec<f64> {
    let Some(first) = stage.iter().flatten().next().copied() else {
        return Vec::new();
    };

    let mut last = first;
    stage
        .iter()
        .map(|v| match v {
            Some(v) => {
                last = *v;
                *v
            }
            // Interior gaps cannot occur for window-based stages; they hold the
            // last defined value like the trailing edge does.
            None => last,
        })
        .collect()
}
