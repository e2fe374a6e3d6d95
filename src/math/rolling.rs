//! Rolling-window means.
//!
//! Two window conventions are used by the smoothing pipeline:
//!
//! - **centered**: an even window of width `w` covering `i - w/2 ..= i + w/2 - 1`
//!   (for `w = 12`: six samples back, the sample itself, five forward). Positions
//!   without a full window are undefined (`None`).
//! - **trailing**: the `w` samples ending at `i`, with a minimum of one period,
//!   so every position is defined.
//!
//! Sums are recomputed per window rather than carried incrementally so results do
//! not depend on accumulated floating-point drift.

/// Centered rolling mean. `None` where the window does not fit.
pub fn centered_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut out = vec![None; n];
    if window == 0 || window > n {
        return out;
    }

    // Samples after `i` in the window; the remaining `window - 1 - ahead` lie before it.
    let ahead = (window - 1) / 2;
    let behind = window - 1 - ahead;

    for (i, slot) in out.iter_mut().enumerate() {
        if i < behind || i + ahead >= n {
            continue;
        }
        let start = i - behind;
        let end = i + ahead + 1;
        *slot = Some(mean(&values[start..end]));
    }
    out
}

/// Trailing rolling mean ending at `index`, using however many samples are
/// available when fewer than `window` precede it.
pub fn trailing_mean_at(values: &[f64], window: usize, index: usize) -> Option<f64> {
    if window == 0 || index >= values.len() {
        return None;
    }
    let start = (index + 1).saturating_sub(window);
    Some(mean(&values[start..=index]))
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}
