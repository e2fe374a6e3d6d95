//! Local-maximum search with minimum-separation and prominence filters.
//!
//! The search runs in three passes:
//!
//! 1. **candidates**: interior samples strictly higher than their left neighbour
//!    and, after any run of equal samples, strictly higher than the first lower
//!    sample to the right. For a flat-topped run the first sample of the run is
//!    the candidate. The first and last samples are never candidates.
//! 2. **separation**: candidates are visited from highest to lowest (later index
//!    first on ties); each kept candidate removes every remaining candidate closer
//!    than `min_separation` samples.
//! 3. **prominence**: a survivor is kept when its prominence is at least the
//!    threshold. Prominence is the height above the higher of the two lowest points
//!    reached when walking left and right until terrain higher than the peak (or a
//!    boundary) is met.
//!
//! Minima are found by running the same search on the negated sequence.

use std::cmp::Ordering;

/// An accepted local maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub index: usize,
    pub prominence: f64,
}

/// Find local maxima of `x` that satisfy the separation and prominence constraints.
///
/// Returned peaks are ordered by index.
pub fn find_peaks(x: &[f64], min_separation: usize, min_prominence: f64) -> Vec<Peak> {
    let candidates = local_maxima(x);
    let separated = select_by_separation(x, &candidates, min_separation);

    separated
        .into_iter()
        .filter_map(|index| {
            let prominence = prominence(x, index);
            (prominence >= min_prominence).then_some(Peak { index, prominence })
        })
        .collect()
}

/// Interior local maxima; flat-topped runs report their first sample.
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let n = x.len();
    let mut out = Vec::new();
    if n < 3 {
        return out;
    }

    let mut i = 1;
    while i < n - 1 {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < n - 1 && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                out.push(i);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    out
}

/// Keep the highest candidates so that no two survivors are closer than
/// `min_separation` samples. `candidates` must be sorted by index.
pub fn select_by_separation(x: &[f64], candidates: &[usize], min_separation: usize) -> Vec<usize> {
    if min_separation <= 1 || candidates.len() < 2 {
        return candidates.to_vec();
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        x[candidates[b]]
            .partial_cmp(&x[candidates[a]])
            .unwrap_or(Ordering::Equal)
            .then(candidates[b].cmp(&candidates[a]))
    });

    let mut keep = vec![true; candidates.len()];
    for &pos in &order {
        if !keep[pos] {
            continue;
        }
        let center = candidates[pos];

        let mut j = pos;
        while j > 0 && center - candidates[j - 1] < min_separation {
            keep[j - 1] = false;
            j -= 1;
        }
        let mut j = pos + 1;
        while j < candidates.len() && candidates[j] - center < min_separation {
            keep[j] = false;
            j += 1;
        }
    }

    candidates
        .iter()
        .zip(keep)
        .filter_map(|(&idx, k)| k.then_some(idx))
        .collect()
}

/// Prominence of the sample at `peak`.
pub fn prominence(x: &[f64], peak: usize) -> f64 {
    let height = x[peak];

    let mut left_min = height;
    for &v in x[..=peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &x[peak..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}
