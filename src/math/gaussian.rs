//! One-dimensional Gaussian kernel filter.
//!
//! The kernel follows the usual discrete convention:
//!
//! - weights `w(k) = exp(-k² / (2σ²))` for `k ∈ [-r, r]`, normalized to sum to 1
//! - radius `r = floor(4σ + 0.5)` (the kernel is truncated at four standard deviations)
//!
//! Out-of-range samples are taken by half-sample symmetric reflection
//! (`d c b a | a b c d | d c b a`), so a constant input stays constant all the
//! way to the boundaries. Callers that want a different boundary assumption pad
//! the input first (see [`pad_edges`]).

/// Number of standard deviations at which the kernel is truncated.
const TRUNCATE: f64 = 4.0;

/// Normalized kernel weights, index `r` is the center tap.
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return vec![1.0];
    }
    let radius = (TRUNCATE * sigma + 0.5) as usize;
    let denom = 2.0 * sigma * sigma;

    let mut weights: Vec<f64> = (0..=2 * radius)
        .map(|j| {
            let k = j as f64 - radius as f64;
            (-k * k / denom).exp()
        })
        .collect();

    let sum: f64 = weights.iter().sum();
    for w in weights.iter_mut() {
        *w /= sum;
    }
    weights
}

/// Apply a Gaussian filter with standard deviation `sigma` (in samples).
///
/// The output has the same length as the input. Empty input yields empty output.
pub fn gaussian_filter(values: &[f64], sigma: f64) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let weights = gaussian_kernel(sigma);
    let radius = (weights.len() / 2) as isize;

    (0..n)
        .map(|i| {
            weights
                .iter()
                .enumerate()
                .map(|(j, w)| {
                    let offset = j as isize - radius;
                    w * values[reflect_index(i as isize + offset, n)]
                })
                .sum::<f64>()
        })
        .collect()
}

/// Extend `values` by `pad` copies of the first and last sample on each side.
pub fn pad_edges(values: &[f64], pad: usize) -> Vec<f64> {
    let (Some(&first), Some(&last)) = (values.first(), values.last()) else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(values.len() + 2 * pad);
    out.extend(std::iter::repeat_n(first, pad));
    out.extend_from_slice(values);
    out.extend(std::iter::repeat_n(last, pad));
    out
}

/// Map an out-of-range index back into `0..n` by symmetric reflection.
fn reflect_index(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = i.rem_euclid(period);
    if m < n as isize {
        m as usize
    } else {
        (period - 1 - m) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let w = gaussian_kernel(6.0);
        assert_eq!(w.len(), 49);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        for k in 0..w.len() / 2 {
            assert!((w[k] - w[w.len() - 1 - k]).abs() < 1e-15);
        }
        assert_eq!(gaussian_kernel(1.0).len(), 9);
    }

    #[test]
    fn reflection_repeats_edge_sample() {
        assert_eq!(reflect_index(-1, 5), 0);
        assert_eq!(reflect_index(-2, 5), 1);
        assert_eq!(reflect_index(5, 5), 4);
        assert_eq!(reflect_index(6, 5), 3);
        // Radius larger than the series keeps folding back.
        assert_eq!(reflect_index(-7, 3), 0);
    }

    #[test]
    fn constant_input_is_preserved() {
        let out = gaussian_filter(&[7.0; 10], 6.0);
        assert!(out.iter().all(|v| (v - 7.0).abs() < 1e-12));
    }

    #[test]
    fn annual_reference_values() {
        // Reference values from a direct evaluation of the reflected kernel sum.
        let out = gaussian_filter(&[100.0, 80.0, 60.0, 90.0, 120.0], 1.0);
        let expected = [91.700849, 81.799685, 77.947563, 91.121465, 107.430439];
        for (got, want) in out.iter().zip(expected) {
            assert!((got - want).abs() < 1e-5, "got {got}, want {want}");
        }
    }

    #[test]
    fn pad_edges_replicates_boundaries() {
        assert_eq!(pad_edges(&[1.0, 2.0, 3.0], 2), vec![1.0, 1.0, 1.0, 2.0, 3.0, 3.0, 3.0]);
        assert!(pad_edges(&[], 3).is_empty());
    }
}
