//! Second-order correlation g²(τ) from two detectors' timestamp streams.
//!
//! Every pair (a, b) with `|t_b - t_a| <= window` contributes one delay
//! `τ = t_b - t_a` to a histogram over `[-window, window]`. Normalizing by
//! the mean bin count gives g²(τ): flat at 1 for uncorrelated light, dipping
//! at τ = 0 for an anti-bunched source.

use crate::error::{require_positive, SimResult, SimulationError};

/// Delay histogram and its normalized form
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationHistogram {
    /// Largest |τ| covered (s)
    pub window: f64,
    /// Width of each delay bin (s)
    pub bin_width: f64,
    /// Bin centres (s)
    pub tau: Vec<f64>,
    /// Coincidences per bin
    pub counts: Vec<u64>,
    /// `counts / mean(counts)`, `None` when there are no coincidences
    pub g2: Option<Vec<f64>>,
}

impl CorrelationHistogram {
    /// Total number of coincidences
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// g² in the bin containing τ = 0
    pub fn g2_at_zero(&self) -> Option<f64> {
        let g2 = self.g2.as_ref()?;
        let index = ((self.window / self.bin_width).floor() as usize).min(g2.len() - 1);
        Some(g2[index])
    }
}

fn require_sorted(name: &'static str, times: &[f64]) -> SimResult<()> {
    if times.windows(2).all(|w| w[0] <= w[1]) {
        Ok(())
    } else {
        Err(SimulationError::invalid(name, "timestamps must be sorted"))
    }
}

/// Build the coincidence histogram of detector `b` relative to detector `a`.
///
/// # Arguments
/// * `a`, `b` - Sorted timestamps of the two detectors (s)
/// * `window` - Largest |τ| considered (s)
/// * `bin_width` - Histogram resolution (s)
pub fn coincidence_histogram(
    a: &[f64],
    b: &[f64],
    window: f64,
    bin_width: f64,
) -> SimResult<CorrelationHistogram> {
    let window = require_positive("window", window)?;
    let bin_width = require_positive("bin_width", bin_width)?;
    require_sorted("detector_a", a)?;
    require_sorted("detector_b", b)?;

    let num_bins = ((2.0 * window / bin_width).round() as usize).max(1);
    let width = 2.0 * window / num_bins as f64;
    let tau: Vec<f64> = (0..num_bins)
        .map(|i| -window + (i as f64 + 0.5) * width)
        .collect();
    let mut counts = vec![0u64; num_bins];

    for &t1 in a {
        let lo = b.partition_point(|&t| t < t1 - window);
        let hi = b.partition_point(|&t| t <= t1 + window);
        for &t2 in &b[lo..hi] {
            let delay = t2 - t1;
            let index = (((delay + window) / width).floor() as usize).min(num_bins - 1);
            counts[index] += 1;
        }
    }

    let total: u64 = counts.iter().sum();
    let g2 = (total > 0).then(|| {
        let mean = total as f64 / num_bins as f64;
        counts.iter().map(|&c| c as f64 / mean).collect()
    });

    Ok(CorrelationHistogram {
        window,
        bin_width: width,
        tau,
        counts,
        g2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_pair() {
        let hist = coincidence_histogram(&[1.0], &[1.25], 1.0, 0.5).unwrap();
        assert_eq!(hist.counts, vec![0, 0, 1, 0]);
        assert_eq!(hist.tau, vec![-0.75, -0.25, 0.25, 0.75]);
        assert_eq!(hist.total(), 1);
    }

    #[test]
    fn test_window_edges_are_inclusive() {
        let hist = coincidence_histogram(&[0.0], &[-1.0, 1.0, 1.5], 1.0, 0.5).unwrap();
        assert_eq!(hist.counts, vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_no_coincidences() {
        let hist = coincidence_histogram(&[0.0], &[10.0], 1.0, 0.1).unwrap();
        assert_eq!(hist.total(), 0);
        assert!(hist.g2.is_none());
        assert!(hist.g2_at_zero().is_none());
    }

    #[test]
    fn test_g2_normalization() {
        let a: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let hist = coincidence_histogram(&a, &a, 0.5, 0.25).unwrap();
        // Only zero-delay pairs: everything in the two central bins
        let g2 = hist.g2.clone().unwrap();
        let mean: f64 = g2.iter().sum::<f64>() / g2.len() as f64;
        assert_relative_eq!(mean, 1.0, epsilon = 1e-12);
        assert!(hist.g2_at_zero().unwrap() > 1.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(coincidence_histogram(&[1.0, 0.0], &[], 1.0, 0.1).is_err());
        assert!(coincidence_histogram(&[], &[], 0.0, 0.1).is_err());
        assert!(coincidence_histogram(&[], &[], 1.0, -0.1).is_err());
    }
}
