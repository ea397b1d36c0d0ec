//! Fringe visibility extraction from a noisy detection histogram.
//!
//! The histogram is smoothed with a Gaussian kernel, cut down to a central
//! window, and searched for peaks and valleys with a minimum spacing.
//! Visibility is `(I_max - I_min) / (I_max + I_min)` using the tallest peak
//! and the deepest valley in the window. When either set is empty the
//! visibility is undefined and reported as `None`.

use shared::algo::{find_peaks, gaussian_filter1d};

use crate::config::AnalysisConfig;
use crate::error::{require_non_negative, SimResult, SimulationError};
use crate::hardware::screen::{Histogram, ScreenGrid};

/// Outcome of analysing one histogram
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityReport {
    /// Smoothed counts over the whole screen
    pub smoothed: Vec<f64>,
    /// Bin indices of detected peaks inside the window
    pub peaks: Vec<usize>,
    /// Bin indices of detected valleys inside the window
    pub valleys: Vec<usize>,
    /// Largest smoothed value among the peaks
    pub i_max: Option<f64>,
    /// Smallest smoothed value among the valleys
    pub i_min: Option<f64>,
    /// Fringe visibility, `None` when it cannot be computed
    pub visibility: Option<f64>,
}

/// `(I_max - I_min) / (I_max + I_min)`, or `None` when the denominator
/// vanishes or the result is not finite.
pub fn visibility_from_extremes(i_max: f64, i_min: f64) -> Option<f64> {
    let denominator = i_max + i_min;
    if denominator == 0.0 {
        return None;
    }
    let v = (i_max - i_min) / denominator;
    v.is_finite().then_some(v)
}

/// Smoothing + peak/valley based visibility estimator
#[derive(Debug, Clone)]
pub struct VisibilityAnalyzer {
    config: AnalysisConfig,
}

impl VisibilityAnalyzer {
    pub fn new(config: AnalysisConfig) -> SimResult<Self> {
        require_non_negative("smoothing_sigma", config.smoothing_sigma)?;
        if !(config.window_lo <= config.window_hi) {
            return Err(SimulationError::InvalidParameter {
                name: "window_lo",
                reason: format!(
                    "analysis window [{}, {}] is empty",
                    config.window_lo, config.window_hi
                ),
            });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Smoothed copy of a histogram
    pub fn smooth(&self, histogram: &Histogram) -> Vec<f64> {
        let counts = histogram.as_f64();
        gaussian_filter1d(&counts.to_vec(), self.config.smoothing_sigma)
    }

    /// Analyse a histogram on its own grid.
    pub fn analyze(&self, histogram: &Histogram) -> VisibilityReport {
        let smoothed = self.smooth(histogram);
        self.analyze_smoothed(smoothed, histogram.grid())
    }

    /// Analyse an already smoothed signal laid out on `grid`.
    pub fn analyze_smoothed(&self, smoothed: Vec<f64>, grid: &ScreenGrid) -> VisibilityReport {
        let window = grid.window_indices(self.config.window_lo, self.config.window_hi);
        let (peaks, valleys) = match (window.first(), window.last()) {
            (Some(&first), Some(&last)) => {
                let central = &smoothed[first..=last];
                let negated: Vec<f64> = central.iter().map(|v| -v).collect();
                let separation = self.config.min_peak_separation;

                let peaks: Vec<usize> = find_peaks(central, separation)
                    .into_iter()
                    .map(|i| i + first)
                    .collect();
                let valleys: Vec<usize> = find_peaks(&negated, separation)
                    .into_iter()
                    .map(|i| i + first)
                    .collect();
                (peaks, valleys)
            }
            _ => (Vec::new(), Vec::new()),
        };

        let i_max = peaks
            .iter()
            .map(|&i| smoothed[i])
            .max_by(|a, b| a.total_cmp(b));
        let i_min = valleys
            .iter()
            .map(|&i| smoothed[i])
            .min_by(|a, b| a.total_cmp(b));

        let visibility = match (i_max, i_min) {
            (Some(hi), Some(lo)) => visibility_from_extremes(hi, lo),
            _ => None,
        };

        if visibility.is_none() {
            log::debug!(
                "Visibility undefined: {} peaks, {} valleys in window",
                peaks.len(),
                valleys.len()
            );
        }

        VisibilityReport {
            smoothed,
            peaks,
            valleys,
            i_max,
            i_min,
            visibility,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid(bins: usize) -> ScreenGrid {
        ScreenGrid::new(0.01, bins).unwrap()
    }

    fn histogram_from(counts: &[u64], grid: ScreenGrid) -> Histogram {
        let mut hist = Histogram::new(grid);
        for (i, &c) in counts.iter().enumerate() {
            for _ in 0..c {
                hist.increment(i);
            }
        }
        hist
    }

    fn analyzer(sigma: f64, separation: usize) -> VisibilityAnalyzer {
        VisibilityAnalyzer::new(AnalysisConfig {
            smoothing_sigma: sigma,
            window_lo: -2e-3,
            window_hi: 2e-3,
            min_peak_separation: separation,
        })
        .unwrap()
    }

    #[test]
    fn test_visibility_formula() {
        assert_relative_eq!(visibility_from_extremes(3.0, 1.0).unwrap(), 0.5);
        assert_relative_eq!(visibility_from_extremes(5.0, 0.0).unwrap(), 1.0);
        assert_eq!(visibility_from_extremes(0.0, 0.0), None);
    }

    #[test]
    fn test_cosine_fringes() {
        let bins = 1001;
        let grid = grid(bins);
        // I(y) = 100 (1 + 0.6 cos(2π y / 0.8 mm)) sampled onto the grid
        let counts: Vec<u64> = grid
            .positions()
            .iter()
            .map(|&y| {
                let phase = 2.0 * std::f64::consts::PI * y / 0.8e-3;
                (100.0 * (1.0 + 0.6 * phase.cos())).round() as u64
            })
            .collect();
        let hist = histogram_from(&counts, grid);
        let report = analyzer(0.0, 10).analyze(&hist);

        assert!(!report.peaks.is_empty());
        assert!(!report.valleys.is_empty());
        let v = report.visibility.unwrap();
        assert_relative_eq!(v, 0.6, epsilon = 0.01);
    }

    #[test]
    fn test_flat_histogram_is_undefined() {
        let grid = grid(200);
        let hist = histogram_from(&vec![5; 200], grid);
        let report = analyzer(2.0, 10).analyze(&hist);
        assert!(report.peaks.is_empty());
        assert_eq!(report.visibility, None);
    }

    #[test]
    fn test_empty_histogram_is_undefined() {
        let hist = Histogram::new(grid(100));
        assert_eq!(analyzer(2.0, 10).analyze(&hist).visibility, None);
    }

    #[test]
    fn test_window_outside_screen_is_undefined() {
        let analyzer = VisibilityAnalyzer::new(AnalysisConfig {
            window_lo: 1.0,
            window_hi: 2.0,
            ..AnalysisConfig::default()
        })
        .unwrap();
        let grid = grid(100);
        let hist = histogram_from(&[1, 5, 1, 5, 1], ScreenGrid::new(0.01, 5).unwrap());
        assert_eq!(analyzer.analyze(&hist).visibility, None);
        assert!(analyzer
            .analyze_smoothed(vec![0.0; 100], &grid)
            .peaks
            .is_empty());
    }

    #[test]
    fn test_global_extremes_among_candidates() {
        // Three peaks of different heights and two valleys in the window
        let counts = [0, 1, 9, 1, 4, 1, 12, 2, 6, 3, 0];
        let grid = ScreenGrid::new(0.004, counts.len()).unwrap();
        let hist = histogram_from(&counts, grid);
        let report = analyzer(0.0, 1).analyze(&hist);

        assert_eq!(report.i_max, Some(12.0));
        assert_eq!(report.i_min, Some(1.0));
        assert_relative_eq!(report.visibility.unwrap(), 11.0 / 13.0);
    }

    #[test]
    fn test_visibility_bounded_for_noisy_histograms() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(77);
        let grid = grid(400);
        for _ in 0..50 {
            let counts: Vec<u64> = (0..400).map(|_| rng.gen_range(0..20)).collect();
            let hist = histogram_from(&counts, grid.clone());
            if let Some(v) = analyzer(1.0, 3).analyze(&hist).visibility {
                assert!((0.0..=1.0).contains(&v), "visibility {v} out of range");
            }
        }
    }

    #[test]
    fn test_invalid_config() {
        assert!(VisibilityAnalyzer::new(AnalysisConfig {
            smoothing_sigma: -1.0,
            ..AnalysisConfig::default()
        })
        .is_err());
        assert!(VisibilityAnalyzer::new(AnalysisConfig {
            window_lo: 1.0,
            window_hi: 0.0,
            ..AnalysisConfig::default()
        })
        .is_err());
    }
}
