//! Detection screen: a fixed linear grid of bin positions and the count
//! histogram accumulated on it.

use ndarray::Array1;

use crate::error::{require_positive, SimResult, SimulationError};

/// Bin centres spread linearly over `[-width/2, +width/2]`, endpoints
/// included.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenGrid {
    positions: Array1<f64>,
    start: f64,
    step: f64,
}

impl ScreenGrid {
    /// Build a grid of `num_bins` positions across a screen `width` metres
    /// wide.
    pub fn new(width: f64, num_bins: usize) -> SimResult<Self> {
        let width = require_positive("screen_width", width)?;
        if num_bins == 0 {
            return Err(SimulationError::invalid("num_bins", "must be at least 1"));
        }

        let start = -width / 2.0;
        let step = if num_bins > 1 {
            width / (num_bins - 1) as f64
        } else {
            0.0
        };
        let positions = Array1::from_shape_fn(num_bins, |i| start + i as f64 * step);

        Ok(Self {
            positions,
            start,
            step,
        })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Bin centre positions in metres
    pub fn positions(&self) -> &Array1<f64> {
        &self.positions
    }

    /// Position of bin `index` in metres
    pub fn position(&self, index: usize) -> f64 {
        self.positions[index]
    }

    /// Index of the grid position nearest to `x`.
    ///
    /// Points beyond either end of the screen map to the edge bin. Returns
    /// `None` only for a NaN input.
    pub fn nearest_bin(&self, x: f64) -> Option<usize> {
        if x.is_nan() {
            return None;
        }
        if self.step == 0.0 {
            return Some(0);
        }
        let last = (self.len() - 1) as f64;
        let index = ((x - self.start) / self.step).round().clamp(0.0, last);
        Some(index as usize)
    }

    /// Indices of bins with `lo <= position <= hi`
    pub fn window_indices(&self, lo: f64, hi: f64) -> Vec<usize> {
        self.positions
            .iter()
            .enumerate()
            .filter(|&(_, &y)| y >= lo && y <= hi)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Per-bin detection counts bound to a [`ScreenGrid`].
///
/// Length and position mapping are fixed at construction; counts only grow.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    grid: ScreenGrid,
    counts: Array1<u64>,
}

impl Histogram {
    /// All-zero histogram over `grid`
    pub fn new(grid: ScreenGrid) -> Self {
        let counts = Array1::zeros(grid.len());
        Self { grid, counts }
    }

    pub fn grid(&self) -> &ScreenGrid {
        &self.grid
    }

    pub fn counts(&self) -> &Array1<u64> {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Add one count to bin `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn increment(&mut self, index: usize) {
        self.counts[index] += 1;
    }

    /// Sum of all bins
    pub fn total(&self) -> u64 {
        self.counts.sum()
    }

    /// Counts as floats, for smoothing and analysis
    pub fn as_f64(&self) -> Array1<f64> {
        self.counts.mapv(|c| c as f64)
    }
}
