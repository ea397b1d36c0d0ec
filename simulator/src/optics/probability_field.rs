//! Analytic two-slit detection probability.
//!
//! For a screen position `y` the path difference between the two slits is
//! `Δr = sqrt(L² + (y + d/2)²) - sqrt(L² + (y - d/2)²)`. The interference
//! term `cos²(π Δr / λ)` is modulated by the single-slit diffraction envelope
//! `sinc²(π a y / (λ L))`. Scaled by the quantum efficiency and normalized
//! over the screen grid this gives the per-bin probability mass.
//!
//! The field depends only on geometry, so a run computes it once and samples
//! from it for every accepted event.

use ndarray::Array1;

use crate::error::{require_probability, SimResult, SimulationError};
use crate::hardware::screen::ScreenGrid;
use crate::optics::geometry::GeometryConfig;

/// Raw intensity sums at or below this are treated as zero
pub const DEGENERATE_SUM_EPSILON: f64 = 1e-12;

/// Unnormalized sinc, `sin(x) / x` with `sinc(0) = 1`
pub fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        x.sin() / x
    }
}

/// Optical path difference between the two slits at screen position `y`
pub fn path_difference(y: f64, slit_separation: f64, screen_distance: f64) -> f64 {
    let l2 = screen_distance * screen_distance;
    let half = slit_separation / 2.0;
    (l2 + (y + half).powi(2)).sqrt() - (l2 + (y - half).powi(2)).sqrt()
}

/// Two-beam interference factor `cos²(π Δr / λ)`
pub fn interference(y: f64, geometry: &GeometryConfig) -> f64 {
    let delta_r = path_difference(y, geometry.slit_separation, geometry.screen_distance);
    (std::f64::consts::PI * delta_r / geometry.wavelength).cos().powi(2)
}

/// Single-slit diffraction envelope `sinc²(π a y / (λ L))`
pub fn diffraction_envelope(y: f64, geometry: &GeometryConfig) -> f64 {
    let arg = std::f64::consts::PI * geometry.slit_width * y
        / (geometry.wavelength * geometry.screen_distance);
    sinc(arg).powi(2)
}

/// Normalized detection PMF over a screen grid
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityField {
    pmf: Array1<f64>,
    raw_sum: f64,
}

impl ProbabilityField {
    /// Evaluate and normalize the field over `grid`.
    ///
    /// # Errors
    /// * `InvalidParameter` for an invalid geometry or efficiency
    /// * `DegenerateDistribution` when the raw intensity vanishes over the
    ///   whole grid, or is not finite
    pub fn new(
        geometry: &GeometryConfig,
        grid: &ScreenGrid,
        quantum_efficiency: f64,
    ) -> SimResult<Self> {
        geometry.validate()?;
        let eta = require_probability("quantum_efficiency", quantum_efficiency)?;

        let raw = grid
            .positions()
            .mapv(|y| eta * interference(y, geometry) * diffraction_envelope(y, geometry));
        let raw_sum = raw.sum();

        if !raw_sum.is_finite() || raw_sum <= DEGENERATE_SUM_EPSILON {
            return Err(SimulationError::DegenerateDistribution(format!(
                "raw intensity sums to {raw_sum:e} over {} bins",
                grid.len()
            )));
        }

        Ok(Self {
            pmf: raw / raw_sum,
            raw_sum,
        })
    }

    /// Per-bin probabilities, summing to one
    pub fn pmf(&self) -> &Array1<f64> {
        &self.pmf
    }

    /// Sum of the unnormalized intensities
    pub fn raw_sum(&self) -> f64 {
        self.raw_sum
    }

    pub fn len(&self) -> usize {
        self.pmf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pmf.is_empty()
    }
}
