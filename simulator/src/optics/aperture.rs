//! Geometric aperture-projection model.
//!
//! Each pulse leaves the source with a Gaussian lateral offset and a Gaussian
//! emission angle. It passes the barrier only if its origin lies inside one
//! of the slits; the barrier test is on the origin, not on where the ray
//! lands. Passing rays travel straight to the screen and are binned at the
//! nearest grid position. Acceptance is a property of the geometry and may be
//! zero.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{require_non_negative, require_positive, SimResult, SimulationError};
use crate::hardware::screen::ScreenGrid;
use crate::optics::geometry::GeometryConfig;

/// Straight-ray aperture sampler
#[derive(Debug, Clone)]
pub struct ApertureProjectionSampler {
    origin: Normal<f64>,
    angle: Normal<f64>,
    slit_centers: Vec<f64>,
    slit_half_width: f64,
    screen_distance: f64,
    grid: ScreenGrid,
}

impl ApertureProjectionSampler {
    /// Create a sampler.
    ///
    /// # Arguments
    /// * `origin_spread` - Std-dev of the lateral emission offset (m)
    /// * `angular_spread` - Full angular spread (rad); the emission angle has
    ///   std-dev `angular_spread / 2`
    /// * `slit_centers` - Slit centre positions (m)
    /// * `slit_width` - Width of every slit (m); zero blocks everything
    /// * `screen_distance` - Barrier-to-screen distance (m)
    /// * `grid` - Screen bin grid
    pub fn new(
        origin_spread: f64,
        angular_spread: f64,
        slit_centers: Vec<f64>,
        slit_width: f64,
        screen_distance: f64,
        grid: ScreenGrid,
    ) -> SimResult<Self> {
        let origin_spread = require_non_negative("origin_spread", origin_spread)?;
        let angular_spread = require_non_negative("angular_spread", angular_spread)?;
        let slit_width = require_non_negative("slit_width", slit_width)?;
        let screen_distance = require_positive("screen_distance", screen_distance)?;

        let origin = Normal::new(0.0, origin_spread)
            .map_err(|e| SimulationError::invalid("origin_spread", e.to_string()))?;
        let angle = Normal::new(0.0, angular_spread / 2.0)
            .map_err(|e| SimulationError::invalid("angular_spread", e.to_string()))?;

        Ok(Self {
            origin,
            angle,
            slit_centers,
            slit_half_width: slit_width / 2.0,
            screen_distance,
            grid,
        })
    }

    /// Sampler for the two slits of `geometry`.
    pub fn from_geometry(
        geometry: &GeometryConfig,
        origin_spread: f64,
        angular_spread: f64,
    ) -> SimResult<Self> {
        geometry.validate()?;
        Self::new(
            origin_spread,
            angular_spread,
            geometry.slit_centers().to_vec(),
            geometry.slit_width,
            geometry.screen_distance,
            geometry.screen_grid()?,
        )
    }

    /// Whether a ray leaving from `origin_offset` clears the barrier.
    pub fn passes_barrier(&self, origin_offset: f64) -> bool {
        self.slit_half_width > 0.0
            && self
                .slit_centers
                .iter()
                .any(|c| (origin_offset - c).abs() <= self.slit_half_width)
    }

    /// Screen position reached by a ray
    pub fn projected_hit(&self, origin_offset: f64, angle: f64) -> f64 {
        origin_offset + self.screen_distance * angle.tan()
    }

    /// Emit one pulse; return its bin, or `None` when the barrier blocks it.
    pub fn sample_bin<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        let origin_offset = self.origin.sample(rng);
        let angle = self.angle.sample(rng);

        if !self.passes_barrier(origin_offset) {
            return None;
        }
        self.grid
            .nearest_bin(self.projected_hit(origin_offset, angle))
    }

    pub fn grid(&self) -> &ScreenGrid {
        &self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sweep_geometry(slit_width: f64) -> GeometryConfig {
        GeometryConfig {
            slit_separation: 1e-3,
            slit_width,
            screen_distance: 1.0,
            screen_width: 0.01,
            num_bins: 1000,
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_width_blocks_everything() {
        let sampler =
            ApertureProjectionSampler::from_geometry(&sweep_geometry(0.0), 0.5e-3, 1e-3).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..10_000).all(|_| sampler.sample_bin(&mut rng).is_none()));
        assert!(!sampler.passes_barrier(0.5e-3));
    }

    #[test]
    fn test_zero_width_blocks_even_a_point_source_on_a_slit() {
        let geometry = GeometryConfig {
            slit_separation: 0.0,
            ..sweep_geometry(0.0)
        };
        let sampler = ApertureProjectionSampler::from_geometry(&geometry, 0.0, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sampler.sample_bin(&mut rng), None);
    }

    #[test]
    fn test_barrier_tests_origin_not_hit() {
        let sampler =
            ApertureProjectionSampler::from_geometry(&sweep_geometry(10e-6), 0.5e-3, 1e-3).unwrap();
        assert!(sampler.passes_barrier(0.5e-3));
        assert!(sampler.passes_barrier(-0.5e-3 + 4e-6));
        assert!(!sampler.passes_barrier(0.0));
        assert!(!sampler.passes_barrier(0.5e-3 + 6e-6));
    }

    #[test]
    fn test_projection() {
        let sampler =
            ApertureProjectionSampler::from_geometry(&sweep_geometry(10e-6), 0.5e-3, 1e-3).unwrap();
        assert_relative_eq!(sampler.projected_hit(1e-3, 0.0), 1e-3);
        assert_relative_eq!(sampler.projected_hit(0.0, 1e-3), 1e-3_f64.tan());
    }

    #[test]
    fn test_point_source_in_slit_lands_on_axis_bins() {
        let geometry = GeometryConfig {
            slit_separation: 0.0,
            ..sweep_geometry(10e-6)
        };
        let sampler = ApertureProjectionSampler::from_geometry(&geometry, 0.0, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let bin = sampler.sample_bin(&mut rng).unwrap();
        assert!((sampler.grid().position(bin)).abs() <= 0.01 / 999.0);
    }

    #[test]
    fn test_acceptance_rate_matches_slit_fraction() {
        // Origin spread wide relative to the slits: acceptance is roughly
        // 2 * a * pdf(d/2)
        let origin_spread = 0.5e-3;
        let sampler =
            ApertureProjectionSampler::from_geometry(&sweep_geometry(10e-6), origin_spread, 1e-3)
                .unwrap();
        let mut rng = StdRng::seed_from_u64(17);
        let trials = 200_000;
        let accepted = (0..trials)
            .filter(|_| sampler.sample_bin(&mut rng).is_some())
            .count();

        let z: f64 = 0.5e-3 / origin_spread;
        let pdf = (-0.5 * z * z).exp() / (origin_spread * (2.0 * std::f64::consts::PI).sqrt());
        let expected = 2.0 * 10e-6 * pdf;
        let rate = accepted as f64 / trials as f64;
        assert_relative_eq!(rate, expected, max_relative = 0.1);
    }

    #[test]
    fn test_invalid_inputs() {
        let grid = ScreenGrid::new(0.01, 10).unwrap();
        assert!(
            ApertureProjectionSampler::new(-1.0, 0.0, vec![0.0], 1e-6, 1.0, grid.clone()).is_err()
        );
        assert!(
            ApertureProjectionSampler::new(0.0, -1.0, vec![0.0], 1e-6, 1.0, grid.clone()).is_err()
        );
        assert!(ApertureProjectionSampler::new(0.0, 0.0, vec![0.0], 1e-6, 0.0, grid).is_err());
    }
}
