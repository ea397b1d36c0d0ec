//! Double-slit geometry shared by both detection models.

use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive, SimResult, SimulationError};
use crate::hardware::screen::ScreenGrid;

/// Slit and screen geometry, all lengths in metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Source wavelength λ
    pub wavelength: f64,
    /// Centre-to-centre slit separation d
    pub slit_separation: f64,
    /// Width of each slit a
    pub slit_width: f64,
    /// Slit-to-screen distance L
    pub screen_distance: f64,
    /// Total screen width
    pub screen_width: f64,
    /// Number of screen bins
    pub num_bins: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            wavelength: 800e-9,
            slit_separation: 20e-6,
            slit_width: 5e-6,
            screen_distance: 1.0,
            screen_width: 0.04,
            num_bins: 600,
        }
    }
}

impl GeometryConfig {
    /// Check every field is inside its physical domain.
    pub fn validate(&self) -> SimResult<()> {
        require_positive("wavelength", self.wavelength)?;
        require_non_negative("slit_separation", self.slit_separation)?;
        require_non_negative("slit_width", self.slit_width)?;
        require_positive("screen_distance", self.screen_distance)?;
        require_positive("screen_width", self.screen_width)?;
        if self.num_bins == 0 {
            return Err(SimulationError::invalid("num_bins", "must be at least 1"));
        }
        Ok(())
    }

    /// Screen bin grid for this geometry
    pub fn screen_grid(&self) -> SimResult<ScreenGrid> {
        ScreenGrid::new(self.screen_width, self.num_bins)
    }

    /// Slit centre positions, symmetric about the optical axis
    pub fn slit_centers(&self) -> [f64; 2] {
        [-self.slit_separation / 2.0, self.slit_separation / 2.0]
    }

    /// Small-angle fringe spacing λL/d on the screen, if d > 0
    pub fn fringe_spacing(&self) -> Option<f64> {
        (self.slit_separation > 0.0)
            .then(|| self.wavelength * self.screen_distance / self.slit_separation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_valid() {
        let geometry = GeometryConfig::default();
        assert!(geometry.validate().is_ok());
        assert_eq!(geometry.screen_grid().unwrap().len(), 600);
        assert_relative_eq!(geometry.fringe_spacing().unwrap(), 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_validation_catches_bad_fields() {
        let bad = GeometryConfig {
            wavelength: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = GeometryConfig {
            num_bins: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = GeometryConfig {
            slit_width: -1e-6,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let zero_width = GeometryConfig {
            slit_width: 0.0,
            ..Default::default()
        };
        assert!(zero_width.validate().is_ok());
    }

    #[test]
    fn test_slit_centers() {
        let geometry = GeometryConfig {
            slit_separation: 1e-3,
            ..Default::default()
        };
        assert_eq!(geometry.slit_centers(), [-0.5e-3, 0.5e-3]);
    }
}
