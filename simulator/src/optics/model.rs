//! One interface over both photon-placement mechanisms.
//!
//! The run loop only needs "give me a bin for this pulse, or tell me it was
//! lost". [`BinSampler`] is that capability; [`DetectionModel`] is the closed
//! set of implementations the simulator ships.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::hardware::screen::ScreenGrid;
use crate::optics::aperture::ApertureProjectionSampler;
use crate::optics::geometry::GeometryConfig;
use crate::optics::photon_sampler::PhotonSampler;
use crate::optics::probability_field::ProbabilityField;

/// Produce a screen bin for one pulse, or reject it
pub trait BinSampler {
    /// Bin index for one pulse, `None` if the pulse never reaches the screen
    fn sample_bin<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize>;
}

impl BinSampler for ApertureProjectionSampler {
    fn sample_bin<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        ApertureProjectionSampler::sample_bin(self, rng)
    }
}

/// Analytic model: categorical draws from a precomputed interference field
#[derive(Debug, Clone)]
pub struct InterferenceSampler {
    field: ProbabilityField,
    sampler: PhotonSampler,
}

impl InterferenceSampler {
    /// Compute the field once for `geometry` and prepare the sampler.
    pub fn new(
        geometry: &GeometryConfig,
        grid: &ScreenGrid,
        quantum_efficiency: f64,
    ) -> SimResult<Self> {
        let field = ProbabilityField::new(geometry, grid, quantum_efficiency)?;
        let pmf = field.pmf().to_vec();
        let sampler = PhotonSampler::new(&pmf)?;
        Ok(Self { field, sampler })
    }

    pub fn field(&self) -> &ProbabilityField {
        &self.field
    }
}

impl BinSampler for InterferenceSampler {
    fn sample_bin<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        Some(self.sampler.sample(rng))
    }
}

/// Which placement mechanism a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Analytic interference and diffraction field
    Interference,
    /// Geometric ray projection through the slits
    Aperture,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Interference => write!(f, "interference"),
            ModelKind::Aperture => write!(f, "aperture"),
        }
    }
}

/// A ready-to-sample detection model
#[derive(Debug, Clone)]
pub enum DetectionModel {
    Interference(InterferenceSampler),
    Aperture(ApertureProjectionSampler),
}

impl DetectionModel {
    /// Build the model of `kind` for a geometry.
    ///
    /// `origin_spread` and `angular_spread` only matter for the aperture
    /// model; `quantum_efficiency` only for the interference model.
    pub fn build(
        kind: ModelKind,
        geometry: &GeometryConfig,
        quantum_efficiency: f64,
        origin_spread: f64,
        angular_spread: f64,
    ) -> SimResult<Self> {
        match kind {
            ModelKind::Interference => {
                let grid = geometry.screen_grid()?;
                Ok(DetectionModel::Interference(InterferenceSampler::new(
                    geometry,
                    &grid,
                    quantum_efficiency,
                )?))
            }
            ModelKind::Aperture => Ok(DetectionModel::Aperture(
                ApertureProjectionSampler::from_geometry(geometry, origin_spread, angular_spread)?,
            )),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            DetectionModel::Interference(_) => ModelKind::Interference,
            DetectionModel::Aperture(_) => ModelKind::Aperture,
        }
    }
}

impl BinSampler for DetectionModel {
    fn sample_bin<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        match self {
            DetectionModel::Interference(model) => model.sample_bin(rng),
            DetectionModel::Aperture(model) => BinSampler::sample_bin(model, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_both_models_share_interface() {
        let geometry = GeometryConfig {
            slit_separation: 1e-3,
            slit_width: 10e-6,
            screen_width: 0.01,
            num_bins: 1000,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(3);

        for kind in [ModelKind::Interference, ModelKind::Aperture] {
            let model = DetectionModel::build(kind, &geometry, 0.7, 0.5e-3, 1e-3).unwrap();
            assert_eq!(model.kind(), kind);
            let hits: Vec<usize> = (0..50_000)
                .filter_map(|_| model.sample_bin(&mut rng))
                .collect();
            assert!(!hits.is_empty());
            assert!(hits.iter().all(|&b| b < 1000));
        }
    }

    #[test]
    fn test_interference_model_never_rejects() {
        let geometry = GeometryConfig::default();
        let model =
            DetectionModel::build(ModelKind::Interference, &geometry, 0.7, 0.0, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!((0..1000).all(|_| model.sample_bin(&mut rng).is_some()));
    }

    #[test]
    fn test_degenerate_field_surfaces_from_build() {
        let geometry = GeometryConfig::default();
        let err =
            DetectionModel::build(ModelKind::Interference, &geometry, 0.0, 0.0, 0.0).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_model_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&ModelKind::Aperture).unwrap(),
            "\"aperture\""
        );
        let kind: ModelKind = serde_json::from_str("\"interference\"").unwrap();
        assert_eq!(kind, ModelKind::Interference);
    }
}
