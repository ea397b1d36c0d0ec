//! Optics: slit geometry and the two photon-placement models

pub mod aperture;
pub mod geometry;
pub mod model;
pub mod photon_sampler;
pub mod probability_field;

pub use aperture::ApertureProjectionSampler;
pub use geometry::GeometryConfig;
pub use model::{BinSampler, DetectionModel, InterferenceSampler, ModelKind};
pub use photon_sampler::PhotonSampler;
pub use probability_field::ProbabilityField;
