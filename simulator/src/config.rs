//! Simulation configuration.
//!
//! Every knob of a run lives in [`SimulationConfig`], grouped by concern.
//! Configs serialize to JSON so a run can be reproduced from a file, and
//! every group fills missing fields from its defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{require_non_negative, require_positive, require_probability, SimulationError};
use crate::optics::geometry::GeometryConfig;
use crate::optics::model::ModelKind;

/// Errors loading or saving a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] SimulationError),
}

/// Pulse source parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Number of emitted pulses per run
    pub num_pulses: usize,
    /// Mean emission rate (Hz)
    pub pulse_rate: f64,
    /// Quantum efficiency η used to scale the analytic field
    pub quantum_efficiency: f64,
    /// Std-dev of the lateral emission offset for the aperture model (m)
    pub origin_spread: f64,
    /// Full angular spread for the aperture model (rad)
    pub angular_spread: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            num_pulses: 100_000,
            pulse_rate: 10_000.0,
            quantum_efficiency: 0.7,
            origin_spread: 0.5e-3,
            angular_spread: 1e-3,
        }
    }
}

/// Detector response parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Dead time after each accepted event (s)
    pub dead_time: f64,
    /// Std-dev of timestamp jitter (s)
    pub jitter_std: f64,
    /// Probability that a pulse reaching an open detector registers
    pub efficiency: f64,
    /// Dark count rate (counts / s)
    pub dark_rate: f64,
    /// Relative pulse-energy spread; a pulse of relative energy `E`
    /// registers with probability `efficiency * clamp(E, 0, 1)`. Zero is off.
    pub energy_spread: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            dead_time: 100e-9,
            jitter_std: 0.5e-9,
            efficiency: 1.0,
            dark_rate: 10.0,
            energy_spread: 0.0,
        }
    }
}

/// Fringe analysis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Gaussian smoothing width in bins
    pub smoothing_sigma: f64,
    /// Lower edge of the central window (m)
    pub window_lo: f64,
    /// Upper edge of the central window (m)
    pub window_hi: f64,
    /// Minimum index separation between peaks (and between valleys)
    pub min_peak_separation: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            smoothing_sigma: 2.0,
            window_lo: -2e-3,
            window_hi: 2e-3,
            min_peak_separation: 10,
        }
    }
}

/// Complete description of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub source: SourceConfig,
    pub detector: DetectorConfig,
    pub geometry: GeometryConfig,
    pub analysis: AnalysisConfig,
    /// Photon placement mechanism
    pub model: ModelKind,
    /// Seed for the run's random streams
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            detector: DetectorConfig::default(),
            geometry: GeometryConfig::default(),
            analysis: AnalysisConfig::default(),
            model: ModelKind::Interference,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    /// Geometric-optics setup of the visibility sweep: 1 mm slit spacing,
    /// 10 µm slits, a 1 cm screen at 1 m, a 1 MHz source and an ideal,
    /// noiseless detector.
    pub fn aperture_preset() -> Self {
        Self {
            source: SourceConfig {
                num_pulses: 500_000,
                pulse_rate: 1_000_000.0,
                ..SourceConfig::default()
            },
            detector: DetectorConfig {
                dead_time: 10e-6,
                jitter_std: 0.0,
                efficiency: 1.0,
                dark_rate: 0.0,
                energy_spread: 0.0,
            },
            geometry: GeometryConfig {
                slit_separation: 1e-3,
                slit_width: 10e-6,
                screen_distance: 1.0,
                screen_width: 0.01,
                num_bins: 1000,
                ..GeometryConfig::default()
            },
            analysis: AnalysisConfig::default(),
            model: ModelKind::Aperture,
            seed: 42,
        }
    }

    /// Check all groups. Invalid values are fatal for a run or sweep.
    pub fn validate(&self) -> Result<(), SimulationError> {
        require_positive("pulse_rate", self.source.pulse_rate)?;
        require_probability("quantum_efficiency", self.source.quantum_efficiency)?;
        require_non_negative("origin_spread", self.source.origin_spread)?;
        require_non_negative("angular_spread", self.source.angular_spread)?;

        require_non_negative("dead_time", self.detector.dead_time)?;
        require_non_negative("jitter_std", self.detector.jitter_std)?;
        require_probability("efficiency", self.detector.efficiency)?;
        require_non_negative("dark_rate", self.detector.dark_rate)?;
        require_non_negative("energy_spread", self.detector.energy_spread)?;

        self.geometry.validate()?;

        require_non_negative("smoothing_sigma", self.analysis.smoothing_sigma)?;
        if !(self.analysis.window_lo <= self.analysis.window_hi) {
            return Err(SimulationError::InvalidParameter {
                name: "window_lo",
                reason: format!(
                    "analysis window [{}, {}] is empty",
                    self.analysis.window_lo, self.analysis.window_hi
                ),
            });
        }
        Ok(())
    }

    /// Load and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::debug!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    /// Write this config as pretty-printed JSON.
    pub fn to_json_file(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Total emission time a run of this config is expected to cover
    pub fn expected_duration(&self) -> f64 {
        self.source.num_pulses as f64 / self.source.pulse_rate
    }
}
