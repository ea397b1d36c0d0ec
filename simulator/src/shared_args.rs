//! Command-line arguments shared by the simulation binaries.
//!
//! Physical quantities are taken in convenient display units (nm, µm, mm,
//! ns, mrad) and converted to SI at this boundary. Every field is optional:
//! a value given on the command line overrides the binary's preset, and a
//! `--config` file replaces the preset entirely.

use std::path::PathBuf;

use clap::Args;
use shared::units::{Interval, IntervalExt, Length, LengthExt, PlaneAngle, PlaneAngleExt};

use crate::config::{ConfigError, SimulationConfig};
use crate::optics::model::ModelKind;

/// Source, detector, geometry and analysis options
#[derive(Args, Debug, Clone, Default)]
pub struct SimulationArgs {
    /// JSON configuration file; command-line values are applied on top
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Photon placement model
    #[arg(long, value_enum)]
    pub model: Option<ModelKind>,

    /// Number of source pulses
    #[arg(long)]
    pub num_pulses: Option<usize>,

    /// Mean pulse rate in Hz
    #[arg(long)]
    pub pulse_rate: Option<f64>,

    /// Quantum efficiency scaling the analytic distribution (0-1)
    #[arg(long)]
    pub quantum_efficiency: Option<f64>,

    /// Detector dead time in nanoseconds
    #[arg(long)]
    pub dead_time_ns: Option<f64>,

    /// Detector timing jitter std-dev in nanoseconds
    #[arg(long)]
    pub jitter_ns: Option<f64>,

    /// Probability an arriving photon is registered (0-1)
    #[arg(long)]
    pub efficiency: Option<f64>,

    /// Dark count rate in Hz
    #[arg(long)]
    pub dark_rate: Option<f64>,

    /// Relative pulse-energy spread (std-dev of E / E_mean, 0 disables)
    #[arg(long)]
    pub energy_spread: Option<f64>,

    /// Wavelength in nanometers
    #[arg(long)]
    pub wavelength_nm: Option<f64>,

    /// Centre-to-centre slit separation in micrometers
    #[arg(long)]
    pub slit_separation_um: Option<f64>,

    /// Slit width in micrometers
    #[arg(long)]
    pub slit_width_um: Option<f64>,

    /// Slit-to-screen distance in meters
    #[arg(long)]
    pub screen_distance_m: Option<f64>,

    /// Screen width in millimeters
    #[arg(long)]
    pub screen_width_mm: Option<f64>,

    /// Number of screen bins
    #[arg(long)]
    pub num_bins: Option<usize>,

    /// Lateral source spread (std-dev) in millimeters
    #[arg(long)]
    pub origin_spread_mm: Option<f64>,

    /// Full angular spread of the source in milliradians
    #[arg(long)]
    pub angular_spread_mrad: Option<f64>,

    /// Gaussian smoothing sigma in bins
    #[arg(long)]
    pub sigma: Option<f64>,

    /// Half-width of the visibility window in millimeters
    #[arg(long)]
    pub window_mm: Option<f64>,

    /// Minimum peak separation in bins
    #[arg(long)]
    pub peak_separation: Option<usize>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SimulationArgs {
    /// Build the run configuration on top of `preset`.
    pub fn to_config(&self, preset: SimulationConfig) -> Result<SimulationConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)?,
            None => preset,
        };

        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(n) = self.num_pulses {
            config.source.num_pulses = n;
        }
        if let Some(rate) = self.pulse_rate {
            config.source.pulse_rate = rate;
        }
        if let Some(qe) = self.quantum_efficiency {
            config.source.quantum_efficiency = qe;
        }
        if let Some(ns) = self.dead_time_ns {
            config.detector.dead_time = Interval::from_nanoseconds(ns).as_seconds();
        }
        if let Some(ns) = self.jitter_ns {
            config.detector.jitter_std = Interval::from_nanoseconds(ns).as_seconds();
        }
        if let Some(efficiency) = self.efficiency {
            config.detector.efficiency = efficiency;
        }
        if let Some(rate) = self.dark_rate {
            config.detector.dark_rate = rate;
        }
        if let Some(spread) = self.energy_spread {
            config.detector.energy_spread = spread;
        }
        if let Some(nm) = self.wavelength_nm {
            config.geometry.wavelength = Length::from_nanometers(nm).as_meters();
        }
        if let Some(um) = self.slit_separation_um {
            config.geometry.slit_separation = Length::from_micrometers(um).as_meters();
        }
        if let Some(um) = self.slit_width_um {
            config.geometry.slit_width = Length::from_micrometers(um).as_meters();
        }
        if let Some(m) = self.screen_distance_m {
            config.geometry.screen_distance = m;
        }
        if let Some(mm) = self.screen_width_mm {
            config.geometry.screen_width = Length::from_millimeters(mm).as_meters();
        }
        if let Some(bins) = self.num_bins {
            config.geometry.num_bins = bins;
        }
        if let Some(mm) = self.origin_spread_mm {
            config.source.origin_spread = Length::from_millimeters(mm).as_meters();
        }
        if let Some(mrad) = self.angular_spread_mrad {
            config.source.angular_spread = PlaneAngle::from_milliradians(mrad).as_radians();
        }
        if let Some(sigma) = self.sigma {
            config.analysis.smoothing_sigma = sigma;
        }
        if let Some(mm) = self.window_mm {
            let half = Length::from_millimeters(mm).as_meters();
            config.analysis.window_lo = -half;
            config.analysis.window_hi = half;
        }
        if let Some(separation) = self.peak_separation {
            config.analysis.min_peak_separation = separation;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use clap::Parser;
    use tempfile::tempdir;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        sim: SimulationArgs,
    }

    #[test]
    fn test_no_flags_keeps_preset() {
        let cli = TestCli::parse_from(["test"]);
        let config = cli.sim.to_config(SimulationConfig::aperture_preset()).unwrap();
        assert_eq!(config, SimulationConfig::aperture_preset());
    }

    #[test]
    fn test_display_units_converted() {
        let cli = TestCli::parse_from([
            "test",
            "--dead-time-ns",
            "250",
            "--slit-separation-um",
            "40",
            "--angular-spread-mrad",
            "2",
            "--window-mm",
            "1.5",
            "--model",
            "aperture",
        ]);
        let config = cli.sim.to_config(SimulationConfig::default()).unwrap();
        assert_relative_eq!(config.detector.dead_time, 250e-9, max_relative = 1e-12);
        assert_relative_eq!(config.geometry.slit_separation, 40e-6, max_relative = 1e-12);
        assert_relative_eq!(config.source.angular_spread, 2e-3, max_relative = 1e-12);
        assert_relative_eq!(config.analysis.window_hi, 1.5e-3, max_relative = 1e-12);
        assert_relative_eq!(config.analysis.window_lo, -1.5e-3, max_relative = 1e-12);
        assert_eq!(config.model, ModelKind::Aperture);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let cli = TestCli::parse_from(["test", "--efficiency", "1.5"]);
        assert!(matches!(
            cli.sim.to_config(SimulationConfig::default()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_config_file_then_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.json");
        let mut saved = SimulationConfig::default();
        saved.source.num_pulses = 1234;
        saved.to_json_file(&path).unwrap();

        let args = SimulationArgs {
            config: Some(path),
            seed: Some(7),
            ..Default::default()
        };
        let config = args.to_config(SimulationConfig::aperture_preset()).unwrap();
        assert_eq!(config.source.num_pulses, 1234);
        assert_eq!(config.seed, 7);
        assert_eq!(config.model, ModelKind::Interference);
    }
}
