//! Multi-dimensional parameter sweeps of the full detection pipeline.
//!
//! Every grid point is an independent run with its own RNG stream, seeded
//! from the sweep seed plus the point index, so the results do not depend on
//! thread scheduling or on `--serial`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use shared::algo::map_with_seeded_rng;

use crate::config::SimulationConfig;
use crate::error::{SimResult, SimulationError};
use crate::sims::run::simulate_and_analyze;

/// A configuration field that can be swept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    NumPulses,
    PulseRate,
    QuantumEfficiency,
    DeadTime,
    JitterStd,
    DarkRate,
    Wavelength,
    SlitSeparation,
    SlitWidth,
    ScreenDistance,
    ScreenWidth,
    NumBins,
    OriginSpread,
    AngularSpread,
    EnergySpread,
}

impl SweepParameter {
    /// CSV column header, including the display unit
    pub fn column_name(&self) -> &'static str {
        match self {
            SweepParameter::NumPulses => "num_pulses",
            SweepParameter::PulseRate => "pulse_rate_hz",
            SweepParameter::QuantumEfficiency => "quantum_efficiency",
            SweepParameter::DeadTime => "dark_time_us",
            SweepParameter::JitterStd => "jitter_ns",
            SweepParameter::DarkRate => "dark_rate_hz",
            SweepParameter::Wavelength => "wavelength_nm",
            SweepParameter::SlitSeparation => "slit_separation_mm",
            SweepParameter::SlitWidth => "slit_width_um",
            SweepParameter::ScreenDistance => "screen_distance_m",
            SweepParameter::ScreenWidth => "screen_width_mm",
            SweepParameter::NumBins => "num_bins",
            SweepParameter::OriginSpread => "origin_spread_mm",
            SweepParameter::AngularSpread => "angular_spread_mrad",
            SweepParameter::EnergySpread => "energy_spread",
        }
    }

    /// Factor from the SI value to the display unit of [`Self::column_name`]
    pub fn display_scale(&self) -> f64 {
        match self {
            SweepParameter::DeadTime => 1e6,
            SweepParameter::JitterStd => 1e9,
            SweepParameter::Wavelength => 1e9,
            SweepParameter::SlitSeparation
            | SweepParameter::ScreenWidth
            | SweepParameter::OriginSpread
            | SweepParameter::AngularSpread => 1e3,
            SweepParameter::SlitWidth => 1e6,
            SweepParameter::NumPulses
            | SweepParameter::PulseRate
            | SweepParameter::QuantumEfficiency
            | SweepParameter::DarkRate
            | SweepParameter::ScreenDistance
            | SweepParameter::NumBins
            | SweepParameter::EnergySpread => 1.0,
        }
    }

    /// Write `value` (SI units) into the matching field of `config`.
    pub fn apply(&self, config: &mut SimulationConfig, value: f64) -> SimResult<()> {
        match self {
            SweepParameter::NumPulses => config.source.num_pulses = as_count("num_pulses", value)?,
            SweepParameter::PulseRate => config.source.pulse_rate = value,
            SweepParameter::QuantumEfficiency => config.source.quantum_efficiency = value,
            SweepParameter::DeadTime => config.detector.dead_time = value,
            SweepParameter::JitterStd => config.detector.jitter_std = value,
            SweepParameter::DarkRate => config.detector.dark_rate = value,
            SweepParameter::Wavelength => config.geometry.wavelength = value,
            SweepParameter::SlitSeparation => config.geometry.slit_separation = value,
            SweepParameter::SlitWidth => config.geometry.slit_width = value,
            SweepParameter::ScreenDistance => config.geometry.screen_distance = value,
            SweepParameter::ScreenWidth => config.geometry.screen_width = value,
            SweepParameter::NumBins => config.geometry.num_bins = as_count("num_bins", value)?,
            SweepParameter::OriginSpread => config.source.origin_spread = value,
            SweepParameter::AngularSpread => config.source.angular_spread = value,
            SweepParameter::EnergySpread => config.detector.energy_spread = value,
        }
        Ok(())
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

fn as_count(name: &'static str, value: f64) -> SimResult<usize> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(SimulationError::invalid(
            name,
            format!("must be a non-negative whole number, got {value}"),
        ));
    }
    Ok(value as usize)
}

/// One sweep dimension: a parameter and its values in SI units
#[derive(Debug, Clone, PartialEq)]
pub struct SweepAxis {
    pub parameter: SweepParameter,
    pub values: Vec<f64>,
}

impl SweepAxis {
    pub fn new(parameter: SweepParameter, values: Vec<f64>) -> Self {
        Self { parameter, values }
    }
}

/// How a sweep point ended
#[derive(Debug, Clone, PartialEq)]
pub enum PointStatus {
    /// Visibility was measured
    Completed,
    /// The detection distribution was degenerate; only dark counts recorded
    DegenerateDistribution,
    /// The run finished but visibility is undefined
    UndefinedVisibility,
}

/// Result for one grid point
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    /// Row-major position in the grid
    pub index: usize,
    /// Swept values (SI units), in axis order
    pub parameters: Vec<(SweepParameter, f64)>,
    pub visibility: Option<f64>,
    /// Registered signal photons
    pub detections: u64,
    pub status: PointStatus,
}

/// All results of a sweep, sorted by point index
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub axes: Vec<SweepParameter>,
    pub points: Vec<SweepPoint>,
    /// Size of the full grid
    pub total_points: usize,
    /// Set when cancellation skipped some points
    pub cancelled: bool,
}

impl SweepOutcome {
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.points.len() == self.total_points
    }
}

/// Cooperative cancellation flag shared with running sweeps
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
struct GridPoint {
    parameters: Vec<(SweepParameter, f64)>,
    config: SimulationConfig,
}

/// Runs a configuration over the Cartesian product of its axes
#[derive(Debug, Clone)]
pub struct SweepController {
    axes: Vec<SweepParameter>,
    points: Vec<GridPoint>,
    seed: u64,
    parallel: bool,
}

impl SweepController {
    /// Expand the grid and validate every point's configuration.
    ///
    /// The first axis varies slowest. Any invalid point fails the whole
    /// sweep before work starts.
    pub fn new(base: SimulationConfig, axes: Vec<SweepAxis>) -> SimResult<Self> {
        for axis in &axes {
            if axis.values.is_empty() {
                return Err(SimulationError::invalid(
                    axis.parameter.column_name(),
                    "sweep axis has no values",
                ));
            }
        }

        let total: usize = axes.iter().map(|a| a.values.len()).product();
        let mut points = Vec::with_capacity(total);
        for index in 0..total {
            let mut remainder = index;
            let mut parameters = vec![(SweepParameter::NumPulses, 0.0); axes.len()];
            for (slot, axis) in axes.iter().enumerate().rev() {
                let n = axis.values.len();
                parameters[slot] = (axis.parameter, axis.values[remainder % n]);
                remainder /= n;
            }

            let mut config = base.clone();
            for (parameter, value) in &parameters {
                parameter.apply(&mut config, *value)?;
            }
            config.validate()?;
            points.push(GridPoint { parameters, config });
        }

        Ok(Self {
            axes: axes.iter().map(|a| a.parameter).collect(),
            points,
            seed: base.seed,
            parallel: true,
        })
    }

    /// Base seed; point `i` uses `seed + i`
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn axes(&self) -> &[SweepParameter] {
        &self.axes
    }

    /// Configuration of the point at `index`
    pub fn point_config(&self, index: usize) -> Option<&SimulationConfig> {
        self.points.get(index).map(|p| &p.config)
    }

    pub fn run(&self, cancel: &CancellationToken) -> SimResult<SweepOutcome> {
        self.run_with_progress(cancel, |_| {})
    }

    /// Run every point, calling `on_point` as each one finishes.
    ///
    /// Point configurations were validated in [`SweepController::new`], so
    /// an error here means a run rejected a value that validation accepted.
    /// It aborts the sweep like any other invalid parameter.
    pub fn run_with_progress<F>(
        &self,
        cancel: &CancellationToken,
        on_point: F,
    ) -> SimResult<SweepOutcome>
    where
        F: Fn(&SweepPoint) + Send + Sync,
    {
        let results = map_with_seeded_rng(
            &self.points,
            self.seed,
            self.parallel,
            |index, point, rng: &mut StdRng| {
                if cancel.is_cancelled() {
                    return None;
                }
                let result = run_point(index, point, rng);
                if let Ok(point) = &result {
                    on_point(point);
                }
                Some(result)
            },
        );

        let mut points = results
            .into_iter()
            .flatten()
            .collect::<SimResult<Vec<SweepPoint>>>()?;
        points.sort_by_key(|p| p.index);

        let cancelled = points.len() < self.points.len();
        if cancelled {
            log::warn!(
                "Sweep cancelled after {} of {} points",
                points.len(),
                self.points.len()
            );
        } else {
            let measured = points.iter().filter(|p| p.visibility.is_some()).count();
            log::info!(
                "Sweep finished: {} points, {} with defined visibility",
                points.len(),
                measured
            );
        }

        Ok(SweepOutcome {
            axes: self.axes.clone(),
            points,
            total_points: self.points.len(),
            cancelled,
        })
    }
}

fn run_point(index: usize, point: &GridPoint, rng: &mut StdRng) -> SimResult<SweepPoint> {
    let (outcome, report) = simulate_and_analyze(&point.config, rng)?;
    let detections = outcome.stats.accepted;

    // A degenerate run holds dark counts only; any fringes found are noise
    let (visibility, status) = if outcome.degenerate {
        (None, PointStatus::DegenerateDistribution)
    } else if report.visibility.is_none() {
        log::warn!("Visibility undefined at sweep point {index}");
        (None, PointStatus::UndefinedVisibility)
    } else {
        (report.visibility, PointStatus::Completed)
    };

    log::debug!(
        "Point {index} {:?}: visibility {:?}, {} detections",
        point.parameters,
        visibility,
        detections
    );

    Ok(SweepPoint {
        index,
        parameters: point.parameters.clone(),
        visibility,
        detections,
        status,
    })
}
