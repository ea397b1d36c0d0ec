//! One complete detection run, driven incrementally.
//!
//! A [`SimulationRun`] owns everything with per-run state: the lazy pulse
//! stream, the detector gate state, the detection model and its own RNG
//! streams. Callers can advance it in slices (for live rendering) and read
//! the cumulative histogram in between, then call [`SimulationRun::finish`]
//! to drain the remaining pulses and add dark counts.
//!
//! Per event: the gate is checked first, then the detector efficiency, then
//! the detection model places the pulse. Only a pulse that lands in a bin
//! restarts the dead period; blocked pulses never reach the detector.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::analysis::visibility::{VisibilityAnalyzer, VisibilityReport};
use crate::config::SimulationConfig;
use crate::error::SimResult;
use crate::hardware::dark_counts::DarkCountInjector;
use crate::hardware::detector_gate::{DetectorGate, GateState};
use crate::hardware::pulse_clock::{EmissionBound, PoissonEmissions, PulseClock};
use crate::hardware::screen::Histogram;
use crate::optics::model::{BinSampler, DetectionModel};

/// One registered, binned photon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionRecord {
    /// Emission time plus detector jitter (s)
    pub observed_time: f64,
    /// Screen bin the photon landed in
    pub bin_index: usize,
}

/// Event bookkeeping for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Pulses taken from the source
    pub emitted: u64,
    /// Pulses arriving while the detector was dead
    pub dropped: u64,
    /// Pulses lost to detector efficiency
    pub missed: u64,
    /// Pulses the model did not place on the screen
    pub blocked: u64,
    /// Pulses registered and binned
    pub accepted: u64,
}

impl RunStats {
    /// Fraction of emitted pulses that were registered
    pub fn detection_efficiency(&self) -> f64 {
        if self.emitted == 0 {
            return f64::NAN;
        }
        self.accepted as f64 / self.emitted as f64
    }
}

/// Final products of a run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Signal plus dark counts
    pub histogram: Histogram,
    /// Signal-only counts, before dark counts were added
    pub signal: Histogram,
    /// Number of dark counts injected
    pub dark_counts: u64,
    /// Every registered detection, in time order
    pub records: Vec<DetectionRecord>,
    pub stats: RunStats,
    /// True when the detection model could not be built and no photons
    /// were sampled
    pub degenerate: bool,
    /// Time of the last emitted pulse (s)
    pub total_duration: f64,
}

/// Incremental simulation of one configuration
#[derive(Debug)]
pub struct SimulationRun {
    model: Option<DetectionModel>,
    gate: DetectorGate,
    gate_state: GateState,
    dark: DarkCountInjector,
    emissions: PoissonEmissions<StdRng>,
    detection_rng: StdRng,
    dark_rng: StdRng,
    histogram: Histogram,
    records: Vec<DetectionRecord>,
    stats: RunStats,
    exhausted: bool,
}

impl SimulationRun {
    /// Set up a run, deriving its RNG streams from `rng`.
    ///
    /// Invalid configuration is an error. A degenerate probability field is
    /// not: the run is built without a model, samples nothing, and still
    /// receives dark counts.
    pub fn new<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> SimResult<Self> {
        config.validate()?;

        let grid = config.geometry.screen_grid()?;
        let model = match DetectionModel::build(
            config.model,
            &config.geometry,
            config.source.quantum_efficiency,
            config.source.origin_spread,
            config.source.angular_spread,
        ) {
            Ok(model) => Some(model),
            Err(e) if e.is_recoverable() => {
                log::warn!("No valid detection distribution for this run: {e}");
                None
            }
            Err(e) => return Err(e),
        };

        let gate = DetectorGate::new(
            config.detector.dead_time,
            config.detector.jitter_std,
            config.detector.efficiency,
        )?
        .with_energy_spread(config.detector.energy_spread)?;
        let dark = DarkCountInjector::new(config.detector.dark_rate)?;

        let clock_rng = StdRng::seed_from_u64(rng.gen());
        let detection_rng = StdRng::seed_from_u64(rng.gen());
        let dark_rng = StdRng::seed_from_u64(rng.gen());

        let emissions = PulseClock::new(config.source.pulse_rate)?
            .emissions(EmissionBound::Count(config.source.num_pulses), clock_rng);

        Ok(Self {
            model,
            gate,
            gate_state: GateState::new(),
            dark,
            emissions,
            detection_rng,
            dark_rng,
            histogram: Histogram::new(grid),
            records: Vec::new(),
            stats: RunStats::default(),
            exhausted: false,
        })
    }

    /// Set up a run seeded from `config.seed`.
    pub fn from_config(config: &SimulationConfig) -> SimResult<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        Self::new(config, &mut rng)
    }

    /// Process the next source pulse. Returns `None` once the source is
    /// exhausted, otherwise the detection it produced, if any.
    fn step(&mut self) -> Option<Option<DetectionRecord>> {
        let Some(event) = self.emissions.next() else {
            self.exhausted = true;
            return None;
        };
        self.stats.emitted += 1;

        if !self.gate.is_open(&self.gate_state, event.time) {
            self.stats.dropped += 1;
            return Some(None);
        }

        let Some(model) = &self.model else {
            self.stats.blocked += 1;
            return Some(None);
        };

        if !self.gate.registers(&mut self.detection_rng) {
            self.stats.missed += 1;
            return Some(None);
        }

        let Some(bin_index) = model.sample_bin(&mut self.detection_rng) else {
            self.stats.blocked += 1;
            return Some(None);
        };

        let observed_time =
            self.gate
                .commit(&mut self.gate_state, event.time, &mut self.detection_rng);
        let record = DetectionRecord {
            observed_time,
            bin_index,
        };
        self.histogram.increment(bin_index);
        self.records.push(record);
        self.stats.accepted += 1;
        Some(Some(record))
    }

    /// Run until `k` more photons are registered or the source runs out,
    /// and return the cumulative histogram.
    pub fn advance_accepted(&mut self, k: usize) -> &Histogram {
        let mut accepted = 0;
        while accepted < k {
            match self.step() {
                Some(Some(_)) => accepted += 1,
                Some(None) => {}
                None => break,
            }
        }
        &self.histogram
    }

    /// Consume at most `k` more source pulses and return the cumulative
    /// histogram.
    pub fn advance_emitted(&mut self, k: usize) -> &Histogram {
        for _ in 0..k {
            if self.step().is_none() {
                break;
            }
        }
        &self.histogram
    }

    /// Signal histogram accumulated so far
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn records(&self) -> &[DetectionRecord] {
        &self.records
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn gate_state(&self) -> &GateState {
        &self.gate_state
    }

    /// Whether the run has no usable detection model
    pub fn is_degenerate(&self) -> bool {
        self.model.is_none()
    }

    /// Whether every source pulse has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Drain the source, inject dark counts over the emission span and
    /// return the results.
    pub fn finish(mut self) -> SimResult<RunOutcome> {
        while self.step().is_some() {}

        let total_duration = self.emissions.last_time();
        let signal = self.histogram.clone();
        let mut histogram = self.histogram;
        let dark_counts = self
            .dark
            .inject(&mut histogram, total_duration, &mut self.dark_rng)?;

        log::debug!(
            "Run finished: {} emitted, {} accepted, {} dropped, {} blocked, {} dark",
            self.stats.emitted,
            self.stats.accepted,
            self.stats.dropped,
            self.stats.blocked,
            dark_counts
        );

        Ok(RunOutcome {
            histogram,
            signal,
            dark_counts,
            records: self.records,
            stats: self.stats,
            degenerate: self.model.is_none(),
            total_duration,
        })
    }
}

/// Run `config` to completion with its own seed.
pub fn run_simulation(config: &SimulationConfig) -> SimResult<RunOutcome> {
    SimulationRun::from_config(config)?.finish()
}

/// Run `config` to completion with an explicit RNG and analyse the final
/// histogram.
pub fn simulate_and_analyze<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> SimResult<(RunOutcome, VisibilityReport)> {
    let analyzer = VisibilityAnalyzer::new(config.analysis.clone())?;
    let outcome = SimulationRun::new(config, rng)?.finish()?;
    let report = analyzer.analyze(&outcome.histogram);
    Ok((outcome, report))
}
