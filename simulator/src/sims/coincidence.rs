//! Two-detector coincidence experiment for g²(τ).
//!
//! A Poisson source feeds both detectors the same pulse train and each
//! detector decides independently, so coincidences are accidental and g² is
//! flat. An anti-bunched source sends each pulse to exactly one detector, as
//! a beamsplitter does with single photons, which leaves a dip at τ = 0.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::analysis::correlation::{coincidence_histogram, CorrelationHistogram};
use crate::error::{require_probability, SimResult};
use crate::hardware::detector_gate::{DetectorGate, GateState};
use crate::hardware::pulse_clock::{AntibunchedClock, EmissionBound, EmissionEvent, PulseClock};

/// Light source of the experiment
#[derive(Debug, Clone, PartialEq)]
pub enum CoincidenceSource {
    /// Poisson pulse train at `rate` Hz
    Poisson { rate: f64 },
    /// Pulses at least `min_separation` apart plus uniform jitter
    Antibunched {
        min_separation: f64,
        jitter_lo: f64,
        jitter_hi: f64,
    },
}

/// Parameters of a coincidence run, times in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct CoincidenceConfig {
    pub num_pulses: usize,
    pub source: CoincidenceSource,
    /// Detection probability of each detector
    pub efficiency: f64,
    /// Dead time of each detector
    pub dead_time: f64,
    /// Timing jitter std-dev of each detector
    pub jitter_std: f64,
    /// Largest |τ| histogrammed
    pub window: f64,
    /// Delay bin width
    pub bin_width: f64,
    pub seed: u64,
}

impl Default for CoincidenceConfig {
    fn default() -> Self {
        Self {
            num_pulses: 1000,
            source: CoincidenceSource::Poisson { rate: 20.0 },
            efficiency: 0.7,
            dead_time: 0.05,
            jitter_std: 0.0,
            window: 1.0,
            bin_width: 0.01,
            seed: 42,
        }
    }
}

/// Timestamps of both detectors and their correlation
#[derive(Debug, Clone)]
pub struct CoincidenceOutcome {
    pub emitted: usize,
    /// Sorted observed times at detector A
    pub detector_a: Vec<f64>,
    /// Sorted observed times at detector B
    pub detector_b: Vec<f64>,
    pub correlation: CorrelationHistogram,
}

/// Run the experiment with RNG streams derived from `config.seed`.
pub fn run_coincidence(config: &CoincidenceConfig) -> SimResult<CoincidenceOutcome> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    run_coincidence_with_rng(config, &mut rng)
}

/// Run the experiment drawing all randomness from `rng`.
pub fn run_coincidence_with_rng<R: Rng + ?Sized>(
    config: &CoincidenceConfig,
    rng: &mut R,
) -> SimResult<CoincidenceOutcome> {
    require_probability("efficiency", config.efficiency)?;
    let gate = DetectorGate::new(config.dead_time, config.jitter_std, config.efficiency)?;

    let clock_rng = StdRng::seed_from_u64(rng.gen());
    let mut detect_rng = StdRng::seed_from_u64(rng.gen());

    let events: Vec<EmissionEvent> = match &config.source {
        CoincidenceSource::Poisson { rate } => PulseClock::new(*rate)?
            .emissions(EmissionBound::Count(config.num_pulses), clock_rng)
            .collect(),
        CoincidenceSource::Antibunched {
            min_separation,
            jitter_lo,
            jitter_hi,
        } => AntibunchedClock::new(*min_separation, *jitter_lo, *jitter_hi)?
            .emissions(config.num_pulses, clock_rng)
            .collect(),
    };

    let mut state_a = GateState::new();
    let mut state_b = GateState::new();
    let mut detector_a = Vec::new();
    let mut detector_b = Vec::new();

    match config.source {
        CoincidenceSource::Poisson { .. } => {
            for event in &events {
                let decision_a = gate.admit(&mut state_a, event.time, &mut detect_rng);
                if let Some(t) = decision_a.observed_time() {
                    detector_a.push(t);
                }
                let decision_b = gate.admit(&mut state_b, event.time, &mut detect_rng);
                if let Some(t) = decision_b.observed_time() {
                    detector_b.push(t);
                }
            }
        }
        CoincidenceSource::Antibunched { .. } => {
            for event in &events {
                let (state, times) = if detect_rng.gen_bool(0.5) {
                    (&mut state_a, &mut detector_a)
                } else {
                    (&mut state_b, &mut detector_b)
                };
                if let Some(t) = gate.admit(state, event.time, &mut detect_rng).observed_time() {
                    times.push(t);
                }
            }
        }
    }

    // Jitter can reorder neighbouring detections
    detector_a.sort_by(f64::total_cmp);
    detector_b.sort_by(f64::total_cmp);

    let correlation =
        coincidence_histogram(&detector_a, &detector_b, config.window, config.bin_width)?;

    log::debug!(
        "Coincidence run: {} pulses, {} at A, {} at B, {} coincidences",
        events.len(),
        detector_a.len(),
        detector_b.len(),
        correlation.total()
    );

    Ok(CoincidenceOutcome {
        emitted: events.len(),
        detector_a,
        detector_b,
        correlation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poisson_detectors_share_no_more_than_the_stream() {
        let config = CoincidenceConfig::default();
        let outcome = run_coincidence(&config).unwrap();
        assert_eq!(outcome.emitted, 1000);
        assert!(outcome.detector_a.len() <= 1000);
        assert!(outcome.detector_b.len() <= 1000);
        assert!(outcome.correlation.total() > 0);
        assert!(outcome
            .detector_a
            .windows(2)
            .all(|w| w[1] - w[0] >= config.dead_time));
    }

    #[test]
    fn test_antibunched_source_never_fires_both_detectors() {
        let config = CoincidenceConfig {
            num_pulses: 2000,
            source: CoincidenceSource::Antibunched {
                min_separation: 0.2,
                jitter_lo: 0.0,
                jitter_hi: 0.05,
            },
            efficiency: 1.0,
            dead_time: 0.0,
            window: 0.5,
            bin_width: 0.01,
            ..Default::default()
        };
        let outcome = run_coincidence(&config).unwrap();
        assert_eq!(
            outcome.detector_a.len() + outcome.detector_b.len(),
            outcome.emitted
        );
        // Pulses are at least 0.2 s apart, so no pair lands within ±0.1 s
        let corr = &outcome.correlation;
        let near_zero: u64 = corr
            .tau
            .iter()
            .zip(&corr.counts)
            .filter(|(tau, _)| tau.abs() < 0.1)
            .map(|(_, c)| *c)
            .sum();
        assert_eq!(near_zero, 0);
        assert_eq!(corr.g2_at_zero(), Some(0.0));
    }

    #[test]
    fn test_reproducible_for_seed() {
        let config = CoincidenceConfig::default();
        let a = run_coincidence(&config).unwrap();
        let b = run_coincidence(&config).unwrap();
        assert_eq!(a.detector_a, b.detector_a);
        assert_eq!(a.correlation, b.correlation);
    }

    #[test]
    fn test_invalid_efficiency_rejected() {
        let config = CoincidenceConfig {
            efficiency: 1.5,
            ..Default::default()
        };
        assert!(run_coincidence(&config).is_err());
    }
}
