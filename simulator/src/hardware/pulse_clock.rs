//! Emission-time generators
//!
//! [`PulseClock`] produces a Poisson renewal process: i.i.d. exponential gaps
//! with mean `1 / rate`, accumulated into strictly increasing timestamps.
//! [`AntibunchedClock`] produces a sub-Poissonian stream with a hard minimum
//! spacing plus uniform jitter.
//!
//! Both are lazy, finite and fully determined by the RNG they are handed.
//! Restarting a sequence means building a new iterator from a fresh RNG.

use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::error::{require_non_negative, require_positive, SimResult, SimulationError};

/// A single source emission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionEvent {
    /// Emission time in seconds
    pub time: f64,
}

/// Where an emission sequence stops
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmissionBound {
    /// Stop after this many events
    Count(usize),
    /// Stop before the first event later than this time (seconds)
    Duration(f64),
}

/// Poisson pulse source with a fixed mean rate
#[derive(Debug, Clone)]
pub struct PulseClock {
    rate: f64,
    interarrival: Exp<f64>,
}

impl PulseClock {
    /// Create a clock emitting on average `rate` pulses per second.
    ///
    /// Fails with `InvalidParameter` unless `rate` is positive and finite.
    pub fn new(rate: f64) -> SimResult<Self> {
        let rate = require_positive("pulse_rate", rate)?;
        let interarrival =
            Exp::new(rate).map_err(|e| SimulationError::invalid("pulse_rate", e.to_string()))?;
        Ok(Self { rate, interarrival })
    }

    /// Mean emission rate in Hz
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Lazily emit events until `bound` is reached, drawing from `rng`.
    pub fn emissions<R: Rng>(&self, bound: EmissionBound, rng: R) -> PoissonEmissions<R> {
        PoissonEmissions {
            interarrival: self.interarrival,
            rng,
            bound,
            emitted: 0,
            current: 0.0,
            exhausted: false,
        }
    }
}

/// Iterator over Poisson emission events, see [`PulseClock::emissions`]
#[derive(Debug)]
pub struct PoissonEmissions<R> {
    interarrival: Exp<f64>,
    rng: R,
    bound: EmissionBound,
    emitted: usize,
    current: f64,
    exhausted: bool,
}

impl<R: Rng> PoissonEmissions<R> {
    /// Number of events produced so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Time of the most recent event (0 before the first)
    pub fn last_time(&self) -> f64 {
        self.current
    }
}

impl<R: Rng> Iterator for PoissonEmissions<R> {
    type Item = EmissionEvent;

    fn next(&mut self) -> Option<EmissionEvent> {
        if self.exhausted {
            return None;
        }
        if let EmissionBound::Count(limit) = self.bound {
            if self.emitted >= limit {
                self.exhausted = true;
                return None;
            }
        }

        // Redraw gaps that would not advance time so the sequence stays
        // strictly increasing.
        let next = loop {
            let candidate = self.current + self.interarrival.sample(&mut self.rng);
            if candidate > self.current {
                break candidate;
            }
        };

        if let EmissionBound::Duration(limit) = self.bound {
            if next > limit {
                self.exhausted = true;
                return None;
            }
        }

        self.current = next;
        self.emitted += 1;
        Some(EmissionEvent { time: next })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.bound {
            _ if self.exhausted => (0, Some(0)),
            EmissionBound::Count(limit) => {
                let remaining = limit.saturating_sub(self.emitted);
                (remaining, Some(remaining))
            }
            EmissionBound::Duration(_) => (0, None),
        }
    }
}

/// Collect `count` Poisson emission times at `rate` Hz.
///
/// Equivalent to the cumulative sum of `count` exponential gaps with mean
/// `1 / rate`.
pub fn emission_times<R: Rng + ?Sized>(
    rate: f64,
    count: usize,
    rng: &mut R,
) -> SimResult<Vec<f64>> {
    let clock = PulseClock::new(rate)?;
    Ok(clock
        .emissions(EmissionBound::Count(count), rng)
        .map(|event| event.time)
        .collect())
}

/// Anti-bunched source: consecutive pulses are at least `min_separation`
/// apart, with an extra uniform jitter drawn from `[jitter_lo, jitter_hi)`.
#[derive(Debug, Clone)]
pub struct AntibunchedClock {
    min_separation: f64,
    jitter_lo: f64,
    jitter_hi: f64,
}

impl AntibunchedClock {
    pub fn new(min_separation: f64, jitter_lo: f64, jitter_hi: f64) -> SimResult<Self> {
        let min_separation = require_non_negative("min_separation", min_separation)?;
        require_non_negative("jitter_lo", jitter_lo)?;
        require_non_negative("jitter_hi", jitter_hi)?;
        if jitter_hi < jitter_lo {
            return Err(SimulationError::invalid(
                "jitter_hi",
                format!("jitter range is inverted: [{jitter_lo}, {jitter_hi})"),
            ));
        }
        if min_separation + jitter_lo <= 0.0 && jitter_hi <= 0.0 {
            return Err(SimulationError::invalid(
                "min_separation",
                "pulse spacing must be positive",
            ));
        }
        Ok(Self {
            min_separation,
            jitter_lo,
            jitter_hi,
        })
    }

    /// Emit `count` events, the first at t = 0.
    pub fn emissions<R: Rng>(&self, count: usize, rng: R) -> AntibunchedEmissions<R> {
        let jitter = (self.jitter_hi > self.jitter_lo)
            .then(|| Uniform::new(self.jitter_lo, self.jitter_hi));
        AntibunchedEmissions {
            min_separation: self.min_separation,
            jitter_floor: self.jitter_lo,
            jitter,
            rng,
            remaining: count,
            current: None,
        }
    }
}

/// Iterator over anti-bunched emission events, see [`AntibunchedClock::emissions`]
#[derive(Debug)]
pub struct AntibunchedEmissions<R> {
    min_separation: f64,
    jitter_floor: f64,
    jitter: Option<Uniform<f64>>,
    rng: R,
    remaining: usize,
    current: Option<f64>,
}

impl<R: Rng> Iterator for AntibunchedEmissions<R> {
    type Item = EmissionEvent;

    fn next(&mut self) -> Option<EmissionEvent> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let time = match self.current {
            None => 0.0,
            Some(previous) => {
                let jitter = match &self.jitter {
                    Some(dist) => dist.sample(&mut self.rng),
                    None => self.jitter_floor,
                };
                previous + self.min_separation + jitter
            }
        };
        self.current = Some(time);
        Some(EmissionEvent { time })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rejects_non_positive_rate() {
        assert!(matches!(
            PulseClock::new(0.0),
            Err(SimulationError::InvalidParameter { .. })
        ));
        assert!(PulseClock::new(-10.0).is_err());
        assert!(PulseClock::new(f64::NAN).is_err());
    }

    #[test]
    fn test_reproducible_for_fixed_seed() {
        let a = emission_times(10_000.0, 1000, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = emission_times(10_000.0, 1000, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a, b);

        let c = emission_times(10_000.0, 1000, &mut StdRng::seed_from_u64(6)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_strictly_increasing() {
        let times = emission_times(1e6, 10_000, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(times.len(), 10_000);
        assert!(times[0] > 0.0);
        assert!(times.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_zero_count_is_empty() {
        let times = emission_times(100.0, 0, &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(times.is_empty());
    }

    #[test]
    fn test_mean_interarrival() {
        let rate = 2_000.0;
        let times = emission_times(rate, 50_000, &mut StdRng::seed_from_u64(11)).unwrap();
        let mean_gap = times.last().unwrap() / times.len() as f64;
        assert_relative_eq!(mean_gap, 1.0 / rate, max_relative = 0.03);
    }

    #[test]
    fn test_duration_bound() {
        let clock = PulseClock::new(1000.0).unwrap();
        let events: Vec<_> = clock
            .emissions(EmissionBound::Duration(2.0), StdRng::seed_from_u64(3))
            .collect();
        assert!(events.iter().all(|e| e.time <= 2.0));
        // ~2000 expected
        assert!(events.len() > 1800 && events.len() < 2200);
    }

    #[test]
    fn test_size_hint_tracks_count() {
        let clock = PulseClock::new(1.0).unwrap();
        let mut iter = clock.emissions(EmissionBound::Count(3), StdRng::seed_from_u64(0));
        assert_eq!(iter.size_hint(), (3, Some(3)));
        iter.next();
        assert_eq!(iter.size_hint(), (2, Some(2)));
        assert_eq!(iter.emitted(), 1);
        assert_eq!(iter.by_ref().count(), 2);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_antibunched_spacing() {
        let clock = AntibunchedClock::new(0.2, 0.05, 0.15).unwrap();
        let times: Vec<f64> = clock
            .emissions(1000, StdRng::seed_from_u64(42))
            .map(|e| e.time)
            .collect();
        assert_eq!(times.len(), 1000);
        assert_eq!(times[0], 0.0);
        for w in times.windows(2) {
            let gap = w[1] - w[0];
            assert!(gap >= 0.25 - 1e-12 && gap < 0.35 + 1e-12);
        }
    }

    #[test]
    fn test_antibunched_validation() {
        assert!(AntibunchedClock::new(0.2, 0.3, 0.1).is_err());
        assert!(AntibunchedClock::new(-0.1, 0.0, 0.1).is_err());
        assert!(AntibunchedClock::new(0.0, 0.0, 0.0).is_err());

        let fixed = AntibunchedClock::new(1.0, 0.0, 0.0).unwrap();
        let times: Vec<f64> = fixed
            .emissions(3, StdRng::seed_from_u64(0))
            .map(|e| e.time)
            .collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
    }
}
