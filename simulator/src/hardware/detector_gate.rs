//! Single-photon detector gating: dead time, timing jitter and efficiency.
//!
//! The gate itself is immutable configuration. The only mutable piece, the
//! time of the last accepted event, lives in a [`GateState`] owned by the
//! simulation run and passed into every call. Gating decisions always use the
//! true event time; jitter only perturbs the timestamp that gets recorded.
//!
//! With a pulse-energy spread set, each pulse carries a relative energy
//! `E ~ N(1, spread)` and registers with probability
//! `efficiency * clamp(E, 0, 1)`, so low-energy pulses are detected less often.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{require_non_negative, require_probability, SimResult, SimulationError};

/// Mutable gate state for one run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateState {
    last_accepted_time: f64,
}

impl Default for GateState {
    fn default() -> Self {
        Self::new()
    }
}

impl GateState {
    /// Fresh state: no event has been accepted yet.
    pub fn new() -> Self {
        Self {
            last_accepted_time: f64::NEG_INFINITY,
        }
    }

    /// Un-jittered time of the most recent accepted event
    pub fn last_accepted_time(&self) -> f64 {
        self.last_accepted_time
    }
}

/// Outcome of presenting one event to the gate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// Arrived during the dead period
    Dropped,
    /// Gate was open but the detector failed to register the pulse
    Missed,
    /// Registered; carries the jittered timestamp
    Accepted { observed_time: f64 },
}

impl GateDecision {
    pub fn observed_time(&self) -> Option<f64> {
        match self {
            GateDecision::Accepted { observed_time } => Some(*observed_time),
            _ => None,
        }
    }
}

/// Detector gating parameters
#[derive(Debug, Clone)]
pub struct DetectorGate {
    dead_time: f64,
    efficiency: f64,
    jitter: Option<Normal<f64>>,
    energy_spread: f64,
    energy: Option<Normal<f64>>,
}

impl DetectorGate {
    /// Create a gate.
    ///
    /// # Arguments
    /// * `dead_time` - Minimum spacing between accepted events (seconds)
    /// * `jitter_std` - Std-dev of the Gaussian timestamp jitter (seconds)
    /// * `efficiency` - Probability that an event arriving at an open gate
    ///   is registered
    pub fn new(dead_time: f64, jitter_std: f64, efficiency: f64) -> SimResult<Self> {
        let dead_time = require_non_negative("dead_time", dead_time)?;
        let jitter_std = require_non_negative("jitter_std", jitter_std)?;
        let efficiency = require_probability("efficiency", efficiency)?;

        let jitter = if jitter_std > 0.0 {
            Some(
                Normal::new(0.0, jitter_std)
                    .map_err(|e| SimulationError::invalid("jitter_std", e.to_string()))?,
            )
        } else {
            None
        };

        Ok(Self {
            dead_time,
            efficiency,
            jitter,
            energy_spread: 0.0,
            energy: None,
        })
    }

    /// Give pulses a Gaussian relative energy spread (std-dev of
    /// `E / E_mean`). Zero disables the energy dependence.
    pub fn with_energy_spread(mut self, energy_spread: f64) -> SimResult<Self> {
        let energy_spread = require_non_negative("energy_spread", energy_spread)?;
        self.energy = if energy_spread > 0.0 {
            Some(
                Normal::new(1.0, energy_spread)
                    .map_err(|e| SimulationError::invalid("energy_spread", e.to_string()))?,
            )
        } else {
            None
        };
        self.energy_spread = energy_spread;
        Ok(self)
    }

    /// Ideal gate with dead time only: no jitter, every pulse registered.
    pub fn with_dead_time(dead_time: f64) -> SimResult<Self> {
        Self::new(dead_time, 0.0, 1.0)
    }

    pub fn dead_time(&self) -> f64 {
        self.dead_time
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    /// Relative pulse-energy spread, zero when disabled
    pub fn energy_spread(&self) -> f64 {
        self.energy_spread
    }

    /// Whether an event at `event_time` falls outside the dead period.
    pub fn is_open(&self, state: &GateState, event_time: f64) -> bool {
        event_time - state.last_accepted_time >= self.dead_time
    }

    /// Record an accepted event: restart the dead period at `event_time`
    /// and return the jittered observed timestamp.
    pub fn commit<R: Rng + ?Sized>(
        &self,
        state: &mut GateState,
        event_time: f64,
        rng: &mut R,
    ) -> f64 {
        state.last_accepted_time = event_time;
        match &self.jitter {
            Some(normal) => event_time + normal.sample(rng),
            None => event_time,
        }
    }

    /// Roll the efficiency draw for an event at an open gate.
    ///
    /// The pulse energy, if enabled, is drawn first from the same RNG. An
    /// ideal detector (efficiency 1, no energy spread) consumes no
    /// randomness.
    pub fn registers<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        let probability = match &self.energy {
            Some(normal) => self.efficiency * normal.sample(rng).clamp(0.0, 1.0),
            None => self.efficiency,
        };
        probability >= 1.0 || rng.gen::<f64>() < probability
    }

    /// Present one event to the gate. Events must arrive in time order.
    pub fn admit<R: Rng + ?Sized>(
        &self,
        state: &mut GateState,
        event_time: f64,
        rng: &mut R,
    ) -> GateDecision {
        if !self.is_open(state, event_time) {
            return GateDecision::Dropped;
        }
        if !self.registers(rng) {
            return GateDecision::Missed;
        }
        let observed_time = self.commit(state, event_time, rng);
        GateDecision::Accepted { observed_time }
    }

    /// Run a whole time-ordered stream through a fresh gate state and
    /// return the observed timestamps of accepted events.
    pub fn filter_stream<R, I>(&self, times: I, rng: &mut R) -> Vec<f64>
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = f64>,
    {
        let mut state = GateState::new();
        times
            .into_iter()
            .filter_map(|t| self.admit(&mut state, t, rng).observed_time())
            .collect()
    }
}
