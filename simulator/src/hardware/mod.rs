//! Hardware module: pulse source, detector gate, screen and dark counts

pub mod dark_counts;
pub mod detector_gate;
pub mod pulse_clock;
pub mod screen;

pub use dark_counts::DarkCountInjector;
pub use detector_gate::{DetectorGate, GateDecision, GateState};
pub use pulse_clock::{emission_times, AntibunchedClock, EmissionBound, EmissionEvent, PulseClock};
pub use screen::{Histogram, ScreenGrid};
