//! Simulation drivers: single runs, parameter sweeps and coincidence runs

pub mod coincidence;
pub mod run;
pub mod sweep;

pub use coincidence::{
    run_coincidence, run_coincidence_with_rng, CoincidenceConfig, CoincidenceOutcome,
    CoincidenceSource,
};
pub use run::{
    run_simulation, simulate_and_analyze, DetectionRecord, RunOutcome, RunStats, SimulationRun,
};
pub use sweep::{
    CancellationToken, PointStatus, SweepAxis, SweepController, SweepOutcome, SweepParameter,
    SweepPoint,
};
