//! Pulse-by-pulse double-slit detection simulator
//!
//! This crate simulates individual photon pulses passing a double slit and
//! being registered by an imperfect single-photon detector, builds the
//! screen histogram one detection at a time, and measures the fringe
//! visibility of the result. It also sweeps the whole pipeline over
//! parameter grids and runs two-detector coincidence experiments.

pub mod analysis;
pub mod config;
pub mod error;
pub mod hardware;
pub mod io;
pub mod optics;
pub mod shared_args;
pub mod sims;

// Re-exports for easier access
pub use analysis::visibility::{VisibilityAnalyzer, VisibilityReport};
pub use config::{AnalysisConfig, ConfigError, DetectorConfig, SimulationConfig, SourceConfig};
pub use error::{SimResult, SimulationError};
pub use hardware::screen::{Histogram, ScreenGrid};
pub use optics::geometry::GeometryConfig;
pub use optics::model::ModelKind;
pub use sims::run::{run_simulation, RunOutcome, SimulationRun};
pub use sims::sweep::{CancellationToken, SweepAxis, SweepController, SweepParameter};
