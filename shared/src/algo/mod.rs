//! Numeric algorithms shared by the simulation crates
//!
//! This module provides 1-D signal helpers (smoothing and peak finding) and
//! deterministic parallel execution utilities.

pub mod parallel;
pub mod peaks;
pub mod smoothing;

pub use parallel::{derive_seed, map_with_seeded_rng};
pub use peaks::{find_local_maxima, find_peaks, select_by_distance};
pub use smoothing::{gaussian_filter1d, gaussian_kernel1d};
