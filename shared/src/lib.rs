//! Shared components and utilities for the fringe simulator crates.
//!
//! This crate contains domain-agnostic helpers used by the simulator core and
//! its binaries: sweep-axis argument parsing, unit conversion at the CLI
//! boundary, 1-D signal processing and deterministic parallel execution.

pub mod algo;
pub mod range_arg;
pub mod units;
