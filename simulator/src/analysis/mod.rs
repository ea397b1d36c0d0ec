//! Analysis of detection results: fringe visibility and g²(τ)

pub mod correlation;
pub mod visibility;

pub use correlation::{coincidence_histogram, CorrelationHistogram};
pub use visibility::{visibility_from_extremes, VisibilityAnalyzer, VisibilityReport};
