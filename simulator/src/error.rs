//! Error taxonomy for the simulation core.
//!
//! Invalid parameters are fatal and surface immediately. Degenerate
//! distributions are recoverable: a run that hits one skips sampling and the
//! sweep records a missing value for that grid point.

use thiserror::Error;

/// Errors raised by the simulation components
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// A configuration value is outside its valid domain
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A probability vector cannot be sampled from
    #[error("Degenerate distribution: {0}")]
    DegenerateDistribution(String),
}

impl SimulationError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// True for errors that a sweep should record as a missing value
    /// rather than abort on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SimulationError::DegenerateDistribution(_))
    }
}

/// Result alias used throughout the crate
pub type SimResult<T> = Result<T, SimulationError>;

/// Require `value > 0` and finite.
pub(crate) fn require_positive(name: &'static str, value: f64) -> SimResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::invalid(
            name,
            format!("must be positive and finite, got {value}"),
        ))
    }
}

/// Require `value >= 0` and finite.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> SimResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::invalid(
            name,
            format!("must be non-negative and finite, got {value}"),
        ))
    }
}

/// Require `0 <= value <= 1`.
pub(crate) fn require_probability(name: &'static str, value: f64) -> SimResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(SimulationError::invalid(
            name,
            format!("must lie in [0, 1], got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validators() {
        assert!(require_positive("rate", 1.0).is_ok());
        assert!(require_positive("rate", 0.0).is_err());
        assert!(require_positive("rate", f64::NAN).is_err());
        assert!(require_positive("rate", f64::INFINITY).is_err());

        assert!(require_non_negative("dead_time", 0.0).is_ok());
        assert!(require_non_negative("dead_time", -1e-9).is_err());

        assert!(require_probability("efficiency", 1.0).is_ok());
        assert!(require_probability("efficiency", 1.5).is_err());
        assert!(require_probability("efficiency", f64::NAN).is_err());
    }

    #[test]
    fn test_error_messages_name_the_parameter() {
        let err = require_positive("pulse_rate", -3.0).unwrap_err();
        assert!(err.to_string().contains("pulse_rate"));
        assert!(!err.is_recoverable());

        let err = SimulationError::DegenerateDistribution("zero sum".into());
        assert!(err.is_recoverable());
    }
}
