//! Dark count injection
//!
//! Dark counts are detector clicks with no photon behind them. Over a run of
//! length `T` their number is Poisson with mean `dark_rate * T`, and each one
//! lands in a uniformly random bin, independent of the signal.

use rand::Rng;
use rand_distr::{Distribution, Poisson};

use crate::error::{require_non_negative, SimResult, SimulationError};
use crate::hardware::screen::Histogram;

/// Adds uncorrelated background counts to a histogram
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DarkCountInjector {
    dark_rate: f64,
}

impl DarkCountInjector {
    /// Create an injector for `dark_rate` false counts per second.
    pub fn new(dark_rate: f64) -> SimResult<Self> {
        let dark_rate = require_non_negative("dark_rate", dark_rate)?;
        Ok(Self { dark_rate })
    }

    pub fn dark_rate(&self) -> f64 {
        self.dark_rate
    }

    /// Draw the number of dark counts for an exposure of `total_duration`
    /// seconds.
    pub fn draw_count<R: Rng + ?Sized>(&self, total_duration: f64, rng: &mut R) -> SimResult<u64> {
        let total_duration = require_non_negative("total_duration", total_duration)?;
        let mean = self.dark_rate * total_duration;
        if mean <= 0.0 {
            return Ok(0);
        }

        let poisson = Poisson::new(mean)
            .map_err(|e| SimulationError::invalid("dark_rate", e.to_string()))?;
        Ok(poisson.sample(rng) as u64)
    }

    /// Inject dark counts into `histogram` and return how many were added.
    pub fn inject<R: Rng + ?Sized>(
        &self,
        histogram: &mut Histogram,
        total_duration: f64,
        rng: &mut R,
    ) -> SimResult<u64> {
        let count = self.draw_count(total_duration, rng)?;
        let num_bins = histogram.len();
        for _ in 0..count {
            histogram.increment(rng.gen_range(0..num_bins));
        }
        if count > 0 {
            log::debug!("Injected {count} dark counts over {total_duration:.3e} s");
        }
        Ok(count)
    }
}
