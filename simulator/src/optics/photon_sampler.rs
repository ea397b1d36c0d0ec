//! Categorical sampling of a detection bin from a PMF.

use rand::distributions::WeightedIndex;
use rand::Rng;
use rand_distr::Distribution;

use crate::error::{SimResult, SimulationError};

/// Allowed deviation of a PMF's total from one
pub const PMF_SUM_TOLERANCE: f64 = 1e-6;

/// Draws bin indices with probability proportional to a validated PMF
#[derive(Debug, Clone)]
pub struct PhotonSampler {
    index: WeightedIndex<f64>,
    len: usize,
}

impl PhotonSampler {
    /// Build a sampler from a probability vector.
    ///
    /// Fails with `DegenerateDistribution` if the vector is empty, holds a
    /// NaN, infinite or negative weight, or does not sum to one. There is no
    /// fallback to uniform sampling.
    pub fn new(pmf: &[f64]) -> SimResult<Self> {
        if pmf.is_empty() {
            return Err(SimulationError::DegenerateDistribution(
                "empty probability vector".to_string(),
            ));
        }

        if let Some((i, p)) = pmf
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(SimulationError::DegenerateDistribution(format!(
                "weight {p} at index {i} is not a probability"
            )));
        }

        let sum: f64 = pmf.iter().sum();
        if (sum - 1.0).abs() > PMF_SUM_TOLERANCE {
            return Err(SimulationError::DegenerateDistribution(format!(
                "weights sum to {sum}, expected 1"
            )));
        }

        let index = WeightedIndex::new(pmf)
            .map_err(|e| SimulationError::DegenerateDistribution(e.to_string()))?;
        Ok(Self {
            index,
            len: pmf.len(),
        })
    }

    /// Number of outcomes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Draw one outcome index.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.index.sample(rng)
    }
}
