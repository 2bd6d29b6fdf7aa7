// src/rng.rs
//! Random Number Generation for the Kinetics Ensemble
//!
//! # Design
//!
//! Every random draw in the crate comes from a generator that the caller
//! creates and passes in explicitly. There is no process-wide generator:
//! the same seed and configuration always reproduce the same ensemble,
//! bit for bit.
//!
//! # Measurement Noise
//!
//! Observations are the model curve plus additive Gaussian noise:
//! ```text
//! [A]_obs = [A]_model + ε,   ε ~ N(0, σ²)
//! ```

use crate::error::{KineticsError, KineticsResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Create the seeded generator that drives one study
pub fn seed_rng_from_u64(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Additive Gaussian measurement noise with a fixed standard deviation
#[derive(Debug, Clone, Copy)]
pub struct NoiseSource {
    normal: Normal<f64>,
    scale: f64,
}

impl NoiseSource {
    pub fn new(scale: f64) -> KineticsResult<Self> {
        let normal = Normal::new(0.0, scale).map_err(|e| KineticsError::InvalidConfiguration {
            field: "scale".to_string(),
            reason: format!("{} is not a valid noise standard deviation ({})", scale, e),
        })?;
        Ok(Self { normal, scale })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// One noisy observation around `mean`
    pub fn observe<R: Rng + ?Sized>(&self, rng: &mut R, mean: f64) -> f64 {
        mean + self.normal.sample(rng)
    }
}
