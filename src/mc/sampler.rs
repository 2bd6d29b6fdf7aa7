// src/mc/sampler.rs
//! Physical Sampler: noisy trajectories with strictly positive concentrations
//!
//! # Algorithm
//!
//! 1. Broadcast the model curve over the time grid into a `(times, N)` matrix
//! 2. Add one N(0, σ²) draw to every entry
//! 3. Collect the columns holding any value ≤ 0
//! 4. Redraw only those columns and drop the ones that are now clean
//! 5. Repeat 4 until the index set is empty or the round cap is reached
//!
//! Each column's draws are i.i.d. whichever round produced them, so every
//! accepted trajectory follows the noise distribution conditioned on
//! positivity.

use crate::error::{validation::*, KineticsError, KineticsResult};
use crate::math_utils::rejection_probability;
use crate::models::first_order::{expected_matrix, FirstOrder};
use crate::rng::NoiseSource;
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::Rng;

/// `N` trajectories over a shared time grid, stored as a `(times, N)` matrix.
///
/// Every entry is strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct Ensemble {
    times: Array1<f64>,
    values: Array2<f64>,
}

impl Ensemble {
    /// Wrap an existing `(times, N)` matrix, checking the positivity invariant
    pub fn from_values(times: Array1<f64>, values: Array2<f64>) -> KineticsResult<Self> {
        validate_time_grid(&times.to_vec())?;
        if values.nrows() != times.len() {
            return Err(KineticsError::InvalidConfiguration {
                field: "values".to_string(),
                reason: format!(
                    "{} rows for a time grid of {} points",
                    values.nrows(),
                    times.len()
                ),
            });
        }
        validate_trajectories(values.ncols())?;
        if let Some(v) = values.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
            return Err(KineticsError::InvalidConfiguration {
                field: "values".to_string(),
                reason: format!("concentration {} is not strictly positive", v),
            });
        }
        Ok(Ensemble { times, values })
    }

    pub fn times(&self) -> &Array1<f64> {
        &self.times
    }

    /// The `(times, N)` concentration matrix
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of trajectories
    pub fn len(&self) -> usize {
        self.values.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn n_times(&self) -> usize {
        self.values.nrows()
    }

    pub fn trajectory(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.column(index)
    }

    pub fn trajectories(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> + '_ {
        self.values.axis_iter(Axis(1))
    }

    pub fn min_value(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// Rejection statistics of one sampling run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplingReport {
    /// Resampling rounds after the initial draw
    pub rounds: usize,
    /// Total column redraws across all rounds
    pub redrawn: usize,
}

#[derive(Debug, Clone)]
pub struct PhysicalSampler {
    times: Array1<f64>,
    model: FirstOrder,
    noise: NoiseSource,
    max_rounds: usize,
}

impl PhysicalSampler {
    pub fn new(
        times: Array1<f64>,
        model: FirstOrder,
        scale: f64,
        max_rounds: usize,
    ) -> KineticsResult<Self> {
        validate_time_grid(&times.to_vec())?;
        validate_positive("k", model.k)?;
        validate_positive("a0", model.a0)?;
        validate_positive("scale", scale)?;
        validate_nonzero("max_resample_rounds", max_rounds)?;

        Ok(PhysicalSampler {
            times,
            model,
            noise: NoiseSource::new(scale)?,
            max_rounds,
        })
    }

    pub fn times(&self) -> &Array1<f64> {
        &self.times
    }

    pub fn scale(&self) -> f64 {
        self.noise.scale()
    }

    /// Probability that one fresh trajectory is rejected
    pub fn rejection_probability(&self) -> f64 {
        let means = self.model.curve(&self.times);
        rejection_probability(&means.to_vec(), self.noise.scale())
    }

    /// Draw `n` strictly positive trajectories from `rng`
    pub fn sample<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> KineticsResult<(Ensemble, SamplingReport)> {
        validate_trajectories(n)?;
        debug!(
            "sampling {} trajectories, expected rejection rate {:.4}",
            n,
            self.rejection_probability()
        );

        let means = self.model.curve(&self.times);
        let mut values = expected_matrix(&self.times, self.model.k, self.model.a0, n);
        values.mapv_inplace(|m| self.noise.observe(&mut *rng, m));

        let mut invalid: Vec<usize> = (0..n).filter(|&j| has_non_positive(&values, j)).collect();
        let mut report = SamplingReport::default();

        while !invalid.is_empty() {
            if report.rounds == self.max_rounds {
                return Err(KineticsError::SamplingDivergence {
                    rounds: report.rounds,
                    remaining: invalid.len(),
                });
            }
            report.rounds += 1;
            report.redrawn += invalid.len();
            debug!("round {}: redrawing {} trajectories", report.rounds, invalid.len());

            for &j in &invalid {
                for (v, &m) in values.column_mut(j).iter_mut().zip(means.iter()) {
                    *v = self.noise.observe(&mut *rng, m);
                }
            }
            invalid.retain(|&j| has_non_positive(&values, j));
        }

        info!(
            "sampled {} trajectories ({} redraws over {} rounds)",
            n, report.redrawn, report.rounds
        );

        Ok((
            Ensemble {
                times: self.times.clone(),
                values,
            },
            report,
        ))
    }
}

fn has_non_positive(values: &Array2<f64>, column: usize) -> bool {
    values.column(column).iter().any(|&v| v <= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seed_rng_from_u64;
    use ndarray::array;

    fn reference_sampler(scale: f64, max_rounds: usize) -> PhysicalSampler {
        PhysicalSampler::new(
            Array1::range(2.0, 22.0, 2.0),
            FirstOrder::new(0.15, 7.5),
            scale,
            max_rounds,
        )
        .unwrap()
    }

    #[test]
    fn test_shape_and_positivity() {
        let sampler = reference_sampler(0.3, 1000);
        let mut rng = seed_rng_from_u64(1);
        let (ensemble, report) = sampler.sample(2048, &mut rng).unwrap();

        assert_eq!(ensemble.len(), 2048);
        assert_eq!(ensemble.n_times(), 10);
        assert!(ensemble.min_value() > 0.0);
        // ~10% of draws at t = 20 are negative, so some redraws must happen
        assert!(report.rounds > 0 && report.redrawn > 0);
    }

    #[test]
    fn test_same_seed_same_ensemble() {
        let sampler = reference_sampler(0.3, 1000);
        let (a, ra) = sampler.sample(500, &mut seed_rng_from_u64(11)).unwrap();
        let (b, rb) = sampler.sample(500, &mut seed_rng_from_u64(11)).unwrap();
        assert_eq!(a, b);
        assert_eq!(ra, rb);

        let (c, _) = sampler.sample(500, &mut seed_rng_from_u64(12)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_divergence_cap() {
        // Mean ~0.4 at t = 20 against σ = 50: almost every column is rejected
        let sampler = reference_sampler(50.0, 3);
        let err = sampler.sample(64, &mut seed_rng_from_u64(5)).unwrap_err();
        match err {
            KineticsError::SamplingDivergence { rounds, remaining } => {
                assert_eq!(rounds, 3);
                assert!(remaining > 0);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_invalid_construction() {
        let model = FirstOrder::new(0.15, 7.5);
        assert!(PhysicalSampler::new(array![2.0, 4.0, 6.0], model, 0.0, 10).is_err());
        assert!(PhysicalSampler::new(array![2.0, 4.0, 6.0], model, 0.3, 0).is_err());
        assert!(PhysicalSampler::new(Array1::zeros(0), model, 0.3, 10).is_err());
        assert!(
            PhysicalSampler::new(array![2.0, 4.0, 6.0], FirstOrder::new(-0.1, 7.5), 0.3, 10)
                .is_err()
        );
        let sampler = PhysicalSampler::new(array![2.0, 4.0, 6.0], model, 0.3, 10).unwrap();
        assert!(sampler.sample(0, &mut seed_rng_from_u64(1)).is_err());
    }

    #[test]
    fn test_from_values_checks_invariants() {
        let times = array![2.0, 4.0, 6.0];
        assert!(Ensemble::from_values(times.clone(), Array2::from_elem((3, 2), 1.0)).is_ok());
        assert!(Ensemble::from_values(times.clone(), Array2::from_elem((2, 2), 1.0)).is_err());
        assert!(Ensemble::from_values(times.clone(), Array2::zeros((3, 0))).is_err());

        let mut values = Array2::from_elem((3, 2), 1.0);
        values[[1, 1]] = 0.0;
        assert!(Ensemble::from_values(times, values).is_err());
    }
}
