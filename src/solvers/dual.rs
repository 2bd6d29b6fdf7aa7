// src/solvers/dual.rs
//! Runs both estimators over every trajectory of an ensemble.
//!
//! Trajectories are independent, so the loop is spread over rayon workers.
//! Results are collected in trajectory order, which makes the parallel and
//! sequential paths produce identical output.

use super::gls::{LinearEstimator, LinearWeighting};
use super::levenberg_marquardt::{NonlinearEstimator, NonlinearOptions};
use super::Estimate;
use crate::error::{KineticsError, KineticsResult};
use crate::mc::sampler::Ensemble;
use crate::models::first_order::FirstOrder;
use log::{info, warn};
use ndarray::{Array1, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// What to do when one trajectory cannot be fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing trajectory
    #[default]
    Abort,
    /// Drop the trajectory from both ensembles and carry on
    Skip,
}

/// Both estimates for one trajectory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualEstimate {
    pub linear: Estimate,
    pub nonlinear: Estimate,
}

/// Parallel per-method estimate ensembles.
///
/// `indices[i]`, `linear[i]` and `nonlinear[i]` always describe the same
/// trajectory; skipped trajectories appear in none of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimateSet {
    pub indices: Vec<usize>,
    pub linear: Vec<Estimate>,
    pub nonlinear: Vec<Estimate>,
    pub skipped: Vec<usize>,
}

impl EstimateSet {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct DualEstimator {
    times: Array1<f64>,
    linear: LinearEstimator,
    nonlinear: NonlinearEstimator<FirstOrder>,
}

impl DualEstimator {
    /// `initial` is the starting point of the non-linear fit
    pub fn new(
        times: Array1<f64>,
        scale: f64,
        initial: FirstOrder,
        weighting: LinearWeighting,
        options: NonlinearOptions,
    ) -> Self {
        let linear = LinearEstimator::new(times.view(), scale, weighting);
        let nonlinear = NonlinearEstimator::new(initial, scale, options);
        DualEstimator {
            times,
            linear,
            nonlinear,
        }
    }

    pub fn estimate(
        &self,
        trajectory: usize,
        concentrations: ArrayView1<f64>,
    ) -> KineticsResult<DualEstimate> {
        Ok(DualEstimate {
            linear: self.linear.fit(trajectory, concentrations)?,
            nonlinear: self
                .nonlinear
                .fit(trajectory, self.times.view(), concentrations)?,
        })
    }

    pub fn estimate_ensemble(
        &self,
        ensemble: &Ensemble,
        policy: FailurePolicy,
        parallel: bool,
    ) -> KineticsResult<EstimateSet> {
        if ensemble.times() != &self.times {
            return Err(KineticsError::InvalidConfiguration {
                field: "times".to_string(),
                reason: "ensemble was sampled on a different time grid".to_string(),
            });
        }

        let n = ensemble.len();
        let results: Vec<KineticsResult<DualEstimate>> = if parallel {
            (0..n)
                .into_par_iter()
                .map(|j| self.estimate(j, ensemble.trajectory(j)))
                .collect()
        } else {
            (0..n)
                .map(|j| self.estimate(j, ensemble.trajectory(j)))
                .collect()
        };

        let mut set = EstimateSet {
            indices: Vec::with_capacity(n),
            linear: Vec::with_capacity(n),
            nonlinear: Vec::with_capacity(n),
            skipped: Vec::new(),
        };
        for (j, result) in results.into_iter().enumerate() {
            match result {
                Ok(dual) => {
                    set.indices.push(j);
                    set.linear.push(dual.linear);
                    set.nonlinear.push(dual.nonlinear);
                }
                Err(e) if e.is_recoverable() && policy == FailurePolicy::Skip => {
                    warn!("skipping trajectory {}: {}", j, e);
                    set.skipped.push(j);
                }
                Err(e) => return Err(e),
            }
        }

        if set.is_empty() {
            return Err(KineticsError::InvalidConfiguration {
                field: "failure_policy".to_string(),
                reason: format!("all {} trajectories failed to fit", n),
            });
        }

        info!(
            "estimated {} trajectories ({} skipped)",
            set.len(),
            set.skipped.len()
        );
        Ok(set)
    }
}
