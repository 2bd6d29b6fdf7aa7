// src/solvers/levenberg_marquardt.rs
//! Weighted Non-linear Estimator (Levenberg-Marquardt)
//!
//! # Mathematical Framework
//!
//! Fits a two-parameter rate law directly to the untransformed data by
//! minimising the weighted residual sum of squares:
//! ```text
//! χ²(p) = Σ ((y_i - f(t_i; p)) / σ_i)²,    p = (k, A0)
//! ```
//!
//! Each iteration solves the damped normal equations
//! ```text
//! (JᵀJ + λ diag(JᵀJ)) δ = Jᵀ r,    J_ij = ∂f(t_i)/∂p_j / σ_i
//! ```
//! shrinking λ after an accepted step and growing it after a rejected one.
//!
//! # Covariance
//!
//! ```text
//! Cov(p̂) = (JᵀJ)⁻¹ · s²,   s² = χ² / (n - 2)
//! ```
//! The reduced chi-square factor is dropped when `absolute_sigma` is set,
//! in which case σ is taken as the known measurement error.

use super::Estimate;
use crate::error::{KineticsError, KineticsResult, Method};
use crate::models::model::RateLaw;
use nalgebra::{Matrix2, Vector2};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt;

const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e16;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonlinearOptions {
    pub max_iterations: usize,
    /// Relative reduction of χ² below which the fit is converged
    pub ftol: f64,
    /// Relative step size below which the fit is converged
    pub xtol: f64,
    pub initial_lambda: f64,
    pub absolute_sigma: bool,
}

impl Default for NonlinearOptions {
    fn default() -> Self {
        NonlinearOptions {
            max_iterations: 200,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
            initial_lambda: 1e-3,
            absolute_sigma: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LmFailure {
    IterationLimit { iterations: usize },
    NonFinite { params: [f64; 2] },
    SingularJacobian,
    InsufficientData { points: usize },
}

impl fmt::Display for LmFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LmFailure::IterationLimit { iterations } => {
                write!(f, "no convergence within {} iterations", iterations)
            }
            LmFailure::NonFinite { params } => {
                write!(f, "non-finite χ² or parameters at k = {}, A0 = {}", params[0], params[1])
            }
            LmFailure::SingularJacobian => write!(f, "JᵀJ is singular, covariance undefined"),
            LmFailure::InsufficientData { points } => write!(
                f,
                "{} points leave no residual degrees of freedom for 2 parameters",
                points
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LmFit {
    pub params: [f64; 2],
    pub covariance: Matrix2<f64>,
    pub chi_square: f64,
    pub iterations: usize,
}

fn chi_square<M: RateLaw>(model: &M, times: ArrayView1<f64>, y: ArrayView1<f64>, sigma: f64) -> f64 {
    times
        .iter()
        .zip(y.iter())
        .map(|(&t, &yi)| {
            let r = (yi - model.concentration(t)) / sigma;
            r * r
        })
        .sum()
}

/// `(JᵀJ, Jᵀr)` with σ folded into both
fn normal_equations<M: RateLaw>(
    model: &M,
    times: ArrayView1<f64>,
    y: ArrayView1<f64>,
    sigma: f64,
) -> (Matrix2<f64>, Vector2<f64>) {
    let mut jtj = Matrix2::zeros();
    let mut jtr = Vector2::zeros();
    for (&t, &yi) in times.iter().zip(y.iter()) {
        let g = model.parameter_gradient(t);
        let row = Vector2::new(g[0] / sigma, g[1] / sigma);
        let r = (yi - model.concentration(t)) / sigma;
        jtj += row * row.transpose();
        jtr += row * r;
    }
    (jtj, jtr)
}

/// Weighted non-linear least squares for a two-parameter rate law,
/// starting from `initial`, with a uniform measurement error `sigma`.
pub fn levenberg_marquardt<M: RateLaw>(
    initial: &M,
    times: ArrayView1<f64>,
    y: ArrayView1<f64>,
    sigma: f64,
    opts: &NonlinearOptions,
) -> Result<LmFit, LmFailure> {
    let n = times.len();
    if n <= 2 && !opts.absolute_sigma {
        return Err(LmFailure::InsufficientData { points: n });
    }

    let mut params = Vector2::from(initial.parameters());
    let mut current = initial.with_parameters(params.into());
    let mut cost = chi_square(&current, times, y, sigma);
    if !cost.is_finite() {
        return Err(LmFailure::NonFinite {
            params: params.into(),
        });
    }

    let mut lambda = opts.initial_lambda;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < opts.max_iterations {
        iterations += 1;
        let (jtj, jtr) = normal_equations(&current, times, y, sigma);
        if jtr.amax() == 0.0 {
            converged = true;
            break;
        }

        let mut accepted = false;
        while lambda <= LAMBDA_MAX {
            let mut damped = jtj;
            for d in 0..2 {
                damped[(d, d)] += lambda * jtj[(d, d)].max(f64::EPSILON);
            }
            let Some(chol) = damped.cholesky() else {
                lambda *= 10.0;
                continue;
            };
            let step = chol.solve(&jtr);
            let trial_params = params + step;
            let trial = initial.with_parameters(trial_params.into());
            let trial_cost = chi_square(&trial, times, y, sigma);

            if trial_cost.is_finite() && trial_cost < cost {
                let reduction = (cost - trial_cost) / cost;
                let small_step = step.norm() <= opts.xtol * (params.norm() + opts.xtol);
                params = trial_params;
                current = trial;
                cost = trial_cost;
                lambda = (lambda / 10.0).max(LAMBDA_MIN);
                accepted = true;
                converged = reduction <= opts.ftol || small_step;
                break;
            }
            lambda *= 10.0;
        }

        // No damping level reduces χ²: the current point is stationary.
        if !accepted {
            converged = true;
        }
        if converged {
            break;
        }
    }

    if !converged {
        return Err(LmFailure::IterationLimit { iterations });
    }
    if !params.iter().all(|p| p.is_finite()) {
        return Err(LmFailure::NonFinite {
            params: params.into(),
        });
    }

    let (jtj, _) = normal_equations(&current, times, y, sigma);
    let mut covariance = jtj
        .try_inverse()
        .filter(|c| c.iter().all(|v| v.is_finite()))
        .ok_or(LmFailure::SingularJacobian)?;
    if !opts.absolute_sigma {
        covariance *= cost / (n - 2) as f64;
    }

    Ok(LmFit {
        params: params.into(),
        covariance,
        chi_square: cost,
        iterations,
    })
}

/// Method B: non-linear fit of the rate law to the raw trajectory
#[derive(Debug, Clone)]
pub struct NonlinearEstimator<M: RateLaw> {
    initial: M,
    scale: f64,
    options: NonlinearOptions,
}

impl<M: RateLaw> NonlinearEstimator<M> {
    pub fn new(initial: M, scale: f64, options: NonlinearOptions) -> Self {
        NonlinearEstimator {
            initial,
            scale,
            options,
        }
    }

    pub fn fit(
        &self,
        trajectory: usize,
        times: ArrayView1<f64>,
        concentrations: ArrayView1<f64>,
    ) -> KineticsResult<Estimate> {
        let fail = |reason: String| KineticsError::FitDivergence {
            trajectory,
            method: Method::NonLinear,
            reason,
        };
        if concentrations.len() != times.len() {
            return Err(fail(format!(
                "trajectory has {} points, time grid has {}",
                concentrations.len(),
                times.len()
            )));
        }

        let fit = levenberg_marquardt(&self.initial, times, concentrations, self.scale, &self.options)
            .map_err(|e| fail(e.to_string()))?;

        let estimate = Estimate {
            k: fit.params[0],
            standard_error: fit.covariance[(0, 0)].sqrt(),
        };
        if !estimate.is_finite() {
            return Err(fail(format!(
                "non-finite estimate k = {}, se = {}",
                estimate.k, estimate.standard_error
            )));
        }
        Ok(estimate)
    }
}
