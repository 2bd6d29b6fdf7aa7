// src/solvers/gls.rs
//! Weighted Linear Estimator (log-transform GLS)
//!
//! # Mathematical Framework
//!
//! Taking logs of the first-order rate law gives a straight line in `t`:
//! ```text
//! ln [A]_i = ln A0 - k t_i      X = [t_i, 1],  β = [-k, ln A0]
//! ```
//!
//! Additive noise on `[A]` is not additive-constant after the log, so each
//! point's noise is propagated to first order:
//! ```text
//! σ_ln,i ≈ σ / [A]_i
//! ```
//!
//! The generalised least squares solution is
//! ```text
//! β̂ = (XᵀWX)⁻¹ XᵀW y,   Cov(β̂) = (XᵀWX)⁻¹,   y = ln [A]
//! ```
//! with `k̂ = -β̂₀` and `se(k̂) = √Cov₀₀`.
//!
//! # Weighting
//!
//! `W` is diagonal. [`LinearWeighting::InverseSigma`] uses `1/σ_ln,i`,
//! which reproduces the published reference figure;
//! [`LinearWeighting::InverseVariance`] uses `1/σ_ln,i²`, the textbook
//! GLS weight.

use super::Estimate;
use crate::error::{KineticsError, KineticsResult, Method};
use nalgebra::{DMatrix, DVector};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearWeighting {
    /// `w_i = [A]_i / σ`
    #[default]
    InverseSigma,
    /// `w_i = ([A]_i / σ)²`
    InverseVariance,
}

impl LinearWeighting {
    #[inline]
    pub fn weight(&self, sigma_log: f64) -> f64 {
        match self {
            LinearWeighting::InverseSigma => 1.0 / sigma_log,
            LinearWeighting::InverseVariance => 1.0 / (sigma_log * sigma_log),
        }
    }
}

/// Method A: GLS on the linearised rate law over a fixed time grid
#[derive(Debug, Clone)]
pub struct LinearEstimator {
    design: DMatrix<f64>,
    scale: f64,
    weighting: LinearWeighting,
}

impl LinearEstimator {
    pub fn new(times: ArrayView1<f64>, scale: f64, weighting: LinearWeighting) -> Self {
        let n = times.len();
        let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { times[i] } else { 1.0 });
        LinearEstimator {
            design,
            scale,
            weighting,
        }
    }

    /// Fit one trajectory; `trajectory` is only used to label failures
    pub fn fit(&self, trajectory: usize, concentrations: ArrayView1<f64>) -> KineticsResult<Estimate> {
        let fail = |reason: String| KineticsError::FitDivergence {
            trajectory,
            method: Method::Linear,
            reason,
        };

        let n = self.design.nrows();
        if concentrations.len() != n {
            return Err(fail(format!(
                "trajectory has {} points, time grid has {}",
                concentrations.len(),
                n
            )));
        }

        let mut y = DVector::zeros(n);
        let mut w = DVector::zeros(n);
        for (i, &c) in concentrations.iter().enumerate() {
            if !(c.is_finite() && c > 0.0) {
                return Err(fail(format!(
                    "concentration {} at point {} has no logarithm",
                    c, i
                )));
            }
            y[i] = c.ln();
            w[i] = self.weighting.weight(self.scale / c);
        }

        let (beta, cov) = solve_weighted_least_squares(&self.design, &y, &w)
            .ok_or_else(|| fail("XᵀWX is singular".to_string()))?;

        let estimate = Estimate {
            k: -beta[0],
            standard_error: cov[(0, 0)].sqrt(),
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

/// Solve weighted least squares: minimize Σ w_i (y_i - x_i'β)²
///
/// Returns `(β, (XᵀWX)⁻¹)`, or `None` when `XᵀWX` cannot be factorised.
pub fn solve_weighted_least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    w: &DVector<f64>,
) -> Option<(DVector<f64>, DMatrix<f64>)> {
    let n = x.nrows();
    let p = x.ncols();

    // X_w = W^(1/2) X, y_w = W^(1/2) y
    let mut x_weighted = x.clone();
    let mut y_weighted = y.clone();
    for i in 0..n {
        let sw = w[i].sqrt();
        for j in 0..p {
            x_weighted[(i, j)] *= sw;
        }
        y_weighted[i] *= sw;
    }

    let xtwx = x_weighted.transpose() * &x_weighted;
    let xtwy = x_weighted.transpose() * y_weighted;

    let chol = xtwx.cholesky()?;
    let beta = chol.solve(&xtwy);
    let cov = chol.inverse();

    if beta.iter().chain(cov.iter()).all(|v| v.is_finite()) {
        Some((beta, cov))
    } else {
        None
    }
}
