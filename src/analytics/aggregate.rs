// src/analytics/aggregate.rs
//! Reduces per-trajectory estimates to ratio distributions and their means.
//!
//! For each method the ratio `k̂ / k` is taken elementwise; an unbiased
//! estimator has a mean ratio of one.

use crate::error::{validation::validate_positive, KineticsError, KineticsResult, Method};
use crate::solvers::dual::EstimateSet;
use crate::solvers::Estimate;
use serde::Serialize;
use statrs::statistics::Statistics;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSummary {
    pub method: Method,
    /// `k̂ / k` in trajectory order
    pub ratios: Vec<f64>,
    pub mean_ratio: f64,
    /// Sample standard deviation of the ratios (0 for a single trajectory)
    pub std_ratio: f64,
    pub mean_standard_error: f64,
}

impl MethodSummary {
    pub fn from_estimates(method: Method, estimates: &[Estimate], k_true: f64) -> KineticsResult<Self> {
        validate_positive("k", k_true)?;
        if estimates.is_empty() {
            return Err(KineticsError::InvalidConfiguration {
                field: "estimates".to_string(),
                reason: format!("no {} estimates to aggregate", method),
            });
        }

        let ratios: Vec<f64> = estimates.iter().map(|e| e.ratio_to(k_true)).collect();
        let mean_ratio = ratios.iter().mean();
        let std_ratio = if ratios.len() > 1 {
            ratios.iter().std_dev()
        } else {
            0.0
        };
        let mean_standard_error = estimates.iter().map(|e| e.standard_error).mean();

        Ok(MethodSummary {
            method,
            ratios,
            mean_ratio,
            std_ratio,
            mean_standard_error,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub k_true: f64,
    pub linear: MethodSummary,
    pub nonlinear: MethodSummary,
    /// Trajectory index behind each ratio position
    pub indices: Vec<usize>,
    pub skipped: Vec<usize>,
}

impl Summary {
    pub fn method(&self, method: Method) -> &MethodSummary {
        match method {
            Method::Linear => &self.linear,
            Method::NonLinear => &self.nonlinear,
        }
    }
}

pub fn summarize(estimates: &EstimateSet, k_true: f64) -> KineticsResult<Summary> {
    Ok(Summary {
        k_true,
        linear: MethodSummary::from_estimates(Method::Linear, &estimates.linear, k_true)?,
        nonlinear: MethodSummary::from_estimates(Method::NonLinear, &estimates.nonlinear, k_true)?,
        indices: estimates.indices.clone(),
        skipped: estimates.skipped.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn est(k: f64, se: f64) -> Estimate {
        Estimate {
            k,
            standard_error: se,
        }
    }

    #[test]
    fn test_mean_ratio() {
        let set = EstimateSet {
            indices: vec![0, 1, 2],
            linear: vec![est(0.12, 0.01), est(0.15, 0.02), est(0.18, 0.03)],
            nonlinear: vec![est(0.15, 0.01), est(0.15, 0.01), est(0.15, 0.01)],
            skipped: vec![],
        };
        let summary = summarize(&set, 0.15).unwrap();

        assert!((summary.linear.mean_ratio - 1.0).abs() < 1e-12);
        assert!((summary.linear.std_ratio - 0.2).abs() < 1e-12);
        assert!((summary.linear.mean_standard_error - 0.02).abs() < 1e-12);
        assert!((summary.nonlinear.mean_ratio - 1.0).abs() < 1e-12);
        assert_eq!(summary.nonlinear.std_ratio, 0.0);
        assert_eq!(summary.method(Method::Linear).ratios.len(), 3);
    }

    #[test]
    fn test_single_estimate() {
        let s = MethodSummary::from_estimates(Method::NonLinear, &[est(0.3, 0.1)], 0.15).unwrap();
        assert_eq!(s.mean_ratio, 2.0);
        assert_eq!(s.std_ratio, 0.0);
    }

    #[test]
    fn test_empty_is_an_error() {
        assert!(MethodSummary::from_estimates(Method::Linear, &[], 0.15).is_err());
        assert!(MethodSummary::from_estimates(Method::Linear, &[est(0.1, 0.1)], 0.0).is_err());
    }
}
