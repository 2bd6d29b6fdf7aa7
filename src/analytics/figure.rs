// src/analytics/figure.rs
//! Numeric content of the four-panel comparison figure.
//!
//! - (a) one trajectory on linear axes with ±σ error bars
//! - (b) the same trajectory for a logarithmic concentration axis
//! - (c) density of `k̂_non / k` with its mean
//! - (d) density of `k̂_lin / k` with its mean
//!
//! Rendering is left to whatever consumes this struct.

use super::aggregate::Summary;
use super::histogram::Histogram;
use crate::error::KineticsResult;
use crate::mc::sampler::Ensemble;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IllustrationTrajectory {
    pub index: usize,
    pub times: Vec<f64>,
    pub concentrations: Vec<f64>,
    /// Error bar half-width, the measurement noise σ
    pub sigma: f64,
}

impl IllustrationTrajectory {
    /// `ln [A]` for the linearised panel
    pub fn log_concentrations(&self) -> Vec<f64> {
        self.concentrations.iter().map(|c| c.ln()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioPanel {
    pub histogram: Histogram,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureData {
    pub trajectory: IllustrationTrajectory,
    pub nonlinear: RatioPanel,
    pub linear: RatioPanel,
}

impl FigureData {
    /// Panels built from trajectory 0 of `ensemble` and the summary ratios
    pub fn new(ensemble: &Ensemble, summary: &Summary, sigma: f64, bins: usize) -> KineticsResult<Self> {
        let trajectory = IllustrationTrajectory {
            index: 0,
            times: ensemble.times().to_vec(),
            concentrations: ensemble.trajectory(0).to_vec(),
            sigma,
        };
        Ok(FigureData {
            trajectory,
            nonlinear: RatioPanel {
                histogram: Histogram::new(&summary.nonlinear.ratios, bins)?,
                mean: summary.nonlinear.mean_ratio,
            },
            linear: RatioPanel {
                histogram: Histogram::new(&summary.linear.ratios, bins)?,
                mean: summary.linear.mean_ratio,
            },
        })
    }
}
