// src/analytics/histogram.rs
//! Density-normalised histogram for the ratio distribution panels.
//!
//! `bins` equal-width bins span `[min, max]` of the sample; the last bin is
//! closed on the right. Densities integrate to one over the bin edges.

use crate::error::{validation::validate_nonzero, KineticsError, KineticsResult};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` increasing edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    pub density: Vec<f64>,
}

impl Histogram {
    pub fn new(values: &[f64], bins: usize) -> KineticsResult<Self> {
        validate_nonzero("histogram_bins", bins)?;
        if values.is_empty() {
            return Err(KineticsError::InvalidConfiguration {
                field: "values".to_string(),
                reason: "cannot build a histogram of no samples".to_string(),
            });
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            return Err(KineticsError::InvalidConfiguration {
                field: "values".to_string(),
                reason: format!("histogram samples must be finite, got {}", v),
            });
        }

        let (mut lo, mut hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();

        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let total = values.len() as f64;
        let density = counts
            .iter()
            .map(|&c| c as f64 / (total * width))
            .collect();

        Ok(Histogram {
            edges,
            counts,
            density,
        })
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// `(left, right, density)` per bin
    pub fn stairs(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.edges
            .windows(2)
            .zip(self.density.iter())
            .map(|(e, &d)| (e[0], e[1], d))
    }
}
