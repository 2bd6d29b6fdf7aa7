//! Rate-constant estimators.
//!
//! Both methods take one trajectory over the shared time grid and return the
//! same [`Estimate`] shape, so they can be compared point for point.

pub mod dual;
pub mod gls;
pub mod levenberg_marquardt;

use serde::{Deserialize, Serialize};

/// Point estimate of the rate constant and its propagated standard error
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub k: f64,
    pub standard_error: f64,
}

impl Estimate {
    pub fn is_finite(&self) -> bool {
        self.k.is_finite() && self.standard_error.is_finite()
    }

    /// `k̂ / k_true`
    pub fn ratio_to(&self, k_true: f64) -> f64 {
        self.k / k_true
    }
}
