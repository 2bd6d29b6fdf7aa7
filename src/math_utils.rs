// src/math_utils.rs
use statrs::function::erf;
use std::f64::consts::SQRT_2;

pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf::erf(x / SQRT_2))
}

/// Probability that a single draw from N(mean, scale²) is non-positive
pub fn non_positive_probability(mean: f64, scale: f64) -> f64 {
    norm_cdf(-mean / scale)
}

/// Probability that a whole trajectory with the given point means is
/// rejected, i.e. at least one of its draws is non-positive
pub fn rejection_probability(means: &[f64], scale: f64) -> f64 {
    let accept: f64 = means
        .iter()
        .map(|&m| 1.0 - non_positive_probability(m, scale))
        .product();
    1.0 - accept
}

pub struct Timer {
    start_time: std::time::Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm_cdf_symmetry() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-12);
        assert!((norm_cdf(1.3) + norm_cdf(-1.3) - 1.0).abs() < 1e-12);
        assert!((norm_cdf(1.959963985) - 0.975).abs() < 1e-6);
    }

    #[test]
    fn test_rejection_probability_bounds() {
        // Reference curve: 7.5 exp(-0.15 t) at t = 20 is ~0.373, σ = 0.3
        let tail = non_positive_probability(7.5 * (-0.15f64 * 20.0).exp(), 0.3);
        assert!(tail > 0.05 && tail < 0.2, "unexpected tail {}", tail);

        let p = rejection_probability(&[10.0, 10.0, 10.0], 0.3);
        assert!(p >= 0.0 && p < 1e-12);

        let p = rejection_probability(&[0.0], 1.0);
        assert!((p - 0.5).abs() < 1e-12);
    }
}
