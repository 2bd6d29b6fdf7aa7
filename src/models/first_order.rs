// src/models/first_order.rs
//! First-Order Decay
//!
//! # Mathematical Framework
//!
//! A first-order reaction consumes the reactant at a rate proportional to
//! its current concentration:
//! ```text
//! d[A]/dt = -k [A]
//! ```
//!
//! With integrated rate law:
//! ```text
//! [A]_t = A0 * exp(-k t)
//! ```
//!
//! and its linearised form, used by the log-transform estimator:
//! ```text
//! ln [A]_t = ln A0 - k t
//! ```

use super::model::RateLaw;
use ndarray::{Array, Array1, Array2, ArrayBase, Axis, Data, Dimension};

/// Integrated first-order rate law for a single time point
#[inline]
pub fn first_order(t: f64, k: f64, a0: f64) -> f64 {
    a0 * (-k * t).exp()
}

/// Elementwise rate law over an array of times of any shape
pub fn concentration<S, D>(t: &ArrayBase<S, D>, k: f64, a0: f64) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    t.mapv(|ti| first_order(ti, k, a0))
}

/// Expected concentration matrix of shape `(times, samples)`.
///
/// The column of expected values over `times` is broadcast across
/// `samples` columns; every column is one trajectory's mean curve.
pub fn expected_matrix(times: &Array1<f64>, k: f64, a0: f64, samples: usize) -> Array2<f64> {
    let column = concentration(times, k, a0).insert_axis(Axis(1));
    let mut out = Array2::zeros((times.len(), samples));
    out.assign(&column);
    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstOrder {
    pub k: f64,
    pub a0: f64,
}

impl FirstOrder {
    pub fn new(k: f64, a0: f64) -> Self {
        FirstOrder { k, a0 }
    }

    /// Half-life `ln 2 / k`
    pub fn half_life(&self) -> f64 {
        std::f64::consts::LN_2 / self.k
    }

    pub fn curve(&self, times: &Array1<f64>) -> Array1<f64> {
        concentration(times, self.k, self.a0)
    }
}

impl RateLaw for FirstOrder {
    fn concentration(&self, t: f64) -> f64 {
        first_order(t, self.k, self.a0)
    }

    fn parameter_gradient(&self, t: f64) -> [f64; 2] {
        let decay = (-self.k * t).exp();
        [-t * self.a0 * decay, decay]
    }

    fn parameters(&self) -> [f64; 2] {
        [self.k, self.a0]
    }

    fn with_parameters(&self, params: [f64; 2]) -> Self {
        FirstOrder::new(params[0], params[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_initial_value_and_half_life() {
        let model = FirstOrder::new(0.15, 7.5);
        assert!((model.concentration(0.0) - 7.5).abs() < 1e-12);
        assert!((model.concentration(model.half_life()) - 3.75).abs() < 1e-12);
    }

    #[test]
    fn test_strictly_decreasing_in_time() {
        for &(k, a0) in &[(0.15, 7.5), (1e-3, 0.2), (3.0, 100.0)] {
            let times = Array1::linspace(0.0, 20.0, 201);
            let curve = concentration(&times, k, a0);
            for w in curve.windows(2) {
                assert!(w[1] < w[0], "not decreasing for k={}, A0={}", k, a0);
            }
        }
    }

    #[test]
    fn test_expected_matrix_broadcasts_columns() {
        let times = array![2.0, 4.0, 6.0];
        let m = expected_matrix(&times, 0.15, 7.5, 4);
        assert_eq!(m.dim(), (3, 4));
        for (i, &t) in times.iter().enumerate() {
            for j in 0..4 {
                assert_eq!(m[[i, j]], first_order(t, 0.15, 7.5));
            }
        }
    }

    #[test]
    fn test_concentration_any_shape() {
        let t = array![[0.0, 1.0], [2.0, 3.0]];
        let c = concentration(&t, 0.5, 2.0);
        assert_eq!(c.dim(), (2, 2));
        assert!((c[[1, 1]] - 2.0 * (-1.5f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let model = FirstOrder::new(0.15, 7.5);
        let h = 1e-6;
        let t = 8.0;
        let grad = model.parameter_gradient(t);
        let dk = (first_order(t, 0.15 + h, 7.5) - first_order(t, 0.15 - h, 7.5)) / (2.0 * h);
        let da = (first_order(t, 0.15, 7.5 + h) - first_order(t, 0.15, 7.5 - h)) / (2.0 * h);
        assert!((grad[0] - dk).abs() < 1e-6);
        assert!((grad[1] - da).abs() < 1e-6);
    }
}
