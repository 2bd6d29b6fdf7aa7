// src/models/model.rs
/// A two-parameter integrated rate law `[A](t; k, A0)`.
///
/// The non-linear estimator only needs the curve and its gradient with
/// respect to the parameters, so it is written against this trait.
pub trait RateLaw {
    fn concentration(&self, t: f64) -> f64;
    /// `[∂[A]/∂k, ∂[A]/∂A0]` at time `t`
    fn parameter_gradient(&self, t: f64) -> [f64; 2];
    /// `[k, A0]`
    fn parameters(&self) -> [f64; 2];
    fn with_parameters(&self, params: [f64; 2]) -> Self
    where
        Self: Sized;
}
