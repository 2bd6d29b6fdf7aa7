// src/error.rs
use serde::Serialize;
use std::fmt;

/// Which rate-constant estimator produced a result or a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Generalised least squares on `ln(concentration)` against `t`
    Linear,
    /// Levenberg-Marquardt on the untransformed exponential decay
    NonLinear,
}

impl Method {
    pub fn label(&self) -> &'static str {
        match self {
            Method::Linear => "linear",
            Method::NonLinear => "non-linear",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Custom error types for the kinetic-wls library
#[derive(Debug, Clone)]
pub enum KineticsError {
    /// Invalid configuration or parameter value
    InvalidConfiguration { field: String, reason: String },

    /// Rejection sampling did not reach an all-positive ensemble
    SamplingDivergence { rounds: usize, remaining: usize },

    /// A single trajectory could not be fitted
    FitDivergence {
        trajectory: usize,
        method: Method,
        reason: String,
    },

    /// Writing an output artifact failed
    Output { path: String, reason: String },
}

impl fmt::Display for KineticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KineticsError::InvalidConfiguration { field, reason } => {
                write!(f, "Invalid configuration for '{}': {}", field, reason)
            }
            KineticsError::SamplingDivergence { rounds, remaining } => {
                write!(
                    f,
                    "Rejection sampling did not converge after {} rounds: {} trajectories still contain non-positive concentrations",
                    rounds, remaining
                )
            }
            KineticsError::FitDivergence {
                trajectory,
                method,
                reason,
            } => {
                write!(
                    f,
                    "{} fit diverged for trajectory {}: {}",
                    method, trajectory, reason
                )
            }
            KineticsError::Output { path, reason } => {
                write!(f, "Failed to write '{}': {}", path, reason)
            }
        }
    }
}

impl std::error::Error for KineticsError {}

impl KineticsError {
    /// Trajectory-level failures may be skipped; everything else is fatal.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, KineticsError::FitDivergence { .. })
    }
}

/// Result type alias for kinetic-wls operations
pub type KineticsResult<T> = Result<T, KineticsError>;

/// Validation utilities
pub mod validation {
    use super::{KineticsError, KineticsResult};

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> KineticsResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(KineticsError::InvalidConfiguration {
                field: name.to_string(),
                reason: format!("must be positive (> 0), got {}", value),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> KineticsResult<()> {
        if !value.is_finite() {
            Err(KineticsError::InvalidConfiguration {
                field: name.to_string(),
                reason: format!("must be finite (not NaN or infinite), got {}", value),
            })
        } else {
            Ok(())
        }
    }

    /// Validate the sampling time grid.
    ///
    /// The grid must hold at least three strictly increasing, positive times:
    /// two fitted parameters plus one residual degree of freedom.
    pub fn validate_time_grid(times: &[f64]) -> KineticsResult<()> {
        if times.len() < 3 {
            return Err(KineticsError::InvalidConfiguration {
                field: "times".to_string(),
                reason: format!("needs at least 3 time points, got {}", times.len()),
            });
        }
        for (i, &t) in times.iter().enumerate() {
            if !t.is_finite() || t <= 0.0 {
                return Err(KineticsError::InvalidConfiguration {
                    field: "times".to_string(),
                    reason: format!("time point {} = {} must be finite and positive", i, t),
                });
            }
        }
        if let Some(i) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(KineticsError::InvalidConfiguration {
                field: "times".to_string(),
                reason: format!(
                    "must be strictly increasing ({} follows {} at index {})",
                    times[i + 1],
                    times[i],
                    i + 1
                ),
            });
        }
        Ok(())
    }

    /// Validate trajectory count
    pub fn validate_trajectories(trajectories: usize) -> KineticsResult<()> {
        if trajectories == 0 {
            Err(KineticsError::InvalidConfiguration {
                field: "trajectories".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if trajectories > 100_000_000 {
            Err(KineticsError::InvalidConfiguration {
                field: "trajectories".to_string(),
                reason: "exceeds maximum allowed (100 million)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate a count that must be at least one
    pub fn validate_nonzero(field: &str, value: usize) -> KineticsResult<()> {
        if value == 0 {
            Err(KineticsError::InvalidConfiguration {
                field: field.to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("scale", 0.3).is_ok());
        assert!(validate_positive("scale", 0.0).is_err());
        assert!(validate_positive("scale", -0.1).is_err());
        assert!(validate_positive("scale", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("value", 1.0).is_ok());
        assert!(validate_finite("value", f64::NAN).is_err());
        assert!(validate_finite("value", f64::INFINITY).is_err());
        assert!(validate_finite("value", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_validate_time_grid() {
        assert!(validate_time_grid(&[2.0, 4.0, 6.0]).is_ok());
        assert!(validate_time_grid(&[]).is_err());
        assert!(validate_time_grid(&[1.0, 2.0]).is_err());
        assert!(validate_time_grid(&[0.0, 2.0, 4.0]).is_err());
        assert!(validate_time_grid(&[-1.0, 2.0, 4.0]).is_err());
        assert!(validate_time_grid(&[2.0, 2.0, 4.0]).is_err());
        assert!(validate_time_grid(&[4.0, 2.0, 6.0]).is_err());
        assert!(validate_time_grid(&[2.0, f64::NAN, 6.0]).is_err());
    }

    #[test]
    fn test_validate_trajectories() {
        assert!(validate_trajectories(1).is_ok());
        assert!(validate_trajectories(32_768).is_ok());
        assert!(validate_trajectories(0).is_err());
    }

    #[test]
    fn test_error_display() {
        let error = validate_positive("scale", -0.1).unwrap_err();

        let display = format!("{}", error);
        assert!(display.contains("scale"));
        assert!(display.contains("-0.1"));
        assert!(display.contains("positive"));
    }

    #[test]
    fn test_fit_divergence_display() {
        let error = KineticsError::FitDivergence {
            trajectory: 17,
            method: Method::NonLinear,
            reason: "iteration limit reached".to_string(),
        };

        let display = format!("{}", error);
        assert!(display.contains("non-linear"));
        assert!(display.contains("17"));
        assert!(error.is_recoverable());
        assert!(!KineticsError::SamplingDivergence {
            rounds: 1000,
            remaining: 3
        }
        .is_recoverable());
    }
}
