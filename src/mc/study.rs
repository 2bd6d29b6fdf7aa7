// src/mc/study.rs
use crate::analytics::aggregate::{summarize, Summary};
use crate::analytics::figure::FigureData;
use crate::error::{validation::*, KineticsResult};
use crate::math_utils::Timer;
use crate::mc::sampler::{Ensemble, PhysicalSampler, SamplingReport};
use crate::models::first_order::FirstOrder;
use crate::rng;
use crate::solvers::dual::{DualEstimator, EstimateSet, FailurePolicy};
use crate::solvers::gls::LinearWeighting;
use crate::solvers::levenberg_marquardt::NonlinearOptions;
use log::info;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// True rate constant
    pub k: f64,
    /// True initial concentration
    pub a0: f64,
    pub times: Vec<f64>,
    /// Standard deviation of the additive measurement noise
    pub scale: f64,
    pub trajectories: usize,
    pub seed: u64,
    pub max_resample_rounds: usize,
    pub weighting: LinearWeighting,
    pub nonlinear: NonlinearOptions,
    pub failure_policy: FailurePolicy,
    pub histogram_bins: usize,
    pub parallel: bool,
}

impl StudyConfig {
    /// Validate the study configuration
    pub fn validate(&self) -> KineticsResult<()> {
        validate_positive("k", self.k)?;
        validate_positive("a0", self.a0)?;
        validate_time_grid(&self.times)?;
        validate_positive("scale", self.scale)?;
        validate_trajectories(self.trajectories)?;
        validate_nonzero("max_resample_rounds", self.max_resample_rounds)?;
        validate_nonzero("histogram_bins", self.histogram_bins)?;
        validate_nonzero("nonlinear.max_iterations", self.nonlinear.max_iterations)?;
        validate_positive("nonlinear.ftol", self.nonlinear.ftol)?;
        validate_positive("nonlinear.xtol", self.nonlinear.xtol)?;
        validate_positive("nonlinear.initial_lambda", self.nonlinear.initial_lambda)?;
        Ok(())
    }

    pub fn truth(&self) -> FirstOrder {
        FirstOrder::new(self.k, self.a0)
    }

    pub fn time_grid(&self) -> Array1<f64> {
        Array1::from(self.times.clone())
    }
}

impl Default for StudyConfig {
    fn default() -> Self {
        StudyConfig {
            k: 0.15,
            a0: 7.5,
            times: (1..=10).map(|i| 2.0 * i as f64).collect(),
            scale: 0.3,
            trajectories: 1 << 15,
            seed: 1,
            max_resample_rounds: 1000,
            weighting: LinearWeighting::InverseSigma,
            nonlinear: NonlinearOptions::default(),
            failure_policy: FailurePolicy::Abort,
            histogram_bins: 100,
            parallel: true,
        }
    }
}

/// Everything one study run produces
#[derive(Debug, Clone)]
pub struct StudyOutput {
    pub ensemble: Ensemble,
    pub sampling: SamplingReport,
    pub estimates: EstimateSet,
    pub summary: Summary,
    pub figure: FigureData,
    pub elapsed_ms: f64,
}

/// Simulate the ensemble, fit every trajectory both ways and summarise.
///
/// Sampling is driven by a generator seeded from `cfg.seed`; two runs with
/// equal configurations return identical ensembles and means.
pub fn run_study(cfg: &StudyConfig) -> KineticsResult<StudyOutput> {
    cfg.validate()?;
    let timer = Timer::new();
    let truth = cfg.truth();
    let times = cfg.time_grid();

    let sampler = PhysicalSampler::new(times.clone(), truth, cfg.scale, cfg.max_resample_rounds)?;
    let mut rng = rng::seed_rng_from_u64(cfg.seed);
    let (ensemble, sampling) = sampler.sample(cfg.trajectories, &mut rng)?;

    let estimator = DualEstimator::new(times, cfg.scale, truth, cfg.weighting, cfg.nonlinear);
    let estimates = estimator.estimate_ensemble(&ensemble, cfg.failure_policy, cfg.parallel)?;

    let summary = summarize(&estimates, cfg.k)?;
    let figure = FigureData::new(&ensemble, &summary, cfg.scale, cfg.histogram_bins)?;

    let elapsed_ms = timer.elapsed_ms();
    info!(
        "mean k/k_true: non-linear {:.4}, linear {:.4} ({:.0} ms)",
        summary.nonlinear.mean_ratio, summary.linear.mean_ratio, elapsed_ms
    );

    Ok(StudyOutput {
        ensemble,
        sampling,
        estimates,
        summary,
        figure,
        elapsed_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KineticsError;

    #[test]
    fn test_default_is_reference_configuration() {
        let cfg = StudyConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.times, vec![2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0]);
        assert_eq!(cfg.trajectories, 32_768);
    }

    #[test]
    fn test_invalid_configurations() {
        let bad = [
            StudyConfig { k: 0.0, ..Default::default() },
            StudyConfig { a0: -1.0, ..Default::default() },
            StudyConfig { scale: 0.0, ..Default::default() },
            StudyConfig { times: vec![], ..Default::default() },
            StudyConfig { times: vec![0.0, 1.0, 2.0], ..Default::default() },
            StudyConfig { trajectories: 0, ..Default::default() },
            StudyConfig { histogram_bins: 0, ..Default::default() },
        ];
        for cfg in &bad {
            match run_study(cfg) {
                Err(KineticsError::InvalidConfiguration { .. }) => {}
                other => panic!("expected InvalidConfiguration, got {:?}", other.map(|_| ())),
            }
        }
    }

    #[test]
    fn test_partial_json_overrides_defaults() {
        let cfg: StudyConfig =
            serde_json::from_str(r#"{"trajectories": 128, "weighting": "inverse_variance"}"#).unwrap();
        assert_eq!(cfg.trajectories, 128);
        assert_eq!(cfg.weighting, LinearWeighting::InverseVariance);
        assert_eq!(cfg.k, 0.15);
        assert_eq!(cfg.nonlinear, NonlinearOptions::default());
    }

    #[test]
    fn test_small_study_runs() {
        let cfg = StudyConfig {
            trajectories: 200,
            ..Default::default()
        };
        let out = run_study(&cfg).unwrap();
        assert_eq!(out.ensemble.len(), 200);
        assert_eq!(out.summary.linear.ratios.len(), 200);
        assert_eq!(out.figure.trajectory.concentrations.len(), 10);
        assert_eq!(out.figure.linear.histogram.bins(), 100);
    }
}
