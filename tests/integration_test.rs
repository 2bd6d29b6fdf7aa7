// tests/integration_test.rs
use kinetic_wls::mc::study::{run_study, StudyConfig};
use kinetic_wls::output::{self, LINEAR_MEAN_FILE, NONLINEAR_MEAN_FILE};
use kinetic_wls::solvers::gls::LinearWeighting;
use std::fs;
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kinetic-wls-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).expect("Could not create scratch directory");
    dir
}

#[test]
fn test_reference_study_bias() {
    let cfg = StudyConfig::default();
    assert_eq!(cfg.trajectories, 32_768);

    let out = run_study(&cfg).expect("Valid configuration");
    let non = out.summary.nonlinear.mean_ratio;
    let lin = out.summary.linear.mean_ratio;

    println!("Mean k_non/k: {:.4}", non);
    println!("Mean k_lin/k: {:.4}", lin);
    println!("Resampling rounds: {}", out.sampling.rounds);

    assert_eq!(out.estimates.len(), 32_768);
    assert!(out.estimates.skipped.is_empty());
    assert!(
        (0.95..=1.05).contains(&non),
        "Non-linear mean ratio {:.4} outside [0.95, 1.05]",
        non
    );
    // The log transform of truncated noise pulls the linear estimate low
    assert!(
        (0.90..=0.99).contains(&lin),
        "Linear mean ratio {:.4} outside [0.90, 0.99]",
        lin
    );
    assert!(lin < non, "Linear fit should be more biased than non-linear");
}

#[test]
fn test_inverse_variance_weighting_also_biased_low() {
    let cfg = StudyConfig {
        trajectories: 8_192,
        weighting: LinearWeighting::InverseVariance,
        ..Default::default()
    };
    let out = run_study(&cfg).expect("Valid configuration");
    let lin = out.summary.linear.mean_ratio;
    assert!(
        (0.88..=0.98).contains(&lin),
        "Inverse-variance linear mean ratio {:.4}",
        lin
    );
}

#[test]
fn test_pipeline_reproducible() {
    let cfg = StudyConfig {
        trajectories: 4_096,
        seed: 2024,
        ..Default::default()
    };
    let a = run_study(&cfg).expect("Valid configuration");
    let b = run_study(&cfg).expect("Valid configuration");

    assert_eq!(a.ensemble, b.ensemble);
    assert_eq!(a.estimates, b.estimates);
    assert_eq!(a.summary.linear.mean_ratio, b.summary.linear.mean_ratio);
    assert_eq!(a.summary.nonlinear.mean_ratio, b.summary.nonlinear.mean_ratio);

    let serial = run_study(&StudyConfig {
        parallel: false,
        ..cfg.clone()
    })
    .expect("Valid configuration");
    assert_eq!(a.estimates, serial.estimates);
}

#[test]
fn test_summary_files_round_to_two_decimals() {
    let cfg = StudyConfig {
        trajectories: 2_048,
        ..Default::default()
    };
    let out = run_study(&cfg).expect("Valid configuration");

    let dir = scratch_dir("summary");
    output::write_summary_values(&dir, &out.summary, true).unwrap();
    let lin = fs::read_to_string(dir.join(LINEAR_MEAN_FILE)).unwrap();
    let non = fs::read_to_string(dir.join(NONLINEAR_MEAN_FILE)).unwrap();
    assert_eq!(lin, format!(r"\num{{{:.2}}}", out.summary.linear.mean_ratio));
    assert_eq!(non, format!(r"\num{{{:.2}}}", out.summary.nonlinear.mean_ratio));

    output::write_summary_values(&dir, &out.summary, false).unwrap();
    let plain = fs::read_to_string(dir.join(NONLINEAR_MEAN_FILE)).unwrap();
    let parsed: f64 = plain.parse().unwrap();
    assert!((parsed - out.summary.nonlinear.mean_ratio).abs() <= 0.005 + 1e-12);
    assert_eq!(plain.split('.').nth(1).map(str::len), Some(2));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_csv_artifacts() {
    let cfg = StudyConfig {
        trajectories: 1_024,
        histogram_bins: 20,
        ..Default::default()
    };
    let out = run_study(&cfg).expect("Valid configuration");
    let dir = scratch_dir("csv");

    let ratios_path = dir.join("ratios.csv");
    output::write_ratios_csv(&ratios_path, &out.estimates, cfg.k).unwrap();
    let ratios = fs::read_to_string(&ratios_path).unwrap();
    assert_eq!(ratios.lines().count(), 1 + 1_024);
    assert!(ratios.starts_with("trajectory,k_lin_ratio,se_lin,k_non_ratio,se_non"));

    let traj_path = dir.join("trajectory.csv");
    output::write_trajectory_csv(&traj_path, &out.figure).unwrap();
    assert_eq!(fs::read_to_string(&traj_path).unwrap().lines().count(), 1 + 10);

    let hist_path = dir.join("histograms.csv");
    output::write_histograms_csv(&hist_path, &out.figure).unwrap();
    assert_eq!(fs::read_to_string(&hist_path).unwrap().lines().count(), 1 + 2 * 20);

    fs::remove_dir_all(&dir).ok();
}
