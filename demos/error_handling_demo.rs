// demos/error_handling_demo.rs
use kinetic_wls::error::KineticsError;
use kinetic_wls::mc::sampler::{Ensemble, PhysicalSampler};
use kinetic_wls::mc::study::{run_study, StudyConfig};
use kinetic_wls::models::first_order::FirstOrder;
use kinetic_wls::rng::seed_rng_from_u64;
use kinetic_wls::solvers::dual::{DualEstimator, FailurePolicy};
use kinetic_wls::solvers::gls::LinearWeighting;
use kinetic_wls::solvers::levenberg_marquardt::NonlinearOptions;
use ndarray::{Array1, Array2};

fn main() {
    println!("Error Handling Demo for kinetic-wls");
    println!("===================================\n");

    // Test 1: Non-positive rate constant
    println!("1. Testing a non-positive rate constant...");
    let cfg = StudyConfig {
        k: -0.15,
        ..Default::default()
    };
    match run_study(&cfg) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 2: Time grid too short to fit two parameters with residual freedom
    println!("\n2. Testing a two-point time grid...");
    let cfg = StudyConfig {
        times: vec![2.0, 4.0],
        ..Default::default()
    };
    match run_study(&cfg) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 3: Noise so large that almost no trajectory stays positive
    println!("\n3. Testing rejection sampling with a tight round cap...");
    let times = Array1::from(vec![2.0, 4.0, 6.0, 8.0, 10.0]);
    let sampler = PhysicalSampler::new(times, FirstOrder::new(0.15, 7.5), 50.0, 5)
        .expect("Valid parameters");
    println!(
        "   Rejection probability per trajectory: {:.4}",
        sampler.rejection_probability()
    );
    let mut rng = seed_rng_from_u64(1);
    match sampler.sample(1_000, &mut rng) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e @ KineticsError::SamplingDivergence { .. }) => println!("   ✓ Caught error: {}", e),
        Err(e) => println!("   Unexpected error: {}", e),
    }

    // Test 4: A fit that cannot converge, aborted and then skipped
    println!("\n4. Testing fit divergence under both failure policies...");
    let times = Array1::from(vec![2.0, 4.0, 6.0, 8.0, 10.0]);
    let truth = FirstOrder::new(0.15, 7.5);
    let mut values = Array2::zeros((5, 2));
    for (i, &t) in times.iter().enumerate() {
        values[[i, 0]] = truth.a0 * (-truth.k * t).exp();
        values[[i, 1]] = values[[i, 0]] + if i % 2 == 0 { 0.2 } else { -0.2 };
    }
    let ensemble = Ensemble::from_values(times.clone(), values).expect("Positive ensemble");
    let options = NonlinearOptions {
        max_iterations: 1,
        ..Default::default()
    };
    let estimator = DualEstimator::new(times, 0.3, truth, LinearWeighting::InverseSigma, options);

    match estimator.estimate_ensemble(&ensemble, FailurePolicy::Abort, false) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Abort: {}", e),
    }
    match estimator.estimate_ensemble(&ensemble, FailurePolicy::Skip, false) {
        Ok(set) => println!(
            "   ✓ Skip: kept {:?}, skipped {:?}",
            set.indices, set.skipped
        ),
        Err(e) => println!("   Unexpected error: {}", e),
    }

    println!("\nError handling demo completed!");
}
