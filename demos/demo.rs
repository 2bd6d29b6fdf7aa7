// demos/demo.rs
use kinetic_wls::math_utils::Timer;
use kinetic_wls::mc::study::{run_study, StudyConfig};
use kinetic_wls::output;
use kinetic_wls::solvers::gls::LinearWeighting;
use kinetic_wls::Method;

fn main() {
    println!("Running kinetic-wls Monte Carlo Demo\n");

    let base = StudyConfig {
        trajectories: 8_192,
        ..Default::default()
    };
    println!(
        "k = {}, [A]0 = {}, sigma = {}, t = {:?}",
        base.k, base.a0, base.scale, base.times
    );
    println!(
        "Half-life: {:.3}, {} trajectories\n",
        base.truth().half_life(),
        base.trajectories
    );

    for weighting in [LinearWeighting::InverseSigma, LinearWeighting::InverseVariance] {
        let cfg = StudyConfig {
            weighting,
            ..base.clone()
        };

        let mut timer = Timer::new();
        timer.start();
        let out = run_study(&cfg).expect("Valid configuration");
        let elapsed = timer.elapsed_ms();

        println!("Linear weighting: {:?}", weighting);
        println!(
            "  Resampling: {} rounds, {} trajectories redrawn",
            out.sampling.rounds, out.sampling.redrawn
        );
        for method in [Method::NonLinear, Method::Linear] {
            let s = out.summary.method(method);
            println!(
                "  {:<11} mean k/k_true = {}  std = {:.4}  mean SE = {:.5}",
                method,
                output::format_mean(s.mean_ratio),
                s.std_ratio,
                s.mean_standard_error
            );
        }
        println!("  Time: {:.1} ms\n", elapsed);
    }

    let out = run_study(&base).expect("Valid configuration");
    let traj = &out.figure.trajectory;
    println!("Trajectory {} (error bars ±{}):", traj.index, traj.sigma);
    println!("{:>6} {:>10} {:>10}", "t", "[A]", "ln [A]");
    for ((t, c), ln_c) in traj
        .times
        .iter()
        .zip(traj.concentrations.iter())
        .zip(traj.log_concentrations())
    {
        println!("{:>6.1} {:>10.4} {:>10.4}", t, c, ln_c);
    }
}
