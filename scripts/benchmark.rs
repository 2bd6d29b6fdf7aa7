// scripts/benchmark.rs
use kinetic_wls::math_utils::Timer;
use kinetic_wls::mc::sampler::PhysicalSampler;
use kinetic_wls::mc::study::StudyConfig;
use kinetic_wls::rng::seed_rng_from_u64;
use kinetic_wls::solvers::dual::{DualEstimator, FailurePolicy};
use kinetic_wls::KineticsResult;
use std::env;
use std::fs::File;
use std::io::{self, Write};

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_cores: usize,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_cores: num_cpus::get(),
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    trajectories: usize,
    time_ms: f64,
    throughput_per_sec: f64,
    mean_ratio: Option<f64>,
}

impl BenchmarkResult {
    fn new(name: String, trajectories: usize, time_ms: f64, mean_ratio: Option<f64>) -> Self {
        Self {
            name,
            trajectories,
            time_ms,
            throughput_per_sec: trajectories as f64 / (time_ms / 1000.0),
            mean_ratio,
        }
    }
}

fn mean_ratio(values: impl Iterator<Item = f64>, k_true: f64) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), k| (s + k / k_true, n + 1));
    sum / n as f64
}

fn run_benchmarks() -> KineticsResult<Vec<BenchmarkResult>> {
    let mut results = Vec::new();
    let base = StudyConfig::default();
    let times = base.time_grid();

    for &n in &[4_096usize, 32_768, 262_144] {
        println!("Running benchmarks with {} trajectories...", n);

        let sampler = PhysicalSampler::new(times.clone(), base.truth(), base.scale, base.max_resample_rounds)?;
        let mut rng = seed_rng_from_u64(base.seed);

        let mut timer = Timer::new();
        timer.start();
        let (ensemble, report) = sampler.sample(n, &mut rng)?;
        results.push(BenchmarkResult::new(
            format!("Rejection sampling ({} rounds)", report.rounds),
            n,
            timer.elapsed_ms(),
            None,
        ));

        let estimator = DualEstimator::new(
            times.clone(),
            base.scale,
            base.truth(),
            base.weighting,
            base.nonlinear,
        );
        for (parallel, label) in [(false, "sequential"), (true, "rayon")] {
            timer.start();
            let set = estimator.estimate_ensemble(&ensemble, FailurePolicy::Abort, parallel)?;
            let time_ms = timer.elapsed_ms();
            results.push(BenchmarkResult::new(
                format!("Dual fit, linear ({})", label),
                n,
                time_ms,
                Some(mean_ratio(set.linear.iter().map(|e| e.k), base.k)),
            ));
            results.push(BenchmarkResult::new(
                format!("Dual fit, non-linear ({})", label),
                n,
                time_ms,
                Some(mean_ratio(set.nonlinear.iter().map(|e| e.k), base.k)),
            ));
        }
    }

    Ok(results)
}

fn write_results_to_csv(
    results: &[BenchmarkResult],
    system_info: &SystemInfo,
    filename: &str,
) -> io::Result<()> {
    let mut file = File::create(filename)?;

    writeln!(file, "# OS: {}", system_info.os)?;
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores)?;
    writeln!(file, "# RUSTFLAGS: {}", system_info.rustc_flags)?;
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads)?;
    writeln!(
        file,
        "# Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "Benchmark,Trajectories,Time_ms,Throughput_per_sec,Mean_ratio")?;

    for result in results {
        writeln!(
            file,
            "{},{},{:.2},{:.0},{}",
            result.name,
            result.trajectories,
            result.time_ms,
            result.throughput_per_sec,
            result
                .mean_ratio
                .map(|m| format!("{:.4}", m))
                .unwrap_or_else(|| "N/A".to_string())
        )?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("kinetic-wls Benchmark Suite");
    println!("===========================\n");

    let system_info = SystemInfo::gather();
    println!("  OS: {}", system_info.os);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    let results = run_benchmarks()?;

    println!("\n{:=<86}", "");
    println!(
        "{:<40} {:>10} {:>12} {:>12} {:>8}",
        "Benchmark", "N", "Time (ms)", "Traj/s", "k̂/k"
    );
    println!("{:-<86}", "");
    for result in &results {
        println!(
            "{:<40} {:>10} {:>12.2} {:>12.0} {:>8}",
            result.name,
            result.trajectories,
            result.time_ms,
            result.throughput_per_sec,
            result
                .mean_ratio
                .map(|m| format!("{:.4}", m))
                .unwrap_or_else(|| "N/A".to_string())
        );
    }
    println!("{:=<86}", "");

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("benchmark_results_{}.csv", timestamp);
    write_results_to_csv(&results, &system_info, &filename)?;
    println!("\nResults saved to: {}", filename);
    println!("Run with: cargo run --bin benchmark --release");
    Ok(())
}
