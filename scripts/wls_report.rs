// scripts/wls_report.rs
use anyhow::{Context, Result};
use bitflags::bitflags;
use clap::Parser;
use kinetic_wls::mc::study::{run_study, StudyConfig, StudyOutput};
use kinetic_wls::output;
use kinetic_wls::solvers::dual::FailurePolicy;
use kinetic_wls::solvers::gls::LinearWeighting;
use std::path::{Path, PathBuf};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Artifacts: u32 {
        const SUMMARY    = 1 << 0;
        const TRAJECTORY = 1 << 1;
        const RATIOS     = 1 << 2;
        const HISTOGRAMS = 1 << 3;
        const MANIFEST   = 1 << 4;
    }
}

#[derive(Parser)]
#[command(name = "wls-report")]
#[command(about = "Compare linearised and non-linear rate constant fits on simulated first-order data")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    /// JSON study configuration; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving the output artifacts
    #[arg(short, long, default_value = "results")]
    output: PathBuf,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of simulated trajectories
    #[arg(long)]
    trajectories: Option<usize>,

    /// Use inverse-variance instead of inverse-sigma weights for the linear fit
    #[arg(long)]
    inverse_variance: bool,

    /// Skip trajectories whose fit diverges instead of aborting
    #[arg(long)]
    skip_failures: bool,

    /// Threads (0 = auto)
    #[arg(long, default_value = "0")]
    threads: usize,

    /// Write bare decimals instead of \num{...} in the summary value files
    #[arg(long)]
    plain: bool,

    /// Only write the two summary value files
    #[arg(long)]
    summary_only: bool,
}

impl Cli {
    fn study_config(&self) -> Result<StudyConfig> {
        let mut cfg = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => StudyConfig::default(),
        };
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        if let Some(n) = self.trajectories {
            cfg.trajectories = n;
        }
        if self.inverse_variance {
            cfg.weighting = LinearWeighting::InverseVariance;
        }
        if self.skip_failures {
            cfg.failure_policy = FailurePolicy::Skip;
        }
        Ok(cfg)
    }

    fn artifacts(&self) -> Artifacts {
        if self.summary_only {
            Artifacts::SUMMARY
        } else {
            Artifacts::all()
        }
    }
}

fn write_artifacts(
    dir: &Path,
    artifacts: Artifacts,
    cfg: &StudyConfig,
    out: &StudyOutput,
    latex: bool,
) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    if artifacts.contains(Artifacts::SUMMARY) {
        output::write_summary_values(dir, &out.summary, latex)?;
    }
    if artifacts.contains(Artifacts::TRAJECTORY) {
        output::write_trajectory_csv(&dir.join("trajectory.csv"), &out.figure)?;
    }
    if artifacts.contains(Artifacts::RATIOS) {
        output::write_ratios_csv(&dir.join("ratios.csv"), &out.estimates, cfg.k)?;
    }
    if artifacts.contains(Artifacts::HISTOGRAMS) {
        output::write_histograms_csv(&dir.join("histograms.csv"), &out.figure)?;
    }
    if artifacts.contains(Artifacts::MANIFEST) {
        let manifest = [
            ("generated_at", chrono::Utc::now().to_rfc3339()),
            ("k", cfg.k.to_string()),
            ("a0", cfg.a0.to_string()),
            ("scale", cfg.scale.to_string()),
            ("trajectories", cfg.trajectories.to_string()),
            ("seed", cfg.seed.to_string()),
            ("weighting", format!("{:?}", cfg.weighting)),
            ("resample_rounds", out.sampling.rounds.to_string()),
            ("redrawn", out.sampling.redrawn.to_string()),
            ("skipped", out.summary.skipped.len().to_string()),
            ("mean_ratio_non", out.summary.nonlinear.mean_ratio.to_string()),
            ("std_ratio_non", out.summary.nonlinear.std_ratio.to_string()),
            ("mean_ratio_lin", out.summary.linear.mean_ratio.to_string()),
            ("std_ratio_lin", out.summary.linear.std_ratio.to_string()),
            ("elapsed_ms", format!("{:.1}", out.elapsed_ms)),
            ("rayon_threads", rayon::current_num_threads().to_string()),
            ("cpu_cores", num_cpus::get().to_string()),
        ];
        output::write_summary_to_csv(&dir.join("summary.csv"), &manifest)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .init();

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("configuring rayon thread pool")?;
    }

    let cfg = cli.study_config()?;
    let out = run_study(&cfg)?;
    write_artifacts(&cli.output, cli.artifacts(), &cfg, &out, !cli.plain)?;

    println!(
        "mean k_non/k = {}, mean k_lin/k = {} ({} trajectories, {} skipped) -> {}",
        output::format_mean(out.summary.nonlinear.mean_ratio),
        output::format_mean(out.summary.linear.mean_ratio),
        out.estimates.len(),
        out.summary.skipped.len(),
        cli.output.display()
    );
    Ok(())
}
