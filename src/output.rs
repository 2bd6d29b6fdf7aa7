// src/output.rs
use crate::analytics::aggregate::Summary;
use crate::analytics::figure::FigureData;
use crate::error::{KineticsError, KineticsResult};
use crate::solvers::dual::EstimateSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Summary value file names, read by the manuscript
pub const LINEAR_MEAN_FILE: &str = "lin_mean_wls.txt";
pub const NONLINEAR_MEAN_FILE: &str = "non_mean_wls.txt";

/// Mean ratio rounded to two decimals
pub fn format_mean(value: f64) -> String {
    format!("{:.2}", value)
}

/// Mean ratio wrapped for siunitx, e.g. `\num{0.99}`
pub fn format_mean_latex(value: f64) -> String {
    format!(r"\num{{{}}}", format_mean(value))
}

fn output_error(path: &Path, e: io::Error) -> KineticsError {
    KineticsError::Output {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

fn write_with<F>(path: &Path, body: F) -> KineticsResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let file = File::create(path).map_err(|e| output_error(path, e))?;
    let mut writer = BufWriter::new(file);
    body(&mut writer)
        .and_then(|_| writer.flush())
        .map_err(|e| output_error(path, e))
}

/// Write the two mean ratios into `dir`, one value per file
pub fn write_summary_values(dir: &Path, summary: &Summary, latex: bool) -> KineticsResult<()> {
    let fmt: fn(f64) -> String = if latex { format_mean_latex } else { format_mean };
    for (name, value) in [
        (LINEAR_MEAN_FILE, summary.linear.mean_ratio),
        (NONLINEAR_MEAN_FILE, summary.nonlinear.mean_ratio),
    ] {
        let path = dir.join(name);
        write_with(&path, |w| write!(w, "{}", fmt(value)))?;
    }
    Ok(())
}

/// Panel (a)/(b) data: one trajectory with its error bar
pub fn write_trajectory_csv(path: &Path, figure: &FigureData) -> KineticsResult<()> {
    let traj = &figure.trajectory;
    write_with(path, |w| {
        writeln!(w, "t,concentration,ln_concentration,sigma")?;
        for ((t, c), ln_c) in traj
            .times
            .iter()
            .zip(traj.concentrations.iter())
            .zip(traj.log_concentrations())
        {
            writeln!(w, "{},{},{},{}", t, c, ln_c, traj.sigma)?;
        }
        Ok(())
    })
}

/// Per-trajectory ratios and standard errors for both methods
pub fn write_ratios_csv(path: &Path, estimates: &EstimateSet, k_true: f64) -> KineticsResult<()> {
    write_with(path, |w| {
        writeln!(w, "trajectory,k_lin_ratio,se_lin,k_non_ratio,se_non")?;
        for ((j, lin), non) in estimates
            .indices
            .iter()
            .zip(estimates.linear.iter())
            .zip(estimates.nonlinear.iter())
        {
            writeln!(
                w,
                "{},{},{},{},{}",
                j,
                lin.ratio_to(k_true),
                lin.standard_error,
                non.ratio_to(k_true),
                non.standard_error
            )?;
        }
        Ok(())
    })
}

/// Panel (c)/(d) data: density histograms of both ratio distributions
pub fn write_histograms_csv(path: &Path, figure: &FigureData) -> KineticsResult<()> {
    write_with(path, |w| {
        writeln!(w, "method,left,right,density")?;
        for (method, panel) in [("non_linear", &figure.nonlinear), ("linear", &figure.linear)] {
            for (left, right, density) in panel.histogram.stairs() {
                writeln!(w, "{},{},{},{}", method, left, right, density)?;
            }
        }
        Ok(())
    })
}

pub fn write_summary_to_csv(path: &Path, summary_data: &[(&str, String)]) -> KineticsResult<()> {
    write_with(path, |w| {
        for (key, value) in summary_data {
            writeln!(w, "{},{}", key, value)?;
        }
        Ok(())
    })
}
