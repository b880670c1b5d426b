//! Query helpers for extracting data from loaded runs.

use ms_results::{RunManifest, SampleRecord, StepRecord};

use crate::error::{AppError, AppResult};

/// Variable names accepted by [`extract_series`].
pub const VARIABLES: &[&str] = &["current_a", "omega_rad_s", "v1_v", "soc", "terminal_v"];

/// Summary of a run's time range, step statistics and final state.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub sample_count: usize,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub rhs_evals: usize,
    pub min_step_s: f64,
    pub max_step_s: f64,
    pub final_omega_rad_s: f64,
    pub final_soc: f64,
}

pub fn get_run_summary(
    manifest: &RunManifest,
    samples: &[SampleRecord],
    steps: &[StepRecord],
) -> AppResult<RunSummary> {
    let last = steps
        .last()
        .ok_or_else(|| AppError::InvalidInput("No steps in run".to_string()))?;

    let sizes: Vec<f64> = steps.iter().filter_map(|s| s.step_s).collect();
    let min_step_s = sizes.iter().copied().fold(f64::INFINITY, f64::min);
    let max_step_s = sizes.iter().copied().fold(0.0, f64::max);

    Ok(RunSummary {
        time_range: (manifest.t_start_s, manifest.t_end_s),
        sample_count: samples.len(),
        accepted_steps: manifest.accepted_steps,
        rejected_steps: manifest.rejected_steps,
        rhs_evals: manifest.rhs_evals,
        min_step_s: if sizes.is_empty() { 0.0 } else { min_step_s },
        max_step_s,
        final_omega_rad_s: last.omega_rad_s,
        final_soc: last.soc,
    })
}

/// Extract `(time, value)` pairs for a sampled variable.
pub fn extract_series(samples: &[SampleRecord], variable: &str) -> AppResult<Vec<(f64, f64)>> {
    let pick: fn(&SampleRecord) -> f64 = match variable {
        "current_a" | "current" | "i_l" => |s: &SampleRecord| s.current_a,
        "omega_rad_s" | "omega" | "speed" => |s: &SampleRecord| s.omega_rad_s,
        "v1_v" | "v1" => |s: &SampleRecord| s.v1_v,
        "soc" | "z" => |s: &SampleRecord| s.soc,
        "terminal_v" | "v_t" => |s: &SampleRecord| s.terminal_v,
        _ => {
            return Err(AppError::InvalidInput(format!(
                "Unknown variable: {} (expected one of {})",
                variable,
                VARIABLES.join(", ")
            )));
        }
    };

    Ok(samples.iter().map(|s| (s.time_s, pick(s))).collect())
}

/// `(time, step size)` for every accepted step, keyed by the step's end time.
pub fn step_size_series(steps: &[StepRecord]) -> Vec<(f64, f64)> {
    steps
        .iter()
        .filter_map(|s| s.step_s.map(|h| (s.time_s, h)))
        .collect()
}
