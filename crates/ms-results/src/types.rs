//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_id: String,
    pub timestamp: String,
    pub solver_version: String,
    /// Integrator name, e.g. "dormand-prince-5(4)"
    pub method: String,
    pub atol: f64,
    pub rtol: f64,
    pub t_start_s: f64,
    pub t_end_s: f64,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub rhs_evals: usize,
}

/// One resampled output point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SampleRecord {
    pub time_s: f64,
    pub current_a: f64,
    pub omega_rad_s: f64,
    pub v1_v: f64,
    pub soc: f64,
    pub terminal_v: f64,
}

/// One accepted integration point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepRecord {
    pub time_s: f64,
    /// Size of the step that ended here; absent for the initial point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_s: Option<f64>,
    pub current_a: f64,
    pub omega_rad_s: f64,
    pub v1_v: f64,
    pub soc: f64,
}
