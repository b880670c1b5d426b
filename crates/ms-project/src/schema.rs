//! Scenario file schema definitions.

use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub constants: ConstantsDef,
    #[serde(default)]
    pub scenarios: Vec<ScenarioDef>,
}

impl Project {
    pub fn scenario(&self, id: &str) -> Option<&ScenarioDef> {
        self.scenarios.iter().find(|s| s.id == id)
    }
}

/// Battery and motor parameters. Omitted fields take the reference values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConstantsDef {
    pub v_oc_v: f64,
    pub r0_ohm: f64,
    pub r1_ohm: f64,
    pub c1_f: f64,
    pub capacity_ah: f64,
    pub inertia_kg_m2: f64,
    pub friction_n_m_s: f64,
    pub k_motor: f64,
    pub rm_ohm: f64,
    pub lm_h: f64,
}

impl Default for ConstantsDef {
    fn default() -> Self {
        Self {
            v_oc_v: 3.7,
            r0_ohm: 0.005,
            r1_ohm: 0.005,
            c1_f: 100.0,
            capacity_ah: 1.0,
            inertia_kg_m2: 0.1,
            friction_n_m_s: 0.05,
            k_motor: 0.01,
            rm_ohm: 0.01,
            lm_h: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub load: LoadDef,
    #[serde(default)]
    pub initial: InitialStateDef,
    pub time_span: TimeSpanDef,
    #[serde(default)]
    pub grid: GridDef,
    #[serde(default)]
    pub solver: SolverDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type")]
pub enum LoadDef {
    #[default]
    Zero,
    Sinusoidal {
        amplitude_n_m: f64,
        #[serde(default = "default_bias")]
        bias: f64,
    },
}

fn default_bias() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InitialStateDef {
    pub current_a: f64,
    pub omega_rad_s: f64,
    pub v1_v: f64,
    pub soc: f64,
}

impl Default for InitialStateDef {
    fn default() -> Self {
        Self {
            current_a: 0.0,
            omega_rad_s: 0.0,
            v1_v: 0.0,
            soc: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSpanDef {
    #[serde(default)]
    pub start_s: f64,
    pub end_s: f64,
}

/// Output times for the resampled series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum GridDef {
    /// `points` evenly spaced times covering the whole span.
    Linspace { points: usize },
    /// Explicit non-decreasing times inside the span.
    Times { times: Vec<f64> },
}

impl Default for GridDef {
    fn default() -> Self {
        GridDef::Linspace { points: 1000 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum MethodDef {
    #[default]
    DormandPrince54,
    BogackiShampine32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverDef {
    pub method: MethodDef,
    pub atol: f64,
    pub rtol: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_step_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_step_s: Option<f64>,
    pub min_step_fraction: f64,
    pub max_steps: usize,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self {
            method: MethodDef::default(),
            atol: 1e-6,
            rtol: 1e-3,
            first_step_s: None,
            max_step_s: None,
            min_step_fraction: 1e-12,
            max_steps: 100_000,
        }
    }
}
