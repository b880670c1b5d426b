//! Compile scenario definitions into solver inputs.

use ms_model::{LoadProfile, ModelConstants, MotorState, PhysicalModel};
use ms_project::schema::{ConstantsDef, GridDef, LoadDef, MethodDef, ScenarioDef};
use ms_sim::{IntegratorType, SimOptions, TimeSpan};

use crate::error::{AppError, AppResult};

/// Everything a drive run needs, derived from one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioRuntime {
    pub model: PhysicalModel,
    pub load: LoadProfile,
    pub initial: MotorState,
    pub span: TimeSpan,
    pub grid: Vec<f64>,
    pub options: SimOptions,
}

/// Map file constants to model constants (capacity: Ah to C).
pub fn compile_constants(def: &ConstantsDef) -> ModelConstants {
    ModelConstants {
        v_oc: def.v_oc_v,
        r0: def.r0_ohm,
        r1: def.r1_ohm,
        c1: def.c1_f,
        capacity: ms_core::in_coulombs(ms_core::amp_hours(def.capacity_ah)),
        j: def.inertia_kg_m2,
        b: def.friction_n_m_s,
        k: def.k_motor,
        rm: def.rm_ohm,
        lm: def.lm_h,
    }
}

pub fn compile_scenario(
    constants: &ConstantsDef,
    scenario: &ScenarioDef,
) -> AppResult<ScenarioRuntime> {
    let model = PhysicalModel::new(compile_constants(constants))?;

    let load = match scenario.load {
        LoadDef::Zero => LoadProfile::Zero,
        LoadDef::Sinusoidal {
            amplitude_n_m,
            bias,
        } => LoadProfile::Sinusoidal {
            amplitude: amplitude_n_m,
            bias,
        },
    };
    load.validate()?;

    let initial = MotorState {
        i_l: scenario.initial.current_a,
        omega: scenario.initial.omega_rad_s,
        v1: scenario.initial.v1_v,
        soc: scenario.initial.soc,
    };

    let span = TimeSpan::new(scenario.time_span.start_s, scenario.time_span.end_s)
        .map_err(|e| AppError::Compile(format!("scenario '{}': {}", scenario.id, e)))?;

    let grid = match &scenario.grid {
        GridDef::Linspace { points } => ms_core::linspace(span.start, span.end, *points),
        GridDef::Times { times } => times.clone(),
    };

    let solver = &scenario.solver;
    let options = SimOptions {
        integrator: match solver.method {
            MethodDef::DormandPrince54 => IntegratorType::DormandPrince54,
            MethodDef::BogackiShampine32 => IntegratorType::BogackiShampine32,
        },
        atol: solver.atol,
        rtol: solver.rtol,
        first_step: solver.first_step_s,
        max_step: solver.max_step_s.unwrap_or(f64::INFINITY),
        min_step_fraction: solver.min_step_fraction,
        max_steps: solver.max_steps,
        ..SimOptions::default()
    };
    options
        .validate()
        .map_err(|e| AppError::Compile(format!("scenario '{}': {}", scenario.id, e)))?;

    Ok(ScenarioRuntime {
        model,
        load,
        initial,
        span,
        grid,
        options,
    })
}
