//! Project validation logic.

use crate::schema::{ConstantsDef, GridDef, InitialStateDef, LoadDef, Project, ScenarioDef, SolverDef};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::schema::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_constants(&project.constants)?;

    let mut scenario_ids = HashSet::new();
    for scenario in &project.scenarios {
        if scenario.id.trim().is_empty() {
            return Err(invalid(
                format!("scenario '{}' id", scenario.name),
                &scenario.id,
                "must not be empty",
            ));
        }
        if !scenario_ids.insert(&scenario.id) {
            return Err(ValidationError::DuplicateId {
                id: scenario.id.clone(),
                context: "scenarios".to_string(),
            });
        }
        validate_scenario(scenario)?;
    }

    Ok(())
}

fn invalid(field: String, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field.to_string(), v, "must be positive and finite"))
    }
}

fn non_negative(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field.to_string(), v, "must be non-negative and finite"))
    }
}

fn validate_constants(c: &ConstantsDef) -> Result<(), ValidationError> {
    non_negative("constants v_oc_v", c.v_oc_v)?;
    non_negative("constants r0_ohm", c.r0_ohm)?;
    positive("constants r1_ohm", c.r1_ohm)?;
    positive("constants c1_f", c.c1_f)?;
    positive("constants capacity_ah", c.capacity_ah)?;
    positive("constants inertia_kg_m2", c.inertia_kg_m2)?;
    non_negative("constants friction_n_m_s", c.friction_n_m_s)?;
    non_negative("constants k_motor", c.k_motor)?;
    non_negative("constants rm_ohm", c.rm_ohm)?;
    positive("constants lm_h", c.lm_h)?;
    Ok(())
}

fn validate_scenario(s: &ScenarioDef) -> Result<(), ValidationError> {
    let (start, end) = (s.time_span.start_s, s.time_span.end_s);
    if !start.is_finite() || !end.is_finite() || end < start {
        return Err(invalid(
            format!("scenario '{}' time_span", s.id),
            format!("[{start}, {end}]"),
            "must be finite with end >= start",
        ));
    }

    if let LoadDef::Sinusoidal { amplitude_n_m, bias } = s.load
        && (!amplitude_n_m.is_finite() || !bias.is_finite())
    {
        return Err(invalid(
            format!("scenario '{}' load", s.id),
            format!("amplitude {amplitude_n_m}, bias {bias}"),
            "must be finite",
        ));
    }

    validate_initial(&s.id, &s.initial)?;

    match &s.grid {
        GridDef::Linspace { points } => {
            if *points == 0 {
                return Err(invalid(
                    format!("scenario '{}' grid points", s.id),
                    points,
                    "must be at least 1",
                ));
            }
        }
        GridDef::Times { times } => {
            if let Some(t) = times.iter().find(|t| !t.is_finite() || **t < start || **t > end) {
                return Err(invalid(
                    format!("scenario '{}' grid times", s.id),
                    t,
                    "must lie inside the time span",
                ));
            }
            if times.windows(2).any(|w| w[1] < w[0]) {
                return Err(invalid(
                    format!("scenario '{}' grid times", s.id),
                    format!("{times:?}"),
                    "must be non-decreasing",
                ));
            }
        }
    }

    validate_solver(&s.id, &s.solver)
}

fn validate_initial(id: &str, init: &InitialStateDef) -> Result<(), ValidationError> {
    for (name, v) in [
        ("current_a", init.current_a),
        ("omega_rad_s", init.omega_rad_s),
        ("v1_v", init.v1_v),
    ] {
        if !v.is_finite() {
            return Err(invalid(
                format!("scenario '{id}' initial {name}"),
                v,
                "must be finite",
            ));
        }
    }
    if !(0.0..=1.0).contains(&init.soc) {
        return Err(invalid(
            format!("scenario '{id}' initial soc"),
            init.soc,
            "must be in [0, 1]",
        ));
    }
    Ok(())
}

fn validate_solver(id: &str, solver: &SolverDef) -> Result<(), ValidationError> {
    non_negative(&format!("scenario '{id}' solver atol"), solver.atol)?;
    non_negative(&format!("scenario '{id}' solver rtol"), solver.rtol)?;
    if let Some(h) = solver.first_step_s {
        positive(&format!("scenario '{id}' solver first_step_s"), h)?;
    }
    if let Some(h) = solver.max_step_s {
        positive(&format!("scenario '{id}' solver max_step_s"), h)?;
    }
    positive(
        &format!("scenario '{id}' solver min_step_fraction"),
        solver.min_step_fraction,
    )?;
    if solver.max_steps == 0 {
        return Err(invalid(
            format!("scenario '{id}' solver max_steps"),
            solver.max_steps,
            "must be positive",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::*;

    fn scenario(id: &str) -> ScenarioDef {
        ScenarioDef {
            id: id.to_string(),
            name: "No load".to_string(),
            load: LoadDef::Zero,
            initial: InitialStateDef::default(),
            time_span: TimeSpanDef {
                start_s: 0.0,
                end_s: 60.0,
            },
            grid: GridDef::default(),
            solver: SolverDef::default(),
        }
    }

    fn project(scenarios: Vec<ScenarioDef>) -> Project {
        Project {
            version: LATEST_VERSION,
            name: "test".to_string(),
            constants: ConstantsDef::default(),
            scenarios,
        }
    }

    #[test]
    fn valid_project_passes() {
        assert!(validate_project(&project(vec![scenario("a"), scenario("b")])).is_ok());
    }

    #[test]
    fn duplicate_scenario_ids_rejected() {
        let err = validate_project(&project(vec![scenario("a"), scenario("a")])).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateId { .. }));
    }

    #[test]
    fn empty_id_rejected() {
        assert!(validate_project(&project(vec![scenario(" ")])).is_err());
    }

    #[test]
    fn future_version_rejected() {
        let mut p = project(vec![]);
        p.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_project(&p).unwrap_err(),
            ValidationError::UnsupportedVersion { .. }
        ));
    }

    #[test]
    fn non_physical_constants_rejected() {
        let mut p = project(vec![]);
        p.constants.lm_h = 0.0;
        assert!(validate_project(&p).is_err());

        let mut p = project(vec![]);
        p.constants.capacity_ah = f64::NAN;
        assert!(validate_project(&p).is_err());
    }

    #[test]
    fn reversed_span_rejected() {
        let mut s = scenario("a");
        s.time_span.end_s = -1.0;
        assert!(validate_project(&project(vec![s])).is_err());
    }

    #[test]
    fn grid_times_checked_against_span() {
        let mut s = scenario("a");
        s.grid = GridDef::Times {
            times: vec![0.0, 70.0],
        };
        assert!(validate_project(&project(vec![s.clone()])).is_err());

        s.grid = GridDef::Times {
            times: vec![10.0, 5.0],
        };
        assert!(validate_project(&project(vec![s.clone()])).is_err());

        s.grid = GridDef::Times {
            times: vec![0.0, 5.0, 60.0],
        };
        assert!(validate_project(&project(vec![s])).is_ok());
    }

    #[test]
    fn bad_solver_options_rejected() {
        let mut s = scenario("a");
        s.solver.rtol = -1e-3;
        assert!(validate_project(&project(vec![s])).is_err());

        let mut s = scenario("a");
        s.solver.max_steps = 0;
        assert!(validate_project(&project(vec![s])).is_err());

        let mut s = scenario("a");
        s.solver.first_step_s = Some(0.0);
        assert!(validate_project(&project(vec![s])).is_err());
    }

    #[test]
    fn initial_charge_out_of_range_rejected() {
        let mut s = scenario("a");
        s.initial.soc = 1.2;
        assert!(validate_project(&project(vec![s])).is_err());
    }
}
