//! Content-based hashing for run IDs.

use ms_project::schema::{ConstantsDef, ScenarioDef};
use sha2::{Digest, Sha256};

pub fn compute_run_id(
    constants: &ConstantsDef,
    scenario: &ScenarioDef,
    solver_version: &str,
) -> String {
    let mut hasher = Sha256::new();

    let constants_json = serde_json::to_string(constants).unwrap_or_default();
    hasher.update(constants_json.as_bytes());

    let scenario_json = serde_json::to_string(scenario).unwrap_or_default();
    hasher.update(scenario_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_project::schema::*;

    fn scenario() -> ScenarioDef {
        ScenarioDef {
            id: "no_load".to_string(),
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

    #[test]
    fn hash_stability() {
        let constants = ConstantsDef::default();
        let hash1 = compute_run_id(&constants, &scenario(), "v1");
        let hash2 = compute_run_id(&constants, &scenario(), "v1");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let constants = ConstantsDef::default();
        let base = compute_run_id(&constants, &scenario(), "v1");

        let mut tighter = scenario();
        tighter.solver.rtol = 1e-6;
        assert_ne!(base, compute_run_id(&constants, &tighter, "v1"));

        let heavier = ConstantsDef {
            inertia_kg_m2: 0.2,
            ..ConstantsDef::default()
        };
        assert_ne!(base, compute_run_id(&heavier, &scenario(), "v1"));

        assert_ne!(base, compute_run_id(&constants, &scenario(), "v2"));
    }
}
