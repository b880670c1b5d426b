use std::path::Path;

use ms_project::schema::*;

#[test]
fn bundled_scenarios_load_and_validate() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenarios/battery_motor.yaml");
    let project = ms_project::load_yaml(&path)
        .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e));

    assert_eq!(project.constants, ConstantsDef::default());
    assert_eq!(project.scenarios.len(), 2);

    let loaded = project.scenario("sinusoidal_load").unwrap();
    assert_eq!(
        loaded.load,
        LoadDef::Sinusoidal {
            amplitude_n_m: 0.05,
            bias: 1.0
        }
    );
    assert_eq!(loaded.initial, InitialStateDef::default());
    assert_eq!(loaded.grid, GridDef::Linspace { points: 1200 });
}

#[test]
fn minimal_yaml_fills_defaults() {
    let yaml = r#"
version: 1
name: minimal
scenarios:
  - id: s1
    name: defaults
    time_span:
      end_s: 10.0
"#;
    let project: Project = serde_yaml::from_str(yaml).unwrap();
    ms_project::validate_project(&project).unwrap();

    let s = &project.scenarios[0];
    assert_eq!(s.load, LoadDef::Zero);
    assert_eq!(s.time_span.start_s, 0.0);
    assert_eq!(s.solver, SolverDef::default());
    assert_eq!(project.constants, ConstantsDef::default());
}

#[test]
fn sinusoidal_bias_defaults_to_one() {
    let yaml = r#"
type: Sinusoidal
amplitude_n_m: 0.2
"#;
    let load: LoadDef = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(
        load,
        LoadDef::Sinusoidal {
            amplitude_n_m: 0.2,
            bias: 1.0
        }
    );
}

#[test]
fn unknown_load_type_is_a_parse_error() {
    let yaml = "type: Ramp\n";
    assert!(serde_yaml::from_str::<LoadDef>(yaml).is_err());
}
