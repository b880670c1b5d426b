use ms_project::schema::*;
use ms_project::{ProjectError, load_json, load_project_file, load_yaml, save_json, save_yaml};

fn sample_project() -> Project {
    Project {
        version: LATEST_VERSION,
        name: "Roundtrip".to_string(),
        constants: ConstantsDef {
            capacity_ah: 2.5,
            ..ConstantsDef::default()
        },
        scenarios: vec![
            ScenarioDef {
                id: "explicit".to_string(),
                name: "Explicit grid".to_string(),
                load: LoadDef::Sinusoidal {
                    amplitude_n_m: 0.05,
                    bias: 0.5,
                },
                initial: InitialStateDef {
                    soc: 0.5,
                    ..InitialStateDef::default()
                },
                time_span: TimeSpanDef {
                    start_s: 1.0,
                    end_s: 11.0,
                },
                grid: GridDef::Times {
                    times: vec![1.0, 2.5, 11.0],
                },
                solver: SolverDef {
                    method: MethodDef::BogackiShampine32,
                    first_step_s: Some(1e-3),
                    max_step_s: Some(0.5),
                    ..SolverDef::default()
                },
            },
        ],
    }
}

#[test]
fn roundtrip_yaml() {
    let project = sample_project();
    let path = std::env::temp_dir().join("ms_project_roundtrip.yaml");

    save_yaml(&path, &project).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(project, loaded);
}

#[test]
fn roundtrip_json() {
    let project = sample_project();
    let path = std::env::temp_dir().join("ms_project_roundtrip.json");

    save_json(&path, &project).unwrap();
    let loaded = load_json(&path).unwrap();
    assert_eq!(project, loaded);

    let by_ext = load_project_file(&path).unwrap();
    assert_eq!(project, by_ext);
}

#[test]
fn save_refuses_invalid_project() {
    let mut project = sample_project();
    project.scenarios[0].time_span.end_s = 0.0;
    let path = std::env::temp_dir().join("ms_project_invalid.yaml");

    let err = save_yaml(&path, &project).unwrap_err();
    assert!(matches!(err, ProjectError::Validation(_)));
}

#[test]
fn missing_file_is_io_error() {
    let path = std::env::temp_dir().join("ms_project_does_not_exist.yaml");
    let _ = std::fs::remove_file(&path);
    assert!(matches!(load_yaml(&path).unwrap_err(), ProjectError::Io(_)));
}
